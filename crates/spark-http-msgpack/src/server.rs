//! axum 服务端的 MessagePack 输入/输出格式化。
//!
//! # 教案意图（Why）
//! - 让处理函数以 `MsgPack<T>` 形式直接接收与返回类型化值，宿主负责内容协商与错误语义；
//! - 提取器与 [`respond`] 使用路由上安装的 [`MsgPackFormatter`]，与客户端共用同一套选项与空请求体语义。
//!
//! # 使用方式（How）
//! - 路由上以 `axum::Extension(formatter)` 安装格式化器；未安装时使用标准格式化器；
//! - 响应需要沿用已安装的选项或按 `Accept` 选择类型时调用 [`respond`]；
//!   直接返回 `MsgPack(value)` 时固定使用标准选项与规范类型。
//!
//! # 契约说明（What）
//! - 请求 `Content-Type` 不是 MessagePack 或类型不合格：415；
//! - 空请求体：400（处理函数需要一个值）；畸形请求体：400；
//! - 请求体超过宿主的 `DefaultBodyLimit` 或选项中的 `max_body_bytes`：413，且缓冲在越限时立即停止；
//! - `Accept` 与 MessagePack 无交集：406。

use axum::RequestExt;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::LengthLimitError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use spark_codec_msgpack::MsgPackFormatter;
use spark_codec_msgpack::media_types::APPLICATION_MSGPACK_STR;
use spark_formatting::negotiation::{select_reader, select_writer};
use spark_formatting::{
    Cancellation, DescribeType, ErrorCategory, FormatterCapabilities, FormatterError,
};
use thiserror::Error;
use tracing::debug;

/// MessagePack 请求体提取器与响应。
///
/// 作为响应时使用标准选项编码；需要已安装的格式化器时改用 [`respond`]。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MsgPack<T>(pub T);

/// 提取或响应失败时返回给对端的拒绝。
#[derive(Debug, Error)]
pub enum MsgPackRejection {
    /// 请求内容类型不受支持，或目标类型不可读。
    #[error("expected request with `Content-Type: application/msgpack`")]
    UnsupportedMediaType,
    /// 请求体为空。
    #[error("request body is empty")]
    MissingBody,
    /// 请求体超过宿主或选项给出的上限。
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
    /// 无法缓冲请求体。
    #[error("failed to buffer request body: {0}")]
    BodyRead(#[source] axum::Error),
    /// 请求体无法解码或超出上限。
    #[error(transparent)]
    Formatting(#[from] FormatterError),
    /// `Accept` 不接受 MessagePack，或类型不可写。
    #[error("no acceptable msgpack representation")]
    NotAcceptable,
}

impl MsgPackRejection {
    /// 对应的 HTTP 状态码。
    pub fn status(&self) -> StatusCode {
        match self {
            MsgPackRejection::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            MsgPackRejection::MissingBody | MsgPackRejection::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            MsgPackRejection::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            MsgPackRejection::Formatting(err) => match err.category() {
                ErrorCategory::ResourceExhausted => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            },
            MsgPackRejection::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        }
    }

    fn from_body_error(err: axum::Error) -> Self {
        if exceeds_length_limit(&err) {
            MsgPackRejection::PayloadTooLarge
        } else {
            MsgPackRejection::BodyRead(err)
        }
    }
}

/// 长度越限可能来自宿主的 `DefaultBodyLimit`，也可能来自本地上限，两者都包在 `axum::Error` 链中。
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(error) = current {
        if error.is::<LengthLimitError>() {
            return true;
        }
        current = error.source();
    }
    false
}

impl IntoResponse for MsgPackRejection {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl<T, S> FromRequest<S> for MsgPack<T>
where
    T: DescribeType + DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = MsgPackRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let formatter = req
            .extensions()
            .get::<MsgPackFormatter>()
            .cloned()
            .unwrap_or_default();

        let readable = {
            let readers: [&dyn FormatterCapabilities; 1] = [&formatter];
            let content_type = req
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            select_reader(&readers, &T::type_descriptor(), content_type).is_some()
        };
        if !readable {
            return Err(MsgPackRejection::UnsupportedMediaType);
        }

        let limit = formatter.options().max_body_bytes.unwrap_or(usize::MAX);
        let bytes = axum::body::to_bytes(req.into_limited_body(), limit)
            .await
            .map_err(MsgPackRejection::from_body_error)?;
        let mut reader: &[u8] = &bytes;
        match formatter.read::<T, _>(&mut reader, &Cancellation::new()).await? {
            Some(value) => Ok(MsgPack(value)),
            None => Err(MsgPackRejection::MissingBody),
        }
    }
}

impl<T> IntoResponse for MsgPack<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        encode_response(
            &MsgPackFormatter::standard(),
            HeaderValue::from_static(APPLICATION_MSGPACK_STR),
            &self.0,
        )
    }
}

/// 使用 `formatter` 的选项，按请求的 `Accept` 头协商并编码响应。
///
/// `Accept` 缺失时使用规范类型；选中别名时响应的 `Content-Type` 也是别名。
pub fn respond<T>(formatter: &MsgPackFormatter, request_headers: &HeaderMap, value: &T) -> Response
where
    T: DescribeType + Serialize,
{
    let writers: [&dyn FormatterCapabilities; 1] = [formatter];
    let accept = request_headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok());
    let Some(chosen) = select_writer(&writers, &T::type_descriptor(), accept) else {
        return MsgPackRejection::NotAcceptable.into_response();
    };
    match HeaderValue::from_str(chosen.media_type.essence()) {
        Ok(content_type) => encode_response(formatter, content_type, value),
        Err(_) => MsgPackRejection::NotAcceptable.into_response(),
    }
}

fn encode_response<T>(
    formatter: &MsgPackFormatter,
    content_type: HeaderValue,
    value: &T,
) -> Response
where
    T: Serialize,
{
    match formatter.encode_value(Some(value)) {
        Ok(payload) => {
            debug!(bytes = payload.len(), "encoded msgpack response");
            ([(CONTENT_TYPE, content_type)], Body::from(payload)).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
