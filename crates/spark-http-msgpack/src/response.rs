use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use spark_codec_msgpack::MsgPackFormatter;
use spark_formatting::negotiation::supports_content_type;
use spark_formatting::{Cancellation, DescribeType};
use tracing::warn;

use crate::ClientError;

/// 已完整接收的 HTTP 响应。
#[derive(Clone, Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// 组装响应。
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// 状态码。
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 响应头。
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 响应体。
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// `Content-Type` 头文本，非 ASCII 时视为缺失。
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// 非 2xx 状态转换为 [`ClientError::Status`]。
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status,
            })
        }
    }

    /// 用 `formatter` 把响应体读取为 `T`。
    ///
    /// # 契约说明（What）
    /// - 空响应体返回 `Ok(None)`；
    /// - 缺少 `Content-Type` 时按 MessagePack 尝试解码；
    /// - 声明了其它内容类型且响应体非空时返回 [`ClientError::UnsupportedMediaType`]。
    pub async fn read_as<T>(
        &self,
        formatter: &MsgPackFormatter,
        cancellation: &Cancellation,
    ) -> Result<Option<T>, ClientError>
    where
        T: DescribeType + DeserializeOwned + Send,
    {
        if let Some(content_type) = self.content_type() {
            if !self.body.is_empty() && !supports_content_type(formatter, content_type) {
                warn!(
                    content_type,
                    status = %self.status,
                    "response content type is not msgpack"
                );
                return Err(ClientError::UnsupportedMediaType {
                    content_type: content_type.to_owned(),
                });
            }
        }

        let mut reader: &[u8] = &self.body;
        formatter
            .read::<T, _>(&mut reader, cancellation)
            .await
            .map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use spark_formatting::ErrorCategory;
    use tracing_test::traced_test;

    fn with_content_type(value: &'static str, body: Vec<u8>) -> HttpResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        HttpResponse::new(StatusCode::OK, headers, body)
    }

    #[tokio::test]
    async fn reads_alias_content_type() {
        let formatter = MsgPackFormatter::standard();
        let body = formatter.encode_value(Some(&42u16)).expect("encode");
        let response = with_content_type("application/x-msgpack", body);
        let value = response
            .read_as::<u16>(&formatter, &Cancellation::new())
            .await
            .expect("decode");
        assert_eq!(value, Some(42));
    }

    #[tokio::test]
    #[traced_test]
    async fn foreign_content_type_is_rejected_and_logged() {
        let response = with_content_type("application/json", b"{}".to_vec());
        let err = response
            .read_as::<u16>(&MsgPackFormatter::standard(), &Cancellation::new())
            .await
            .expect_err("json body");
        assert_eq!(err.category(), ErrorCategory::UnsupportedMediaType);
        assert!(logs_contain("response content type is not msgpack"));
    }

    #[tokio::test]
    async fn empty_body_reads_as_none_regardless_of_content_type() {
        let response = with_content_type("text/plain", Vec::new());
        let value = response
            .read_as::<String>(&MsgPackFormatter::standard(), &Cancellation::new())
            .await
            .expect("empty");
        assert_eq!(value, None);
    }

    #[test]
    fn error_for_status_keeps_success() {
        let ok = HttpResponse::new(StatusCode::CREATED, HeaderMap::new(), Vec::new());
        assert!(ok.error_for_status().is_ok());
        let failed = HttpResponse::new(StatusCode::BAD_GATEWAY, HeaderMap::new(), Vec::new());
        assert!(matches!(
            failed.error_for_status(),
            Err(ClientError::Status { status }) if status == StatusCode::BAD_GATEWAY
        ));
    }
}
