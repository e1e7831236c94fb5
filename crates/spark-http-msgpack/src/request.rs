use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use spark_codec_msgpack::media_types::{ACCEPT_VALUE, APPLICATION_MSGPACK_STR};
use spark_codec_msgpack::{MsgPackFormatter, SerializerOptions, SharedOptions};
use spark_formatting::{Cancellation, DescribeType};
use tracing::debug;

use crate::{ClientError, HttpResponse, HttpTransport, ObjectContent, OutboundRequest, RequestUri};

/// 一次 MessagePack 请求的完整描述。
///
/// # 设计背景（Why）
/// - 发送一个类型化值只涉及五个输入：方法、地址、值、选项、取消令牌；其中后两者有合理默认值，
///   因此用一个带默认值的描述对象代替按参数排列组合的多个入口；
/// - 所有入口最终都汇聚到 [`send_as_msgpack`]，参数校验与请求构造只有一份实现。
///
/// # 使用方式（How）
/// ```no_run
/// # use spark_http_msgpack::{MsgPackRequest, ReqwestTransport};
/// # async fn demo(client: &ReqwestTransport) -> Result<(), spark_http_msgpack::ClientError> {
/// let response = MsgPackRequest::post("people", 42u32).send(Some(client)).await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MsgPackRequest<T> {
    method: Method,
    uri: RequestUri,
    value: Option<T>,
    options: Option<SharedOptions>,
    cancellation: Option<Cancellation>,
}

impl<T> MsgPackRequest<T>
where
    T: DescribeType + Serialize + Send + Sync,
{
    /// 任意方法的请求；`value` 为 `None` 时发送空请求体。
    pub fn new(method: Method, uri: impl Into<RequestUri>, value: Option<T>) -> Self {
        Self {
            method,
            uri: uri.into(),
            value,
            options: None,
            cancellation: None,
        }
    }

    /// POST 请求。
    pub fn post(uri: impl Into<RequestUri>, value: T) -> Self {
        Self::new(Method::POST, uri, Some(value))
    }

    /// PUT 请求。
    pub fn put(uri: impl Into<RequestUri>, value: T) -> Self {
        Self::new(Method::PUT, uri, Some(value))
    }

    /// 指定序列化选项，缺省为进程级标准选项。
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// 指定取消令牌，缺省为永不取消的新令牌。
    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// 请求方法。
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// 请求地址。
    pub fn uri(&self) -> &RequestUri {
        &self.uri
    }

    /// 填充默认值后经 `client` 发送。
    pub async fn send<C>(self, client: Option<&C>) -> Result<HttpResponse, ClientError>
    where
        C: HttpTransport + ?Sized,
    {
        let options = self
            .options
            .unwrap_or_else(SerializerOptions::standard_shared);
        let cancellation = self.cancellation.unwrap_or_default();
        send_as_msgpack(
            client,
            self.method,
            &self.uri,
            self.value,
            Some(options),
            &cancellation,
        )
        .await
    }
}

/// 以 MessagePack 编码 `value` 并发出一个请求。
///
/// # 逻辑解析（How）
/// 1. 校验客户端与选项，缺失即返回参数错误；
/// 2. 结合客户端基地址解析 URI，失败返回 [`ClientError::InvalidRequestUri`]；
/// 3. 以 `options` 构造格式化器与请求体，设置 `Content-Type` 与 `Accept`；
/// 4. 交由传输发送，结果原样返回。
///
/// 前两步与第三步都发生在任何网络 I/O 之前。
pub async fn send_as_msgpack<C, T>(
    client: Option<&C>,
    method: Method,
    uri: &RequestUri,
    value: Option<T>,
    options: Option<SharedOptions>,
    cancellation: &Cancellation,
) -> Result<HttpResponse, ClientError>
where
    C: HttpTransport + ?Sized,
    T: DescribeType + Serialize + Send + Sync,
{
    let client = client.ok_or(ClientError::invalid_argument("client"))?;
    let options = options.ok_or(ClientError::invalid_argument("options"))?;
    let url = uri.resolve(client.base_address())?;

    let content = ObjectContent::new(value, MsgPackFormatter::new(options));
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_MSGPACK_STR));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

    debug!(method = %method, url = %url, "dispatching msgpack request");
    client
        .send(
            OutboundRequest {
                method,
                url,
                headers,
                content: Some(&content),
            },
            cancellation,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::StatusCode;
    use tracing_test::traced_test;
    use url::Url;

    /// 只回显请求体的内存传输。
    struct Echo {
        base: Url,
    }

    #[async_trait]
    impl HttpTransport for Echo {
        fn base_address(&self) -> Option<&Url> {
            Some(&self.base)
        }

        async fn send(
            &self,
            request: OutboundRequest<'_>,
            cancellation: &Cancellation,
        ) -> Result<HttpResponse, ClientError> {
            let body = match request.content {
                Some(content) => content.to_bytes(cancellation).await?,
                None => Vec::new(),
            };
            Ok(HttpResponse::new(StatusCode::OK, request.headers, body))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn dispatch_is_logged_with_resolved_url() {
        let client = Echo {
            base: Url::parse("http://echo.test/v1/").expect("base"),
        };
        let response = MsgPackRequest::put("people/7", 7u8)
            .send(Some(&client))
            .await
            .expect("echo");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(logs_contain("dispatching msgpack request"));
        assert!(logs_contain("http://echo.test/v1/people/7"));
    }

    #[tokio::test]
    async fn absent_value_sends_empty_body() {
        let client = Echo {
            base: Url::parse("http://echo.test/").expect("base"),
        };
        let response = MsgPackRequest::<u8>::new(Method::POST, "", None)
            .send(Some(&client))
            .await
            .expect("echo");
        assert!(response.body().is_empty());
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/msgpack"))
        );
    }
}
