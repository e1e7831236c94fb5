use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method};
use spark_formatting::Cancellation;
use url::Url;

use crate::{ClientError, HttpContent, HttpResponse};

/// 一次待发送的请求。
pub struct OutboundRequest<'a> {
    /// 请求方法。
    pub method: Method,
    /// 已解析的绝对地址。
    pub url: Url,
    /// 请求头。
    pub headers: HeaderMap,
    /// 请求体，`None` 表示不携带请求体。
    pub content: Option<&'a dyn HttpContent>,
}

impl std::fmt::Debug for OutboundRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

/// HTTP 传输接缝。
///
/// # 契约说明（What）
/// - `send` 每次调用发出恰好一个请求，不重试；
/// - 取消令牌在发送与等待响应期间都必须被观察，触发后返回 [`ClientError::Cancelled`]；
/// - `base_address` 用于解析相对 URI。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 相对 URI 的解析基准。
    fn base_address(&self) -> Option<&Url>;

    /// 发送请求并接收完整响应。
    async fn send(
        &self,
        request: OutboundRequest<'_>,
        cancellation: &Cancellation,
    ) -> Result<HttpResponse, ClientError>;
}

#[async_trait]
impl<T> HttpTransport for Arc<T>
where
    T: HttpTransport + ?Sized,
{
    fn base_address(&self) -> Option<&Url> {
        (**self).base_address()
    }

    async fn send(
        &self,
        request: OutboundRequest<'_>,
        cancellation: &Cancellation,
    ) -> Result<HttpResponse, ClientError> {
        (**self).send(request, cancellation).await
    }
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use std::time::Duration;

    use async_trait::async_trait;
    use spark_formatting::Cancellation;
    use tracing::debug;
    use url::Url;

    use super::{HttpTransport, OutboundRequest};
    use crate::{ClientConfig, ClientError, HttpResponse};

    const SEND_REQUEST: &str = "send request";

    /// 基于 `reqwest` 的传输实现。
    ///
    /// 请求体先完整缓冲再发送；取消令牌与整个请求/响应交换竞争，先触发者胜出。
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
        base_address: Option<Url>,
    }

    impl ReqwestTransport {
        /// 包装现有客户端。
        pub fn new(client: reqwest::Client, base_address: Option<Url>) -> Self {
            Self {
                client,
                base_address,
            }
        }

        /// 按配置构建客户端。
        pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.request_timeout_ms {
                builder = builder.timeout(Duration::from_millis(timeout));
            }
            if let Some(agent) = &config.user_agent {
                builder = builder.user_agent(agent.as_str());
            }
            let client = builder.build()?;
            Ok(Self::new(client, config.base_address.clone()))
        }

        /// 底层客户端。
        pub fn client(&self) -> &reqwest::Client {
            &self.client
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        fn base_address(&self) -> Option<&Url> {
            self.base_address.as_ref()
        }

        async fn send(
            &self,
            request: OutboundRequest<'_>,
            cancellation: &Cancellation,
        ) -> Result<HttpResponse, ClientError> {
            if cancellation.is_cancelled() {
                return Err(ClientError::cancelled(SEND_REQUEST));
            }

            let body = match request.content {
                Some(content) => content.to_bytes(cancellation).await?,
                None => Vec::new(),
            };
            debug!(
                method = %request.method,
                url = %request.url,
                bytes = body.len(),
                "sending request"
            );

            let exchange = async {
                let response = self
                    .client
                    .request(request.method, request.url)
                    .headers(request.headers)
                    .body(body)
                    .send()
                    .await?;
                let status = response.status();
                let headers = response.headers().clone();
                let body = response.bytes().await?;
                Ok::<_, reqwest::Error>(HttpResponse::new(status, headers, body))
            };

            tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(ClientError::cancelled(SEND_REQUEST)),
                result = exchange => result.map_err(ClientError::from),
            }
        }
    }
}
