use serde::{Deserialize, Serialize};
use url::Url;

/// 客户端传输配置，可由 TOML 加载。
///
/// ```toml
/// base_address = "http://peer.internal:8080/api/"
/// request_timeout_ms = 5000
/// user_agent = "billing-worker/1.4"
/// ```
///
/// 超时属于传输层职责，格式化与请求构造不施加任何超时。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 相对 URI 的解析基准。
    pub base_address: Option<Url>,
    /// 整个请求（含读取响应体）的超时。
    pub request_timeout_ms: Option<u64>,
    /// 自定义 `User-Agent`。
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// 从 TOML 文档加载。
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// 设置基地址。
    pub fn with_base_address(mut self, base: Url) -> Self {
        self.base_address = Some(base);
        self
    }
}
