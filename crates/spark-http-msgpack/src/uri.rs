use url::{ParseError, Url};

use crate::ClientError;

/// 请求目标：文本形式或已解析的 [`Url`]。
///
/// 空文本表示“直接使用客户端基地址”。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestUri {
    /// 尚未解析的文本，可以是绝对或相对地址。
    Text(String),
    /// 已解析的地址。
    Url(Url),
}

impl RequestUri {
    /// 结合客户端基地址解析出最终请求地址。
    ///
    /// # 契约说明（What）
    /// - 绝对的 `http`/`https` 地址原样使用；
    /// - 相对文本（含空文本）拼接到 `base` 上；
    /// - 其余情况（无基地址的相对文本、非 HTTP 协议、无法解析）返回
    ///   [`ClientError::InvalidRequestUri`]，此时尚未进行任何网络 I/O。
    pub fn resolve(&self, base: Option<&Url>) -> Result<Url, ClientError> {
        let resolved = match self {
            RequestUri::Url(url) => Some(url.clone()),
            RequestUri::Text(text) => match Url::parse(text) {
                Ok(url) => Some(url),
                Err(ParseError::RelativeUrlWithoutBase) => {
                    base.and_then(|base| base.join(text).ok())
                }
                Err(_) => None,
            },
        };
        resolved
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ClientError::InvalidRequestUri {
                uri: self.to_string(),
            })
    }
}

impl std::fmt::Display for RequestUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestUri::Text(text) => f.write_str(text),
            RequestUri::Url(url) => f.write_str(url.as_str()),
        }
    }
}

impl From<&str> for RequestUri {
    fn from(value: &str) -> Self {
        RequestUri::Text(value.to_owned())
    }
}

impl From<String> for RequestUri {
    fn from(value: String) -> Self {
        RequestUri::Text(value)
    }
}

impl From<Url> for RequestUri {
    fn from(value: Url) -> Self {
        RequestUri::Url(value)
    }
}

impl From<&Url> for RequestUri {
    fn from(value: &Url) -> Self {
        RequestUri::Url(value.clone())
    }
}
