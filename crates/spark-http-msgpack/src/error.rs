use http::StatusCode;
use spark_formatting::{BoxError, ErrorCategory, FormatterError};
use thiserror::Error;

/// 客户端辅助层的稳定错误码。
pub mod codes {
    /// 客户端句柄或选项缺失。
    pub const INVALID_ARGUMENT: &str = "client.invalid_argument";
    /// 请求 URI 无法解析为绝对地址。
    pub const INVALID_REQUEST_URI: &str = "client.invalid_request_uri";
    /// 请求在发送或等待响应时被取消。
    pub const CANCELLED: &str = "client.cancelled";
    /// 传输层失败。
    pub const TRANSPORT_IO: &str = "transport.io";
    /// 响应内容类型不受支持。
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "client.unsupported_media_type";
    /// 响应状态码表示失败。
    pub const STATUS: &str = "client.status";
}

/// 客户端辅助层错误。
///
/// 格式化阶段的错误通过 [`ClientError::Formatting`] 透传，错误码与分类沿用内部错误。
#[derive(Debug, Error)]
pub enum ClientError {
    /// 必填参数缺失。
    #[error("argument `{param}` must be provided")]
    InvalidArgument {
        /// 缺失参数的名称。
        param: &'static str,
    },

    /// 请求 URI 既不是绝对地址，客户端也没有基地址可供解析。
    #[error(
        "invalid request URI `{uri}`: it must be an absolute http(s) URI or the client must have a base address"
    )]
    InvalidRequestUri {
        /// 原始 URI 文本。
        uri: String,
    },

    /// 请求体编码或响应体解码失败。
    #[error(transparent)]
    Formatting(#[from] FormatterError),

    /// 操作被取消。
    #[error("{operation} cancelled")]
    Cancelled {
        /// 被取消的操作。
        operation: &'static str,
    },

    /// 传输层失败。
    #[error("transport failure: {source}")]
    Transport {
        /// 底层原因。
        #[source]
        source: BoxError,
    },

    /// 响应的内容类型无法由当前格式化器处理。
    #[error("unsupported response content type `{content_type}`")]
    UnsupportedMediaType {
        /// 响应声明的内容类型。
        content_type: String,
    },

    /// 响应状态码不在 2xx 范围。
    #[error("response status {status}")]
    Status {
        /// 响应状态码。
        status: StatusCode,
    },
}

impl ClientError {
    /// 构造参数缺失错误。
    pub fn invalid_argument(param: &'static str) -> Self {
        ClientError::InvalidArgument { param }
    }

    /// 构造取消错误。
    pub fn cancelled(operation: &'static str) -> Self {
        ClientError::Cancelled { operation }
    }

    /// 以任意底层错误构造传输错误。
    pub fn transport(source: impl Into<BoxError>) -> Self {
        ClientError::Transport {
            source: source.into(),
        }
    }

    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            ClientError::InvalidRequestUri { .. } => codes::INVALID_REQUEST_URI,
            ClientError::Formatting(inner) => inner.code(),
            ClientError::Cancelled { .. } => codes::CANCELLED,
            ClientError::Transport { .. } => codes::TRANSPORT_IO,
            ClientError::UnsupportedMediaType { .. } => codes::UNSUPPORTED_MEDIA_TYPE,
            ClientError::Status { .. } => codes::STATUS,
        }
    }

    /// 处置分类。
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::InvalidArgument { .. } => ErrorCategory::InvalidArgument,
            ClientError::InvalidRequestUri { .. } => ErrorCategory::RequestConstruction,
            ClientError::Formatting(inner) => inner.category(),
            ClientError::Cancelled { .. } => ErrorCategory::Cancelled,
            ClientError::Transport { .. } => ErrorCategory::Transport,
            ClientError::UnsupportedMediaType { .. } => ErrorCategory::UnsupportedMediaType,
            ClientError::Status { .. } => ErrorCategory::NonRetryable,
        }
    }

    /// 是否为取消结果，包括格式化阶段的取消。
    pub fn is_cancelled(&self) -> bool {
        match self {
            ClientError::Cancelled { .. } => true,
            ClientError::Formatting(inner) => inner.is_cancelled(),
            _ => false,
        }
    }

    /// 若为参数缺失错误，返回参数名。
    pub fn missing_param(&self) -> Option<&'static str> {
        match self {
            ClientError::InvalidArgument { param } => Some(param),
            ClientError::Formatting(inner) => inner.missing_param(),
            _ => None,
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ClientError {
    fn from(source: reqwest::Error) -> Self {
        ClientError::transport(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_errors_keep_their_identity() {
        let err = ClientError::from(FormatterError::decode("Person", "truncated"));
        assert_eq!(err.code(), "protocol.decode");
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
        assert!(!err.is_cancelled());
    }

    #[test]
    fn request_construction_is_its_own_category() {
        let err = ClientError::InvalidRequestUri {
            uri: "people/1".to_owned(),
        };
        assert_eq!(err.category(), ErrorCategory::RequestConstruction);
        assert!(err.to_string().contains("people/1"));
    }
}
