use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// 底层原因的对象安全表示，便于跨编解码器携带具体错误。
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// 稳定错误码常量，沿用 `<领域>.<语义>` 命名约定。
pub mod codes {
    /// 必填参数缺失（类型、流、客户端句柄或序列化选项）。
    pub const INVALID_ARGUMENT: &str = "formatting.invalid_argument";
    /// 编解码器拒绝了字节流。
    pub const PROTOCOL_DECODE: &str = "protocol.decode";
    /// 声明类型与实际值类型不一致。
    pub const PROTOCOL_TYPE_MISMATCH: &str = "protocol.type_mismatch";
    /// 请求体超出读取预算。
    pub const PROTOCOL_BUDGET_EXCEEDED: &str = "protocol.budget_exceeded";
    /// 编码失败。
    pub const FORMATTING_ENCODE: &str = "formatting.encode";
    /// 流读取失败。
    pub const STREAM_READ: &str = "formatting.stream.read_failed";
    /// 流写入失败。
    pub const STREAM_WRITE: &str = "formatting.stream.write_failed";
    /// 流刷新失败。
    pub const STREAM_FLUSH: &str = "formatting.stream.flush_failed";
    /// 协作式取消。
    pub const CANCELLED: &str = "formatting.cancelled";
}

/// 错误分类枚举，驱动调用方的处置策略。
///
/// # 契约说明（What）
/// - `InvalidArgument`：必填输入缺失，在任何 I/O 之前同步抛出，永不重试；
/// - `MalformedInput`：编解码器拒绝输入，不会被掩盖为“无值”；
/// - `ResourceExhausted`：请求体超过配置的预算；
/// - `Transport`：网络或流层面失败，原样向上传播；
/// - `Cancelled`：协作式取消，必须与成功、畸形输入区分；
/// - `RequestConstruction`：请求 URI 无法解析，发生在网络 I/O 之前；
/// - `UnsupportedMediaType`：响应内容类型无法由当前格式化器处理；
/// - `NonRetryable`：其余确定性失败。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// 必填输入缺失。
    InvalidArgument,
    /// 输入字节无法被解码。
    MalformedInput,
    /// 超出资源预算。
    ResourceExhausted,
    /// 传输层失败。
    Transport,
    /// 操作被取消。
    Cancelled,
    /// 请求构造失败。
    RequestConstruction,
    /// 内容类型不受支持。
    UnsupportedMediaType,
    /// 其余不可重试错误。
    NonRetryable,
}

/// 描述一次底层操作对应的稳定错误码与默认文案。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationKind {
    /// 失败时使用的错误码。
    pub code: &'static str,
    /// 写入日志与错误消息的操作名。
    pub name: &'static str,
}

impl OperationKind {
    /// 读取请求/响应体。
    pub const READ_BODY: OperationKind = OperationKind {
        code: codes::STREAM_READ,
        name: "read body",
    };
    /// 写入请求/响应体。
    pub const WRITE_BODY: OperationKind = OperationKind {
        code: codes::STREAM_WRITE,
        name: "write body",
    };
    /// 刷新输出流。
    pub const FLUSH_BODY: OperationKind = OperationKind {
        code: codes::STREAM_FLUSH,
        name: "flush body",
    };
}

/// 格式化契约的统一错误域。
///
/// # 设计背景（Why）
/// - 宿主框架需要区分“参数缺失”“畸形输入”“取消”等结果才能给出正确的 HTTP 语义，
///   因此每种失败都有独立变体与稳定错误码；
/// - 编解码器的具体错误以 [`BoxError`] 保存在 `source` 中，保证错误链完整。
///
/// # 契约说明（What）
/// - [`code`](Self::code) 返回稳定错误码，[`category`](Self::category) 返回处置分类；
/// - 所有变体满足 `Send + Sync + 'static`，可跨任务传播。
#[derive(Debug, Error)]
pub enum FormatterError {
    /// 必填参数缺失。
    #[error("argument `{param}` must be provided")]
    InvalidArgument {
        /// 缺失参数的名称。
        param: &'static str,
    },

    /// 字节流无法解码为目标类型。
    #[error("malformed payload for `{type_name}`: {source}")]
    Decode {
        /// 目标类型名。
        type_name: &'static str,
        /// 编解码器给出的原因。
        #[source]
        source: BoxError,
    },

    /// 值无法编码。
    #[error("failed to encode `{type_name}`: {source}")]
    Encode {
        /// 被编码的类型名。
        type_name: &'static str,
        /// 编解码器给出的原因。
        #[source]
        source: BoxError,
    },

    /// 传入的类型描述与调用方的泛型类型不一致。
    #[error("type descriptor `{expected}` does not describe `{actual}`")]
    TypeMismatch {
        /// 类型描述声明的类型名。
        expected: &'static str,
        /// 实际读写的类型名。
        actual: &'static str,
    },

    /// 请求体超过读取预算。
    #[error("payload exceeds the {limit} byte limit")]
    BodyTooLarge {
        /// 配置的上限。
        limit: usize,
    },

    /// 操作被协作式取消。
    #[error("{operation} cancelled")]
    Cancelled {
        /// 被取消的操作名。
        operation: &'static str,
    },

    /// 底层流 I/O 失败。
    #[error("{}: {source}", .operation.name)]
    Io {
        /// 失败的操作。
        operation: OperationKind,
        /// I/O 错误。
        #[source]
        source: io::Error,
    },
}

impl FormatterError {
    /// 构造参数缺失错误。
    pub fn invalid_argument(param: &'static str) -> Self {
        FormatterError::InvalidArgument { param }
    }

    /// 构造解码错误。
    pub fn decode(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        FormatterError::Decode {
            type_name,
            source: source.into(),
        }
    }

    /// 构造编码错误。
    pub fn encode(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        FormatterError::Encode {
            type_name,
            source: source.into(),
        }
    }

    /// 构造取消错误。
    pub fn cancelled(operation: OperationKind) -> Self {
        FormatterError::Cancelled {
            operation: operation.name,
        }
    }

    /// 将 I/O 错误映射为格式化错误。
    pub fn io(operation: OperationKind, source: io::Error) -> Self {
        FormatterError::Io { operation, source }
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            FormatterError::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            FormatterError::Decode { .. } => codes::PROTOCOL_DECODE,
            FormatterError::Encode { .. } => codes::FORMATTING_ENCODE,
            FormatterError::TypeMismatch { .. } => codes::PROTOCOL_TYPE_MISMATCH,
            FormatterError::BodyTooLarge { .. } => codes::PROTOCOL_BUDGET_EXCEEDED,
            FormatterError::Cancelled { .. } => codes::CANCELLED,
            FormatterError::Io { operation, .. } => operation.code,
        }
    }

    /// 获取处置分类。
    pub fn category(&self) -> ErrorCategory {
        match self {
            FormatterError::InvalidArgument { .. } => ErrorCategory::InvalidArgument,
            FormatterError::Decode { .. } | FormatterError::TypeMismatch { .. } => {
                ErrorCategory::MalformedInput
            }
            FormatterError::BodyTooLarge { .. } => ErrorCategory::ResourceExhausted,
            FormatterError::Encode { .. } => ErrorCategory::NonRetryable,
            FormatterError::Cancelled { .. } => ErrorCategory::Cancelled,
            FormatterError::Io { .. } => ErrorCategory::Transport,
        }
    }

    /// 是否为取消结果。
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FormatterError::Cancelled { .. })
    }

    /// 若为参数缺失错误，返回缺失参数名。
    pub fn missing_param(&self) -> Option<&'static str> {
        match self {
            FormatterError::InvalidArgument { param } => Some(param),
            _ => None,
        }
    }
}
