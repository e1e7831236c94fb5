use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{Cancellation, FormatterError, MediaType, TypeDescriptor};

/// 格式化器的对象安全能力面，供宿主在协商阶段以 `&dyn` 形式遍历。
///
/// # 契约说明（What）
/// - [`supported_media_types`](Self::supported_media_types) 在实例生命周期内恒定且有序，
///   首项为规范类型，宿主以它作为默认 `Content-Type`；
/// - `can_read_type`/`can_write_type` 为纯函数，返回 `false` 是协商信号而非错误。
pub trait FormatterCapabilities: Send + Sync {
    /// 支持的媒体类型，按优先级排列。
    fn supported_media_types(&self) -> &[MediaType];

    /// 是否能把请求体读取为 `ty`。
    fn can_read_type(&self, ty: &TypeDescriptor) -> bool;

    /// 是否能把 `ty` 的值写入响应体。
    fn can_write_type(&self, ty: &TypeDescriptor) -> bool;
}

/// 异步流与对象之间的转换契约。
///
/// # 设计背景（Why）
/// - 宿主框架以“类型描述 + 流 + 取消令牌”的形态调用格式化器；参数在 Rust 中以 `Option`
///   建模，以便缺失时返回带参数名的 [`FormatterError::InvalidArgument`]，而不是在类型层面消失；
/// - 流由调用方借出，格式化器既不持有也不关闭它。
///
/// # 契约说明（What）
/// - **读取**：零字节返回 `Ok(None)`，编解码器不被调用；畸形字节返回 [`FormatterError::Decode`]；
/// - **写入**：`value` 为 `None` 时写入零字节并成功返回；
/// - **取消**：已触发的令牌在任何 I/O 之前返回 [`FormatterError::Cancelled`]；
/// - **校验顺序**：类型描述 → 流 → 描述与泛型一致性 → 取消。
#[async_trait]
pub trait MediaTypeFormatter: FormatterCapabilities {
    /// 从流中读取一个 `T`。
    async fn read_from_stream<T, R>(
        &self,
        ty: Option<&TypeDescriptor>,
        stream: Option<&mut R>,
        cancellation: &Cancellation,
    ) -> Result<Option<T>, FormatterError>
    where
        T: DeserializeOwned + Send + 'static,
        R: AsyncRead + Unpin + Send + ?Sized;

    /// 把 `value` 写入流。
    async fn write_to_stream<T, W>(
        &self,
        ty: Option<&TypeDescriptor>,
        value: Option<&T>,
        stream: Option<&mut W>,
        cancellation: &Cancellation,
    ) -> Result<(), FormatterError>
    where
        T: Serialize + Sync + 'static,
        W: AsyncWrite + Unpin + Send + ?Sized;
}

/// 依次校验必填参数与类型一致性，返回解引用后的类型描述与流。
///
/// 格式化器实现共享这段前置检查，保证错误顺序一致。
pub fn validate_call<'a, T, S>(
    ty: Option<&'a TypeDescriptor>,
    stream: Option<&'a mut S>,
) -> Result<(&'a TypeDescriptor, &'a mut S), FormatterError>
where
    T: ?Sized + 'static,
    S: ?Sized,
{
    let ty = ty.ok_or(FormatterError::invalid_argument("type"))?;
    let stream = stream.ok_or(FormatterError::invalid_argument("stream"))?;
    if !ty.is::<T>() {
        return Err(FormatterError::TypeMismatch {
            expected: ty.name(),
            actual: std::any::type_name::<T>(),
        });
    }
    Ok((ty, stream))
}
