use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use spark_formatting::io::{read_body, write_body};
use spark_formatting::{
    Cancellation, DescribeType, Direction, FormatterCapabilities, FormatterError, MediaType,
    MediaTypeFormatter, OperationKind, TypeDescriptor, validate_call,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::media_types::SUPPORTED_MEDIA_TYPES;
use crate::options::{SerializerOptions, SharedOptions};

/// MessagePack 媒体类型格式化器。
///
/// # 设计背景（Why）
/// - 宿主在协商阶段只调用能力面（资格与媒体类型），在读写阶段调用异步流转换；
///   两者共享同一份 [`SharedOptions`]，保证协商结论与实际编码一致；
/// - 实例不含可变状态，可在任意多个并发请求之间共享或廉价克隆。
///
/// # 逻辑解析（How）
/// - 资格判定统一委托给 `options.eligibility`；
/// - 读取先把请求体完整缓冲（受 `max_body_bytes` 约束），零字节直接返回 `None`，
///   否则交给 `rmp-serde` 解码；
/// - 写入时 `None` 不产生任何字节，其余情况编码后一次性写入并刷新。
///
/// # 契约说明（What）
/// - `Clone` 为浅拷贝，克隆体与原实例共享选项 `Arc`；
/// - 流由调用方借出，本类型从不关闭流。
#[derive(Clone, Debug)]
pub struct MsgPackFormatter {
    options: SharedOptions,
}

impl MsgPackFormatter {
    /// 使用给定选项构造。
    pub fn new(options: SharedOptions) -> Self {
        Self { options }
    }

    /// 从可能缺失的选项构造，缺失时返回参数错误 `options`。
    pub fn try_new(options: Option<SharedOptions>) -> Result<Self, FormatterError> {
        options
            .map(Self::new)
            .ok_or(FormatterError::invalid_argument("options"))
    }

    /// 使用进程级共享的标准选项构造。
    pub fn standard() -> Self {
        Self::new(SerializerOptions::standard_shared())
    }

    /// 当前持有的选项。
    pub fn options(&self) -> &SharedOptions {
        &self.options
    }

    /// 是否与 `other` 共享同一份选项实例。
    pub fn shares_options_with(&self, other: &MsgPackFormatter) -> bool {
        Arc::ptr_eq(&self.options, &other.options)
    }

    /// 以 `T` 自身的类型描述读取。
    pub async fn read<T, R>(
        &self,
        stream: &mut R,
        cancellation: &Cancellation,
    ) -> Result<Option<T>, FormatterError>
    where
        T: DescribeType + DeserializeOwned + Send,
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let descriptor = T::type_descriptor();
        self.read_from_stream(Some(&descriptor), Some(stream), cancellation)
            .await
    }

    /// 以 `T` 自身的类型描述写入。
    pub async fn write<T, W>(
        &self,
        value: Option<&T>,
        stream: &mut W,
        cancellation: &Cancellation,
    ) -> Result<(), FormatterError>
    where
        T: DescribeType + Serialize + Sync,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let descriptor = T::type_descriptor();
        self.write_to_stream(Some(&descriptor), value, Some(stream), cancellation)
            .await
    }

    /// 同步编码，供已持有完整缓冲的宿主（如响应构造）使用；`None` 编码为空字节串。
    pub fn encode_value<T>(&self, value: Option<&T>) -> Result<Vec<u8>, FormatterError>
    where
        T: Serialize,
    {
        match value {
            Some(value) => self.options.encode(value),
            None => Ok(Vec::new()),
        }
    }

    /// 同步解码；空字节串解码为 `None`。
    pub fn decode_value<T>(&self, bytes: &[u8]) -> Result<Option<T>, FormatterError>
    where
        T: DeserializeOwned,
    {
        if bytes.is_empty() {
            return Ok(None);
        }
        self.options.decode(bytes).map(Some)
    }
}

impl Default for MsgPackFormatter {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormatterCapabilities for MsgPackFormatter {
    fn supported_media_types(&self) -> &[MediaType] {
        &SUPPORTED_MEDIA_TYPES
    }

    fn can_read_type(&self, ty: &TypeDescriptor) -> bool {
        self.options.eligibility.is_eligible(ty, Direction::Read)
    }

    fn can_write_type(&self, ty: &TypeDescriptor) -> bool {
        self.options.eligibility.is_eligible(ty, Direction::Write)
    }
}

#[async_trait]
impl MediaTypeFormatter for MsgPackFormatter {
    async fn read_from_stream<T, R>(
        &self,
        ty: Option<&TypeDescriptor>,
        stream: Option<&mut R>,
        cancellation: &Cancellation,
    ) -> Result<Option<T>, FormatterError>
    where
        T: DeserializeOwned + Send + 'static,
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let (descriptor, stream) = validate_call::<T, R>(ty, stream)?;
        if cancellation.is_cancelled() {
            return Err(FormatterError::cancelled(OperationKind::READ_BODY));
        }

        let bytes = read_body(stream, cancellation, self.options.max_body_bytes).await?;
        if bytes.is_empty() {
            trace!(type_name = descriptor.name(), "empty msgpack body read as no value");
            return Ok(None);
        }

        let value = self.options.decode::<T>(&bytes)?;
        debug!(
            type_name = descriptor.name(),
            bytes = bytes.len(),
            "decoded msgpack body"
        );
        Ok(Some(value))
    }

    async fn write_to_stream<T, W>(
        &self,
        ty: Option<&TypeDescriptor>,
        value: Option<&T>,
        stream: Option<&mut W>,
        cancellation: &Cancellation,
    ) -> Result<(), FormatterError>
    where
        T: Serialize + Sync + 'static,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let (descriptor, stream) = validate_call::<T, W>(ty, stream)?;
        if cancellation.is_cancelled() {
            return Err(FormatterError::cancelled(OperationKind::WRITE_BODY));
        }

        let Some(value) = value else {
            trace!(type_name = descriptor.name(), "no value, msgpack body left empty");
            return Ok(());
        };

        let payload = self.options.encode(value)?;
        write_body(stream, &payload, cancellation).await?;
        debug!(
            type_name = descriptor.name(),
            bytes = payload.len(),
            "encoded msgpack body"
        );
        Ok(())
    }
}
