use async_trait::async_trait;
use serde::Serialize;
use spark_codec_msgpack::MsgPackFormatter;
use spark_codec_msgpack::media_types::APPLICATION_MSGPACK;
use spark_formatting::{
    Cancellation, DescribeType, FormatterError, MediaType, MediaTypeFormatter, TypeDescriptor,
};
use tokio::io::AsyncWrite;

/// 请求体内容：知道自己的媒体类型，并能把自己写入输出流。
///
/// 传输实现只与该 trait 交互，不关心值的具体类型。
#[async_trait]
pub trait HttpContent: Send + Sync {
    /// 请求体的媒体类型。
    fn media_type(&self) -> &MediaType;

    /// 负责编码的格式化器。
    fn formatter(&self) -> &MsgPackFormatter;

    /// 将请求体写入 `sink`。
    async fn write_body(
        &self,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        cancellation: &Cancellation,
    ) -> Result<(), FormatterError>;

    /// 将请求体缓冲为字节。
    async fn to_bytes(&self, cancellation: &Cancellation) -> Result<Vec<u8>, FormatterError> {
        let mut buffer = Vec::new();
        self.write_body(&mut buffer, cancellation).await?;
        Ok(buffer)
    }
}

/// 持有一个类型化值的请求体内容。
#[derive(Clone, Debug)]
pub struct ObjectContent<T> {
    value: Option<T>,
    descriptor: TypeDescriptor,
    formatter: MsgPackFormatter,
    media_type: MediaType,
}

impl<T> ObjectContent<T>
where
    T: DescribeType + Serialize + Send + Sync,
{
    /// 以规范媒体类型构造；`None` 值将产生空请求体。
    pub fn new(value: Option<T>, formatter: MsgPackFormatter) -> Self {
        Self {
            value,
            descriptor: T::type_descriptor(),
            formatter,
            media_type: APPLICATION_MSGPACK,
        }
    }

    /// 持有的值。
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// 值的类型描述。
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl<T> HttpContent for ObjectContent<T>
where
    T: DescribeType + Serialize + Send + Sync,
{
    fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    fn formatter(&self) -> &MsgPackFormatter {
        &self.formatter
    }

    async fn write_body(
        &self,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        cancellation: &Cancellation,
    ) -> Result<(), FormatterError> {
        self.formatter
            .write_to_stream(
                Some(&self.descriptor),
                self.value.as_ref(),
                Some(sink),
                cancellation,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_value_buffers_to_empty_body() {
        let content = ObjectContent::<String>::new(None, MsgPackFormatter::standard());
        let bytes = content.to_bytes(&Cancellation::new()).await.expect("empty");
        assert!(bytes.is_empty());
        assert_eq!(content.media_type().essence(), "application/msgpack");
    }

    #[tokio::test]
    async fn present_value_matches_sync_encoding() {
        let formatter = MsgPackFormatter::standard();
        let content = ObjectContent::new(Some(vec![1u8, 2, 3]), formatter.clone());
        let bytes = content.to_bytes(&Cancellation::new()).await.expect("encode");
        assert_eq!(
            bytes,
            formatter.encode_value(Some(&vec![1u8, 2, 3])).expect("sync")
        );
    }
}
