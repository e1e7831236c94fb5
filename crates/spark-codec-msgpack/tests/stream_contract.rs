//! 格式化器流契约：参数校验、空请求体、畸形输入与取消。

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spark_codec_msgpack::{MsgPackFormatter, SerializerOptions};
use spark_formatting::{
    Cancellation, DescribeType, ErrorCategory, FormatterError, MediaTypeFormatter, TypeDescriptor,
};
use tokio::io::{AsyncRead, ReadBuf};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    id: u32,
    name: String,
}

impl DescribeType for Person {}

/// 永远挂起的读端。
struct Silent;

impl AsyncRead for Silent {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

/// 第一次读取即失败的读端。
struct Broken;

impl AsyncRead for Broken {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
    }
}

#[tokio::test]
async fn empty_stream_reads_as_none_for_every_type() {
    let formatter = MsgPackFormatter::standard();
    let cancellation = Cancellation::new();

    let mut empty: &[u8] = &[];
    assert_eq!(
        formatter
            .read::<Person, _>(&mut empty, &cancellation)
            .await
            .expect("person"),
        None
    );
    let mut empty: &[u8] = &[];
    assert_eq!(
        formatter
            .read::<u64, _>(&mut empty, &cancellation)
            .await
            .expect("u64"),
        None
    );
    let mut empty: &[u8] = &[];
    assert_eq!(
        formatter
            .read::<Vec<String>, _>(&mut empty, &cancellation)
            .await
            .expect("vec"),
        None
    );
    let mut empty: &[u8] = &[];
    assert_eq!(
        formatter
            .read::<Option<i8>, _>(&mut empty, &cancellation)
            .await
            .expect("option"),
        None
    );
}

#[tokio::test]
async fn none_value_writes_zero_bytes_for_every_type() {
    let formatter = MsgPackFormatter::standard();
    let cancellation = Cancellation::new();

    let mut sink = Vec::new();
    formatter
        .write::<Person, _>(None, &mut sink, &cancellation)
        .await
        .expect("person");
    assert!(sink.is_empty());

    let mut sink = Vec::new();
    formatter
        .write::<u64, _>(None, &mut sink, &cancellation)
        .await
        .expect("u64");
    assert!(sink.is_empty());

    let mut sink = Vec::new();
    formatter
        .write::<Vec<String>, _>(None, &mut sink, &cancellation)
        .await
        .expect("vec");
    assert!(sink.is_empty());

    let mut sink = Vec::new();
    formatter
        .write::<Option<i8>, _>(None, &mut sink, &cancellation)
        .await
        .expect("option");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn malformed_bytes_surface_as_decode_errors() {
    let formatter = MsgPackFormatter::standard();
    // fixarray(2) 后只跟了一个元素，随后数据截断。
    let mut truncated: &[u8] = &[0x92, 0x01];
    let err = formatter
        .read::<Person, _>(&mut truncated, &Cancellation::new())
        .await
        .expect_err("truncated payload");
    assert_eq!(err.category(), ErrorCategory::MalformedInput);
    assert_eq!(err.code(), "protocol.decode");
}

#[tokio::test]
async fn missing_arguments_are_reported_in_order() {
    let formatter = MsgPackFormatter::standard();
    let cancellation = Cancellation::new();
    let descriptor = Person::type_descriptor();

    let err = formatter
        .read_from_stream::<Person, &[u8]>(None, None, &cancellation)
        .await
        .expect_err("type missing");
    assert_eq!(err.missing_param(), Some("type"));

    let err = formatter
        .read_from_stream::<Person, &[u8]>(Some(&descriptor), None, &cancellation)
        .await
        .expect_err("stream missing");
    assert_eq!(err.missing_param(), Some("stream"));

    let err = formatter
        .write_to_stream::<Person, Vec<u8>>(None, None, None, &cancellation)
        .await
        .expect_err("type missing");
    assert_eq!(err.missing_param(), Some("type"));

    let err = formatter
        .write_to_stream::<Person, Vec<u8>>(Some(&descriptor), None, None, &cancellation)
        .await
        .expect_err("stream missing");
    assert_eq!(err.missing_param(), Some("stream"));
}

#[tokio::test]
async fn foreign_descriptor_is_rejected() {
    let formatter = MsgPackFormatter::standard();
    let descriptor = TypeDescriptor::of::<String>();
    let mut sink = Vec::new();
    let err = formatter
        .write_to_stream(Some(&descriptor), Some(&7u32), Some(&mut sink), &Cancellation::new())
        .await
        .expect_err("mismatch");
    assert!(matches!(err, FormatterError::TypeMismatch { .. }));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn pre_cancelled_calls_never_return_success() {
    let formatter = MsgPackFormatter::standard();
    let cancellation = Cancellation::new();
    cancellation.cancel();

    let mut empty: &[u8] = &[];
    let err = formatter
        .read::<Person, _>(&mut empty, &cancellation)
        .await
        .expect_err("cancelled read must not be None");
    assert!(err.is_cancelled());

    let mut sink = Vec::new();
    let err = formatter
        .write::<Person, _>(None, &mut sink, &cancellation)
        .await
        .expect_err("cancelled write");
    assert_eq!(err.category(), ErrorCategory::Cancelled);
}

#[tokio::test(flavor = "multi_thread")]
async fn pending_read_is_cancelled_mid_flight() {
    let formatter = MsgPackFormatter::standard();
    let cancellation = Cancellation::new();
    let trigger = cancellation.child();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(2),
        formatter.read::<Person, _>(&mut Silent, &cancellation),
    )
    .await
    .expect("cancellation must interrupt the read")
    .expect_err("cancelled");
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn stream_failures_are_transport_errors() {
    let err = MsgPackFormatter::standard()
        .read::<Person, _>(&mut Broken, &Cancellation::new())
        .await
        .expect_err("reset");
    assert_eq!(err.category(), ErrorCategory::Transport);
    assert_eq!(err.code(), "formatting.stream.read_failed");
}

#[tokio::test]
async fn oversized_body_is_rejected_before_decoding() {
    let formatter =
        MsgPackFormatter::new(SerializerOptions::standard().with_max_body_bytes(8).into_shared());
    let payload = SerializerOptions::standard()
        .encode(&Person {
            id: 1,
            name: "a name longer than eight bytes".to_owned(),
        })
        .expect("encode");
    let mut reader: &[u8] = &payload;
    let err = formatter
        .read::<Person, _>(&mut reader, &Cancellation::new())
        .await
        .expect_err("too large");
    assert!(matches!(err, FormatterError::BodyTooLarge { limit: 8 }));
}
