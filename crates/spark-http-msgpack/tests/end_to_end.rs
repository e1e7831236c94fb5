//! 真实 HTTP 往返：reqwest 客户端 ⇄ axum 回显服务。
//!
//! 服务端以 `MsgPack<Person>` 接收请求体并按 `Accept` 原样回写，客户端用同一套格式化器解码响应。

#![cfg(all(feature = "reqwest", feature = "server"))]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Extension};
use axum::response::Response;
use axum::routing::post;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use spark_codec_msgpack::{MsgPackFormatter, SerializerOptions};
use spark_formatting::{Cancellation, DescribeType};
use spark_http_msgpack::server::{MsgPack, respond};
use spark_http_msgpack::{ClientConfig, MsgPackClientExt, ReqwestTransport};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: u32,
    name: String,
    born_year: i32,
}

impl DescribeType for Person {}

fn ada() -> Person {
    Person {
        id: 1,
        name: "Ada".to_owned(),
        born_year: 1815,
    }
}

async fn echo(
    Extension(formatter): Extension<MsgPackFormatter>,
    headers: HeaderMap,
    MsgPack(person): MsgPack<Person>,
) -> Response {
    respond(&formatter, &headers, &person)
}

async fn slow(MsgPack(_person): MsgPack<Person>) -> StatusCode {
    tokio::time::sleep(Duration::from_secs(30)).await;
    StatusCode::OK
}

async fn spawn_peer() -> SocketAddr {
    let app = Router::new()
        .route("/people", post(echo).put(echo))
        .route("/slow", post(slow))
        .layer(Extension(MsgPackFormatter::standard()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

async fn accept_note(MsgPack(_note): MsgPack<String>) -> StatusCode {
    StatusCode::OK
}

/// 宿主把请求体上限收紧到 1 KiB 的对端。
async fn spawn_limited_peer() -> SocketAddr {
    let app = Router::new()
        .route("/notes", post(accept_note))
        .layer(DefaultBodyLimit::max(1024));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn client_for(addr: SocketAddr) -> ReqwestTransport {
    let base = Url::parse(&format!("http://{addr}/")).expect("base address");
    let config = ClientConfig {
        request_timeout_ms: Some(10_000),
        ..ClientConfig::default()
    }
    .with_base_address(base);
    ReqwestTransport::from_config(&config).expect("client")
}

#[tokio::test(flavor = "multi_thread")]
async fn post_round_trips_through_a_real_peer() {
    let client = client_for(spawn_peer().await);
    let response = client
        .post_as_msgpack("people", ada())
        .await
        .expect("post")
        .error_for_status()
        .expect("2xx");

    assert_eq!(
        response.content_type(),
        Some("application/msgpack"),
        "peer answers with the canonical type"
    );
    let echoed = response
        .read_as::<Person>(&MsgPackFormatter::standard(), &Cancellation::new())
        .await
        .expect("decode");
    assert_eq!(echoed, Some(ada()));
}

#[tokio::test(flavor = "multi_thread")]
async fn put_with_field_keyed_options_round_trips() {
    let client = client_for(spawn_peer().await);
    let response = client
        .put_as_msgpack("people", ada())
        .options(SerializerOptions::contractless().into_shared())
        .await
        .expect("put")
        .error_for_status()
        .expect("2xx");
    let echoed = response
        .read_as::<Person>(&MsgPackFormatter::standard(), &Cancellation::new())
        .await
        .expect("decode");
    assert_eq!(echoed, Some(ada()));
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_rejects_foreign_content_types() {
    let addr = spawn_peer().await;
    let client = client_for(addr);
    let response = client
        .client()
        .post(format!("http://{addr}/people"))
        .header(CONTENT_TYPE, "application/json")
        .body("{\"id\":1}")
        .send()
        .await
        .expect("raw post");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test(flavor = "multi_thread")]
async fn mid_flight_cancellation_is_reported_as_cancelled() {
    let client = client_for(spawn_peer().await);
    let cancellation = Cancellation::new();
    let trigger = cancellation.child();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        client
            .post_as_msgpack("slow", ada())
            .cancellation(cancellation)
            .into_future(),
    )
    .await
    .expect("cancellation must beat the slow handler")
    .expect_err("cancelled");
    assert!(err.is_cancelled());
}

#[tokio::test(flavor = "multi_thread")]
async fn host_body_limit_is_enforced_with_413() {
    let addr = spawn_limited_peer().await;
    let client = client_for(addr);
    let formatter = MsgPackFormatter::standard();

    let small = formatter
        .encode_value(Some(&"short".to_owned()))
        .expect("encode small");
    let response = client
        .client()
        .post(format!("http://{addr}/notes"))
        .header(CONTENT_TYPE, "application/msgpack")
        .body(small)
        .send()
        .await
        .expect("small post");
    assert_eq!(response.status(), StatusCode::OK);

    let large = formatter
        .encode_value(Some(&"x".repeat(8 * 1024)))
        .expect("encode large");
    let response = client
        .client()
        .post(format!("http://{addr}/notes"))
        .header(CONTENT_TYPE, "application/msgpack")
        .body(large)
        .send()
        .await
        .expect("large post");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
