#![warn(missing_docs)]

//! # spark-http-msgpack
//!
//! ## 教案意图（Why）
//! - 客户端：一次调用完成“以 MessagePack 编码值 → 设置媒体类型 → 发出 POST/PUT”，
//!   取代一组按参数排列组合的重载；
//! - 服务端：为 axum 提供 [`server::MsgPack`] 提取器与响应，使处理函数直接收发类型化的值。
//!
//! ## 使用方式（How）
//! - 任何实现了 [`HttpTransport`] 的客户端都自动获得 [`MsgPackClientExt`]：
//!   `client.post_as_msgpack("people", &person).await`；
//! - 需要自定义选项或取消令牌时，在 `.await` 之前链式调用 `.options(..)`、`.cancellation(..)`；
//! - 生产环境使用 [`ReqwestTransport`]（`reqwest` 特性），测试中可替换为内存实现。
//!
//! ## 契约说明（What）
//! - 缺失客户端或选项时在任何 I/O 之前返回 [`ClientError::InvalidArgument`]；
//! - 相对 URI 在客户端没有基地址时返回 [`ClientError::InvalidRequestUri`]，同样不发出请求；
//! - 每次调用恰好发出一个请求，不重试、不排队，传输错误原样上抛。

mod config;
mod content;
mod error;
mod ext;
mod request;
mod response;
mod transport;
mod uri;

#[cfg(feature = "server")]
pub mod server;

pub use config::ClientConfig;
pub use content::{HttpContent, ObjectContent};
pub use error::{ClientError, codes};
pub use ext::{BoundRequest, MsgPackClientExt};
pub use request::{MsgPackRequest, send_as_msgpack};
pub use response::HttpResponse;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{HttpTransport, OutboundRequest};
pub use uri::RequestUri;
