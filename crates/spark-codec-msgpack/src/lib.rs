#![warn(missing_docs)]

//! `spark-codec-msgpack` 把 MessagePack 接入 `spark-formatting` 的格式化契约。
//!
//! # 教案背景（Why）
//! - HTTP 宿主默认只会 JSON/XML；本 crate 提供一个可注册的 [`MsgPackFormatter`]，
//!   让宿主在协商到 `application/msgpack` 时改用紧凑的二进制编码；
//! - 编解码本身完全委托给 `rmp-serde`，本 crate 只负责资格判定、空请求体语义、取消与错误映射。
//!
//! # 使用概览（How）
//! - `MsgPackFormatter::standard()` 使用进程级共享的标准选项；
//! - 需要字段名键控或读取上限时，构造 [`SerializerOptions`] 并包进 `Arc` 传给 [`MsgPackFormatter::new`]；
//! - 选项也可由 TOML 文档加载（[`SerializerOptions::from_toml_str`]）。
//!
//! # 合约说明（What）
//! - 支持的媒体类型固定为 `application/msgpack`（规范）与 `application/x-msgpack`（别名），顺序不变；
//! - 空请求体读为 `None`，`None` 写为空请求体；
//! - 格式化器克隆为浅拷贝，选项 `Arc` 共享，不会深拷贝。
//!
//! # 风险提示（Trade-offs）
//! - 读取采用“完整缓冲后解码”，内存占用与请求体大小成正比，需配合 `max_body_bytes` 限制。

mod formatter;
mod options;

pub mod media_types;

pub use formatter::MsgPackFormatter;
pub use options::{SerializerOptions, SharedOptions, StructLayout};
