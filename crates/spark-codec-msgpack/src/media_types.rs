//! MessagePack 媒体类型常量。

use spark_formatting::MediaType;

/// 规范媒体类型文本。
pub const APPLICATION_MSGPACK_STR: &str = "application/msgpack";

/// 历史别名文本。
pub const APPLICATION_X_MSGPACK_STR: &str = "application/x-msgpack";

/// 规范媒体类型，同时是默认 `Content-Type`。
pub const APPLICATION_MSGPACK: MediaType = MediaType::from_static(APPLICATION_MSGPACK_STR);

/// 历史别名，读写行为与规范类型完全一致。
pub const APPLICATION_X_MSGPACK: MediaType = MediaType::from_static(APPLICATION_X_MSGPACK_STR);

/// 客户端请求时使用的 `Accept` 头值。
pub const ACCEPT_VALUE: &str = "application/msgpack, application/x-msgpack";

/// 格式化器声明的媒体类型，规范类型在前。
pub static SUPPORTED_MEDIA_TYPES: [MediaType; 2] = [APPLICATION_MSGPACK, APPLICATION_X_MSGPACK];
