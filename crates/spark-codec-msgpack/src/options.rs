use std::any::type_name;
use std::sync::{Arc, LazyLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spark_formatting::{EligibilityPolicy, FormatterError};

/// 跨格式化器共享的选项句柄。
pub type SharedOptions = Arc<SerializerOptions>;

static STANDARD: LazyLock<SharedOptions> =
    LazyLock::new(|| Arc::new(SerializerOptions::standard()));

/// 结构体在线上的排布方式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructLayout {
    /// 按字段顺序编码为数组，体积最小，但要求收发双方字段顺序一致。
    #[default]
    Array,
    /// 以字段名为键编码为映射，无需双方约定字段顺序。
    Map,
}

/// MessagePack 序列化选项。
///
/// # 设计背景（Why）
/// - 每次读写都要用到同一份不可变配置，因此以 [`SharedOptions`] 的形式在格式化器、
///   请求构造器与并发任务之间共享；
/// - 资格策略也放在这里，使“哪些类型可以走二进制编码”与编码细节一起配置。
///
/// # 契约说明（What）
/// - 解码同时接受数组与映射两种结构体排布，`struct_layout` 只影响编码；
/// - `max_body_bytes` 为 `None` 时不限制读取大小；
/// - 所有字段在 TOML 中均可省略，缺省值等同 [`SerializerOptions::standard`]。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// 结构体排布。
    pub struct_layout: StructLayout,
    /// 是否让 serde 以人类可读模式工作（影响 `Uuid`、时间等类型的编码）。
    pub human_readable: bool,
    /// 读取请求体的字节上限。
    pub max_body_bytes: Option<usize>,
    /// 读写资格策略。
    pub eligibility: EligibilityPolicy,
}

impl SerializerOptions {
    /// 标准选项：数组排布、二进制模式、无读取上限、严格资格策略。
    pub fn standard() -> Self {
        Self {
            struct_layout: StructLayout::Array,
            human_readable: false,
            max_body_bytes: None,
            eligibility: EligibilityPolicy::STRICT,
        }
    }

    /// 以字段名为键的选项，适合收发双方无法约定字段顺序的场景。
    pub fn contractless() -> Self {
        Self {
            struct_layout: StructLayout::Map,
            ..Self::standard()
        }
    }

    /// 进程级共享的标准选项，多次调用返回同一个 `Arc`。
    pub fn standard_shared() -> SharedOptions {
        Arc::clone(&STANDARD)
    }

    /// 从 TOML 文档加载，缺省字段取标准值。
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// 设置结构体排布。
    pub fn with_struct_layout(mut self, layout: StructLayout) -> Self {
        self.struct_layout = layout;
        self
    }

    /// 设置读取上限。
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    /// 设置资格策略。
    pub fn with_eligibility(mut self, policy: EligibilityPolicy) -> Self {
        self.eligibility = policy;
        self
    }

    /// 包装为共享句柄。
    pub fn into_shared(self) -> SharedOptions {
        Arc::new(self)
    }

    /// 按当前选项编码 `value`。
    pub fn encode<T>(&self, value: &T) -> Result<Vec<u8>, FormatterError>
    where
        T: Serialize + ?Sized,
    {
        let mut buffer = Vec::new();
        let outcome = match (self.struct_layout, self.human_readable) {
            (StructLayout::Array, false) => {
                value.serialize(&mut rmp_serde::Serializer::new(&mut buffer))
            }
            (StructLayout::Array, true) => value
                .serialize(&mut rmp_serde::Serializer::new(&mut buffer).with_human_readable()),
            (StructLayout::Map, false) => {
                value.serialize(&mut rmp_serde::Serializer::new(&mut buffer).with_struct_map())
            }
            (StructLayout::Map, true) => value.serialize(
                &mut rmp_serde::Serializer::new(&mut buffer)
                    .with_struct_map()
                    .with_human_readable(),
            ),
        };
        outcome.map_err(|err| FormatterError::encode(type_name::<T>(), err))?;
        Ok(buffer)
    }

    /// 按当前选项解码 `bytes`。空输入同样交给编解码器，由调用方决定是否提前短路。
    pub fn decode<T>(&self, bytes: &[u8]) -> Result<T, FormatterError>
    where
        T: DeserializeOwned,
    {
        let mut deserializer = rmp_serde::Deserializer::from_read_ref(bytes);
        let outcome = if self.human_readable {
            T::deserialize(&mut deserializer.with_human_readable())
        } else {
            T::deserialize(&mut deserializer)
        };
        outcome.map_err(|err| FormatterError::decode(type_name::<T>(), err))
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self::standard()
    }
}
