#![warn(missing_docs)]

//! # spark-formatting
//!
//! ## 教案意图（Why）
//! - **职责定位**：为 HTTP 宿主框架的“内容协商 → 读取/写入”流程提供与具体编解码器无关的格式化契约，
//!   使 MessagePack 等二进制格式可以像 JSON 一样插拔到请求/响应管道中。
//! - **架构价值**：宿主只与 [`FormatterCapabilities`]、[`MediaTypeFormatter`] 两个 trait 交互；
//!   编解码 crate（如 `spark-codec-msgpack`）实现契约，HTTP crate 组合契约，三者互不感知内部细节。
//!
//! ## 使用方式（How）
//! - 通过 [`DescribeType`] 在编译期为模型类型登记 [`TypeDescriptor`]，宿主据此调用
//!   `can_read_type`/`can_write_type` 判定资格；
//! - 资格规则集中在 [`EligibilityPolicy::is_eligible`]，默认拒绝接口、抽象与非公开类型；
//! - 读写流程统一经由 [`io::run_with_cancellation`] 注入协作式取消；
//! - [`negotiation`] 模块提供基于字符串匹配的 `Accept`/`Content-Type` 选择逻辑。
//!
//! ## 契约说明（What）
//! - 所有错误以 [`FormatterError`] 表达，并映射到稳定错误码（[`codes`]）与 [`ErrorCategory`]；
//! - “空请求体 ⇔ 无值”是协议约定：读取零字节返回 `None`，写入 `None` 产生零字节；
//! - 取消总是以独立的 `Cancelled` 结果出现，绝不与成功或空值混淆。
//!
//! ## 风险提示（Trade-offs）
//! - 读写方法为泛型方法，因此 [`MediaTypeFormatter`] 不是对象安全的；需要动态分发的宿主
//!   （如协商阶段）改用对象安全的 [`FormatterCapabilities`]。

mod cancellation;
mod descriptor;
mod eligibility;
mod error;
mod formatter;
mod media_type;

pub mod io;
pub mod negotiation;

pub use cancellation::Cancellation;
pub use descriptor::{DescribeType, TypeCapabilities, TypeDescriptor};
pub use eligibility::{Direction, EligibilityPolicy, NonPublicPolicy};
pub use error::{BoxError, ErrorCategory, FormatterError, OperationKind, codes};
pub use formatter::{FormatterCapabilities, MediaTypeFormatter, validate_call};
pub use media_type::{MediaType, Quality};
