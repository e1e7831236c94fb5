use serde::{Deserialize, Serialize};

use crate::TypeDescriptor;

/// 资格判定的方向。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 从请求/响应体反序列化。
    Read,
    /// 序列化到请求/响应体。
    Write,
}

/// 非公开类型的处理方式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonPublicPolicy {
    /// 读写双向均拒绝非公开类型。
    #[default]
    RejectBoth,
    /// 仅读取方向拒绝，写入方向放行。
    RejectOnRead,
}

/// 读写资格策略。
///
/// # 契约说明（What）
/// - 接口、抽象或非具体类型在任何方向都不合格；
/// - 公开具体类型在两个方向均合格；
/// - 非公开具体类型由 [`NonPublicPolicy`] 决定。
///
/// `can_read_type`/`can_write_type` 只委托到 [`is_eligible`](Self::is_eligible)，规则不在别处重复。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    /// 非公开类型的处理方式。
    pub non_public: NonPublicPolicy,
}

impl EligibilityPolicy {
    /// 双向拒绝非公开类型（默认）。
    pub const STRICT: EligibilityPolicy = EligibilityPolicy {
        non_public: NonPublicPolicy::RejectBoth,
    };

    /// 允许写出非公开类型。
    pub const WRITE_NON_PUBLIC: EligibilityPolicy = EligibilityPolicy {
        non_public: NonPublicPolicy::RejectOnRead,
    };

    /// 判定 `ty` 在 `direction` 上是否可由格式化器处理。
    pub fn is_eligible(&self, ty: &TypeDescriptor, direction: Direction) -> bool {
        let caps = ty.capabilities();
        if caps.is_interface || caps.is_abstract || !caps.is_concrete {
            return false;
        }
        if caps.is_public {
            return true;
        }
        match (self.non_public, direction) {
            (NonPublicPolicy::RejectOnRead, Direction::Write) => true,
            (NonPublicPolicy::RejectOnRead, Direction::Read) | (NonPublicPolicy::RejectBoth, _) => {
                false
            }
        }
    }
}
