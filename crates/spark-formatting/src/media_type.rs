use std::borrow::Cow;
use std::fmt;

/// `Accept` 头中的 q 值，以千分比整数存储以避免浮点比较。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    /// 最高优先级 `q=1`。
    pub const MAX: Quality = Quality(1000);
    /// `q=0`，表示“不可接受”。
    pub const ZERO: Quality = Quality(0);

    /// 以千分比构造，超出范围时截断到 1000。
    pub const fn from_millis(millis: u16) -> Self {
        if millis > 1000 {
            Quality(1000)
        } else {
            Quality(millis)
        }
    }

    /// 千分比数值。
    pub const fn millis(self) -> u16 {
        self.0
    }

    /// 解析 `0`、`0.5`、`1.000` 等形式；非法输入返回 `None`。
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };
        if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut millis: u16 = match whole {
            "0" => 0,
            "1" => 1000,
            _ => return None,
        };
        let mut scale = 100;
        for digit in fraction.bytes() {
            millis += u16::from(digit - b'0') * scale;
            scale /= 10;
        }
        (millis <= 1000).then_some(Quality(millis))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1000 => f.write_str("1"),
            0 => f.write_str("0"),
            millis => {
                let text = format!("{millis:03}");
                write!(f, "0.{}", text.trim_end_matches('0'))
            }
        }
    }
}

/// 媒体类型标识：`type/subtype` 本体加可选的 q 值。
///
/// # 契约说明（What）
/// - `essence` 保留原始大小写用于展示，比较一律大小写不敏感；
/// - 除 `q` 以外的参数（如 `charset`）在解析时被丢弃，二进制格式不使用它们；
/// - [`matches`](Self::matches) 支持 `*/*` 与 `type/*` 通配。
#[derive(Clone, Debug)]
pub struct MediaType {
    essence: Cow<'static, str>,
    quality: Option<Quality>,
}

impl MediaType {
    /// 从静态字符串构造，适合常量。
    pub const fn from_static(essence: &'static str) -> Self {
        Self {
            essence: Cow::Borrowed(essence),
            quality: None,
        }
    }

    /// 从任意字符串构造，不做解析。
    pub fn new(essence: impl Into<Cow<'static, str>>) -> Self {
        Self {
            essence: essence.into(),
            quality: None,
        }
    }

    /// 解析形如 `application/msgpack; q=0.8` 的文本。
    ///
    /// 缺少 `/` 或任一侧为空时返回 `None`；非法 q 值被忽略而非使整个条目失效。
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim();
        let (ty, subtype) = essence.split_once('/')?;
        if ty.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return None;
        }
        let quality = parts.find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("q")
                .then(|| Quality::parse(value))
                .flatten()
        });
        Some(Self {
            essence: Cow::Owned(essence.to_owned()),
            quality,
        })
    }

    /// `type/subtype` 本体。
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// 显式声明的 q 值。
    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }

    /// 生效的 q 值，未声明时为 1。
    pub fn effective_quality(&self) -> Quality {
        self.quality.unwrap_or_default()
    }

    /// 返回携带指定 q 值的副本。
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// 判断 `self`（可能含通配）是否覆盖 `other`。
    pub fn matches(&self, other: &MediaType) -> bool {
        self.matches_essence(other.essence())
    }

    /// 与 [`matches`](Self::matches) 相同，但直接比较本体文本。
    pub fn matches_essence(&self, other: &str) -> bool {
        let Some((ty, subtype)) = self.essence.split_once('/') else {
            return false;
        };
        let Some((other_ty, other_subtype)) = other.trim().split_once('/') else {
            return false;
        };
        if ty == "*" && subtype == "*" {
            return true;
        }
        if !ty.eq_ignore_ascii_case(other_ty) {
            return false;
        }
        subtype == "*" || subtype.eq_ignore_ascii_case(other_subtype)
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.essence.eq_ignore_ascii_case(&other.essence) && self.quality == other.quality
    }
}

impl Eq for MediaType {}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        if let Some(quality) = self.quality {
            write!(f, "; q={quality}")?;
        }
        Ok(())
    }
}
