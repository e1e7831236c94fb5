use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// 类型能力标志，供资格策略判定。
///
/// Rust 没有运行时反射，这些标志在类型登记时静态给出。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeCapabilities {
    /// 可直接实例化的具体类型。
    pub is_concrete: bool,
    /// 对外公开的类型。
    pub is_public: bool,
    /// 仅描述行为契约的接口类型（如 `dyn Trait`）。
    pub is_interface: bool,
    /// 不可直接实例化的抽象类型。
    pub is_abstract: bool,
}

impl TypeCapabilities {
    /// 公开的具体类型，绝大多数模型与基础类型属于此类。
    pub const CONCRETE: TypeCapabilities = TypeCapabilities {
        is_concrete: true,
        is_public: true,
        is_interface: false,
        is_abstract: false,
    };

    /// 接口类型。
    pub const INTERFACE: TypeCapabilities = TypeCapabilities {
        is_concrete: false,
        is_public: true,
        is_interface: true,
        is_abstract: true,
    };

    /// 抽象类型。
    pub const ABSTRACT: TypeCapabilities = TypeCapabilities {
        is_concrete: false,
        is_public: true,
        is_interface: false,
        is_abstract: true,
    };

    /// 非公开的具体类型。
    pub const NON_PUBLIC: TypeCapabilities = TypeCapabilities {
        is_concrete: true,
        is_public: false,
        is_interface: false,
        is_abstract: false,
    };
}

/// 静态类型描述：类型身份加能力标志。
///
/// # 设计背景（Why）
/// - 宿主协商阶段需要在拿到具体值之前判断“能否读写某类型”，因此描述必须独立于值存在；
/// - 读写阶段用 [`is`](Self::is) 校验描述与泛型参数一致，防止宿主传错描述。
///
/// # 使用方式（How）
/// - 模型类型通过 `impl DescribeType for MyModel {}` 登记为公开具体类型；
/// - 需要声明为非公开或抽象时覆写 [`DescribeType::type_descriptor`]，
///   例如返回 `TypeDescriptor::non_public::<Self>()`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
    capabilities: TypeCapabilities,
}

impl TypeDescriptor {
    /// 公开具体类型 `T` 的描述。
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::with_capabilities::<T>(TypeCapabilities::CONCRETE)
    }

    /// 接口类型 `T` 的描述，通常用于 `dyn Trait`。
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::with_capabilities::<T>(TypeCapabilities::INTERFACE)
    }

    /// 抽象类型 `T` 的描述。
    pub fn abstract_type<T: ?Sized + 'static>() -> Self {
        Self::with_capabilities::<T>(TypeCapabilities::ABSTRACT)
    }

    /// 非公开具体类型 `T` 的描述。
    pub fn non_public<T: ?Sized + 'static>() -> Self {
        Self::with_capabilities::<T>(TypeCapabilities::NON_PUBLIC)
    }

    /// 以任意能力组合描述 `T`。
    pub fn with_capabilities<T: ?Sized + 'static>(capabilities: TypeCapabilities) -> Self {
        Self {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            capabilities,
        }
    }

    /// 类型名，仅用于诊断，不保证稳定。
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 类型身份。
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 能力标志。
    pub fn capabilities(&self) -> TypeCapabilities {
        self.capabilities
    }

    /// 是否描述的正是 `T`。
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// 编译期类型登记。
///
/// 默认实现把类型描述为公开具体类型；覆写以声明其它能力。
pub trait DescribeType: 'static {
    /// 返回该类型的描述。
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

macro_rules! describe_concrete {
    ($($ty:ty),* $(,)?) => {
        $(impl DescribeType for $ty {})*
    };
}

describe_concrete!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
);

impl<T: 'static> DescribeType for Option<T> {}
impl<T: 'static> DescribeType for Box<T> {}
impl<T: 'static> DescribeType for Vec<T> {}
impl<T: 'static, const N: usize> DescribeType for [T; N] {}
impl<K: 'static, V: 'static, S: 'static> DescribeType for HashMap<K, V, S> {}
impl<K: 'static, V: 'static> DescribeType for BTreeMap<K, V> {}
impl<T: 'static, S: 'static> DescribeType for HashSet<T, S> {}
impl<T: 'static> DescribeType for BTreeSet<T> {}

macro_rules! describe_tuples {
    ($(($($name:ident),+)),* $(,)?) => {
        $(impl<$($name: 'static),+> DescribeType for ($($name,)+) {})*
    };
}

describe_tuples!((A), (A, B), (A, B, C), (A, B, C, D), (A, B, C, D, E), (A, B, C, D, E, F));
