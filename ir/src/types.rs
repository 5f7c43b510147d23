//! Identifiers and constant payloads shared across the IR.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// SSA value within one function. Equality is identity of the value.
    ValueId,
    "%"
);
define_id!(
    /// Operation within one function. Stays valid until the operation is erased.
    OpId,
    "#"
);
define_id!(
    /// Basic block within one function.
    BlockId,
    "^bb"
);

/// Constant payload of a `const` operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl ConstValue {
    /// Integer view of the constant, if it is integral and fits `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Bool(v) => Some(v as i64),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_const_from {
    ($($ty:ty => $variant:ident as $storage:ty),* $(,)?) => {
        $(impl From<$ty> for ConstValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v as $storage)
            }
        })*
    };
}

impl_const_from! {
    i8 => Int as i64, i16 => Int as i64, i32 => Int as i64, i64 => Int as i64,
    u8 => UInt as u64, u16 => UInt as u64, u32 => UInt as u64, u64 => UInt as u64,
    f32 => Float as f64, f64 => Float as f64,
}

impl From<bool> for ConstValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Symbolic reference to a kernel inside a kernel module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelRef {
    pub module: String,
    pub name: String,
}

impl KernelRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self { module: module.into(), name: name.into() }
    }
}

impl fmt::Display for KernelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}::@{}", self.module, self.name)
    }
}
