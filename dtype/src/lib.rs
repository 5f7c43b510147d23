//! Element and value types for the lumen host IR.
//!
//! [`ScalarDType`] describes a single element; [`DType`] describes the type of an
//! SSA value (scalar, opaque pointer, ranked or unranked buffer).

pub mod ext;


use smallvec::SmallVec;

/// Scalar data types (base numeric types).
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::FromRepr)]
#[derive(enumset::EnumSetType)]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
#[enumset(repr = "u32")]
pub enum ScalarDType {
    Bool = 0,

    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Int64 = 7,
    UInt64 = 8,

    Float16 = 9,
    BFloat16 = 10,
    Float32 = 11,
    Float64 = 12,

    /// Void type for operations without a result.
    Void = 13,

    /// Index type for buffer subscripts.
    Index = 14,
}

impl ScalarDType {
    /// Width of one element in bits.
    pub const fn bit_width(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 => 64,
            Self::Void => 0,
            Self::Index => 64, // Treat as 64-bit index
        }
    }

    /// Width of one element in bytes, rounded up from the bit width.
    pub const fn bytes(&self) -> usize {
        self.bit_width().div_ceil(8)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, Self::Index)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// Short textual name used by the IR printer.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Bool => "i1",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "ui8",
            Self::UInt16 => "ui16",
            Self::UInt32 => "ui32",
            Self::UInt64 => "ui64",
            Self::Float16 => "f16",
            Self::BFloat16 => "bf16",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Void => "void",
            Self::Index => "index",
        }
    }
}

impl std::fmt::Display for ScalarDType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Type of an SSA value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Scalar type (single value).
    Scalar(ScalarDType),

    /// Opaque host pointer (runtime handles, global addresses).
    Ptr,

    /// Host memory buffer with a static shape.
    Buffer { scalar: ScalarDType, shape: SmallVec<[usize; 4]> },

    /// Host memory buffer with its rank erased.
    UnrankedBuffer { scalar: ScalarDType },
}

impl From<ScalarDType> for DType {
    fn from(scalar: ScalarDType) -> Self {
        Self::Scalar(scalar)
    }
}

impl DType {
    // =========================================================================
    // Type Constructors
    // =========================================================================

    /// Create a ranked buffer type with the given element type and shape.
    pub fn buffer(scalar: ScalarDType, shape: impl IntoIterator<Item = usize>) -> Self {
        Self::Buffer { scalar, shape: shape.into_iter().collect() }
    }

    /// Erase the rank of a buffer type. Non-buffer types are returned unchanged.
    pub fn unranked(&self) -> Self {
        match self {
            Self::Buffer { scalar, .. } => Self::UnrankedBuffer { scalar: *scalar },
            _ => self.clone(),
        }
    }

    pub fn scalar(&self) -> Option<ScalarDType> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Element type of a ranked or unranked buffer.
    pub fn element(&self) -> Option<ScalarDType> {
        match self {
            Self::Buffer { scalar, .. } | Self::UnrankedBuffer { scalar } => Some(*scalar),
            _ => None,
        }
    }

    /// Static shape of a ranked buffer.
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Self::Buffer { shape, .. } => Some(shape),
            _ => None,
        }
    }

    // =========================================================================
    // Type Properties
    // =========================================================================

    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::Buffer { .. })
    }

    pub fn is_int(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_int())
    }

    pub fn is_float(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_float())
    }

    /// Number of elements held by a ranked buffer (1 for rank 0).
    pub fn numel(&self) -> Option<u64> {
        self.shape()?.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
    }

    /// Size in bytes of the data held by a ranked buffer.
    ///
    /// Returns `None` for non-buffer types and on overflow.
    pub fn storage_bytes(&self) -> Option<u64> {
        let scalar = self.element()?;
        self.shape()?.iter().try_fold(scalar.bytes() as u64, |acc, &d| acc.checked_mul(d as u64))
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Ptr => f.write_str("ptr"),
            Self::Buffer { scalar, shape } => {
                f.write_str("buffer<")?;
                for dim in shape {
                    write!(f, "{dim}x")?;
                }
                write!(f, "{scalar}>")
            }
            Self::UnrankedBuffer { scalar } => write!(f, "buffer<*x{scalar}>"),
        }
    }
}

// Convenient aliases for common scalar types
#[allow(non_upper_case_globals)]
impl DType {
    pub const Bool: Self = Self::Scalar(ScalarDType::Bool);
    pub const Int8: Self = Self::Scalar(ScalarDType::Int8);
    pub const Int16: Self = Self::Scalar(ScalarDType::Int16);
    pub const Int32: Self = Self::Scalar(ScalarDType::Int32);
    pub const Int64: Self = Self::Scalar(ScalarDType::Int64);
    pub const UInt8: Self = Self::Scalar(ScalarDType::UInt8);
    pub const UInt16: Self = Self::Scalar(ScalarDType::UInt16);
    pub const UInt32: Self = Self::Scalar(ScalarDType::UInt32);
    pub const UInt64: Self = Self::Scalar(ScalarDType::UInt64);
    pub const Float16: Self = Self::Scalar(ScalarDType::Float16);
    pub const BFloat16: Self = Self::Scalar(ScalarDType::BFloat16);
    pub const Float32: Self = Self::Scalar(ScalarDType::Float32);
    pub const Float64: Self = Self::Scalar(ScalarDType::Float64);
    pub const Void: Self = Self::Scalar(ScalarDType::Void);
    pub const Index: Self = Self::Scalar(ScalarDType::Index);
}
