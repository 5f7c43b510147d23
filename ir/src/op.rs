//! Operation enum and implementation.
//!
//! The [`Op`] enum defines every operation the host IR can hold: host memory
//! accesses, constants, calls, GPU kernel launches and block terminators.

use smallvec::SmallVec;

use crate::types::{BlockId, ConstValue, KernelRef, ValueId};

/// Operation type with typed operands.
///
/// Each operation encodes its operand structure directly in the enum variant.
/// Variable-arity operands use SmallVec to avoid heap allocation for common cases.
#[derive(Debug, Clone, PartialEq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Op {
    // Constants and symbols
    Const(ConstValue),
    AddressOf {
        global: String,
    },

    // Host memory
    Alloc,
    Dealloc {
        buffer: ValueId,
    },
    Load {
        buffer: ValueId,
        indices: SmallVec<[ValueId; 4]>,
    },
    Store {
        value: ValueId,
        buffer: ValueId,
        indices: SmallVec<[ValueId; 4]>,
    },
    /// Buffer type conversion (ranked to unranked).
    Cast {
        src: ValueId,
    },

    // Calls
    Call {
        callee: String,
        args: SmallVec<[ValueId; 6]>,
    },

    // GPU
    LaunchFunc(LaunchFunc),

    // Terminators
    Branch {
        target: BlockId,
        args: SmallVec<[ValueId; 4]>,
    },
    Return {
        values: SmallVec<[ValueId; 2]>,
    },
}

/// Invocation of a GPU kernel with a grid/block configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchFunc {
    pub kernel: KernelRef,
    /// Grid size operands (x, y, z).
    pub grid: [ValueId; 3],
    /// Block size operands (x, y, z).
    pub block: [ValueId; 3],
    /// Kernel argument buffers in binding order.
    pub args: SmallVec<[ValueId; 4]>,
}

impl Op {
    /// All SSA operands, in a stable order.
    pub fn operands(&self) -> SmallVec<[ValueId; 8]> {
        match self {
            Self::Const(_) | Self::AddressOf { .. } | Self::Alloc => SmallVec::new(),
            Self::Dealloc { buffer } | Self::Cast { src: buffer } => smallvec::smallvec![*buffer],
            Self::Load { buffer, indices } => std::iter::once(*buffer).chain(indices.iter().copied()).collect(),
            Self::Store { value, buffer, indices } => {
                [*value, *buffer].into_iter().chain(indices.iter().copied()).collect()
            }
            Self::Call { args, .. } => args.iter().copied().collect(),
            Self::LaunchFunc(launch) => launch.operands(),
            Self::Branch { args, .. } => args.iter().copied().collect(),
            Self::Return { values } => values.iter().copied().collect(),
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Branch { .. } | Self::Return { .. })
    }

    /// Callee name for call operations.
    pub fn callee(&self) -> Option<&str> {
        match self {
            Self::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }

    pub fn as_launch(&self) -> Option<&LaunchFunc> {
        match self {
            Self::LaunchFunc(launch) => Some(launch),
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match self {
            Self::Const(value) => Some(value),
            _ => None,
        }
    }
}

impl LaunchFunc {
    pub fn operands(&self) -> SmallVec<[ValueId; 8]> {
        self.grid.iter().chain(self.block.iter()).chain(self.args.iter()).copied().collect()
    }
}
