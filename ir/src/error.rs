use lumen_dtype::DType;
use smallvec::SmallVec;
use snafu::Snafu;

use crate::types::{BlockId, OpId, ValueId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Value id does not belong to the function.
    #[snafu(display("unknown value {value}"))]
    UnknownValue { value: ValueId },

    /// Block id does not belong to the function.
    #[snafu(display("unknown block {block}"))]
    UnknownBlock { block: BlockId },

    /// Operation was erased or never existed.
    #[snafu(display("operation {op} does not exist"))]
    UnknownOp { op: OpId },

    /// Erasing an operation whose results still have users.
    #[snafu(display("cannot erase {op}: its results are still used by {users:?}"))]
    ValueStillUsed { op: OpId, users: SmallVec<[OpId; 4]> },

    /// Operation expected a buffer operand.
    #[snafu(display("expected a buffer operand, got {dtype}"))]
    ExpectedBuffer { dtype: DType },

    /// Two program-level symbols share a name.
    #[snafu(display("symbol @{name} is already defined"))]
    DuplicateSymbol { name: String },

    /// An extern is re-declared with a different signature.
    #[snafu(display("extern @{name} is already declared with a different signature"))]
    ConflictingDeclaration { name: String },

    /// Function lookup by index or name failed.
    #[snafu(display("unknown function {name}"))]
    UnknownFunction { name: String },

    // =========================================================================
    // SPIR-V serialization
    // =========================================================================
    /// Shader module has no instructions.
    #[snafu(display("shader module @{name} is empty"))]
    EmptyShaderModule { name: String },

    /// Shader module declares an id bound of zero.
    #[snafu(display("shader module @{name} has an invalid id bound"))]
    InvalidIdBound { name: String },

    /// Instruction does not fit the 16-bit SPIR-V word count.
    #[snafu(display("SPIR-V instruction with opcode {opcode} spans {words} words (max 65535)"))]
    InstructionTooLong { opcode: u16, words: usize },
}
