//! Error types for launch lowering.

use lumen_dtype::{DType, ScalarDType};
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal errors. Any of them aborts the whole lowering run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Fewer shader modules than kernel launches.
    #[snafu(display("launch {launch}: no shader module at that position ({available} available)"))]
    MissingShaderModule { launch: usize, available: usize },

    /// Shader module could not be serialized.
    #[snafu(display("launch {launch}: failed to serialize shader module @{module}: {source}"))]
    ShaderSerialization { launch: usize, module: String, source: lumen_ir::Error },

    /// Shader binary size does not fit the 32-bit launch ABI.
    #[snafu(display("launch {launch}: shader binary of {bytes} bytes is too large for the runtime ABI"))]
    ShaderTooLarge { launch: usize, bytes: usize },

    /// Kernel argument is not a ranked buffer.
    #[snafu(display("launch {launch}: argument {binding} is not a typed buffer (got {dtype})"))]
    MalformedBufferArgument { launch: usize, binding: usize, dtype: DType },

    /// Buffer element type has no binding entry point.
    #[snafu(display("launch {launch}: unsupported buffer element type {scalar} at binding {binding}"))]
    UnsupportedElementType { launch: usize, binding: usize, scalar: ScalarDType },

    /// Buffer byte size does not fit the 32-bit binding ABI.
    #[snafu(display("launch {launch}: buffer at binding {binding} is too large for the runtime ABI"))]
    BufferTooLarge { launch: usize, binding: usize },

    /// Grid dimension is not an integer constant fitting `i32`.
    #[snafu(display("launch {launch}: grid dimension {dim} must be an i32 constant"))]
    NonConstantGridSize { launch: usize, dim: char },

    /// Launches live in more than one function.
    #[snafu(display("kernel launches span functions @{first} and @{second}"))]
    LaunchesSpanFunctions { first: String, second: String },

    /// Launch sequenced after the runtime was already torn down.
    #[snafu(display("launch {launch}: runtime already torn down"))]
    SequenceFinalized { launch: usize },

    /// Buffer binding was requested before the runtime was torn down.
    #[snafu(display("buffer binding requires a finalized launch sequence"))]
    SequenceNotFinalized,

    /// Error from IR layer.
    #[snafu(context(false), display("IR error: {source}"))]
    IrError { source: lumen_ir::Error },
}
