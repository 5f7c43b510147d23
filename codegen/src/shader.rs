//! Shader binary extraction.
//!
//! Launches are matched to shader modules by position: the k-th launch in
//! program order uses the k-th shader module.

use lumen_ir::Program;
use lumen_ir::spirv::words_to_bytes;
use snafu::{OptionExt, ResultExt};

use crate::error::*;

/// Serialized shader binary of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinary {
    pub module: String,
    pub bytes: Vec<u8>,
}

impl ShaderBinary {
    /// Size in bytes as passed to the runtime.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Serialize the shader module that belongs to launch `launch`.
pub fn extract_shader(program: &Program, launch: usize) -> Result<ShaderBinary> {
    let modules = program.shader_modules();
    let module = modules.get(launch).context(MissingShaderModuleSnafu { launch, available: modules.len() })?;

    let words = module.serialize().context(ShaderSerializationSnafu { launch, module: module.name() })?;
    tracing::trace!(launch, module = module.name(), words = words.len(), "shader extracted");

    Ok(ShaderBinary { module: module.name().to_string(), bytes: words_to_bytes(&words) })
}

/// Internal global holding the binary of launch `launch`.
pub fn binary_symbol(launch: usize) -> String {
    format!("{}{launch}", crate::runtime::SPIRV_BINARY_PREFIX)
}

/// Internal global holding the NUL-terminated entry point name of launch `launch`.
pub fn entry_point_symbol(kernel: &str, launch: usize) -> String {
    format!("{kernel}{}{launch}", crate::runtime::ENTRY_POINT_NAME_SUFFIX)
}

/// NUL-terminated entry point name bytes.
pub fn entry_point_bytes(kernel: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(kernel.len() + 1);
    bytes.extend_from_slice(kernel.as_bytes());
    bytes.push(0);
    bytes
}
