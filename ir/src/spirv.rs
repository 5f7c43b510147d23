//! SPIR-V shader modules and their binary serialization.
//!
//! A [`ShaderModule`] is kept as a flat list of instructions; [`ShaderModule::serialize`]
//! produces the standard binary layout:
//!
//! ```text
//! word 0      magic number (0x07230203)
//! word 1      version (0x00MMmm00)
//! word 2      generator magic
//! word 3      id bound
//! word 4      schema (0)
//! word 5..    instructions: (word_count << 16 | opcode), operands...
//! ```

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;

pub const MAGIC: u32 = 0x0723_0203;

/// Generator magic written into the header.
pub const GENERATOR: u32 = 0x4C55_0001;

/// Opcodes used by the module helpers.
pub mod opcode {
    pub const NAME: u16 = 5;
    pub const MEMORY_MODEL: u16 = 14;
    pub const ENTRY_POINT: u16 = 15;
    pub const EXECUTION_MODE: u16 = 16;
    pub const CAPABILITY: u16 = 17;
    pub const TYPE_VOID: u16 = 19;
    pub const TYPE_FUNCTION: u16 = 33;
    pub const FUNCTION: u16 = 54;
    pub const FUNCTION_END: u16 = 56;
    pub const LABEL: u16 = 248;
    pub const RETURN: u16 = 253;
}

const CAPABILITY_SHADER: u32 = 1;
const ADDRESSING_LOGICAL: u32 = 0;
const MEMORY_MODEL_GLSL450: u32 = 1;
const EXECUTION_MODEL_GL_COMPUTE: u32 = 5;
const EXECUTION_MODE_LOCAL_SIZE: u32 = 17;
const FUNCTION_CONTROL_NONE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u16,
    pub operands: SmallVec<[u32; 4]>,
}

impl Instruction {
    pub fn new(opcode: u16, operands: impl IntoIterator<Item = u32>) -> Self {
        Self { opcode, operands: operands.into_iter().collect() }
    }

    /// Total instruction length in words, including the leading opcode word.
    pub fn word_count(&self) -> usize {
        self.operands.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderModule {
    name: String,
    version: (u8, u8),
    id_bound: u32,
    instructions: Vec<Instruction>,
}

impl ShaderModule {
    /// Create an empty module. Ids handed out by [`Self::fresh_id`] start at 1.
    pub fn new(name: impl Into<String>, version: (u8, u8)) -> Self {
        Self { name: name.into(), version, id_bound: 1, instructions: Vec::new() }
    }

    /// Minimal GLCompute module exposing one entry point with an empty body.
    pub fn compute(name: impl Into<String>, entry_point: &str, local_size: [u32; 3]) -> Self {
        let mut module = Self::new(name, (1, 0));
        let void = module.fresh_id();
        let fn_type = module.fresh_id();
        let func = module.fresh_id();
        let label = module.fresh_id();

        module.push(Instruction::new(opcode::CAPABILITY, [CAPABILITY_SHADER]));
        module.push(Instruction::new(opcode::MEMORY_MODEL, [ADDRESSING_LOGICAL, MEMORY_MODEL_GLSL450]));
        module.push(Instruction::new(
            opcode::ENTRY_POINT,
            [EXECUTION_MODEL_GL_COMPUTE, func].into_iter().chain(encode_string(entry_point)),
        ));
        module.push(Instruction::new(
            opcode::EXECUTION_MODE,
            [func, EXECUTION_MODE_LOCAL_SIZE].into_iter().chain(local_size),
        ));
        module.push(Instruction::new(opcode::NAME, std::iter::once(func).chain(encode_string(entry_point))));
        module.push(Instruction::new(opcode::TYPE_VOID, [void]));
        module.push(Instruction::new(opcode::TYPE_FUNCTION, [fn_type, void]));
        module.push(Instruction::new(opcode::FUNCTION, [void, func, FUNCTION_CONTROL_NONE, fn_type]));
        module.push(Instruction::new(opcode::LABEL, [label]));
        module.push(Instruction::new(opcode::RETURN, []));
        module.push(Instruction::new(opcode::FUNCTION_END, []));
        module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn fresh_id(&mut self) -> u32 {
        let id = self.id_bound;
        self.id_bound += 1;
        id
    }

    pub fn set_id_bound(&mut self, bound: u32) {
        self.id_bound = bound;
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Names of all `OpEntryPoint` declarations, in module order.
    pub fn entry_points(&self) -> Vec<String> {
        self.instructions
            .iter()
            .filter(|inst| inst.opcode == opcode::ENTRY_POINT && inst.operands.len() > 2)
            .filter_map(|inst| decode_string(&inst.operands[2..]))
            .collect()
    }

    /// Serialize into a SPIR-V word stream.
    pub fn serialize(&self) -> Result<Vec<u32>> {
        ensure!(!self.instructions.is_empty(), EmptyShaderModuleSnafu { name: &self.name });
        ensure!(self.id_bound > 0, InvalidIdBoundSnafu { name: &self.name });

        let (major, minor) = self.version;
        let body_words: usize = self.instructions.iter().map(Instruction::word_count).sum();
        let mut words = Vec::with_capacity(5 + body_words);
        words.extend([MAGIC, (major as u32) << 16 | (minor as u32) << 8, GENERATOR, self.id_bound, 0]);

        for inst in &self.instructions {
            let count = inst.word_count();
            ensure!(count <= u16::MAX as usize, InstructionTooLongSnafu { opcode: inst.opcode, words: count });
            words.push((count as u32) << 16 | inst.opcode as u32);
            words.extend_from_slice(&inst.operands);
        }

        tracing::trace!(module = %self.name, words = words.len(), "serialized shader module");
        Ok(words)
    }
}

/// Encode a literal string: UTF-8 bytes, NUL-terminated, packed little-endian into words.
pub fn encode_string(s: &str) -> SmallVec<[u32; 4]> {
    let bytes = s.as_bytes();
    (0..=bytes.len() / 4)
        .map(|chunk| {
            (0..4).fold(0u32, |word, i| {
                let byte = bytes.get(chunk * 4 + i).copied().unwrap_or(0);
                word | (byte as u32) << (8 * i)
            })
        })
        .collect()
}

/// Decode a literal string produced by [`encode_string`].
pub fn decode_string(words: &[u32]) -> Option<String> {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).take_while(|&b| b != 0).collect();
    String::from_utf8(bytes).ok()
}

/// Flatten a word stream into little-endian bytes.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
