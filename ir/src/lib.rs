//! Host-side intermediate representation for the lumen compiler.
//!
//! This crate defines the small SSA IR the GPU launch lowering operates on.
//!
//! # Module Organization
//!
//! - [`types`] - Value/operation/block identifiers, constants, kernel references
//! - [`op`] - Operation enum defining all IR operations
//! - [`function`] - Functions, basic blocks, def-use queries
//! - [`builder`] - Insertion-point builder
//! - [`program`] - Program-level containers (globals, externs, kernel modules)
//! - [`spirv`] - SPIR-V shader modules and their binary serialization
//! - [`printer`] - Textual rendering
//! - [`error`] - Error types and result handling

pub mod builder;
pub mod error;
pub mod function;
pub mod op;
pub mod printer;
pub mod program;
pub mod spirv;
pub mod types;


pub use builder::OpBuilder;
pub use error::{Error, Result};
pub use function::{Block, Function, InsertPoint, OpOrder, Operation, UseIndex, ValueData, ValueDef};
pub use op::{LaunchFunc, Op};
pub use program::{ExternDecl, Global, KernelModule, Linkage, Program, Signature};
pub use spirv::{Instruction, ShaderModule};
pub use types::{BlockId, ConstValue, KernelRef, OpId, ValueId};

// Re-export external types for convenience
pub use lumen_dtype::{DType, ScalarDType};
