//! Textual rendering of programs, used by debug logs and tests.
//!
//! ```text
//! func @main(%0: buffer<4xf32>) {
//! ^bb0:
//!   %1 = const 4 : i32
//!   call @foo(%1, %0)
//!   return
//! }
//! ```

use std::fmt::{self, Display, Formatter, Write};

use crate::function::{Function, Operation};
use crate::op::Op;
use crate::program::{Linkage, Program};
use crate::types::ValueId;

fn join(values: impl IntoIterator<Item = ValueId>) -> String {
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{value}");
    }
    out
}

fn write_op(f: &mut Formatter<'_>, func: &Function, operation: &Operation) -> fmt::Result {
    f.write_str("  ")?;
    if !operation.results.is_empty() {
        write!(f, "{} = ", join(operation.results.iter().copied()))?;
    }

    match &operation.op {
        Op::Const(value) => write!(f, "const {value}")?,
        Op::AddressOf { global } => write!(f, "address_of @{global}")?,
        Op::Alloc => f.write_str("alloc")?,
        Op::Dealloc { buffer } => write!(f, "dealloc {buffer}")?,
        Op::Load { buffer, indices } => write!(f, "load {buffer}[{}]", join(indices.iter().copied()))?,
        Op::Store { value, buffer, indices } => {
            write!(f, "store {value}, {buffer}[{}]", join(indices.iter().copied()))?
        }
        Op::Cast { src } => write!(f, "cast {src}")?,
        Op::Call { callee, args } => write!(f, "call @{callee}({})", join(args.iter().copied()))?,
        Op::LaunchFunc(launch) => write!(
            f,
            "launch {} grid({}) block({}) args({})",
            launch.kernel,
            join(launch.grid),
            join(launch.block),
            join(launch.args.iter().copied())
        )?,
        Op::Branch { target, args } => write!(f, "br {target}({})", join(args.iter().copied()))?,
        Op::Return { values } => {
            f.write_str("return")?;
            if !values.is_empty() {
                write!(f, " {}", join(values.iter().copied()))?;
            }
        }
    }

    let types: Vec<String> = operation
        .results
        .iter()
        .filter_map(|r| func.value_type(*r).ok())
        .map(ToString::to_string)
        .collect();
    if !types.is_empty() {
        write!(f, " : {}", types.join(", "))?;
    }
    writeln!(f)
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "func @{}(", self.name())?;
        for (i, param) in self.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let dtype = self.value_type(*param).map_err(|_| fmt::Error)?;
            write!(f, "{param}: {dtype}")?;
        }
        writeln!(f, ") {{")?;

        for block in self.block_ids() {
            let data = self.block(block).map_err(|_| fmt::Error)?;
            if data.args().is_empty() {
                writeln!(f, "{block}:")?;
            } else {
                writeln!(f, "{block}({}):", join(data.args().iter().copied()))?;
            }
            for op in data.ops() {
                let operation = self.op(*op).map_err(|_| fmt::Error)?;
                write_op(f, self, operation)?;
            }
        }
        writeln!(f, "}}")
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for decl in self.externs() {
            let params: Vec<String> = decl.signature.params.iter().map(ToString::to_string).collect();
            write!(f, "extern @{}({})", decl.name, params.join(", "))?;
            if !decl.signature.results.is_empty() {
                let results: Vec<String> = decl.signature.results.iter().map(ToString::to_string).collect();
                write!(f, " -> {}", results.join(", "))?;
            }
            writeln!(f)?;
        }
        for global in self.globals() {
            let linkage = match global.linkage {
                Linkage::Internal => "internal",
                Linkage::External => "external",
            };
            writeln!(f, "global @{} {linkage} [{} bytes]", global.name, global.data.len())?;
        }
        for module in self.kernel_modules() {
            writeln!(f, "kernel_module @{} {{ {} }}", module.name, module.kernels.join(", "))?;
        }
        for module in self.shader_modules() {
            writeln!(f, "shader_module @{} [{} instructions]", module.name(), module.instructions().len())?;
        }
        for func in self.functions() {
            write!(f, "{func}")?;
        }
        Ok(())
    }
}
