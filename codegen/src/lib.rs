//! Lowering of GPU kernel launches into host runtime calls.
//!
//! Each `launch` operation is replaced by an explicit sequence of calls against
//! a host-orchestrated GPU runtime: create a launch action from the kernel's
//! SPIR-V binary, bind every argument buffer, schedule it, and run the schedule
//! after the last launch.
//!
//! # Architecture
//!
//! - [`shader`] - Serialized shader binary of the k-th launch
//! - [`copy_mode`] - Host↔device copy classification per (launch, buffer)
//! - [`transfer`] - Device-to-device transfer elision for reused buffers
//! - [`sequencer`] - Per-launch runtime action sequence
//! - [`binder`] - Typed buffer binding calls
//! - [`symbols`] - Declarations of the runtime entry points in use
//! - [`pass`] - The pass entry point tying them together
//!
//! # Usage
//!
//! ```ignore
//! use lumen_codegen::{LaunchLowering, LoweringConfig};
//!
//! let report = LaunchLowering::new(LoweringConfig::default()).run(&mut program)?;
//! for diagnostic in &report.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! ```

pub mod binder;
pub mod config;
pub mod context;
pub mod copy_mode;
pub mod error;
pub mod pass;
pub mod runtime;
pub mod sequencer;
pub mod shader;
pub mod symbols;
pub mod transfer;

#[cfg(test)]
pub mod test;

pub use config::LoweringConfig;
pub use context::{Diagnostic, LoweringReport};
pub use copy_mode::{CopyDirection, CopyMode};
pub use error::*;
pub use pass::LaunchLowering;
pub use runtime::{RuntimeSymbol, SymbolUsage};
