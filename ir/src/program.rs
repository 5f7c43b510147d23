//! Program-level containers: functions, globals, extern declarations, and the
//! GPU kernel and shader modules produced by upstream passes.

use lumen_dtype::DType;
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::function::Function;
use crate::spirv::ShaderModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Internal,
    External,
}

/// Constant data emitted into the host binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    pub name: String,
    pub data: Vec<u8>,
    pub linkage: Linkage,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<DType>,
    pub results: Vec<DType>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = DType>, results: impl IntoIterator<Item = DType>) -> Self {
        Self { params: params.into_iter().collect(), results: results.into_iter().collect() }
    }
}

/// Declaration of an external function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternDecl {
    pub name: String,
    pub signature: Signature,
}

/// Container of device kernels referenced by launch operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelModule {
    pub name: String,
    pub kernels: Vec<String>,
}

impl KernelModule {
    pub fn new(name: impl Into<String>, kernels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { name: name.into(), kernels: kernels.into_iter().map(Into::into).collect() }
    }
}

/// A whole program: the unit a lowering pass operates on.
#[derive(Debug, Clone, Default)]
pub struct Program {
    functions: Vec<Function>,
    externs: Vec<ExternDecl>,
    globals: Vec<Global>,
    kernel_modules: Vec<KernelModule>,
    shader_modules: Vec<ShaderModule>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Add a function and return its index.
    pub fn add_function(&mut self, func: Function) -> Result<usize> {
        ensure!(self.function(func.name()).is_none(), DuplicateSymbolSnafu { name: func.name() });
        self.functions.push(func);
        Ok(self.functions.len() - 1)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn function_at(&self, index: usize) -> Result<&Function> {
        self.functions.get(index).context(UnknownFunctionSnafu { name: format!("#{index}") })
    }

    pub fn function_at_mut(&mut self, index: usize) -> Result<&mut Function> {
        self.functions.get_mut(index).context(UnknownFunctionSnafu { name: format!("#{index}") })
    }

    // =========================================================================
    // Globals
    // =========================================================================

    pub fn add_global(&mut self, name: impl Into<String>, data: Vec<u8>, linkage: Linkage) -> Result<()> {
        let name = name.into();
        ensure!(self.global(&name).is_none(), DuplicateSymbolSnafu { name });
        self.globals.push(Global { name, data, linkage });
        Ok(())
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    // =========================================================================
    // Extern declarations
    // =========================================================================

    /// Declare an external function. Returns `false` if an identical declaration already exists.
    pub fn declare_extern(&mut self, name: impl Into<String>, signature: Signature) -> Result<bool> {
        let name = name.into();
        if let Some(existing) = self.externs.iter().find(|d| d.name == name) {
            ensure!(existing.signature == signature, ConflictingDeclarationSnafu { name });
            return Ok(false);
        }
        self.externs.push(ExternDecl { name, signature });
        Ok(true)
    }

    pub fn externs(&self) -> &[ExternDecl] {
        &self.externs
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.externs.iter().any(|d| d.name == name)
    }

    // =========================================================================
    // Kernel and shader modules
    // =========================================================================

    pub fn add_kernel_module(&mut self, module: KernelModule) {
        self.kernel_modules.push(module);
    }

    pub fn kernel_modules(&self) -> &[KernelModule] {
        &self.kernel_modules
    }

    /// Remove all kernel modules, returning how many were removed.
    pub fn remove_kernel_modules(&mut self) -> usize {
        std::mem::take(&mut self.kernel_modules).len()
    }

    pub fn add_shader_module(&mut self, module: ShaderModule) {
        self.shader_modules.push(module);
    }

    /// Shader modules in program order.
    pub fn shader_modules(&self) -> &[ShaderModule] {
        &self.shader_modules
    }

    /// Remove all shader modules, returning how many were removed.
    pub fn remove_shader_modules(&mut self) -> usize {
        std::mem::take(&mut self.shader_modules).len()
    }
}
