//! Launch lowering pass entry point.

use lumen_ir::Program;

use crate::binder::bind_pending;
use crate::config::LoweringConfig;
use crate::context::{LoweringContext, LoweringReport};
use crate::error::*;
use crate::sequencer::{collect_launches, lower_launch};
use crate::symbols::declare_runtime_symbols;

/// Rewrites GPU kernel launches into host runtime call sequences.
///
/// # Example
///
/// ```ignore
/// let report = LaunchLowering::new(LoweringConfig::default()).run(&mut program)?;
/// assert!(program.kernel_modules().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LaunchLowering {
    config: LoweringConfig,
}

impl LaunchLowering {
    pub fn new(config: LoweringConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(LoweringConfig::from_env())
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    /// Lower every launch in `program`.
    ///
    /// On error `program` is left untouched.
    #[tracing::instrument(skip_all)]
    pub fn run(&self, program: &mut Program) -> Result<LoweringReport> {
        let mut working = program.clone();
        let report = self.lower(&mut working)?;
        *program = working;
        Ok(report)
    }

    fn lower(&self, program: &mut Program) -> Result<LoweringReport> {
        let sites = collect_launches(program)?;
        let mut ctx = LoweringContext::new(self.config, sites.len());

        for (launch, &site) in sites.iter().enumerate() {
            lower_launch(program, site, launch, &mut ctx)?;
        }
        if let Some(site) = sites.first() {
            bind_pending(program.function_at_mut(site.func)?, &mut ctx)?;
        }

        let kernel_modules = program.remove_kernel_modules();
        let shader_modules = program.remove_shader_modules();
        tracing::debug!(kernel_modules, shader_modules, "device modules removed");

        let declared = declare_runtime_symbols(program, ctx.symbols, ctx.element_types)?;

        tracing::debug!(
            launches = sites.len(),
            transfers = ctx.transfer_actions,
            diagnostics = ctx.diagnostics.len(),
            "launch lowering complete"
        );

        Ok(LoweringReport {
            launches: sites.len(),
            symbols: ctx.symbols,
            declared,
            element_types: ctx.element_types,
            transfers: ctx.transfer_actions,
            diagnostics: ctx.diagnostics,
        })
    }
}
