//! Per-run lowering state.

use enumset::EnumSet;
use lumen_ir::{OpId, ScalarDType, ValueId};

use crate::config::LoweringConfig;
use crate::runtime::{RuntimeSymbol, SymbolUsage};
use crate::transfer::TransferTracker;

/// Position of the action sequencer in the launch sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequencerState {
    #[default]
    Uninitialized,
    /// Launch `launch` has been sequenced; the runtime handle is live.
    Running { launch: usize, runtime: ValueId },
    /// Runtime torn down by the `teardown` call.
    Finalized { runtime: ValueId, teardown: OpId },
}

impl SequencerState {
    pub fn runtime(&self) -> Option<ValueId> {
        match *self {
            Self::Uninitialized => None,
            Self::Running { runtime, .. } | Self::Finalized { runtime, .. } => Some(runtime),
        }
    }

    pub fn teardown(&self) -> Option<OpId> {
        match *self {
            Self::Finalized { teardown, .. } => Some(teardown),
            _ => None,
        }
    }
}

/// Binding placeholder left at a launch site, expanded once teardown is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBinding {
    pub launch: usize,
    pub kernel: String,
    pub placeholder: OpId,
}

/// Advisory finding. Lowering proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub launch: usize,
    pub kernel: String,
    pub binding: usize,
    pub buffer: ValueId,
    /// Host access the diagnostic is about.
    pub op: OpId,
    /// Binding call the diagnostic is attached to.
    pub call_site: OpId,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "launch {} (@{}) binding {} ({}): {} at {}",
            self.launch, self.kernel, self.binding, self.buffer, self.message, self.op
        )
    }
}

/// Mutable state of one lowering run.
#[derive(Debug)]
pub struct LoweringContext {
    pub config: LoweringConfig,
    /// Launches discovered before any rewriting.
    pub total_launches: usize,
    pub state: SequencerState,
    pub symbols: SymbolUsage,
    pub element_types: EnumSet<ScalarDType>,
    pub transfers: TransferTracker,
    /// Transfer actions emitted so far.
    pub transfer_actions: usize,
    pub pending: Vec<PendingBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoweringContext {
    pub fn new(config: LoweringConfig, total_launches: usize) -> Self {
        Self {
            config,
            total_launches,
            state: SequencerState::Uninitialized,
            symbols: EnumSet::empty(),
            element_types: EnumSet::empty(),
            transfers: TransferTracker::new(),
            transfer_actions: 0,
            pending: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn use_symbol(&mut self, symbol: RuntimeSymbol) {
        self.symbols |= symbol;
    }

    pub fn is_last_launch(&self, launch: usize) -> bool {
        launch + 1 == self.total_launches
    }
}

/// Summary of a successful lowering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoweringReport {
    pub launches: usize,
    /// Runtime entry points referenced by emitted calls.
    pub symbols: SymbolUsage,
    /// Entry points newly declared in the program, in declaration order.
    pub declared: Vec<String>,
    pub element_types: EnumSet<ScalarDType>,
    pub transfers: usize,
    pub diagnostics: Vec<Diagnostic>,
}
