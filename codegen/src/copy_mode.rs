//! Host↔device copy classification for kernel argument buffers.
//!
//! For a buffer bound at a launch site, the analysis walks the def-use graph
//! starting from the buffer's producer, drops operations injected by the
//! lowering itself, and classifies every remaining (user-visible) access by
//! where it sits relative to the launch and to the runtime teardown:
//!
//! ```text
//! ^bb0:
//!   store %x, %buf[...]      ← before launch            → HostToDevice
//!   <launch site>
//!   load %buf[...]           ← before teardown          → hazard (warn only)
//!   run(%rt)
//!   deinitVulkan(%rt)
//!   load %buf[...]           ← after teardown           → DeviceToHost
//! ^bb1:
//!   load %buf[...]           ← other block              → both
//! ```
//!
//! Buffers that are function parameters have unknown provenance and always get
//! both directions.

use std::collections::{BTreeSet, HashSet, VecDeque};

use enumset::EnumSet;
use lumen_ir::{Function, Op, OpId, OpOrder, UseIndex, ValueId};
use smallvec::SmallVec;

use crate::Result;
use crate::runtime::{BIND_ALL_BUFFERS, RuntimeSymbol, SymbolUsage};

/// Direction of a host↔device copy.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(enumset::EnumSetType)]
#[enumset(repr = "u32")]
pub enum CopyDirection {
    /// Host data must be visible to the device before the launch (bit 0).
    HostToDevice,
    /// Device results must be copied back to the host after teardown (bit 1).
    DeviceToHost,
}

/// Copy directions required for one buffer at one launch.
pub type CopyMode = EnumSet<CopyDirection>;

/// Encode a copy mode as the runtime's `copyModeBits` field.
pub fn copy_mode_bits(mode: CopyMode) -> u32 {
    mode.as_repr()
}

/// Result of classifying one buffer at one launch site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyModeAnalysis {
    pub mode: CopyMode,
    /// Host accesses sandwiched between the launch and the runtime teardown.
    pub hazards: SmallVec<[OpId; 2]>,
}

/// True for operations injected by the lowering itself (allocation, casts,
/// binding placeholders and calls to runtime entry points already in use).
pub fn is_internal_op(op: &Op, symbols: &SymbolUsage) -> bool {
    match op {
        Op::Alloc | Op::Cast { .. } => true,
        Op::Call { callee, .. } => {
            callee == BIND_ALL_BUFFERS || RuntimeSymbol::from_name(callee).is_some_and(|s| symbols.contains(s))
        }
        _ => false,
    }
}

/// Def-use edges and block positions of a function, built once and shared by
/// every analysis of one binding pass.
///
/// Operations inserted after the index was built are invisible to it; the
/// binder only inserts internal operations, which the analysis drops anyway.
/// Operations must not be erased while the index is in use.
#[derive(Debug, Clone)]
pub struct FunctionIndex {
    uses: UseIndex,
    order: OpOrder,
}

impl FunctionIndex {
    pub fn new(func: &Function) -> Self {
        Self { uses: func.use_index(), order: func.op_order() }
    }

    /// Operations transitively depending on `value`, minus the internal ones.
    ///
    /// Breadth-first over def-use edges with an explicit worklist. Traversal
    /// continues through internal operations; they are only dropped from the result.
    pub fn external_dependencies(
        &self,
        func: &Function,
        value: ValueId,
        symbols: &SymbolUsage,
    ) -> Result<BTreeSet<OpId>> {
        let mut visited: HashSet<OpId> = HashSet::new();
        let mut worklist: VecDeque<ValueId> = VecDeque::from([value]);

        if let Some(producer) = func.defining_op(value)? {
            visited.insert(producer);
        }

        while let Some(current) = worklist.pop_front() {
            for &user in self.uses.users(current) {
                if visited.insert(user) {
                    worklist.extend(func.op(user)?.results.iter().copied());
                }
            }
        }

        let mut external = BTreeSet::new();
        for op in visited {
            if !is_internal_op(&func.op(op)?.op, symbols) {
                external.insert(op);
            }
        }
        Ok(external)
    }

    /// Classify which copies `buffer` needs around the launch at `site`.
    ///
    /// `teardown` is the runtime deinit call closing the launch sequence.
    pub fn analyze_buffer(
        &self,
        func: &Function,
        site: OpId,
        teardown: OpId,
        buffer: ValueId,
        symbols: &SymbolUsage,
    ) -> Result<CopyModeAnalysis> {
        if func.is_block_argument(buffer)? {
            return Ok(CopyModeAnalysis { mode: EnumSet::all(), hazards: SmallVec::new() });
        }

        let (site_block, site_index) = self.order.position(site)?;
        let teardown_pos = self.order.position(teardown)?;

        let mut analysis = CopyModeAnalysis::default();
        for op in self.external_dependencies(func, buffer, symbols)? {
            let (block, index) = self.order.position(op)?;
            if block != site_block {
                analysis.mode |= EnumSet::all();
            } else if index < site_index {
                analysis.mode |= CopyDirection::HostToDevice;
            } else if teardown_pos.0 == block && teardown_pos.1 < index {
                analysis.mode |= CopyDirection::DeviceToHost;
            } else {
                analysis.hazards.push(op);
            }
        }
        Ok(analysis)
    }
}

/// Operations transitively depending on `value`, minus the internal ones.
pub fn external_dependencies(func: &Function, value: ValueId, symbols: &SymbolUsage) -> Result<BTreeSet<OpId>> {
    FunctionIndex::new(func).external_dependencies(func, value, symbols)
}

/// One-off [`FunctionIndex::analyze_buffer`].
pub fn analyze_buffer(
    func: &Function,
    site: OpId,
    teardown: OpId,
    buffer: ValueId,
    symbols: &SymbolUsage,
) -> Result<CopyModeAnalysis> {
    FunctionIndex::new(func).analyze_buffer(func, site, teardown, buffer, symbols)
}
