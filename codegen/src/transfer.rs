//! Device-to-device transfer elision.
//!
//! The tracker remembers, per buffer identity, the last (launch, binding) it
//! was bound at. Binding the same buffer at a later launch produces a transfer
//! from that last binding, so chains always go `L1 → L2 → L3`.

use std::collections::HashMap;

use lumen_ir::{OpBuilder, ScalarDType, ValueId};
use smallvec::SmallVec;

use crate::Result;
use crate::runtime::RuntimeSymbol;

/// Where a buffer was last bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferRecord {
    pub launch: usize,
    pub binding: usize,
}

/// Device-to-device copy between two bindings of one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAction {
    pub buffer: ValueId,
    pub src: TransferRecord,
    pub dst: TransferRecord,
}

#[derive(Debug, Clone, Default)]
pub struct TransferTracker {
    records: HashMap<ValueId, TransferRecord>,
}

impl TransferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bindings of launch `launch` and return the transfers they need.
    ///
    /// A buffer bound twice by the same launch does not transfer to itself;
    /// its record still moves to the later binding.
    pub fn observe(&mut self, launch: usize, buffers: &[ValueId]) -> SmallVec<[TransferAction; 4]> {
        let mut actions = SmallVec::new();
        for (binding, &buffer) in buffers.iter().enumerate() {
            let dst = TransferRecord { launch, binding };
            if let Some(src) = self.records.insert(buffer, dst)
                && src.launch < launch
            {
                actions.push(TransferAction { buffer, src, dst });
            }
        }
        actions
    }

    pub fn record(&self, buffer: ValueId) -> Option<TransferRecord> {
        self.records.get(&buffer).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Emit one `createVulkanMemoryTransferAction` call per action.
pub fn emit_transfers(builder: &mut OpBuilder<'_>, runtime: ValueId, actions: &[TransferAction]) -> Result<()> {
    for action in actions {
        let mut operands: SmallVec<[ValueId; 5]> = SmallVec::new();
        operands.push(runtime);
        for field in [action.src.launch, action.src.binding, action.dst.launch, action.dst.binding] {
            operands.push(builder.constant(field as i64, ScalarDType::Int64)?);
        }
        builder.call(RuntimeSymbol::CreateMemoryTransferAction.name(), &operands, [])?;

        tracing::debug!(
            buffer = %action.buffer,
            src.launch = action.src.launch,
            src.binding = action.src.binding,
            dst.launch = action.dst.launch,
            dst.binding = action.dst.binding,
            "device transfer"
        );
    }
    Ok(())
}
