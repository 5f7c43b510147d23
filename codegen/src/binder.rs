//! Buffer binding.
//!
//! Expands each `bindAllBuffers` placeholder into one typed binding call per
//! argument buffer. Runs after every launch has been sequenced so the copy
//! direction analysis can see the runtime teardown.

use lumen_ir::{DType, Function, OpBuilder, OpId, ScalarDType, ValueId};
use snafu::{OptionExt, ensure};

use crate::context::{Diagnostic, LoweringContext, PendingBinding, SequencerState};
use crate::copy_mode::{FunctionIndex, copy_mode_bits};
use crate::error::*;
use crate::runtime::{DESCRIPTOR_SET, RuntimeSymbol};

const HAZARD: &str = "host access between kernel launch and runtime teardown";

/// Static parameters of one buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBinding {
    pub scalar: ScalarDType,
    pub symbol: RuntimeSymbol,
    pub byte_size: i32,
}

/// Resolve the entry point and byte size of the buffer bound at `binding`.
pub fn resolve_binding(dtype: &DType, launch: usize, binding: usize) -> Result<BufferBinding> {
    ensure!(dtype.is_buffer(), MalformedBufferArgumentSnafu { launch, binding, dtype: dtype.clone() });
    let scalar = dtype.element().context(MalformedBufferArgumentSnafu { launch, binding, dtype: dtype.clone() })?;
    let symbol = RuntimeSymbol::bind_buffer(scalar).context(UnsupportedElementTypeSnafu { launch, binding, scalar })?;
    let byte_size = dtype
        .storage_bytes()
        .and_then(|bytes| i32::try_from(bytes).ok())
        .context(BufferTooLargeSnafu { launch, binding })?;
    Ok(BufferBinding { scalar, symbol, byte_size })
}

/// Expand every pending placeholder. Requires a finalized launch sequence.
pub fn bind_pending(func: &mut Function, ctx: &mut LoweringContext) -> Result<()> {
    let pending = std::mem::take(&mut ctx.pending);
    if pending.is_empty() {
        return Ok(());
    }
    let SequencerState::Finalized { runtime, teardown } = ctx.state else {
        return SequenceNotFinalizedSnafu.fail();
    };

    // Placeholders stay in place until every launch is bound: the index
    // refers to them.
    let index = FunctionIndex::new(func);
    for binding in &pending {
        bind_buffers(func, &index, ctx, binding, runtime, teardown)?;
    }
    for binding in &pending {
        func.erase(binding.placeholder)?;
    }
    Ok(())
}

fn bind_buffers(
    func: &mut Function,
    index: &FunctionIndex,
    ctx: &mut LoweringContext,
    pending: &PendingBinding,
    runtime: ValueId,
    teardown: OpId,
) -> Result<()> {
    // Placeholder operands are the launch arguments in binding order.
    let buffers = func.op(pending.placeholder)?.op.operands();
    let launch = pending.launch;

    let mut builder = OpBuilder::before(func, pending.placeholder);
    let set = builder.native_const(DESCRIPTOR_SET)?;

    for (slot, &buffer) in buffers.iter().enumerate() {
        let dtype = builder.func().value_type(buffer)?.clone();
        let binding = resolve_binding(&dtype, launch, slot)?;
        let analysis = index.analyze_buffer(builder.func(), pending.placeholder, teardown, buffer, &ctx.symbols)?;
        let mode_bits = copy_mode_bits(analysis.mode);

        let binding_index = builder.native_const(slot as i32)?;
        let byte_size = builder.native_const(binding.byte_size)?;
        let mode = builder.native_const(mode_bits as i32)?;
        let unranked = builder.cast_unranked(buffer)?;
        let call = builder.call(binding.symbol.name(), &[runtime, set, binding_index, byte_size, mode, unranked], [])?;

        ctx.use_symbol(binding.symbol);
        ctx.element_types |= binding.scalar;

        tracing::debug!(
            launch,
            binding = slot,
            %buffer,
            symbol = binding.symbol.name(),
            bytes = binding.byte_size,
            copy_mode = mode_bits,
            "buffer bound"
        );

        for op in analysis.hazards {
            let diagnostic = Diagnostic {
                launch,
                kernel: pending.kernel.clone(),
                binding: slot,
                buffer,
                op,
                call_site: call,
                message: HAZARD.to_string(),
            };
            tracing::warn!(
                launch,
                kernel = %pending.kernel,
                binding = slot,
                %buffer,
                %op,
                "{HAZARD}"
            );
            ctx.diagnostics.push(diagnostic);
        }
    }
    Ok(())
}
