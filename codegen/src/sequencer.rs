//! Per-launch runtime action sequencing.
//!
//! Every launch is replaced in place by the following calls, all threading the
//! runtime handle `R`:
//!
//! ```text
//! R = initVulkan()                                   ; first launch only
//! createVulkanLaunchKernelAction(R, SPIRV_BIN<k>, size, entry, gx, gy, gz)
//! bindAllBuffers(args...)                            ; expanded by the binder
//! setVulkanLaunchKernelAction(R, subgroup_size)
//! createVulkanMemoryTransferAction(R, ...)           ; per reused buffer
//! addVulkanLaunchActionToSchedule(R)
//! run(R)                                             ; last launch only
//! deinitVulkan(R)                                    ; last launch only
//! print_memref_f32(buffer<*xf32>)                    ; when printing buffers
//! ```

use lumen_ir::{DType, Function, Linkage, Op, OpBuilder, OpId, Program, ScalarDType, ValueId};
use smallvec::SmallVec;
use snafu::OptionExt;

use crate::context::{LoweringContext, PendingBinding, SequencerState};
use crate::error::*;
use crate::runtime::{BIND_ALL_BUFFERS, RuntimeSymbol};
use crate::shader::{binary_symbol, entry_point_bytes, entry_point_symbol, extract_shader};
use crate::transfer::emit_transfers;

/// A launch operation and the function holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSite {
    pub func: usize,
    pub op: OpId,
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Collect every launch in program order.
///
/// All launches must live in one function: the runtime handle is an SSA value
/// of that function.
pub fn collect_launches(program: &Program) -> Result<Vec<LaunchSite>> {
    let mut sites = Vec::new();
    for (index, func) in program.functions().iter().enumerate() {
        for (op, operation) in func.walk() {
            if operation.op.as_launch().is_none() {
                continue;
            }
            if let Some(first) = sites.first().map(|s: &LaunchSite| s.func)
                && first != index
            {
                return LaunchesSpanFunctionsSnafu {
                    first: program.function_at(first)?.name(),
                    second: func.name(),
                }
                .fail();
            }
            sites.push(LaunchSite { func: index, op });
        }
    }
    tracing::debug!(launches = sites.len(), "launches collected");
    Ok(sites)
}

// ============================================================================
// LOWERING
// ============================================================================

fn grid_dim(func: &Function, value: ValueId, launch: usize, dim: char) -> Result<i32> {
    func.constant_value(value)
        .and_then(|c| c.as_i64())
        .and_then(|v| i32::try_from(v).ok())
        .context(NonConstantGridSizeSnafu { launch, dim })
}

/// Subgroup size hint: the block-size x dimension when constant, else 1.
fn subgroup_size(func: &Function, block_x: ValueId, launch: usize) -> i32 {
    let Some(value) = func.constant_value(block_x).and_then(|c| c.as_i64()) else {
        return 1;
    };
    i32::try_from(value).unwrap_or_else(|_| {
        tracing::warn!(launch, block_x = value, "block size x out of i32 range, using subgroup size 1");
        1
    })
}

fn call_runtime(
    builder: &mut OpBuilder<'_>,
    ctx: &mut LoweringContext,
    symbol: RuntimeSymbol,
    args: &[ValueId],
) -> Result<OpId> {
    ctx.use_symbol(symbol);
    Ok(builder.call(symbol.name(), args, [])?)
}

/// Replace launch number `launch` with its runtime action sequence.
pub fn lower_launch(program: &mut Program, site: LaunchSite, launch: usize, ctx: &mut LoweringContext) -> Result<()> {
    let shader = extract_shader(program, launch)?;
    let spirv_size = i32::try_from(shader.size()).ok().context(ShaderTooLargeSnafu { launch, bytes: shader.size() })?;

    let func = program.function_at(site.func)?;
    let launch_op = func
        .op(site.op)?
        .op
        .as_launch()
        .cloned()
        .context(lumen_ir::error::UnknownOpSnafu { op: site.op })?;
    let grid = [
        grid_dim(func, launch_op.grid[0], launch, 'x')?,
        grid_dim(func, launch_op.grid[1], launch, 'y')?,
        grid_dim(func, launch_op.grid[2], launch, 'z')?,
    ];
    let subgroup = subgroup_size(func, launch_op.block[0], launch);

    tracing::debug!(
        launch,
        kernel = %launch_op.kernel,
        shader = %shader.module,
        args = launch_op.args.len(),
        "lowering launch"
    );

    let kernel = launch_op.kernel.name.clone();
    let spirv_global = binary_symbol(launch);
    let entry_global = entry_point_symbol(&kernel, launch);
    program.add_global(&spirv_global, shader.bytes, Linkage::Internal)?;
    program.add_global(&entry_global, entry_point_bytes(&kernel), Linkage::Internal)?;

    let func = program.function_at_mut(site.func)?;
    let mut builder = OpBuilder::before(func, site.op);

    let runtime = match ctx.state {
        SequencerState::Uninitialized => {
            ctx.use_symbol(RuntimeSymbol::Init);
            builder.create_value(
                Op::Call { callee: RuntimeSymbol::Init.name().into(), args: SmallVec::new() },
                DType::Ptr,
            )?
        }
        SequencerState::Running { runtime, .. } => runtime,
        SequencerState::Finalized { .. } => return SequenceFinalizedSnafu { launch }.fail(),
    };

    // Launch action.
    let spirv_ptr = builder.address_of(spirv_global)?;
    let spirv_size = builder.native_const(spirv_size)?;
    let entry_ptr = builder.address_of(entry_global)?;
    let mut create_args: SmallVec<[ValueId; 7]> = SmallVec::from_slice(&[runtime, spirv_ptr, spirv_size, entry_ptr]);
    for dim in grid {
        create_args.push(builder.native_const(dim)?);
    }
    call_runtime(&mut builder, ctx, RuntimeSymbol::CreateLaunchAction, &create_args)?;

    let placeholder = builder.call(BIND_ALL_BUFFERS, &launch_op.args, [])?;
    ctx.pending.push(PendingBinding { launch, kernel, placeholder });

    if subgroup != 1 {
        tracing::debug!(launch, subgroup, "non-default subgroup size");
    }
    let subgroup = builder.native_const(subgroup)?;
    call_runtime(&mut builder, ctx, RuntimeSymbol::SetLaunchAction, &[runtime, subgroup])?;

    if ctx.config.elide_transfers {
        let actions = ctx.transfers.observe(launch, &launch_op.args);
        if !actions.is_empty() {
            ctx.use_symbol(RuntimeSymbol::CreateMemoryTransferAction);
            ctx.transfer_actions += actions.len();
            emit_transfers(&mut builder, runtime, &actions)?;
        }
    }

    call_runtime(&mut builder, ctx, RuntimeSymbol::AddLaunchActionToSchedule, &[runtime])?;

    ctx.state = if ctx.is_last_launch(launch) {
        call_runtime(&mut builder, ctx, RuntimeSymbol::Run, &[runtime])?;
        let teardown = call_runtime(&mut builder, ctx, RuntimeSymbol::Deinit, &[runtime])?;
        tracing::debug!(launch, %teardown, "runtime teardown");
        SequencerState::Finalized { runtime, teardown }
    } else {
        SequencerState::Running { launch, runtime }
    };

    if ctx.config.print_buffers {
        print_buffers(&mut builder, ctx, &launch_op.args)?;
    }

    builder.func_mut().erase(site.op)?;
    Ok(())
}

/// Print every ranked `f32` buffer. Other element types are skipped.
fn print_buffers(builder: &mut OpBuilder<'_>, ctx: &mut LoweringContext, buffers: &[ValueId]) -> Result<()> {
    for &buffer in buffers {
        let dtype = builder.func().value_type(buffer)?;
        if !dtype.is_buffer() || dtype.element() != Some(ScalarDType::Float32) {
            continue;
        }
        let unranked = builder.cast_unranked(buffer)?;
        call_runtime(builder, ctx, RuntimeSymbol::PrintBufferF32, &[unranked])?;
    }
    Ok(())
}
