//! Copy direction analysis tests.

use enumset::EnumSet;
use lumen_ir::{DType, Function, Op, OpBuilder, OpId, ScalarDType, ValueId};
use test_case::test_case;

use crate::copy_mode::*;
use crate::runtime::{BIND_ALL_BUFFERS, RuntimeSymbol, SymbolUsage};
use crate::test::fixtures::f32_buffer;

fn used() -> SymbolUsage {
    RuntimeSymbol::Deinit | RuntimeSymbol::Run | RuntimeSymbol::BindBufferFloat32
}

/// `alloc; [store]; site; [load]; teardown; [load]` in a single block.
fn single_block(store_before: bool, load_between: bool, load_after: bool) -> (Function, OpId, OpId, ValueId) {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(f32_buffer(4)).unwrap();
    let idx = b.index_const(0).unwrap();
    let value = b.native_const(1.0f32).unwrap();
    if store_before {
        b.store(value, buffer, &[idx]).unwrap();
    }
    let site = b.call(BIND_ALL_BUFFERS, &[buffer], []).unwrap();
    if load_between {
        b.load(buffer, &[idx]).unwrap();
    }
    let teardown = b.call("deinitVulkan", &[], []).unwrap();
    if load_after {
        b.load(buffer, &[idx]).unwrap();
    }
    b.ret(&[]).unwrap();
    (func, site, teardown, buffer)
}

#[test]
fn test_parameter_buffer_gets_both_directions() {
    let mut func = Function::new("main", [f32_buffer(8)]);
    let entry = func.entry();
    let param = func.params()[0];
    let mut b = OpBuilder::at_end(&mut func, entry);
    let site = b.call(BIND_ALL_BUFFERS, &[param], []).unwrap();
    let teardown = b.call("deinitVulkan", &[], []).unwrap();

    let analysis = analyze_buffer(&func, site, teardown, param, &used()).unwrap();
    assert_eq!(analysis.mode, EnumSet::all());
    assert!(analysis.hazards.is_empty());
}

#[test_case(false, false => 0; "unused")]
#[test_case(true, false => 1; "written before launch")]
#[test_case(false, true => 2; "read after teardown")]
#[test_case(true, true => 3; "written and read")]
fn test_single_block_mode(store_before: bool, load_after: bool) -> u32 {
    let (func, site, teardown, buffer) = single_block(store_before, false, load_after);
    let analysis = analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();
    assert!(analysis.hazards.is_empty());
    copy_mode_bits(analysis.mode)
}

#[test]
fn test_access_between_launch_and_teardown_is_hazard() {
    let (func, site, teardown, buffer) = single_block(true, true, false);
    let analysis = analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();

    assert_eq!(analysis.mode, EnumSet::only(CopyDirection::HostToDevice));
    assert_eq!(analysis.hazards.len(), 1);
    let op = &func.op(analysis.hazards[0]).unwrap().op;
    assert!(matches!(op, Op::Load { .. }));
}

#[test]
fn test_access_in_other_block_gets_both_directions() {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let exit = func.add_block([]);

    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(f32_buffer(4)).unwrap();
    let site = b.call(BIND_ALL_BUFFERS, &[buffer], []).unwrap();
    let teardown = b.call("deinitVulkan", &[], []).unwrap();
    b.branch(exit, &[]).unwrap();

    b.set_insertion_point(lumen_ir::InsertPoint::BlockEnd(exit));
    let idx = b.index_const(0).unwrap();
    b.load(buffer, &[idx]).unwrap();
    b.ret(&[]).unwrap();

    let analysis = analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();
    assert_eq!(analysis.mode, EnumSet::all());
}

#[test]
fn test_teardown_in_other_block_makes_later_access_a_hazard() {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let exit = func.add_block([]);

    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(f32_buffer(4)).unwrap();
    let idx = b.index_const(0).unwrap();
    let site = b.call(BIND_ALL_BUFFERS, &[buffer], []).unwrap();
    b.load(buffer, &[idx]).unwrap();
    b.branch(exit, &[]).unwrap();

    b.set_insertion_point(lumen_ir::InsertPoint::BlockEnd(exit));
    let teardown = b.call("deinitVulkan", &[], []).unwrap();
    b.ret(&[]).unwrap();

    let analysis = analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();
    assert!(analysis.mode.is_empty());
    assert_eq!(analysis.hazards.len(), 1);
}

#[test]
fn test_dependencies_follow_casts_but_exclude_them() {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(f32_buffer(4)).unwrap();
    let cast = b.cast_unranked(buffer).unwrap();
    let user = b.call("consume", &[cast], []).unwrap();
    let bound = b.cast_unranked(buffer).unwrap();
    b.call(RuntimeSymbol::BindBufferFloat32.name(), &[bound], []).unwrap();

    let deps = external_dependencies(&func, buffer, &used()).unwrap();
    assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![user]);
}

#[test]
fn test_runtime_call_is_external_until_used() {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(f32_buffer(4)).unwrap();
    let cast = b.cast_unranked(buffer).unwrap();
    let print = b.call(RuntimeSymbol::PrintBufferF32.name(), &[cast], []).unwrap();

    let deps = external_dependencies(&func, buffer, &used()).unwrap();
    assert!(deps.contains(&print));

    let deps = external_dependencies(&func, buffer, &(used() | RuntimeSymbol::PrintBufferF32)).unwrap();
    assert!(deps.is_empty());
}

#[test_case(Op::Alloc => true; "alloc")]
#[test_case(Op::Call { callee: BIND_ALL_BUFFERS.into(), args: Default::default() } => true; "placeholder")]
#[test_case(Op::Call { callee: "run".into(), args: Default::default() } => true; "used runtime call")]
#[test_case(Op::Call { callee: "createVulkanMemoryTransferAction".into(), args: Default::default() } => false; "unused runtime call")]
#[test_case(Op::Call { callee: "user_fn".into(), args: Default::default() } => false; "user call")]
#[test_case(Op::Return { values: Default::default() } => false; "return")]
fn test_is_internal_op(op: Op) -> bool {
    is_internal_op(&op, &used())
}

#[test]
fn test_copy_mode_bits() {
    assert_eq!(copy_mode_bits(EnumSet::empty()), 0);
    assert_eq!(copy_mode_bits(CopyDirection::HostToDevice.into()), 1);
    assert_eq!(copy_mode_bits(CopyDirection::DeviceToHost.into()), 2);
    assert_eq!(copy_mode_bits(EnumSet::all()), 3);
}

#[test]
fn test_dealloc_counts_as_host_access() {
    let mut func = Function::new("main", []);
    let entry = func.entry();
    let mut b = OpBuilder::at_end(&mut func, entry);
    let buffer = b.alloc(DType::buffer(ScalarDType::Int32, [2])).unwrap();
    let site = b.call(BIND_ALL_BUFFERS, &[buffer], []).unwrap();
    let teardown = b.call("deinitVulkan", &[], []).unwrap();
    b.dealloc(buffer).unwrap();

    let analysis = analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();
    assert_eq!(analysis.mode, EnumSet::only(CopyDirection::DeviceToHost));
}

#[test]
fn test_index_stays_valid_across_insertions() {
    let (mut func, site, teardown, buffer) = single_block(true, false, true);
    let index = FunctionIndex::new(&func);

    let mut b = OpBuilder::before(&mut func, site);
    let cast = b.cast_unranked(buffer).unwrap();
    b.call(RuntimeSymbol::BindBufferFloat32.name(), &[cast], []).unwrap();

    let analysis = index.analyze_buffer(&func, site, teardown, buffer, &used()).unwrap();
    assert_eq!(analysis.mode, EnumSet::all());
    assert!(analysis.hazards.is_empty());
}
