//! Buffer binding resolution and placeholder expansion tests.

use lumen_ir::{DType, Function, ScalarDType};
use test_case::test_case;

use crate::binder::*;
use crate::config::LoweringConfig;
use crate::context::{LoweringContext, PendingBinding};
use crate::error::Error;
use crate::runtime::RuntimeSymbol;

#[test_case(ScalarDType::Int8 => 15)]
#[test_case(ScalarDType::UInt8 => 15)]
#[test_case(ScalarDType::Int16 => 30)]
#[test_case(ScalarDType::Float16 => 30)]
#[test_case(ScalarDType::BFloat16 => 30)]
#[test_case(ScalarDType::Int32 => 60)]
#[test_case(ScalarDType::UInt32 => 60)]
#[test_case(ScalarDType::Float32 => 60)]
#[test_case(ScalarDType::Int64 => 120)]
#[test_case(ScalarDType::Float64 => 120)]
fn test_byte_size(scalar: ScalarDType) -> i32 {
    resolve_binding(&DType::buffer(scalar, [3, 5]), 0, 0).unwrap().byte_size
}

#[test]
fn test_zero_element_buffer_binds_zero_bytes() {
    let binding = resolve_binding(&DType::buffer(ScalarDType::Float32, [0, 7]), 0, 0).unwrap();
    assert_eq!(binding.byte_size, 0);
}

#[test]
fn test_rank_zero_buffer_binds_one_element() {
    let binding = resolve_binding(&DType::buffer(ScalarDType::Float64, []), 0, 0).unwrap();
    assert_eq!(binding.byte_size, 8);
    assert_eq!(binding.symbol, RuntimeSymbol::BindBufferFloat64);
}

#[test]
fn test_unsupported_element_type() {
    let err = resolve_binding(&DType::buffer(ScalarDType::Bool, [4]), 2, 1).unwrap_err();
    assert!(matches!(err, Error::UnsupportedElementType { launch: 2, binding: 1, scalar: ScalarDType::Bool }));
}

#[test]
fn test_scalar_argument_is_malformed() {
    let err = resolve_binding(&DType::Float32, 0, 3).unwrap_err();
    assert!(matches!(err, Error::MalformedBufferArgument { binding: 3, .. }));
}

#[test]
fn test_unranked_argument_is_malformed() {
    let err = resolve_binding(&DType::UnrankedBuffer { scalar: ScalarDType::Float32 }, 0, 0).unwrap_err();
    assert!(matches!(err, Error::MalformedBufferArgument { .. }));
}

#[test]
fn test_oversized_buffer() {
    let err = resolve_binding(&DType::buffer(ScalarDType::Float64, [1 << 20, 1 << 10]), 0, 0).unwrap_err();
    assert!(matches!(err, Error::BufferTooLarge { .. }));
}

#[test]
fn test_largest_representable_buffer() {
    let binding = resolve_binding(&DType::buffer(ScalarDType::Int8, [i32::MAX as usize]), 0, 0).unwrap();
    assert_eq!(binding.byte_size, i32::MAX);
}

#[test]
fn test_binding_requires_finalized_sequence() {
    let mut func = Function::new("main", []);
    let mut ctx = LoweringContext::new(LoweringConfig::default(), 2);
    ctx.pending.push(PendingBinding { launch: 0, kernel: "k".into(), placeholder: first_op(&mut func) });

    let err = bind_pending(&mut func, &mut ctx).unwrap_err();
    assert!(matches!(err, Error::SequenceNotFinalized));
}

#[test]
fn test_nothing_pending_is_noop() {
    let mut func = Function::new("main", []);
    let mut ctx = LoweringContext::new(LoweringConfig::default(), 0);
    bind_pending(&mut func, &mut ctx).unwrap();
    assert_eq!(func.walk().count(), 0);
}

fn first_op(func: &mut Function) -> lumen_ir::OpId {
    let entry = func.entry();
    lumen_ir::OpBuilder::at_end(func, entry).ret(&[]).unwrap()
}
