//! Runtime symbol declaration tests.

use enumset::EnumSet;
use lumen_ir::{Program, ScalarDType, Signature};

use crate::error::Error;
use crate::runtime::RuntimeSymbol;
use crate::symbols::declare_runtime_symbols;
use crate::test::fixtures::extern_names;

const FIXED: [&str; 6] = [
    "initVulkan",
    "createVulkanLaunchKernelAction",
    "setVulkanLaunchKernelAction",
    "addVulkanLaunchActionToSchedule",
    "run",
    "deinitVulkan",
];

#[test]
fn test_fixed_symbols_always_declared() {
    let mut program = Program::new();
    let declared = declare_runtime_symbols(&mut program, EnumSet::empty(), EnumSet::empty()).unwrap();
    assert_eq!(declared, FIXED);
    assert_eq!(extern_names(&program), FIXED);
}

#[test]
fn test_optional_symbols_only_when_used() {
    let mut program = Program::new();
    let used = RuntimeSymbol::Init | RuntimeSymbol::CreateMemoryTransferAction | RuntimeSymbol::BindBufferInteger32;
    declare_runtime_symbols(&mut program, used, ScalarDType::Int32 | ScalarDType::UInt32).unwrap();

    let names = extern_names(&program);
    assert_eq!(&names[..6], FIXED);
    assert_eq!(&names[6..], ["createVulkanMemoryTransferAction", "bindBufferInteger32"]);
}

#[test]
fn test_bindings_follow_element_type_order() {
    let mut program = Program::new();
    let used = RuntimeSymbol::BindBufferFloat32 | RuntimeSymbol::BindBufferInteger8 | RuntimeSymbol::BindBufferFloat16;
    let types = ScalarDType::Float32 | ScalarDType::Int8 | ScalarDType::Float16;
    declare_runtime_symbols(&mut program, used, types).unwrap();

    assert_eq!(&extern_names(&program)[6..], ["bindBufferInteger8", "bindBufferFloat16", "bindBufferFloat32"]);
}

#[test]
fn test_existing_declaration_is_kept() {
    let mut program = Program::new();
    program.declare_extern("run", RuntimeSymbol::Run.signature()).unwrap();

    let declared = declare_runtime_symbols(&mut program, EnumSet::empty(), EnumSet::empty()).unwrap();
    assert_eq!(declared.len(), 5);
    assert!(!declared.iter().any(|name| name == "run"));
    assert_eq!(program.externs().len(), 6);
}

#[test]
fn test_conflicting_declaration_is_an_error() {
    let mut program = Program::new();
    program.declare_extern("run", Signature::new([], [])).unwrap();

    let err = declare_runtime_symbols(&mut program, EnumSet::empty(), EnumSet::empty()).unwrap_err();
    assert!(matches!(err, Error::IrError { source: lumen_ir::Error::ConflictingDeclaration { .. } }));
}
