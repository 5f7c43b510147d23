use lumen_dtype::DType;

use crate::{Error, Function, KernelModule, Linkage, Program, ShaderModule, Signature};

#[test]
fn test_duplicate_global_rejected() {
    let mut program = Program::new();
    program.add_global("SPIRV_BIN0", vec![1, 2, 3], Linkage::Internal).unwrap();
    let err = program.add_global("SPIRV_BIN0", vec![], Linkage::Internal).unwrap_err();
    assert_eq!(err, Error::DuplicateSymbol { name: "SPIRV_BIN0".into() });
    assert_eq!(program.global("SPIRV_BIN0").unwrap().data, vec![1, 2, 3]);
}

#[test]
fn test_duplicate_function_rejected() {
    let mut program = Program::new();
    assert_eq!(program.add_function(Function::new("main", [])).unwrap(), 0);
    assert!(program.add_function(Function::new("main", [])).is_err());
}

#[test]
fn test_declare_extern_is_idempotent() {
    let mut program = Program::new();
    let sig = Signature::new([DType::Ptr], []);
    assert!(program.declare_extern("run", sig.clone()).unwrap());
    assert!(!program.declare_extern("run", sig).unwrap());
    assert_eq!(program.externs().len(), 1);
    assert!(program.is_declared("run"));
}

#[test]
fn test_declare_extern_conflict() {
    let mut program = Program::new();
    program.declare_extern("run", Signature::new([DType::Ptr], [])).unwrap();
    let err = program.declare_extern("run", Signature::new([DType::Int32], [])).unwrap_err();
    assert!(matches!(err, Error::ConflictingDeclaration { .. }));
}

#[test]
fn test_remove_modules() {
    let mut program = Program::new();
    program.add_kernel_module(KernelModule::new("kernels", ["a", "b"]));
    program.add_shader_module(ShaderModule::compute("a_spv", "a", [1, 1, 1]));
    program.add_shader_module(ShaderModule::compute("b_spv", "b", [1, 1, 1]));

    assert_eq!(program.remove_kernel_modules(), 1);
    assert_eq!(program.remove_shader_modules(), 2);
    assert!(program.kernel_modules().is_empty());
    assert!(program.shader_modules().is_empty());
}
