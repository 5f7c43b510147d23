use test_case::test_case;

use crate::Error;
use crate::spirv::*;

#[test]
fn test_header_layout() {
    let module = ShaderModule::compute("add_module", "add", [64, 1, 1]);
    let words = module.serialize().unwrap();

    assert_eq!(words[0], MAGIC);
    assert_eq!(words[1], 0x0001_0000);
    assert_eq!(words[2], GENERATOR);
    assert_eq!(words[3], 5, "four ids handed out, bound is one past the last");
    assert_eq!(words[4], 0);
}

#[test]
fn test_instruction_word_encoding() {
    let mut module = ShaderModule::new("m", (1, 5));
    module.push(Instruction::new(opcode::CAPABILITY, [1]));
    module.push(Instruction::new(opcode::RETURN, []));
    let words = module.serialize().unwrap();

    assert_eq!(words[1], 0x0001_0500);
    assert_eq!(&words[5..], &[2 << 16 | 17, 1, 1 << 16 | 253]);
}

#[test]
fn test_entry_points() {
    let module = ShaderModule::compute("m", "matmul_tiled", [8, 8, 1]);
    assert_eq!(module.entry_points(), vec!["matmul_tiled".to_string()]);
}

#[test]
fn test_empty_module_fails() {
    let module = ShaderModule::new("empty", (1, 0));
    assert!(matches!(module.serialize(), Err(Error::EmptyShaderModule { .. })));
}

#[test]
fn test_zero_id_bound_fails() {
    let mut module = ShaderModule::compute("m", "k", [1, 1, 1]);
    module.set_id_bound(0);
    assert!(matches!(module.serialize(), Err(Error::InvalidIdBound { .. })));
}

#[test]
fn test_oversized_instruction_fails() {
    let mut module = ShaderModule::new("m", (1, 0));
    module.push(Instruction::new(opcode::NAME, std::iter::repeat_n(0u32, u16::MAX as usize)));
    let err = module.serialize().unwrap_err();
    assert_eq!(err, Error::InstructionTooLong { opcode: opcode::NAME, words: u16::MAX as usize + 1 });
}

#[test_case("", &[0]; "empty string is a single nul word")]
#[test_case("abc", &[0x0063_6261]; "three bytes plus nul")]
#[test_case("abcd", &[0x6463_6261, 0]; "full word needs a trailing nul word")]
fn test_encode_string(s: &str, expected: &[u32]) {
    assert_eq!(encode_string(s).as_slice(), expected);
}

#[test]
fn test_words_to_bytes_little_endian() {
    assert_eq!(words_to_bytes(&[MAGIC]), vec![0x03, 0x02, 0x23, 0x07]);
}
