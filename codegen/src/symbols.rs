//! Runtime symbol declarations.

use enumset::EnumSet;
use lumen_ir::{Program, ScalarDType};

use crate::Result;
use crate::runtime::{RuntimeSymbol, SymbolUsage};

fn declare(program: &mut Program, declared: &mut Vec<String>, symbol: RuntimeSymbol) -> Result<()> {
    if program.declare_extern(symbol.name(), symbol.signature())? {
        declared.push(symbol.name().to_string());
    }
    Ok(())
}

/// Declare the fixed runtime entry points and the optional ones in `used`.
///
/// Typed binding entry points follow element type order. Returns the names
/// newly declared; symbols the program already declares are skipped.
pub fn declare_runtime_symbols(
    program: &mut Program,
    used: SymbolUsage,
    element_types: EnumSet<ScalarDType>,
) -> Result<Vec<String>> {
    let mut declared = Vec::new();

    for symbol in RuntimeSymbol::FIXED {
        declare(program, &mut declared, symbol)?;
    }

    for symbol in [RuntimeSymbol::CreateMemoryTransferAction, RuntimeSymbol::PrintBufferF32] {
        if used.contains(symbol) {
            declare(program, &mut declared, symbol)?;
        }
    }

    for scalar in element_types {
        if let Some(symbol) = RuntimeSymbol::bind_buffer(scalar)
            && used.contains(symbol)
        {
            declare(program, &mut declared, symbol)?;
        }
    }

    tracing::debug!(
        declared = declared.len(),
        optional = used.iter().filter(|s| s.is_optional()).count(),
        "runtime symbols declared"
    );
    Ok(declared)
}
