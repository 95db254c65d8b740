//! The Parser module classifies a normalized source line into an
//! Instruction record: mnemonic, destination and source operand.
use super::ast::{Instruction, SourceLine};
use super::error::{AsmError, SyntaxReason};

/// Splits a line of the form `MNEMONIC[ DEST][, SRC]`.
/// The mnemonic is not validated here; the encoder does that.
pub fn classify(line: SourceLine) -> Result<Instruction, AsmError> {
    let parts: Vec<&str> = line.text.split(',').collect();
    if parts.len() > 2 {
        return Err(AsmError::syntax(&line, SyntaxReason::TooManyOperands));
    }

    let src = parts.get(1).map(|s| s.trim().to_string());

    let tokens: Vec<&str> = parts[0].split_whitespace().collect();
    if tokens.len() > 2 {
        return Err(AsmError::syntax(&line, SyntaxReason::TooManyTokens));
    }

    let mnemonic = tokens.get(0).map(|s| s.to_string()).unwrap_or_default();
    let dst = tokens.get(1).map(|s| s.to_string());

    Ok(Instruction { line, mnemonic, dst, src })
}
