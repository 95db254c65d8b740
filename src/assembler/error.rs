//! Faults raised while assembling. Every fault that stems from the source
//! program carries the offending line so it can be reported as
//! `[<line>] - <SOURCE>`.
use std::fmt;
use std::io;

use super::ast::SourceLine;

#[derive(thiserror::Error, Debug)]
pub enum AsmError {
    #[error("SyntaxError at {line}: {reason}")]
    Syntax { line: SourceLine, reason: SyntaxReason },

    #[error("RangeError at {line}: value {value} does not fit in a {bits}-bit field")]
    Range { line: SourceLine, value: String, bits: u32 },

    #[error("unable to read line {line}: {source}")]
    Read { line: usize, source: io::Error },

    #[error("unable to write output: {0}")]
    Write(#[from] io::Error),
}

impl AsmError {
    pub fn syntax(line: &SourceLine, reason: SyntaxReason) -> Self {
        AsmError::Syntax { line: line.clone(), reason }
    }

    /// Line number of the offending source line, if the fault has one.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            AsmError::Syntax { line, .. } |
            AsmError::Range  { line, .. } => Some(line.number),
            AsmError::Read   { line, .. } => Some(*line),
            AsmError::Write(_)            => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SyntaxReason {
    UnknownMnemonic(String),
    TooManyOperands,
    TooManyTokens,
    BadOperand(String),
    BadPort(Option<String>),
}

impl fmt::Display for SyntaxReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use SyntaxReason::*;
        match self {
            UnknownMnemonic(m)  => write!(f, "unknown mnemonic `{}`", m),
            TooManyOperands     => write!(f, "expected at most one comma"),
            TooManyTokens       => write!(f, "expected at most one operand before the comma"),
            BadOperand(o)       => write!(f, "`{}` is not a register, decimal or hexadecimal value", o),
            BadPort(Some(p))    => write!(f, "port must be DATA or ADDR, got `{}`", p),
            BadPort(None)       => write!(f, "port must be DATA or ADDR"),
        }
    }
}
