//! This lexer turns a source file into normalized instruction lines.
use std::io::{BufReader, BufRead, Read};

use super::ast::SourceLine;
use super::error::AsmError;

/// Reads every line of the source, discarding comments and blank lines.
/// Line numbers are 1-based and count blank and comment-only lines, so
/// they always match what an editor shows.
pub fn source_lines<T: Read + ?Sized>(reader: Box<T>) -> Result<Vec<SourceLine>, AsmError> {
    let mut lines: Vec<SourceLine> = Vec::with_capacity(256);

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let number = index + 1;
        match line {
            Ok(s) => if let Some(l) = normalize_line(&s, number) {
                lines.push(l);
            },
            Err(source) => return Err(AsmError::Read { line: number, source }),
        }
    }

    Ok(lines)
}

/// Strips a trailing comment and uppercases what is left.
/// Returns None if nothing but whitespace remains.
fn normalize_line(line: &str, number: usize) -> Option<SourceLine> {
    let code = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };

    if code.trim().is_empty() {
        None
    } else {
        Some(SourceLine::new(number, code))
    }
}
