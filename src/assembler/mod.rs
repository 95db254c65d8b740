//! The Assembler module is in charge of taking a
//! Scott CPU assembly file and producing a raw binary image.
//!
//! Each line is normalized by the lexer, classified into an
//! Instruction by the parser and turned into one or two bytes by
//! the encoder. Lines are independent of each other, so a single
//! pass in source order is enough.

pub mod ast;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod parser;

use std::io::{Read, Write};

use self::ast::{Encoded, Instruction};
use self::encoder::Encoder;
use self::error::AsmError;

/// One line of the assembly listing.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    /// Byte offset of the instruction in the output image.
    pub offset: usize,
    pub instruction: Instruction,
    pub encoded: Encoded,
}

/// Encodes instructions and appends their bytes to a sink in the order
/// they are pushed. Bytes are written as soon as an instruction encodes,
/// so output produced before a fault stays in the sink.
pub struct Assembler<W: Write> {
    encoder: Encoder,
    sink: W,
    listing: Vec<Entry>,
    offset: usize,
}

impl<W: Write> Assembler<W> {
    pub fn new(sink: W) -> Self {
        Assembler { encoder: Encoder::new(), sink, listing: Vec::new(), offset: 0 }
    }

    /// Encodes one instruction and writes its bytes to the sink.
    pub fn push(&mut self, instruction: Instruction) -> Result<Encoded, AsmError> {
        let encoded = self.encoder.encode(&instruction)?;
        self.sink.write_all(&encoded.bytes())?;

        self.listing.push(Entry { offset: self.offset, instruction, encoded });
        self.offset += encoded.size();
        Ok(encoded)
    }

    pub fn listing(&self) -> &[Entry] {
        &self.listing
    }

    /// Number of bytes written so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Flushes the sink and returns the listing.
    pub fn finish(mut self) -> Result<Vec<Entry>, AsmError> {
        self.sink.flush()?;
        Ok(self.listing)
    }
}

/// Assembles a whole source file into `sink`, stopping at the first fault.
pub fn assemble<R: Read + ?Sized, W: Write>(reader: Box<R>, sink: W) -> Result<Vec<Entry>, AsmError> {
    let mut asm = Assembler::new(sink);

    for line in lexer::source_lines(reader)? {
        let instruction = parser::classify(line)?;
        info!("{}", instruction);
        asm.push(instruction)?;
    }

    info!("assembled {} instruction(s) into {} byte(s)", asm.listing().len(), asm.offset());
    asm.finish()
}

/// Classifies every line without encoding anything.
pub fn preprocess<R: Read + ?Sized>(reader: Box<R>) -> Result<Vec<Instruction>, AsmError> {
    lexer::source_lines(reader)?
        .into_iter()
        .map(parser::classify)
        .collect()
}
