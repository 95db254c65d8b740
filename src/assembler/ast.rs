//! Data model for a parsed Scott CPU assembly file.
//!
//! Each non-blank line holds exactly one instruction of the form
//! `MNEMONIC[ DEST][, SRC]`. Comments are prefixed with semicolons (;)
//! and run to the end of the line. Mnemonics, registers and literals are
//! case-insensitive; lines are uppercased before classification.
//!
//! Supported Instructions:
//!
//! ```nasm
//! LOAD  RA, RB      ; RA <= RAM[RB]
//! STORE RA, RB      ; RAM[RA] <= RB
//! DATA  RA, CONST   ; RA <= CONST (second byte)
//! IN    DATA, RB    ; RB <= IO data bus
//! IN    ADDR, RB    ; RB <= IO address bus
//! OUT   DATA, RB    ; IO data bus <= RB
//! OUT   ADDR, RB    ; IO address bus <= RB
//! ADD   RA, RB      ; RA <= RA + RB
//! SHL   RA, RB      ; RA <= RB << 1
//! SHR   RA, RB      ; RA <= RB >> 1
//! NOT   RA, RB      ; RA <= !RB
//! AND   RA, RB      ; RA <= RA & RB
//! OR    RA, RB      ; RA <= RA | RB
//! XOR   RA, RB      ; RA <= RA ^ RB
//! CMP   RA, RB      ; set flags from RA - RB
//! JMPR  RA          ; jump to the address held in RA
//! JMP   ADDR        ; jump to ADDR (second byte)
//! J[C][A][E][Z] ADDR ; jump to ADDR if any named flag is set
//! CLEAR             ; clear the flags
//! ```
//!
//! Example source file:
//!
//! ```nasm
//! DATA R0, 5        ; decimal literal
//! DATA R1, 0x0A     ; hexadecimal literal
//! ADD R0, R1
//! CLEAR
//! JC 0x10
//! ```

use std::fmt;

/// A line that survived comment stripping and normalization.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceLine {
    /// 1-based line number in the original file.
    pub number: usize,
    /// Uppercased, trimmed text with any comment removed.
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: &str) -> Self {
        SourceLine { number, text: text.trim().to_uppercase() }
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] - {}", self.number, self.text)
    }
}

/// A classified source line. The mnemonic is not checked against the
/// opcode table until the record is encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub line: SourceLine,
    pub mnemonic: String,
    pub dst: Option<String>,
    pub src: Option<String>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

/// Grouping of opcodes by how many operand positions their syntax accepts.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OpClass {
    TwoOperand,
    OneOperand,
    ZeroOperand,
}

/// Flag bits tested by a conditional jump.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Condition(u8);

impl Condition {
    pub const CARRY: u8 = 0b1000;
    pub const ABOVE: u8 = 0b0100;
    pub const EQUAL: u8 = 0b0010;
    pub const ZERO:  u8 = 0b0001;

    /// Parses the flag letters following `J`. Letters must appear in
    /// C, A, E, Z order, each at most once, and at least one is required.
    pub fn from_letters(letters: &str) -> Option<Condition> {
        let mut bits = 0u8;
        let mut rest = letters;

        for (letter, bit) in [('C', Self::CARRY), ('A', Self::ABOVE), ('E', Self::EQUAL), ('Z', Self::ZERO)].iter() {
            if rest.starts_with(*letter) {
                bits |= bit;
                rest = &rest[1..];
            }
        }

        if bits == 0 || !rest.is_empty() {
            None
        } else {
            Some(Condition(bits))
        }
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (letter, bit) in [('C', Self::CARRY), ('A', Self::ABOVE), ('E', Self::EQUAL), ('Z', Self::ZERO)].iter() {
            if self.0 & bit != 0 {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Opcode {
    LOAD,
    STORE,
    DATA,
    IN,
    OUT,
    ADD,
    SHL,
    SHR,
    NOT,
    AND,
    OR,
    XOR,
    CMP,
    JMPR,
    JMP,
    J(Condition),
    CLEAR,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::J(cond) => write!(f, "J{}", cond),
            op => write!(f, "{:?}", op),
        }
    }
}

/// How an opcode lays out its operands in the output bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Encoding {
    /// `opcode | (src << 2) | dst`
    RegisterPair,
    /// `[opcode | dst, src]`
    LoadImmediate,
    /// `opcode | port << 2 | src` where the destination selects DATA or ADDR.
    PortTransfer,
    /// `opcode | dst`
    Register,
    /// `[opcode, dst]`
    Immediate,
    /// `opcode`, or `[opcode, dst]` when an operand is supplied.
    Bare,
}

impl Opcode {
    /// Looks the mnemonic up in the opcode tables.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        use Opcode::*;
        match mnemonic {
            "LOAD"  => Some(LOAD),
            "STORE" => Some(STORE),
            "DATA"  => Some(DATA),
            "IN"    => Some(IN),
            "OUT"   => Some(OUT),
            "ADD"   => Some(ADD),
            "SHL"   => Some(SHL),
            "SHR"   => Some(SHR),
            "NOT"   => Some(NOT),
            "AND"   => Some(AND),
            "OR"    => Some(OR),
            "XOR"   => Some(XOR),
            "CMP"   => Some(CMP),
            "JMPR"  => Some(JMPR),
            "JMP"   => Some(JMP),
            "CLEAR" => Some(CLEAR),
            _ if mnemonic.starts_with('J') => Condition::from_letters(&mnemonic[1..]).map(J),
            _ => None,
        }
    }

    /// Returns the opcode byte with all operand bits clear.
    pub fn value(&self) -> u8 {
        use Opcode::*;
        match self {
            LOAD    => 0x00,
            STORE   => 0x10,
            DATA    => 0x20,
            JMPR    => 0x30,
            JMP     => 0x40,
            J(cond) => 0x50 | cond.bits(),
            CLEAR   => 0x60,
            IN      => 0x70,
            OUT     => 0x78,
            ADD     => 0x80,
            SHL     => 0x90,
            SHR     => 0xA0,
            NOT     => 0xB0,
            AND     => 0xC0,
            OR      => 0xD0,
            XOR     => 0xE0,
            CMP     => 0xF0,
        }
    }

    pub fn class(&self) -> OpClass {
        use Opcode::*;
        match self {
            LOAD | STORE | DATA | IN | OUT |
            ADD | SHL | SHR | NOT | AND |
            OR | XOR | CMP          => OpClass::TwoOperand,
            JMPR | JMP | J(_)       => OpClass::OneOperand,
            CLEAR                   => OpClass::ZeroOperand,
        }
    }

    pub fn encoding(&self) -> Encoding {
        use Opcode::*;
        match self {
            IN | OUT                => Encoding::PortTransfer,
            DATA                    => Encoding::LoadImmediate,
            LOAD | STORE | ADD |
            SHL | SHR | NOT | AND |
            OR | XOR | CMP          => Encoding::RegisterPair,
            JMPR                    => Encoding::Register,
            JMP | J(_)              => Encoding::Immediate,
            CLEAR                   => Encoding::Bare,
        }
    }
}

/// The one or two bytes produced for a single instruction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Encoded {
    pub primary: u8,
    pub immediate: Option<u8>,
}

impl Encoded {
    pub fn single(primary: u8) -> Self {
        Encoded { primary, immediate: None }
    }

    pub fn with_immediate(primary: u8, immediate: u8) -> Self {
        Encoded { primary, immediate: Some(immediate) }
    }

    pub fn has_immediate(&self) -> bool {
        self.immediate.is_some()
    }

    /// Bytes in output order: primary first, then the immediate.
    pub fn bytes(&self) -> Vec<u8> {
        match self.immediate {
            Some(imm) => vec![self.primary, imm],
            None => vec![self.primary],
        }
    }

    /// Number of bytes the instruction occupies in the image.
    pub fn size(&self) -> usize {
        if self.has_immediate() { 2 } else { 1 }
    }
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.immediate {
            Some(imm) => write!(f, "0x{:02X} 0x{:02X}", self.primary, imm),
            None => write!(f, "0x{:02X}", self.primary),
        }
    }
}
