//! The Encoder turns a classified Instruction into machine code.
//!
//! Operands resolve in a fixed order: absent (or empty) is 0, then the
//! register names R0-R3, then a decimal literal, then a `0X` prefixed
//! hexadecimal literal. Register fields packed into the primary byte are
//! 2 bits wide; an immediate emitted as the second byte is 8 bits wide.
//! Values that do not fit their field are rejected, never masked.
use regex::Regex;

use super::ast::{Encoded, Encoding, Instruction, Opcode, SourceLine};
use super::error::{AsmError, SyntaxReason};

const FIELD_BITS: u32 = 2;
const IMMEDIATE_BITS: u32 = 8;

/// Port selector bit for IN/OUT when the address bus is targeted.
const ADDR_PORT: u8 = 0b100;

pub struct Encoder {
    decimal: Regex,
    hex: Regex,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Encoder {
            decimal: Regex::new(r"^[0-9]+$").expect("decimal operand pattern"),
            hex: Regex::new(r"^0X[0-9A-F]+$").expect("hex operand pattern"),
        }
    }

    /// Encodes a single instruction into one or two bytes.
    pub fn encode(&self, ins: &Instruction) -> Result<Encoded, AsmError> {
        let line = &ins.line;
        let op = match Opcode::from_mnemonic(&ins.mnemonic) {
            Some(op) => op,
            None => return Err(AsmError::syntax(line, SyntaxReason::UnknownMnemonic(ins.mnemonic.clone()))),
        };

        let opcode = op.value();
        let encoded = match op.encoding() {
            Encoding::PortTransfer => {
                let port = match ins.dst.as_deref() {
                    Some("DATA") => 0,
                    Some("ADDR") => ADDR_PORT,
                    other => return Err(AsmError::syntax(line, SyntaxReason::BadPort(other.map(str::to_string)))),
                };
                let src = self.field(line, ins.src.as_deref())?;
                Encoded::single(opcode | port | src)
            },

            Encoding::RegisterPair => {
                let dst = self.field(line, ins.dst.as_deref())?;
                let src = self.field(line, ins.src.as_deref())?;
                Encoded::single(opcode | (src << 2) | dst)
            },

            Encoding::LoadImmediate => {
                let dst = self.field(line, ins.dst.as_deref())?;
                let src = self.immediate(line, ins.src.as_deref())?;
                Encoded::with_immediate(opcode | dst, src)
            },

            Encoding::Register => {
                self.resolve(line, ins.src.as_deref())?;
                let dst = self.field(line, ins.dst.as_deref())?;
                Encoded::single(opcode | dst)
            },

            Encoding::Immediate => {
                self.resolve(line, ins.src.as_deref())?;
                let dst = self.immediate(line, ins.dst.as_deref())?;
                Encoded::with_immediate(opcode, dst)
            },

            // A zero-operand op given an operand takes the immediate form.
            Encoding::Bare => {
                self.resolve(line, ins.src.as_deref())?;
                match ins.dst.as_deref() {
                    Some(text) if !text.is_empty() => Encoded::with_immediate(opcode, self.immediate(line, Some(text))?),
                    _ => Encoded::single(opcode),
                }
            },
        };

        debug!("{} => {}", ins, encoded);
        Ok(encoded)
    }

    /// Resolves an operand to its addressing value.
    pub fn resolve(&self, line: &SourceLine, operand: Option<&str>) -> Result<u64, AsmError> {
        let text = match operand {
            None => return Ok(0),
            Some(t) if t.is_empty() => return Ok(0),
            Some(t) => t,
        };

        let parsed = match text {
            "R0" => return Ok(0),
            "R1" => return Ok(1),
            "R2" => return Ok(2),
            "R3" => return Ok(3),
            _ if self.decimal.is_match(text) => u64::from_str_radix(text, 10),
            _ if self.hex.is_match(text) => u64::from_str_radix(&text[2..], 16),
            _ => return Err(AsmError::syntax(line, SyntaxReason::BadOperand(text.to_string()))),
        };

        // Only digits remain, so the parse can fail solely on overflow.
        parsed.map_err(|_| AsmError::Range { line: line.clone(), value: text.to_string(), bits: 64 })
    }

    /// Resolves an operand packed into a 2-bit field of the primary byte.
    fn field(&self, line: &SourceLine, operand: Option<&str>) -> Result<u8, AsmError> {
        self.fit(line, operand, FIELD_BITS)
    }

    /// Resolves an operand emitted verbatim as the second byte.
    fn immediate(&self, line: &SourceLine, operand: Option<&str>) -> Result<u8, AsmError> {
        self.fit(line, operand, IMMEDIATE_BITS)
    }

    fn fit(&self, line: &SourceLine, operand: Option<&str>, bits: u32) -> Result<u8, AsmError> {
        let value = self.resolve(line, operand)?;
        if value >> bits != 0 {
            return Err(AsmError::Range { line: line.clone(), value: operand.unwrap_or_default().to_string(), bits });
        }
        Ok(value as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::parser::classify;

    fn encode(text: &str) -> Result<Encoded, AsmError> {
        Encoder::new().encode(&classify(SourceLine::new(1, text))?)
    }

    fn bytes(text: &str) -> Vec<u8> {
        encode(text).unwrap().bytes()
    }

    #[test]
    fn test_resolve() {
        let enc = Encoder::new();
        let line = SourceLine::new(1, "ADD R0, R1");

        assert_eq!(enc.resolve(&line, None).unwrap(), 0);
        assert_eq!(enc.resolve(&line, Some("")).unwrap(), 0);
        for (i, reg) in ["R0", "R1", "R2", "R3"].iter().enumerate() {
            assert_eq!(enc.resolve(&line, Some(*reg)).unwrap(), i as u64);
        }
        assert_eq!(enc.resolve(&line, Some("0")).unwrap(), 0);
        assert_eq!(enc.resolve(&line, Some("42")).unwrap(), 42);
        assert_eq!(enc.resolve(&line, Some("007")).unwrap(), 7);
        assert_eq!(enc.resolve(&line, Some("0X1F")).unwrap(), 0x1F);
        assert_eq!(enc.resolve(&line, Some("0XFF")).unwrap(), 0xFF);
        assert_eq!(enc.resolve(&line, Some("1000")).unwrap(), 1000);

        assert!(matches!(enc.resolve(&line, Some("R4")), Err(AsmError::Syntax { .. })));
        assert!(matches!(enc.resolve(&line, Some("0XQQ")), Err(AsmError::Syntax { .. })));
        assert!(matches!(enc.resolve(&line, Some("0X")), Err(AsmError::Syntax { .. })));
        assert!(matches!(enc.resolve(&line, Some("-1")), Err(AsmError::Syntax { .. })));
        assert!(matches!(enc.resolve(&line, Some("0B101")), Err(AsmError::Syntax { .. })));
        assert!(matches!(enc.resolve(&line, Some("99999999999999999999999")), Err(AsmError::Range { .. })));
    }

    #[test]
    fn test_register_pair() {
        let ops: [(&str, u8); 10] = [
            ("LOAD", 0x00), ("STORE", 0x10), ("ADD", 0x80), ("SHL", 0x90),
            ("SHR", 0xA0), ("NOT", 0xB0), ("AND", 0xC0), ("OR", 0xD0),
            ("XOR", 0xE0), ("CMP", 0xF0),
        ];
        for (mnemonic, opcode) in ops.iter() {
            for dst in 0..4u8 {
                for src in 0..4u8 {
                    let text = format!("{} R{}, R{}", mnemonic, dst, src);
                    assert_eq!(bytes(&text), vec![opcode | (src << 2) | dst], "{}", text);
                }
            }
        }

        assert_eq!(bytes("ADD R0, R1"), vec![0x84]);
        assert_eq!(bytes("CMP R3, 2"), vec![0xFB]);
        assert_eq!(bytes("NOT R1"), vec![0xB1]);
    }

    #[test]
    fn test_load_immediate() {
        assert_eq!(bytes("DATA R0, 5"), vec![0x20, 0x05]);
        assert_eq!(bytes("DATA R3, 0xFF"), vec![0x23, 0xFF]);
        assert_eq!(bytes("DATA R1, R2"), vec![0x21, 0x02]);
        assert!(encode("DATA R2, 255").unwrap().has_immediate());
    }

    #[test]
    fn test_port_transfer() {
        assert_eq!(bytes("IN DATA, R1"), vec![0x71]);
        assert_eq!(bytes("IN ADDR, R1"), vec![0x75]);
        assert_eq!(bytes("OUT DATA, R3"), vec![0x7B]);
        assert_eq!(bytes("OUT ADDR, R2"), vec![0x7E]);
        assert!(!encode("OUT ADDR, R2").unwrap().has_immediate());

        match encode("IN R0, R1") {
            Err(AsmError::Syntax { reason, .. }) => assert_eq!(reason, SyntaxReason::BadPort(Some("R0".to_string()))),
            other => panic!("expected a syntax error, got {:?}", other),
        }
        match encode("OUT") {
            Err(AsmError::Syntax { reason, .. }) => assert_eq!(reason, SyntaxReason::BadPort(None)),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_jumps() {
        assert_eq!(bytes("JMPR R2"), vec![0x32]);
        assert!(!encode("JMPR R2").unwrap().has_immediate());
        assert_eq!(bytes("JMP 0x10"), vec![0x40, 0x10]);
        assert_eq!(bytes("JMP 200"), vec![0x40, 200]);

        let conditional: [(&str, u8); 15] = [
            ("JC", 0x58), ("JA", 0x54), ("JE", 0x52), ("JZ", 0x51),
            ("JCA", 0x5C), ("JCE", 0x5A), ("JCZ", 0x59), ("JAE", 0x56),
            ("JAZ", 0x55), ("JEZ", 0x53), ("JCAE", 0x5E), ("JCAZ", 0x5D),
            ("JCEZ", 0x5B), ("JAEZ", 0x57), ("JCAEZ", 0x5F),
        ];
        for (mnemonic, opcode) in conditional.iter() {
            let text = format!("{} 0x2A", mnemonic);
            assert_eq!(bytes(&text), vec![*opcode, 0x2A], "{}", text);
        }

        // A register name resolves to its index and is not packed.
        assert_eq!(bytes("JZ R3"), vec![0x51, 0x03]);
    }

    #[test]
    fn test_clear() {
        assert_eq!(bytes("CLEAR"), vec![0x60]);
        assert_eq!(bytes("CLEAR 0"), vec![0x60, 0x00]);
        assert_eq!(bytes("CLEAR 0x12"), vec![0x60, 0x12]);
    }

    #[test]
    fn test_unused_source_is_still_resolved() {
        match encode("JMP 5, 0XQQ") {
            Err(AsmError::Syntax { reason, .. }) => assert_eq!(reason, SyntaxReason::BadOperand("0XQQ".to_string())),
            other => panic!("expected a syntax error, got {:?}", other),
        }
        match encode("JMPR R1, FOO") {
            Err(AsmError::Syntax { reason, .. }) => assert_eq!(reason, SyntaxReason::BadOperand("FOO".to_string())),
            other => panic!("expected a syntax error, got {:?}", other),
        }
        assert!(matches!(encode("CLEAR 1, R7"), Err(AsmError::Syntax { .. })));
        assert!(matches!(encode("CLEAR , 0XZ"), Err(AsmError::Syntax { .. })));

        // A well-formed but unused source is ignored, as is its magnitude.
        assert_eq!(bytes("JC 1, 999"), vec![0x58, 0x01]);
        assert_eq!(bytes("JMPR R1, R2"), vec![0x31]);
    }

    #[test]
    fn test_unknown_mnemonic() {
        match encode("FOO R0") {
            Err(AsmError::Syntax { line, reason }) => {
                assert_eq!(line.number, 1);
                assert_eq!(reason, SyntaxReason::UnknownMnemonic("FOO".to_string()));
            },
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_operand() {
        match encode("DATA R0, 0XQQ") {
            Err(AsmError::Syntax { reason, .. }) => assert_eq!(reason, SyntaxReason::BadOperand("0XQQ".to_string())),
            other => panic!("expected a syntax error, got {:?}", other),
        }
        assert!(matches!(encode("ADD R0, R9"), Err(AsmError::Syntax { .. })));
    }

    #[test]
    fn test_out_of_range() {
        match encode("DATA R0, 256") {
            Err(AsmError::Range { value, bits, .. }) => {
                assert_eq!(value, "256");
                assert_eq!(bits, 8);
            },
            other => panic!("expected a range error, got {:?}", other),
        }
        match encode("ADD R0, 4") {
            Err(AsmError::Range { value, bits, .. }) => {
                assert_eq!(value, "4");
                assert_eq!(bits, 2);
            },
            other => panic!("expected a range error, got {:?}", other),
        }
        assert!(matches!(encode("JMP 0x100"), Err(AsmError::Range { .. })));
        assert!(matches!(encode("OUT DATA, 5"), Err(AsmError::Range { .. })));
        assert!(matches!(encode("JMPR 4"), Err(AsmError::Range { .. })));
    }
}
