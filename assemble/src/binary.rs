//! Encode a program as Micro86 machine words.
//!
//! Every instruction is a single 32-bit word, the opcode in the upper half and
//! the operand in the lower half. Variables are laid out right after the
//! instructions in declaration order, one word each.

use std::fmt;

use crate::ast::Program;
use crate::error::{Error, ErrorKind, Result};
use crate::isa::Descriptor;
use crate::resolve::{self, Resolved, Value};

/// A single instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub opcode: u16,
    pub operand: u16,
}

/// An assembled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    /// Instruction words followed by variable words.
    pub words: Vec<u32>,
    /// The number of instruction words.
    pub instructions: usize,
    /// The number of variable words.
    pub variables: usize,
}

impl Word {
    pub fn new(opcode: u16, operand: u16) -> Self {
        Self { opcode, operand }
    }

    pub fn encode(self) -> u32 {
        u32::from(self.opcode) << 16 | u32::from(self.operand)
    }

    pub fn decode(word: u32) -> Self {
        Self {
            opcode: (word >> 16) as u16,
            operand: (word & 0xFFFF) as u16,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.encode())
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{:08X}", word)?;
        }
        Ok(())
    }
}

/// The memory address of a variable.
pub fn address(instructions: usize, ordinal: usize) -> usize {
    instructions + ordinal - 1
}

/// The low half of an instruction word, or the offending value.
fn operand_bits(value: Value<'_>, instructions: usize) -> std::result::Result<u16, i64> {
    match value {
        // Range checked during resolution, negative values keep their
        // two's complement bits.
        Value::Literal(v) => Ok(v as u16),
        Value::Label { position, .. } => u16::try_from(position).map_err(|_| position as i64),
        Value::Variable { ordinal, .. } => {
            let address = address(instructions, ordinal);
            u16::try_from(address).map_err(|_| address as i64)
        }
    }
}

/// Assemble the program as machine words.
pub fn program(isa: &Descriptor, program: &Program<'_>) -> Result<Binary> {
    let instructions = program.instrs.len();
    let variables = program.symbols.variables.len();

    let mut words = Vec::with_capacity(instructions + variables);
    for Resolved {
        opcode, operand, ..
    } in resolve::program(isa, program)?
    {
        let operand = match operand {
            Some((span, value)) => operand_bits(value, instructions)
                .map_err(|v| Error::new(ErrorKind::OperandOutOfRange(v), span))?,
            None => 0,
        };
        words.push(Word::new(opcode, operand).encode());
    }
    words.extend(program.symbols.variables.values().map(|v| v.value as u32));

    log::debug!(
        "assembled {} instruction words and {} variable words",
        instructions,
        variables
    );
    Ok(Binary {
        words,
        instructions,
        variables,
    })
}
