//! Bind operands to literals, labels and variables.
//!
//! Both code generators share this step. It only runs once the whole program
//! has been scanned, which is what allows labels to be referenced before they
//! are declared.

use crate::ast::{Operand, Program, Symbols};
use crate::error::{Error, ErrorKind, Result};
use crate::isa::Descriptor;
use crate::span::Span;

/// What an operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'i> {
    /// An integer literal, only for immediate instructions. Always fits in
    /// the low half of an instruction word, see [`fits`].
    Literal(i64),
    /// A label, only for immediate instructions.
    Label { name: &'i str, position: usize },
    /// A declared variable, only for direct instructions.
    Variable { name: &'i str, ordinal: usize },
}

/// An instruction with its operand bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'i> {
    pub opcode: u16,
    /// The location of the mnemonic.
    pub span: Span,
    pub operand: Option<(Span, Value<'i>)>,
}

/// Whether a literal fits in the operand half of an instruction word.
///
/// Jump targets are unsigned addresses, every other literal is a signed
/// 16-bit value.
pub fn fits(value: i64, jump: bool) -> bool {
    if jump {
        u16::try_from(value).is_ok()
    } else {
        i16::try_from(value).is_ok()
    }
}

/// Resolves a single operand of the given opcode.
pub fn operand<'i>(
    isa: &Descriptor,
    symbols: &Symbols<'i>,
    opcode: u16,
    operand: Operand<'i>,
) -> Result<Value<'i>> {
    let Operand { text, span } = operand;
    let immediate = isa
        .is_immediate(opcode)
        .map_err(|err| Error::new(err.into(), span))?;
    if immediate {
        if let Ok(value) = text.parse() {
            let jump = matches!(isa.role(opcode), Ok(Some(role)) if role.is_jump());
            if !fits(value, jump) {
                return Err(Error::new(ErrorKind::OperandOutOfRange(value), span));
            }
            return Ok(Value::Literal(value));
        }
        let position = symbols
            .label(text)
            .ok_or_else(|| Error::new(ErrorKind::UnresolvedLabel(text.to_owned()), span))?;
        Ok(Value::Label {
            name: text,
            position,
        })
    } else {
        let variable = symbols
            .variable(text)
            .ok_or_else(|| Error::new(ErrorKind::UnresolvedVariable(text.to_owned()), span))?;
        Ok(Value::Variable {
            name: text,
            ordinal: variable.ordinal,
        })
    }
}

/// Resolves every instruction in the program, in program counter order.
pub fn program<'i>(isa: &Descriptor, program: &Program<'i>) -> Result<Vec<Resolved<'i>>> {
    program
        .instrs
        .iter()
        .map(|instr| {
            let operand = match instr.operand {
                Some(o) => Some((o.span, operand(isa, &program.symbols, instr.opcode, o)?)),
                None => None,
            };
            Ok(Resolved {
                opcode: instr.opcode,
                span: instr.span,
                operand,
            })
        })
        .collect()
}
