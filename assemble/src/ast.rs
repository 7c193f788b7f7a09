//! Abstract representation of a translated program.
//!
//! Operands are kept as raw source text here, they are only bound to labels
//! and variables once the whole program has been scanned.

use indexmap::IndexMap;

use crate::span::Span;

/// The unresolved text of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand<'i> {
    pub text: &'i str,
    pub span: Span,
}

/// An instruction.
///
/// Its position in [`Program::instrs`] is its program counter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instr<'i> {
    pub opcode: u16,
    /// The location of the mnemonic.
    pub span: Span,
    pub operand: Option<Operand<'i>>,
}

/// A declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    /// The literal initial value.
    pub value: i32,
    /// The 1-based declaration order.
    pub ordinal: usize,
}

/// Labels and variables collected while scanning a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols<'i> {
    /// Label name to the position of the instruction following it.
    pub labels: IndexMap<&'i str, usize>,
    /// Variables in declaration order.
    pub variables: IndexMap<&'i str, Variable>,
}

/// An entire program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program<'i> {
    pub instrs: Vec<Instr<'i>>,
    pub symbols: Symbols<'i>,
}

impl<'i> Symbols<'i> {
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.variables.get(name).copied()
    }

    /// The labels declared at the given position, in declaration order.
    pub fn labels_at(&self, position: usize) -> impl Iterator<Item = &'i str> + '_ {
        self.labels
            .iter()
            .filter(move |(_, p)| **p == position)
            .map(|(&name, _)| name)
    }
}
