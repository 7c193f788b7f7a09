//! Translate source tokens into a program.
//!
//! This is a single left to right scan. Labels get their position straight
//! away because it only depends on the instructions before them, operands are
//! stored as raw text and resolved later.

#[cfg(test)]
mod tests;

use crate::ast::{Instr, Operand, Program, Variable};
use crate::error::{Error, ErrorKind, Result};
use crate::ident;
use crate::isa::{Descriptor, LookupError};
use crate::lex::Tokens;
use crate::span::Span;

struct Parser<'a, 'i> {
    /// The instruction set.
    isa: &'a Descriptor,
    /// The original input string.
    input: &'i str,
    /// An iterator over the tokens in the input.
    tokens: Tokens<'i>,
    /// The program built so far.
    program: Program<'i>,
}

fn lookup<T>(result: std::result::Result<T, LookupError>, span: Span) -> Result<T> {
    result.map_err(|err| Error::new(err.into(), span))
}

impl<'a, 'i> Parser<'a, 'i> {
    fn new(isa: &'a Descriptor, input: &'i str) -> Self {
        Self {
            isa,
            input,
            tokens: Tokens::new(input),
            program: Program::default(),
        }
    }

    /// The current program counter position.
    fn position(&self) -> usize {
        self.program.instrs.len()
    }

    /// Consumes the next token, failing at the end of input.
    fn expect(&mut self, want: &'static str) -> Result<(Span, &'i str)> {
        self.tokens
            .next()
            .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof(want), Span::eof(self.input)))
    }

    /// Records a label at the current position.
    fn declare_label(&mut self, span: Span, name: &'i str) -> Result<()> {
        ident::validate(self.isa, name).map_err(|kind| Error::new(kind, span))?;
        let position = self.position();
        if self.program.symbols.labels.insert(name, position).is_some() {
            return Err(Error::new(ErrorKind::DuplicateLabel(name.to_owned()), span));
        }
        Ok(())
    }

    /// Consumes an instruction and its operand, if it takes one.
    fn eat_instr(&mut self, span: Span, mnemonic: &'i str) -> Result<()> {
        let opcode = lookup(self.isa.opcode(mnemonic), span)?;
        let operand = if lookup(self.isa.has_operand(opcode), span)? {
            let (span, text) = self.tokens.next().ok_or_else(|| {
                Error::new(ErrorKind::MissingOperand(mnemonic.to_owned()), span)
            })?;
            Some(Operand { text, span })
        } else {
            None
        };
        self.program.instrs.push(Instr {
            opcode,
            span,
            operand,
        });
        Ok(())
    }

    /// Consumes the name and initial value of a variable declaration.
    fn eat_declaration(&mut self) -> Result<()> {
        let (span, name) = self.expect("a variable name")?;
        ident::validate(self.isa, name).map_err(|kind| Error::new(kind, span))?;
        if self.program.symbols.variables.contains_key(name) {
            return Err(Error::new(ErrorKind::DuplicateVariable(name.to_owned()), span));
        }

        let (span, value) = self.expect("an initial value")?;
        let value = value
            .parse()
            .map_err(|_| Error::new(ErrorKind::InvalidInteger(value.to_owned()), span))?;

        let ordinal = self.program.symbols.variables.len() + 1;
        self.program
            .symbols
            .variables
            .insert(name, Variable { value, ordinal });
        Ok(())
    }

    /// Consumes the next program.
    fn eat_program(mut self) -> Result<Program<'i>> {
        while let Some((span, token)) = self.tokens.next() {
            // A label prefixes the statement that follows it.
            let (span, token) = match token.strip_suffix(':') {
                Some(label) => {
                    self.declare_label(span.trim_last(), label)?;
                    self.expect("an instruction or declaration after the label")?
                }
                None => (span, token),
            };

            if self.isa.is_mnemonic(token) {
                self.eat_instr(span, token)?;
            } else if token == self.isa.declaration_keyword() {
                self.eat_declaration()?;
            } else {
                return Err(Error::new(ErrorKind::UnknownToken(token.to_owned()), span));
            }
        }
        log::debug!(
            "parsed {} instructions, {} labels and {} variables",
            self.program.instrs.len(),
            self.program.symbols.labels.len(),
            self.program.symbols.variables.len()
        );
        Ok(self.program)
    }
}

/// Parse Micro86 assembly.
pub fn program<'i>(isa: &Descriptor, input: &'i str) -> Result<Program<'i>> {
    Parser::new(isa, input).eat_program()
}
