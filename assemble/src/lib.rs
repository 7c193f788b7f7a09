//! An assembler for the Micro86 instruction set.
//!
//! Source text is translated into a [`Program`](ast::Program) using an
//! instruction set [`Descriptor`](isa::Descriptor), and from there either
//! encoded as machine words or transliterated into C++.

pub mod ast;
pub mod binary;
pub mod cpp;
mod error;
mod ident;
pub mod isa;
mod lex;
mod parse;
pub mod resolve;
mod span;

pub use crate::binary::Binary;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::isa::Descriptor;
pub use crate::parse::program as parse;
pub use crate::span::Span;

/// Assemble the program as Micro86 machine words.
pub fn to_binary(isa: &Descriptor, input: &str) -> Result<Binary> {
    binary::program(isa, &parse::program(isa, input)?)
}

/// Transliterate the program into C++ source code.
pub fn to_cpp(isa: &Descriptor, input: &str) -> Result<String> {
    cpp::program(isa, &parse::program(isa, input)?)
}
