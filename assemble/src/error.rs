use std::cmp::max;
use std::path::Path;

use peter::Stylize;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::isa::LookupError;
use crate::span::Span;

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while translating a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("`{0}` is a reserved word")]
    ReservedWord(String),

    #[error("unknown token `{0}`")]
    UnknownToken(String),

    #[error("`{0}` requires an operand")]
    MissingOperand(String),

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("invalid integer `{0}`")]
    InvalidInteger(String),

    #[error("label `{0}` already declared")]
    DuplicateLabel(String),

    #[error("variable `{0}` already declared")]
    DuplicateVariable(String),

    #[error("unresolved label `{0}`")]
    UnresolvedLabel(String),

    #[error("unresolved variable `{0}`")]
    UnresolvedVariable(String),

    #[error("operand `{0}` does not fit in 16 bits")]
    OperandOutOfRange(i64),

    #[error("no statement for `{0}`, its descriptor has no role")]
    UnmappedOpcode(String),

    #[error("invalid operand for `{mnemonic}`, {reason}")]
    InvalidOperand {
        mnemonic: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// A translation error.
///
/// The span specifies what will be underlined in the error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    span: Span,
}

/// Returns the zero based line and the display column of a byte offset.
fn to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let start = input[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = input[..start].matches('\n').count();
    (line, input[start..offset].width())
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, span: impl Into<Span>) -> Self {
        Self {
            kind,
            span: span.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn pretty(&self, input: &str, filename: &Path) -> String {
        let Self { kind, span } = self;

        let (line, col) = to_line_col(input, span.m);
        let width = max(span.as_str(input).width(), 1);
        let code = input.lines().nth(line).unwrap_or_default();
        let error = format!(
            "{underline:>pad$} {msg}",
            underline = "^".repeat(width).bold().red(),
            msg = kind.to_string().bold(),
            pad = col + width,
        );

        let num = (line + 1).to_string();
        format!(
            "\n\
             {0:pad$} {arrow} {filename}:{line}:{col}\n \
             {0:pad$} {pipe}\n \
             {num:>} {pipe} {code}\n \
             {0:pad$} {pipe} {error}\n",
            "",
            pad = num.chars().count(),
            arrow = "-->".bold().blue(),
            filename = filename.display(),
            line = line + 1,
            col = col + 1,
            pipe = "|".bold().blue(),
            num = num.bold().blue(),
            code = code,
            error = error,
        )
    }
}
