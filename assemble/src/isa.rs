//! The instruction set descriptor.
//!
//! A descriptor is loaded once from line-oriented text and then only ever
//! borrowed. Each significant line looks like
//!
//! ```text
//! 0A01 = JMPI o i
//! ```
//!
//! where `o` marks an instruction that takes an operand and `o i` one whose
//! operand is immediate. An optional trailing `@role` token names the role of
//! the instruction explicitly, otherwise it is inferred from the mnemonic.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

/// The keyword that starts a variable declaration.
const DECLARATION_KEYWORD: &str = "VAR";

/// The default Micro86 descriptor.
const MICRO86: &str = include_str!("../micro86.m86db");

/// An error while loading a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid descriptor syntax on line {line}: {reason}")]
    Format { line: usize, reason: &'static str },
}

/// A failed descriptor lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown opcode `{0:04X}`")]
    UnknownOpcode(u16),
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
}

/// What an instruction does, independent of its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Halt,
    Load,
    Store,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Compare,
    Jump,
    JumpEqual,
    JumpNotEqual,
    JumpLess,
    JumpLessEqual,
    JumpGreater,
    JumpGreaterEqual,
    Read,
    Write,
}

/// A single instruction in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub opcode: u16,
    pub mnemonic: String,
    pub has_operand: bool,
    pub immediate: bool,
    pub role: Option<Role>,
}

/// An instruction set.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Entries keyed by opcode, in descriptor order.
    opcodes: IndexMap<u16, Entry>,
    /// Mnemonic to opcode.
    mnemonics: IndexMap<String, u16>,
}

////////////////////////////////////////////////////////////////////////////////
// Implementations
////////////////////////////////////////////////////////////////////////////////

impl Role {
    const NAMES: [(&'static str, Role); 18] = [
        ("halt", Role::Halt),
        ("load", Role::Load),
        ("store", Role::Store),
        ("add", Role::Add),
        ("sub", Role::Subtract),
        ("mul", Role::Multiply),
        ("div", Role::Divide),
        ("mod", Role::Modulo),
        ("cmp", Role::Compare),
        ("jmp", Role::Jump),
        ("je", Role::JumpEqual),
        ("jne", Role::JumpNotEqual),
        ("jl", Role::JumpLess),
        ("jle", Role::JumpLessEqual),
        ("jg", Role::JumpGreater),
        ("jge", Role::JumpGreaterEqual),
        ("in", Role::Read),
        ("out", Role::Write),
    ];

    /// Infers the role of an instruction from its mnemonic.
    ///
    /// Immediate variants conventionally carry a trailing `I`, like `ADDI`
    /// or `JMPI`, so the mnemonic is retried without it.
    pub fn infer(mnemonic: &str) -> Option<Self> {
        Self::from_mnemonic(mnemonic)
            .or_else(|| mnemonic.strip_suffix('I').and_then(Self::from_mnemonic))
    }

    fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        let role = match mnemonic {
            "HALT" | "HLT" => Self::Halt,
            "LOAD" | "LD" => Self::Load,
            "STORE" | "ST" => Self::Store,
            "ADD" => Self::Add,
            "SUB" => Self::Subtract,
            "MUL" => Self::Multiply,
            "DIV" => Self::Divide,
            "MOD" => Self::Modulo,
            "CMP" => Self::Compare,
            "JMP" => Self::Jump,
            "JE" | "JZ" => Self::JumpEqual,
            "JNE" | "JNZ" => Self::JumpNotEqual,
            "JL" => Self::JumpLess,
            "JLE" => Self::JumpLessEqual,
            "JG" => Self::JumpGreater,
            "JGE" => Self::JumpGreaterEqual,
            "IN" | "READ" => Self::Read,
            "OUT" | "WRITE" => Self::Write,
            _ => return None,
        };
        Some(role)
    }

    /// Whether this role transfers control to its operand.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Self::Jump
                | Self::JumpEqual
                | Self::JumpNotEqual
                | Self::JumpLess
                | Self::JumpLessEqual
                | Self::JumpGreater
                | Self::JumpGreaterEqual
        )
    }

    /// The name used for this role in a descriptor.
    pub fn name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, role)| role == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, role)| *role)
            .ok_or(())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a single significant descriptor line.
fn parse_entry(line: &str) -> Result<Entry, &'static str> {
    let mut tokens: Vec<_> = line.split_whitespace().collect();

    let role = match tokens.last() {
        Some(token) if token.starts_with('@') => {
            let role = token[1..].parse::<Role>().map_err(|_| "unknown role")?;
            tokens.pop();
            Some(role)
        }
        _ => None,
    };

    let (opcode, mnemonic, has_operand, immediate) = match tokens[..] {
        [opcode, "=", mnemonic] => (opcode, mnemonic, false, false),
        [opcode, "=", mnemonic, "o"] => (opcode, mnemonic, true, false),
        [opcode, "=", mnemonic, "o", "i"] => (opcode, mnemonic, true, true),
        _ => return Err("expected `<opcode> = <mnemonic> [o [i]] [@role]`"),
    };

    if !opcode.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err("opcode is not hexadecimal");
    }
    let opcode = u16::from_str_radix(opcode, 16).map_err(|_| "opcode does not fit in 16 bits")?;
    if mnemonic == DECLARATION_KEYWORD {
        return Err("mnemonic clashes with the declaration keyword");
    }

    Ok(Entry {
        opcode,
        mnemonic: mnemonic.to_owned(),
        has_operand,
        immediate,
        role: role.or_else(|| Role::infer(mnemonic)),
    })
}

impl Descriptor {
    /// Load a descriptor from its text.
    pub fn load(text: &str) -> Result<Self, Error> {
        let mut isa = Self {
            opcodes: IndexMap::new(),
            mnemonics: IndexMap::new(),
        };
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_entry(line).map_err(|reason| Error::Format { line: i + 1, reason })?;
            if entry.role.is_none() {
                log::debug!("no role for mnemonic `{}`", entry.mnemonic);
            }
            // Later lines silently override earlier ones with the same key.
            isa.mnemonics.insert(entry.mnemonic.clone(), entry.opcode);
            isa.opcodes.insert(entry.opcode, entry);
        }
        log::debug!("loaded {} instruction descriptors", isa.opcodes.len());
        Ok(isa)
    }

    /// The built-in Micro86 instruction set.
    pub fn micro86() -> Self {
        Self::load(MICRO86).expect("built-in descriptor is well formed")
    }

    /// The descriptor entry for the given opcode.
    pub fn entry(&self, opcode: u16) -> Result<&Entry, LookupError> {
        self.opcodes
            .get(&opcode)
            .ok_or(LookupError::UnknownOpcode(opcode))
    }

    /// The opcode for the given mnemonic.
    pub fn opcode(&self, mnemonic: &str) -> Result<u16, LookupError> {
        self.mnemonics
            .get(mnemonic)
            .copied()
            .ok_or_else(|| LookupError::UnknownMnemonic(mnemonic.to_owned()))
    }

    /// The mnemonic for the given opcode.
    pub fn mnemonic(&self, opcode: u16) -> Result<&str, LookupError> {
        self.entry(opcode).map(|e| e.mnemonic.as_str())
    }

    pub fn has_operand(&self, opcode: u16) -> Result<bool, LookupError> {
        self.entry(opcode).map(|e| e.has_operand)
    }

    pub fn is_immediate(&self, opcode: u16) -> Result<bool, LookupError> {
        self.entry(opcode).map(|e| e.immediate)
    }

    pub fn role(&self, opcode: u16) -> Result<Option<Role>, LookupError> {
        self.entry(opcode).map(|e| e.role)
    }

    pub fn is_mnemonic(&self, word: &str) -> bool {
        self.mnemonics.contains_key(word)
    }

    pub fn is_opcode(&self, opcode: u16) -> bool {
        self.opcodes.contains_key(&opcode)
    }

    /// Whether the word is a mnemonic or the declaration keyword.
    pub fn is_reserved(&self, word: &str) -> bool {
        word == DECLARATION_KEYWORD || self.is_mnemonic(word)
    }

    pub fn declaration_keyword(&self) -> &'static str {
        DECLARATION_KEYWORD
    }

    /// All entries, in descriptor order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.opcodes.values()
    }
}

impl FromStr for Descriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load(s)
    }
}
