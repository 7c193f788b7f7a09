//! Validate label and variable names.

use crate::error::ErrorKind;
use crate::isa::Descriptor;

fn is_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$')
}

fn is_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$')
}

/// Checks that the name is a well formed identifier and not a reserved word.
pub fn validate(isa: &Descriptor, name: &str) -> Result<(), ErrorKind> {
    let mut chars = name.chars();
    let well_formed = matches!(chars.next(), Some(c) if is_start(c)) && chars.all(is_continue);
    if !well_formed {
        Err(ErrorKind::InvalidIdentifier(name.to_owned()))
    } else if isa.is_reserved(name) {
        Err(ErrorKind::ReservedWord(name.to_owned()))
    } else {
        Ok(())
    }
}
