//! Transliterate a program into C++.
//!
//! The generated program models the machine with an accumulator `_acc`, a
//! comparison register `_cmp` and a byte buffer `_byte`. Each instruction
//! becomes one statement chosen by its role in the descriptor, labels become
//! `goto` targets. Names that C++ or the generated program already use get
//! trailing underscores appended until they are free.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::ast::Program;
use crate::error::{Error, ErrorKind, Result};
use crate::isa::{Descriptor, Role};
use crate::resolve::{self, Resolved, Value};
use crate::span::Span;

const PROLOGUE: &str = "\
#include <iostream>
#include <cstdlib>
using namespace std;

int main() {
int _acc = 0, _cmp;
char _byte;
cin >> noskipws;";

const EPILOGUE: &str = "\
// === HALT Bypassed ===

exit(1);
}";

/// C++ keywords and the names the prologue and epilogue rely on.
const RESERVED: &[&str] = &[
    "_acc", "_byte", "_cmp", "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand",
    "bitor", "bool", "break", "case", "catch", "char", "char16_t", "char32_t", "char8_t", "cin",
    "class", "co_await", "co_return", "co_yield", "compl", "concept", "const", "const_cast",
    "consteval", "constexpr", "constinit", "continue", "cout", "decltype", "default", "delete",
    "do", "double", "dynamic_cast", "else", "enum", "exit", "explicit", "export", "extern",
    "false", "float", "for", "friend", "goto", "if", "inline", "int", "long", "main", "mutable",
    "namespace", "new", "noexcept", "noskipws", "not", "not_eq", "nullptr", "operator", "or",
    "or_eq", "private", "protected", "public", "register", "reinterpret_cast", "requires",
    "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast", "std",
    "struct", "switch", "template", "this", "thread_local", "throw", "true", "try", "typedef",
    "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t",
    "while", "xor", "xor_eq",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// The synthesized label for a numeric jump target.
fn position_label(position: usize) -> String {
    format!("_pc{}", position)
}

/// Whether the name has the shape of a synthesized label.
fn is_position_label(name: &str) -> bool {
    name.strip_prefix("_pc")
        .map_or(false, |digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// New names for the ones that clash, unique among all the given names.
fn mangle<'i>(names: &[&'i str], clashes: impl Fn(&str) -> bool) -> HashMap<&'i str, String> {
    let mut taken: HashSet<String> = names.iter().map(|&name| name.to_owned()).collect();
    let mut renamed = HashMap::new();
    for &name in names.iter().filter(|&&name| clashes(name)) {
        let mut new = format!("{}_", name);
        while clashes(&new) || taken.contains(&new) {
            new.push('_');
        }
        log::debug!("renaming `{}` to `{}` in the generated C++", name, new);
        taken.insert(new.clone());
        renamed.insert(name, new);
    }
    renamed
}

fn invalid_operand(isa: &Descriptor, opcode: u16, span: Span, reason: &'static str) -> Error {
    let mnemonic = isa.mnemonic(opcode).unwrap_or_default().to_owned();
    Error::new(ErrorKind::InvalidOperand { mnemonic, reason }, span)
}

struct Translator<'a, 'i> {
    isa: &'a Descriptor,
    program: &'a Program<'i>,
    /// Positions that are the target of a numeric jump.
    targets: BTreeSet<usize>,
    variables: HashMap<&'i str, String>,
    labels: HashMap<&'i str, String>,
}

impl<'a, 'i> Translator<'a, 'i> {
    fn variable(&self, name: &'i str) -> String {
        self.variables.get(name).map_or_else(|| name.to_owned(), Clone::clone)
    }

    fn label(&self, name: &'i str) -> String {
        self.labels.get(name).map_or_else(|| name.to_owned(), Clone::clone)
    }

    /// The operand of an instruction that reads a value.
    fn rvalue(&self, r: &Resolved<'i>) -> Result<String> {
        match r.operand {
            Some((_, Value::Literal(v))) => Ok(v.to_string()),
            Some((_, Value::Label { position, .. })) => Ok(position.to_string()),
            Some((_, Value::Variable { name, .. })) => Ok(self.variable(name)),
            None => Err(invalid_operand(self.isa, r.opcode, r.span, "an operand is required")),
        }
    }

    /// The operand of an instruction that writes a value.
    fn lvalue(&self, r: &Resolved<'i>) -> Result<String> {
        match r.operand {
            Some((_, Value::Variable { name, .. })) => Ok(self.variable(name)),
            Some((span, _)) => Err(invalid_operand(self.isa, r.opcode, span, "the operand must be a variable")),
            None => Err(invalid_operand(self.isa, r.opcode, r.span, "an operand is required")),
        }
    }

    /// The `goto` target of a jump instruction.
    fn target(&self, r: &Resolved<'i>) -> Result<String> {
        let count = self.program.instrs.len() as i64;
        match r.operand {
            Some((_, Value::Label { name, .. })) => Ok(self.label(name)),
            Some((_, Value::Literal(v))) if (0..=count).contains(&v) => Ok(position_label(v as usize)),
            Some((span, _)) => Err(invalid_operand(
                self.isa,
                r.opcode,
                span,
                "the jump target must be a label or an instruction position",
            )),
            None => Err(invalid_operand(self.isa, r.opcode, r.span, "an operand is required")),
        }
    }

    /// The statement lines for a single instruction.
    fn statement(&self, r: &Resolved<'i>) -> Result<Vec<String>> {
        let role = self
            .isa
            .role(r.opcode)
            .map_err(|err| Error::new(err.into(), r.span))?
            .ok_or_else(|| {
                let mnemonic = self.isa.mnemonic(r.opcode).unwrap_or_default().to_owned();
                Error::new(ErrorKind::UnmappedOpcode(mnemonic), r.span)
            })?;

        let compound = |op: &str| -> Result<Vec<String>> {
            Ok(vec![format!("_acc {}= {};", op, self.rvalue(r)?)])
        };
        let branch = |cond: &str| -> Result<Vec<String>> {
            Ok(vec![format!("if (_cmp {} 0) goto {};", cond, self.target(r)?)])
        };

        match role {
            Role::Halt => Ok(vec!["exit(0);".to_owned()]),
            Role::Load => Ok(vec![format!("_acc = {};", self.rvalue(r)?)]),
            Role::Store => Ok(vec![format!("{} = _acc;", self.lvalue(r)?)]),
            Role::Add => compound("+"),
            Role::Subtract => compound("-"),
            Role::Multiply => compound("*"),
            Role::Divide => compound("/"),
            Role::Modulo => compound("%"),
            Role::Compare => Ok(vec![format!("_cmp = _acc - {};", self.rvalue(r)?)]),
            Role::Jump => Ok(vec![format!("goto {};", self.target(r)?)]),
            Role::JumpEqual => branch("=="),
            Role::JumpNotEqual => branch("!="),
            Role::JumpLess => branch("<"),
            Role::JumpLessEqual => branch("<="),
            Role::JumpGreater => branch(">"),
            Role::JumpGreaterEqual => branch(">="),
            Role::Read => Ok(vec!["cin >> _byte;".to_owned(), "_acc = (int) _byte;".to_owned()]),
            Role::Write => Ok(vec!["cout << (char) _acc;".to_owned()]),
        }
    }

    /// The labels to place in front of the statement at this position.
    fn labels(&self, position: usize) -> String {
        let mut prefix: String = self
            .program
            .symbols
            .labels_at(position)
            .map(|name| format!("{}: ", self.label(name)))
            .collect();
        if self.targets.contains(&position) {
            prefix.push_str(&format!("{}: ", position_label(position)));
        }
        prefix
    }

    fn translate(&self, resolved: &[Resolved<'i>]) -> Result<String> {
        let mut lines = vec![PROLOGUE.to_owned(), String::new()];

        lines.push("// === Declarations ===".to_owned());
        lines.push(String::new());
        for (&name, variable) in &self.program.symbols.variables {
            lines.push(format!("int {} = {};", self.variable(name), variable.value));
        }
        lines.push(String::new());

        lines.push("// === Operations ===".to_owned());
        lines.push(String::new());
        for (position, r) in resolved.iter().enumerate() {
            let mut statement = self.statement(r)?;
            statement[0].insert_str(0, &self.labels(position));
            lines.extend(statement);
        }
        let end = self.labels(resolved.len());
        if !end.is_empty() {
            lines.push(format!("{};", end));
        }
        lines.push(String::new());

        lines.push(EPILOGUE.to_owned());
        Ok(lines.join("\n") + "\n")
    }
}

/// Transliterate the program into C++ source code.
pub fn program(isa: &Descriptor, program: &Program<'_>) -> Result<String> {
    let resolved = resolve::program(isa, program)?;
    let targets = resolved
        .iter()
        .filter(|r| matches!(isa.role(r.opcode), Ok(Some(role)) if role.is_jump()))
        .filter_map(|r| match r.operand {
            Some((_, Value::Literal(v))) => usize::try_from(v).ok(),
            _ => None,
        })
        .collect();
    let symbols = &program.symbols;
    let variables: Vec<_> = symbols.variables.keys().copied().collect();
    let labels: Vec<_> = symbols.labels.keys().copied().collect();
    let translator = Translator {
        isa,
        program,
        targets,
        variables: mangle(&variables, is_reserved),
        labels: mangle(&labels, |name| is_reserved(name) || is_position_label(name)),
    };
    let cpp = translator.translate(&resolved)?;
    log::debug!("translated {} instructions into C++", resolved.len());
    Ok(cpp)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::parse;

    fn translate(isa: &Descriptor, asm: &str) -> Result<String> {
        program(isa, &parse::program(isa, asm)?)
    }

    /// Only the translated statements, without the prologue and epilogue.
    #[track_caller]
    fn operations(isa: &Descriptor, asm: &str) -> Vec<String> {
        let cpp = translate(isa, asm).unwrap();
        let start = cpp.find("// === Operations ===\n\n").unwrap() + 23;
        let end = cpp.find("\n// === HALT Bypassed ===").unwrap();
        cpp[start..end].lines().map(str::to_owned).collect()
    }

    #[test]
    fn every_role() {
        let isa = Descriptor::micro86();
        let asm = "\
VAR v 3
top: LOADI 1 LOAD v STORE v
ADDI 2 ADD v SUBI 3 SUB v MULI 4 MUL v DIVI 5 DIV v MODI 6 MOD v
CMPI -7 CMP v
JMPI top JEI top JNEI top JLI top JLEI top JGI top JGEI top
IN OUT HALT";
        assert_eq!(
            operations(&isa, asm),
            [
                "top: _acc = 1;",
                "_acc = v;",
                "v = _acc;",
                "_acc += 2;",
                "_acc += v;",
                "_acc -= 3;",
                "_acc -= v;",
                "_acc *= 4;",
                "_acc *= v;",
                "_acc /= 5;",
                "_acc /= v;",
                "_acc %= 6;",
                "_acc %= v;",
                "_cmp = _acc - -7;",
                "_cmp = _acc - v;",
                "goto top;",
                "if (_cmp == 0) goto top;",
                "if (_cmp != 0) goto top;",
                "if (_cmp < 0) goto top;",
                "if (_cmp <= 0) goto top;",
                "if (_cmp > 0) goto top;",
                "if (_cmp >= 0) goto top;",
                "cin >> _byte;",
                "_acc = (int) _byte;",
                "cout << (char) _acc;",
                "exit(0);",
            ]
        );
    }

    #[test]
    fn labels_in_front_of_statements() {
        let isa = Descriptor::micro86();
        let asm = "a: LOADI b b: VAR x 1 c: OUT JMPI a";
        assert_eq!(
            operations(&isa, asm),
            ["a: _acc = 1;", "b: c: cout << (char) _acc;", "goto a;"]
        );
    }

    #[test]
    fn numeric_jump_targets() {
        let isa = Descriptor::micro86();
        assert_eq!(
            operations(&isa, "OUT JMPI 0 JEI 3"),
            [
                "_pc0: cout << (char) _acc;",
                "goto _pc0;",
                "if (_cmp == 0) goto _pc3;",
                "_pc3: ;",
            ]
        );
    }

    #[test]
    fn roles_come_from_the_descriptor() {
        // Same mnemonics as Micro86 but different opcodes.
        let isa = Descriptor::load("10 = HALT\n11 = LOADI o i\n12 = PUT @out\n").unwrap();
        assert_eq!(
            operations(&isa, "LOADI 72 PUT HALT"),
            ["_acc = 72;", "cout << (char) _acc;", "exit(0);"]
        );
    }

    #[test]
    fn clashing_variables_are_renamed() {
        let isa = Descriptor::micro86();
        let asm = "VAR exit 1 VAR _acc 2 VAR int 3 VAR int_ 4 LOAD exit ADD _acc STORE int HALT";
        let cpp = translate(&isa, asm).unwrap();
        for line in ["int exit_ = 1;", "int _acc_ = 2;", "int int__ = 3;", "int int_ = 4;"] {
            assert!(cpp.contains(&format!("\n{}\n", line)), "{}", line);
        }
        assert_eq!(
            operations(&isa, "VAR main 1 VAR cin 2 LOAD main STORE cin HALT"),
            ["_acc = main_;", "cin_ = _acc;", "exit(0);"]
        );
    }

    #[test]
    fn clashing_labels_are_renamed() {
        let isa = Descriptor::micro86();
        assert_eq!(
            operations(&isa, "_pc0: OUT JMPI 0 JMPI _pc0"),
            ["_pc0_: _pc0: cout << (char) _acc;", "goto _pc0;", "goto _pc0_;"]
        );
        assert_eq!(
            operations(&isa, "while: OUT JMPI while _pc: HALT"),
            ["while_: cout << (char) _acc;", "goto while_;", "_pc: exit(0);"]
        );
        assert!(is_position_label("_pc12"));
        assert!(!is_position_label("_pc"));
        assert!(!is_position_label("_pcx"));
    }

    #[test]
    fn literals_are_range_checked() {
        let isa = Descriptor::micro86();
        let err = translate(&isa, "LOADI 99999 HALT").unwrap_err();
        assert_eq!(err, Error::new(ErrorKind::OperandOutOfRange(99999), 6..11));
        let err = translate(&isa, "JMPI 40000").unwrap_err();
        assert_eq!(
            err,
            Error::new(
                ErrorKind::InvalidOperand {
                    mnemonic: "JMPI".into(),
                    reason: "the jump target must be a label or an instruction position"
                },
                5..10
            )
        );
    }

    #[test]
    fn empty_program() {
        let isa = Descriptor::micro86();
        let expected = "\
#include <iostream>
#include <cstdlib>
using namespace std;

int main() {
int _acc = 0, _cmp;
char _byte;
cin >> noskipws;

// === Declarations ===


// === Operations ===


// === HALT Bypassed ===

exit(1);
}
";
        assert_eq!(translate(&isa, "").unwrap(), expected);
    }

    #[test]
    fn errors() {
        let isa = Descriptor::load(
            "01 = HALT\n02 = NOP\n03 = STOREI o i @store\n04 = JMP o @jmp\n05 = LOAD @load\n06 = JMPI o i\n",
        )
        .unwrap();
        let invalid = |mnemonic: &str, reason| ErrorKind::InvalidOperand {
            mnemonic: mnemonic.to_owned(),
            reason,
        };
        let tests = [
            ("NOP", 0..3, ErrorKind::UnmappedOpcode("NOP".into())),
            ("STOREI 4", 7..8, invalid("STOREI", "the operand must be a variable")),
            (
                "VAR x 1 JMP x",
                12..13,
                invalid("JMP", "the jump target must be a label or an instruction position"),
            ),
            (
                "JMPI 2",
                5..6,
                invalid("JMPI", "the jump target must be a label or an instruction position"),
            ),
            ("JMPI -1", 5..7, ErrorKind::OperandOutOfRange(-1)),
            ("LOAD", 0..4, invalid("LOAD", "an operand is required")),
            ("JMPI nowhere", 5..12, ErrorKind::UnresolvedLabel("nowhere".into())),
        ];
        for (asm, span, kind) in tests {
            assert_eq!(translate(&isa, asm).unwrap_err(), Error::new(kind, span), "{}", asm);
        }
    }
}
