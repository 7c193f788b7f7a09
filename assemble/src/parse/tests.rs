use super::*;
use crate::ast::Symbols;

use indexmap::indexmap;
use pretty_assertions::assert_eq;

/// A small instruction set where arithmetic and jumps are immediate.
const ISA: &str = "\
01 = HALT
02 = LOAD o
03 = LOADI o i
04 = STORE o
05 = SUB o i
06 = ADD o i
07 = JNE o i
";

fn isa() -> Descriptor {
    Descriptor::load(ISA).unwrap()
}

fn instr(opcode: u16, span: std::ops::Range<usize>) -> Instr<'static> {
    Instr {
        opcode,
        span: span.into(),
        operand: None,
    }
}

fn with_operand(
    opcode: u16,
    span: std::ops::Range<usize>,
    text: &'static str,
    operand: std::ops::Range<usize>,
) -> Instr<'static> {
    Instr {
        operand: Some(Operand {
            text,
            span: operand.into(),
        }),
        ..instr(opcode, span)
    }
}

#[test]
fn eat_program_loop() {
    let asm = "loop: LOADI 5 SUB 1 JNE loop HALT";
    let program = program(&isa(), asm).unwrap();
    assert_eq!(
        program.instrs,
        [
            with_operand(0x03, 6..11, "5", 12..13),
            with_operand(0x05, 14..17, "1", 18..19),
            with_operand(0x07, 20..23, "loop", 24..28),
            instr(0x01, 29..33),
        ]
    );
    assert_eq!(program.symbols.labels, indexmap! { "loop" => 0 });
    assert!(program.symbols.variables.is_empty());
}

#[test]
fn eat_program_declaration() {
    let asm = "VAR x 10 LOAD x ADD 1 STORE x HALT";
    let program = program(&isa(), asm).unwrap();
    assert_eq!(program.instrs.len(), 4);
    assert_eq!(
        program.symbols.variables,
        indexmap! { "x" => Variable { value: 10, ordinal: 1 } }
    );
    assert!(program.symbols.labels.is_empty());
}

#[test]
fn eat_program_basic() {
    let asm = r#"
; Doubles `x` until it is no longer less than `limit`.

        VAR x 1
        VAR limit -100
again:  LOAD x
        ADD 0       ; comment after an instruction
        STORE x
        JNE done
        JNE again
done:   HALT
"#;
    let program = program(&isa(), asm).unwrap();
    assert_eq!(
        program.symbols,
        Symbols {
            labels: indexmap! { "again" => 0, "done" => 5 },
            variables: indexmap! {
                "x" => Variable { value: 1, ordinal: 1 },
                "limit" => Variable { value: -100, ordinal: 2 },
            },
        }
    );
    let operands: Vec<_> = program
        .instrs
        .iter()
        .map(|i| i.operand.map(|o| o.text))
        .collect();
    assert_eq!(
        operands,
        [Some("x"), Some("0"), Some("x"), Some("done"), Some("again"), None]
    );
}

#[test]
fn eat_program_forward_and_backward_labels() {
    let asm = "start: JNE end LOADI 1 JNE start end: HALT";
    let program = program(&isa(), asm).unwrap();
    assert_eq!(program.symbols.labels, indexmap! { "start" => 0, "end" => 3 });
}

#[test]
fn eat_program_label_before_declaration() {
    let asm = "LOADI 1 here: VAR x 2 HALT";
    let program = program(&isa(), asm).unwrap();
    assert_eq!(program.symbols.labels, indexmap! { "here" => 1 });
    assert_eq!(program.symbols.label("here"), Some(1));
    assert_eq!(program.symbols.labels_at(1).collect::<Vec<_>>(), ["here"]);
}

#[test]
fn eat_program_operands_are_raw() {
    let asm = "LOAD HALT LOADI nowhere";
    let program = program(&isa(), asm).unwrap();
    assert_eq!(
        program.instrs,
        [
            with_operand(0x02, 0..4, "HALT", 5..9),
            with_operand(0x03, 10..15, "nowhere", 16..23),
        ]
    );
}

#[test]
fn eat_program_empty() {
    assert_eq!(program(&isa(), "").unwrap(), Program::default());
    assert_eq!(program(&isa(), "; nothing here\n").unwrap(), Program::default());
}

#[test]
fn eat_program_errors() {
    let tests = [
        ("LOADI", 0..5, ErrorKind::MissingOperand("LOADI".into())),
        ("HALT nope", 5..9, ErrorKind::UnknownToken("nope".into())),
        ("halt", 0..4, ErrorKind::UnknownToken("halt".into())),
        ("a: b: HALT", 3..5, ErrorKind::UnknownToken("b:".into())),
        (
            "end:",
            4..4,
            ErrorKind::UnexpectedEof("an instruction or declaration after the label"),
        ),
        ("1x: HALT", 0..2, ErrorKind::InvalidIdentifier("1x".into())),
        (": HALT", 0..0, ErrorKind::InvalidIdentifier("".into())),
        ("HALT: HALT", 0..4, ErrorKind::ReservedWord("HALT".into())),
        ("a: HALT a: HALT", 8..9, ErrorKind::DuplicateLabel("a".into())),
        ("VAR", 3..3, ErrorKind::UnexpectedEof("a variable name")),
        ("VAR x", 5..5, ErrorKind::UnexpectedEof("an initial value")),
        ("VAR VAR 1", 4..7, ErrorKind::ReservedWord("VAR".into())),
        ("VAR LOAD 1", 4..8, ErrorKind::ReservedWord("LOAD".into())),
        ("VAR 9x 1", 4..6, ErrorKind::InvalidIdentifier("9x".into())),
        ("VAR x one", 6..9, ErrorKind::InvalidInteger("one".into())),
        ("VAR x 4294967296", 6..16, ErrorKind::InvalidInteger("4294967296".into())),
        ("VAR x 1 VAR x 2", 12..13, ErrorKind::DuplicateVariable("x".into())),
    ];
    for (asm, span, kind) in tests {
        assert_eq!(program(&isa(), asm).unwrap_err(), Error::new(kind, span), "{}", asm);
    }
}
