use m86_assemble::{Descriptor, ErrorKind};

use pretty_assertions::assert_eq;

const FOR_LOOP: &str = "\
; Doubles X four times.
VAR I 0
VAR X 0
        LOADI 24
        STORE X
        LOADI 1
        STORE I
LOOP:   LOAD I
        CMPI 5
        JGI NEXT
        LOAD X
        MULI 2
        STORE X
        LOAD I
        ADDI 1
        STORE I
        JMPI LOOP
NEXT:   HALT
";

const MAX: &str = "\
VAR MAX 0
VAR X 10
VAR Y 8

        LOAD X
        CMP Y
        JGEI X_BIG
        LOAD Y
        STORE MAX
        HALT
X_BIG:  STORE MAX
        HALT
";

fn binary(asm: &str) -> String {
    m86_assemble::to_binary(&Descriptor::micro86(), asm)
        .unwrap()
        .to_string()
}

fn cpp(asm: &str) -> String {
    m86_assemble::to_cpp(&Descriptor::micro86(), asm).unwrap()
}

#[test]
fn for_loop_binary() {
    let expected = "\
02010018
03020010
02010001
0302000F
0202000F
09010005
0F01000E
02020010
06010002
03020010
0202000F
04010001
0302000F
0A010004
01000000
00000000
00000000
";
    assert_eq!(binary(FOR_LOOP), expected);
}

#[test]
fn for_loop_cpp() {
    let expected = "\
#include <iostream>
#include <cstdlib>
using namespace std;

int main() {
int _acc = 0, _cmp;
char _byte;
cin >> noskipws;

// === Declarations ===

int I = 0;
int X = 0;

// === Operations ===

_acc = 24;
X = _acc;
_acc = 1;
I = _acc;
LOOP: _acc = I;
_cmp = _acc - 5;
if (_cmp > 0) goto NEXT;
_acc = X;
_acc *= 2;
X = _acc;
_acc = I;
_acc += 1;
I = _acc;
goto LOOP;
NEXT: exit(0);

// === HALT Bypassed ===

exit(1);
}
";
    assert_eq!(cpp(FOR_LOOP), expected);
}

#[test]
fn max_binary() {
    let expected = "\
02020009
0902000A
10010006
0202000A
03020008
01000000
03020008
01000000
00000000
0000000A
00000008
";
    assert_eq!(binary(MAX), expected);
}

#[test]
fn max_cpp() {
    let expected = "\
#include <iostream>
#include <cstdlib>
using namespace std;

int main() {
int _acc = 0, _cmp;
char _byte;
cin >> noskipws;

// === Declarations ===

int MAX = 0;
int X = 10;
int Y = 8;

// === Operations ===

_acc = X;
_cmp = _acc - Y;
if (_cmp >= 0) goto X_BIG;
_acc = Y;
MAX = _acc;
exit(0);
X_BIG: MAX = _acc;
exit(0);

// === HALT Bypassed ===

exit(1);
}
";
    assert_eq!(cpp(MAX), expected);
}

#[test]
fn output_is_deterministic() {
    assert_eq!(binary(FOR_LOOP), binary(FOR_LOOP));
    assert_eq!(cpp(MAX), cpp(MAX));
}

#[test]
fn unresolved_reference() {
    let isa = Descriptor::micro86();
    let asm = "LOAD X\nJMPI LOOP\nHALT\n";
    let err = m86_assemble::to_binary(&isa, asm).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnresolvedVariable("X".into()));
    assert_eq!(err.span().range(), 5..6);
    let err = m86_assemble::to_cpp(&isa, asm).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnresolvedVariable("X".into()));
}

#[test]
fn reserved_words() {
    let isa = Descriptor::micro86();
    for asm in ["VAR HALT 1", "LOAD: HALT", "VAR VAR 0"] {
        let err = m86_assemble::to_binary(&isa, asm).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ReservedWord(_)), "{}", asm);
    }
}

#[test]
fn custom_descriptor() {
    let isa = Descriptor::load("# tiny\nA0 = STOP @halt\nB1 = PUT @out\nC2 = SET o i @load\n").unwrap();
    let binary = m86_assemble::to_binary(&isa, "SET 72 PUT STOP").unwrap();
    assert_eq!(binary.words, [0x00C2_0048, 0x00B1_0000, 0x00A0_0000]);
    let cpp = m86_assemble::to_cpp(&isa, "SET 72 PUT STOP").unwrap();
    assert!(cpp.contains("_acc = 72;\ncout << (char) _acc;\nexit(0);\n"));
}
