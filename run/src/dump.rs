//! Human readable views of a stopped machine.

use std::io::{self, Write};

use assemble::binary::Word;

use crate::Machine;

/// Write each word of the program image as an instruction, along with the
/// memory cell it refers to.
pub(crate) fn disassembly(machine: &Machine<'_>, mut out: impl Write) -> io::Result<()> {
    write!(out, "\n=== DISASSEMBLED CODE ===\n\n")?;
    for (address, &raw) in machine.mem[..machine.program].iter().enumerate() {
        write!(out, "0x{:08X}:\t", address)?;
        let word = Word::decode(raw);
        let entry = match machine.isa.entry(word.opcode) {
            Ok(entry) => entry,
            Err(_) => {
                writeln!(out, "0x{:08X}", raw)?;
                continue;
            }
        };
        if !entry.has_operand {
            writeln!(out, "{}", entry.mnemonic)?;
            continue;
        }
        let operand = usize::from(word.operand);
        let jump = matches!(entry.role, Some(role) if role.is_jump());
        match machine.mem.get(operand) {
            Some(value) if jump || !entry.immediate => writeln!(
                out,
                "{}\t\t0x{:08X}\t\t|0x{:08X}: 0x{:08X}|",
                entry.mnemonic, operand, operand, value
            )?,
            _ => writeln!(out, "{}\t\t0x{:08X}", entry.mnemonic, operand)?,
        }
    }
    Ok(())
}

/// Write the registers and the whole of memory.
///
/// Runs of zero words are elided, only the first and, at the end of memory,
/// the last word of a run are shown.
pub(crate) fn post_mortem(machine: &Machine<'_>, mut out: impl Write) -> io::Result<()> {
    write!(out, "\n=== POST-MORTEM DUMP ===\n")?;
    write!(out, "\nCPU:\n\n")?;
    let ir = machine.mem.get(machine.ptr).copied().unwrap_or_default();
    writeln!(
        out,
        "Registers: acc: 0x{:08X} ip: 0x{:08X} cmp: {} (ir: 0x{:08X})",
        machine.acc, machine.ptr, machine.cmp, ir
    )?;

    write!(out, "\nMEMORY:\n\n")?;
    let last = machine.mem.len().saturating_sub(1);
    let mut zeros = 0;
    for (address, &value) in machine.mem.iter().enumerate() {
        if value == 0 {
            zeros += 1;
            if zeros > 1 && address < last {
                if zeros == 2 {
                    writeln!(out, ". . . . .")?;
                }
                continue;
            }
        } else {
            zeros = 0;
        }
        writeln!(out, "0x{:08X}:\t0x{:08X}", address, value)?;
    }
    Ok(())
}
