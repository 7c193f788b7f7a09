//! An emulator for assembled Micro86 programs.
//!
//! Memory holds the program image followed by zeroed words, one 32-bit word
//! per address. Only the program image can be executed. The machine has an
//! accumulator, an instruction pointer and the result of the last
//! comparison. Instructions are dispatched on their role in the
//! instruction set descriptor, so any descriptor that maps the roles can be
//! run.

mod dump;

use std::io::{self, prelude::*};

use assemble::binary::Word;
use assemble::isa::{Descriptor, Role};
use thiserror::Error;

/// The number of memory words when not configured.
pub const DEFAULT_MEMORY: usize = 20;

/// Settings for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Log every executed instruction.
    pub trace: bool,
    /// Fault once this many instructions have executed.
    pub max_steps: Option<u64>,
    /// Write a disassembly and a post-mortem dump to the output once the
    /// program stops, whether it halted or faulted.
    pub dump: bool,
    /// The number of memory words, grown to fit a larger program image.
    pub memory: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace: false,
            max_steps: None,
            dump: false,
            memory: DEFAULT_MEMORY,
        }
    }
}

/// How a program finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A halt instruction was executed.
    Halted { steps: u64 },
}

/// A fault raised while loading or running a program.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid machine word on line {line}")]
    Parse { line: usize },

    #[error("unknown opcode {opcode:#06X} at address {address}")]
    UnknownOpcode { opcode: u16, address: usize },

    #[error("instruction `{mnemonic}` at address {address} has no role")]
    Unmapped { mnemonic: String, address: usize },

    #[error("address {target} is outside of memory, accessed at address {address}")]
    MemoryViolation { target: usize, address: usize },

    #[error("division by zero at address {address}")]
    DivisionByZero { address: usize },

    #[error("ran past the end of the program without halting")]
    EndOfProgram,

    #[error("no input left for the instruction at address {address}")]
    Input { address: usize },

    #[error("step limit of {0} reached")]
    StepLimit(u64),

    #[error(transparent)]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// The state of the machine after a step.
#[derive(Debug, PartialEq, Eq)]
enum State {
    Running,
    Halted,
}

#[derive(Debug)]
struct Machine<'a> {
    isa: &'a Descriptor,
    mem: Vec<u32>,
    /// The number of words in the program image.
    program: usize,
    ptr: usize,
    acc: i32,
    /// The difference computed by the last comparison.
    cmp: i64,
}

impl<'a> Machine<'a> {
    fn new(isa: &'a Descriptor, mut mem: Vec<u32>, memory: usize) -> Self {
        let program = mem.len();
        if program < memory {
            mem.resize(memory, 0);
        }
        Self {
            isa,
            mem,
            program,
            ptr: 0,
            acc: 0,
            cmp: 0,
        }
    }

    fn mem_get(&self, target: usize) -> Result<i32> {
        self.mem
            .get(target)
            .map(|&word| word as i32)
            .ok_or(Error::MemoryViolation {
                target,
                address: self.ptr,
            })
    }

    fn mem_get_mut(&mut self, target: usize) -> Result<&mut u32> {
        let address = self.ptr;
        self.mem
            .get_mut(target)
            .ok_or(Error::MemoryViolation { target, address })
    }

    /// The value an instruction operates on.
    fn value(&self, word: Word, immediate: bool) -> Result<i32> {
        if immediate {
            Ok(i32::from(word.operand as i16))
        } else {
            self.mem_get(usize::from(word.operand))
        }
    }

    fn jump_if(&mut self, word: Word, cond: bool) {
        if cond {
            self.ptr = usize::from(word.operand);
        } else {
            self.ptr += 1;
        }
    }

    fn step(&mut self, trace: bool, mut input: impl Read, mut output: impl Write) -> Result<State> {
        let address = self.ptr;
        let word = match self.mem[..self.program].get(address) {
            Some(&word) => Word::decode(word),
            None => return Err(Error::EndOfProgram),
        };
        let entry = self
            .isa
            .entry(word.opcode)
            .map_err(|_| Error::UnknownOpcode {
                opcode: word.opcode,
                address,
            })?;
        let role = entry.role.ok_or_else(|| Error::Unmapped {
            mnemonic: entry.mnemonic.clone(),
            address,
        })?;
        if trace {
            log::trace!(
                "{:04}  {}  {:<6} {:>6}  acc={}",
                address,
                word,
                entry.mnemonic,
                word.operand,
                self.acc
            );
        }

        let immediate = entry.immediate;
        match role {
            Role::Halt => return Ok(State::Halted),
            Role::Load => self.acc = self.value(word, immediate)?,
            Role::Store => {
                let acc = self.acc as u32;
                *self.mem_get_mut(usize::from(word.operand))? = acc;
            }
            Role::Add => self.acc = self.acc.wrapping_add(self.value(word, immediate)?),
            Role::Subtract => self.acc = self.acc.wrapping_sub(self.value(word, immediate)?),
            Role::Multiply => self.acc = self.acc.wrapping_mul(self.value(word, immediate)?),
            Role::Divide | Role::Modulo => {
                let divisor = self.value(word, immediate)?;
                if divisor == 0 {
                    return Err(Error::DivisionByZero { address });
                }
                self.acc = match role {
                    Role::Divide => self.acc.wrapping_div(divisor),
                    _ => self.acc.wrapping_rem(divisor),
                };
            }
            Role::Compare => {
                self.cmp = i64::from(self.acc) - i64::from(self.value(word, immediate)?);
            }
            Role::Read => {
                let mut byte = [0];
                if input.read(&mut byte)? == 0 {
                    return Err(Error::Input { address });
                }
                self.acc = i32::from(byte[0]);
            }
            Role::Write => output.write_all(&[self.acc as u8])?,
            Role::Jump => {
                self.jump_if(word, true);
                return Ok(State::Running);
            }
            jump => {
                let cond = match jump {
                    Role::JumpEqual => self.cmp == 0,
                    Role::JumpNotEqual => self.cmp != 0,
                    Role::JumpLess => self.cmp < 0,
                    Role::JumpLessEqual => self.cmp <= 0,
                    Role::JumpGreater => self.cmp > 0,
                    _ => self.cmp >= 0,
                };
                self.jump_if(word, cond);
                return Ok(State::Running);
            }
        }
        self.ptr += 1;
        Ok(State::Running)
    }
}

/// Parse the text of an assembled program into machine words.
///
/// Blank lines and `#` comment lines are ignored.
pub fn parse(text: &str) -> Result<Vec<u32>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, word)| u32::from_str_radix(word, 16).map_err(|_| Error::Parse { line }))
        .collect()
}

/// Run a program image until it halts.
pub fn execute(
    isa: &Descriptor,
    mem: Vec<u32>,
    config: &Config,
    mut input: impl Read,
    mut output: impl Write,
) -> Result<Exit> {
    let mut machine = Machine::new(isa, mem, config.memory);
    log::debug!(
        "running a program image of {} words in {} words of memory",
        machine.program,
        machine.mem.len()
    );
    let mut steps = 0;
    let result = loop {
        if let Some(max) = config.max_steps {
            if steps >= max {
                break Err(Error::StepLimit(max));
            }
        }
        let state = machine.step(config.trace, &mut input, &mut output);
        steps += 1;
        match state {
            Ok(State::Running) => {}
            Ok(State::Halted) => {
                log::debug!("halted after {} steps", steps);
                break Ok(Exit::Halted { steps });
            }
            Err(err) => break Err(err),
        }
    };
    if config.dump {
        dump::disassembly(&machine, &mut output)?;
        dump::post_mortem(&machine, &mut output)?;
    }
    output.flush()?;
    result
}

/// Run the provided assembled program.
pub fn program(
    isa: &Descriptor,
    text: &str,
    config: &Config,
    input: impl Read,
    output: impl Write,
) -> Result<Exit> {
    execute(isa, parse(text)?, config, input, output)
}
