mod banner;
mod log;

use std::ffi::OsStr;
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use assemble::{Binary, Descriptor};
use clap::{ArgAction, Parser, Subcommand};
use peter::Stylize;

use crate::banner::{Banner, Kind};

/// Assemble, translate and run Micro86 programs.
#[derive(Debug, Parser)]
#[clap(author, version, disable_help_subcommand = true)]
struct Opt {
    /// Log more, may be given multiple times.
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// An instruction set descriptor to use instead of Micro86.
    #[clap(long, global = true, env = "M86_ISA", value_name = "PATH")]
    isa: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assemble a program into machine words.
    Build {
        /// The input file.
        #[clap()]
        input: PathBuf,

        /// The output file, `-` for stdout.
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Wrap the output in a metadata header and footer.
        #[clap(long)]
        banner: bool,
    },
    /// Transliterate a program into C++.
    Translate {
        /// The input file.
        #[clap()]
        input: PathBuf,

        /// The output file, `-` for stdout.
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Wrap the output in a metadata header and footer.
        #[clap(long)]
        banner: bool,
    },
    /// Run a program on the emulator, assembling it first unless it is a
    /// `.m86b` file.
    Run {
        /// The input file.
        #[clap()]
        input: PathBuf,

        /// Log every executed instruction.
        #[clap(long)]
        trace: bool,

        /// Stop after this many instructions.
        #[clap(long, value_name = "N")]
        max_steps: Option<u64>,

        /// Print a disassembly and a post-mortem dump once the program stops.
        #[clap(long)]
        dump: bool,

        /// The number of memory words, grown to fit the program.
        #[clap(long, value_name = "N", default_value_t = run::DEFAULT_MEMORY)]
        memory: usize,
    },
}

fn eprint(header: &str, message: impl Display) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{:>12} {}", header.bold().green(), message);
    } else {
        eprintln!("{:>12} {}", header, message);
    }
}

/// The process exit code for a failure.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<run::Error>() {
        return match err {
            run::Error::Io(_) => 2,
            run::Error::Parse { .. } => 3,
            _ => 4,
        };
    }
    if err.is::<assemble::Error>() {
        3
    } else {
        2
    }
}

fn descriptor(path: Option<&Path>) -> Result<Descriptor> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read descriptor `{}`", path.display()))?;
            let isa = Descriptor::load(&text)
                .with_context(|| format!("failed to load descriptor `{}`", path.display()))?;
            Ok(isa)
        }
        None => Ok(Descriptor::micro86()),
    }
}

fn read(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("failed to read `{}`", input.display()))
}

fn write(output: &Path, contents: &str) -> Result<()> {
    if output == Path::new("-") {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(output, contents)
            .with_context(|| format!("failed to write `{}`", output.display()))?;
        eprint("Finished", output.display());
    }
    Ok(())
}

/// Unwraps the result of assembling, or shows the error and exits.
fn or_exit<T>(result: assemble::Result<T>, asm: &str, input: &Path) -> T {
    result.unwrap_or_else(|err| {
        eprintln!("{}", err.pretty(asm, input));
        eprintln!(
            "{}{} could not assemble `{}`",
            "error".bold().red(),
            ":".bold(),
            input.display()
        );
        process::exit(3);
    })
}

fn assemble_file(isa: &Descriptor, input: &Path) -> Result<Binary> {
    let asm = read(input)?;
    eprint("Assembling", input.display());
    Ok(or_exit(assemble::to_binary(isa, &asm), &asm, input))
}

fn build(isa: &Descriptor, input: PathBuf, output: Option<PathBuf>, banner: bool) -> Result<()> {
    let started = Instant::now();
    let binary = assemble_file(isa, &input)?;
    let mut text = binary.to_string();
    if banner {
        text = Banner::new(Kind::Binary, started, binary.instructions, binary.variables).wrap(&text);
    }
    let output = output.unwrap_or_else(|| input.with_extension("m86b"));
    write(&output, &text)
}

fn translate(isa: &Descriptor, input: PathBuf, output: Option<PathBuf>, banner: bool) -> Result<()> {
    let started = Instant::now();
    let asm = read(&input)?;
    eprint("Translating", input.display());
    let program = or_exit(assemble::parse(isa, &asm), &asm, &input);
    let mut cpp = or_exit(assemble::cpp::program(isa, &program), &asm, &input);
    if banner {
        let instructions = program.instrs.len();
        let variables = program.symbols.variables.len();
        cpp = Banner::new(Kind::Cpp, started, instructions, variables).wrap(&cpp);
    }
    let output = output.unwrap_or_else(|| input.with_extension("cpp"));
    write(&output, &cpp)
}

fn run(isa: &Descriptor, input: PathBuf, config: run::Config) -> Result<()> {
    let words = if input.extension() == Some(OsStr::new("m86b")) {
        run::parse(&read(&input)?)?
    } else {
        assemble_file(isa, &input)?.words
    };
    eprint("Running", input.display());
    let stdin = io::stdin();
    let stdout = io::stdout();
    let run::Exit::Halted { steps } = run::execute(isa, words, &config, stdin.lock(), stdout.lock())?;
    log::info!("halted after {} steps", steps);
    Ok(())
}

fn execute(opt: Opt) -> Result<()> {
    let isa = descriptor(opt.isa.as_deref())?;
    match opt.command {
        Command::Build {
            input,
            output,
            banner,
        } => build(&isa, input, output, banner),
        Command::Translate {
            input,
            output,
            banner,
        } => translate(&isa, input, output, banner),
        Command::Run {
            input,
            trace,
            max_steps,
            dump,
            memory,
        } => {
            let config = run::Config {
                trace,
                max_steps,
                dump,
                memory,
            };
            run(&isa, input, config)
        }
    }
}

fn main() {
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(err) => match err.kind() {
            clap::ErrorKind::DisplayHelp | clap::ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                process::exit(1);
            }
        },
    };

    let level = match opt.command {
        Command::Run { trace: true, .. } => ::log::LevelFilter::Trace,
        _ => log::level(opt.verbose),
    };
    if let Err(err) = log::init(level) {
        eprintln!("failed to install logger: {}", err);
    }

    if let Err(err) = execute(opt) {
        eprintln!("{}{} {:#}", "error".bold().red(), ":".bold(), err);
        process::exit(exit_code(&err));
    }
}
