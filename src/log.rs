pub use log::info;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use peter::Stylize;

static LOGGER: Logger = Logger;

struct Logger;

impl Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !atty::is(atty::Stream::Stderr) {
            eprintln!("{}: {}", record.level().as_str().to_lowercase(), record.args());
            return;
        }
        let header = match record.level() {
            Level::Trace => "trace".bold().to_string(),
            Level::Debug => "debug".bold().blue().to_string(),
            Level::Info => "info".bold().green().to_string(),
            Level::Warn => "warn".bold().yellow().to_string(),
            Level::Error => "error".bold().red().to_string(),
        };
        eprintln!("{}{} {}", header, ":".bold(), record.args());
    }

    fn flush(&self) {}
}

/// The log level for the number of `--verbose` flags.
pub fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
