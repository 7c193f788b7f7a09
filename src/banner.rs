//! Metadata wrapped around generated output.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The kind of output being wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Binary,
    Cpp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: Kind,
    /// Seconds since the Unix epoch.
    pub dated: u64,
    pub elapsed: Duration,
    pub instructions: usize,
    pub variables: usize,
}

impl Kind {
    fn comment(self) -> &'static str {
        match self {
            Self::Binary => "#",
            Self::Cpp => "//",
        }
    }
}

/// Formats seconds since the Unix epoch as an RFC 3339 UTC timestamp.
fn timestamp(secs: u64) -> String {
    let (days, secs) = (secs / 86_400, secs % 86_400);
    // Days to a civil date, with years starting in March so leap days fall
    // at the end of the year.
    let days = days + 719_468;
    let era = days / 146_097;
    let doe = days % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    )
}

impl Banner {
    /// A banner for output whose generation began at `started`.
    pub fn new(kind: Kind, started: Instant, instructions: usize, variables: usize) -> Self {
        let dated = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            kind,
            dated,
            elapsed: started.elapsed(),
            instructions,
            variables,
        }
    }

    /// Wraps the generated output in the header and footer.
    pub fn wrap(&self, body: &str) -> String {
        let c = self.kind.comment();
        let (what, verb, task, count) = match self.kind {
            Kind::Binary => ("Micro86 instructions", "Assembled", "assembling", "instructions"),
            Kind::Cpp => ("C++ code", "Translated", "translating", "operations"),
        };
        let lines = [
            format!("{} {}.", c, what),
            format!("{} {} using {}.", c, verb, env!("CARGO_PKG_NAME")),
            format!("{} Dated: {}.", c, timestamp(self.dated)),
            format!("{} Approx. {} time: {} ms.", c, task, self.elapsed.as_millis()),
            format!("{} Number of {}: {}.", c, count, self.instructions),
            format!("{} Number of memory units allocated: {}.", c, self.variables),
            String::new(),
            format!("{} === CODE === {}", c, c),
            String::new(),
        ];
        format!("{}\n{}\n{} === EOF === {}\n", lines.join("\n"), body, c, c)
    }
}
