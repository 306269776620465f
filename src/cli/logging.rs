//! Module implementing logging for the application.

use std::env;
use std::io::{self, Write};

use ansi_term::{Colour, Style};
use log::SetLoggerError;
use slog::{self, Drain, FilterLevel, Level, OwnedKVList, Record};
use slog_envlogger::LogBuilder as EnvLogBuilder;

use super::NAME;


// Default logging level defined using the two enums used by slog.
// Both values must correspond to the same level. (This is checked by a test).
// The shell program only reports problems unless asked to be more verbose.
const DEFAULT_LEVEL: Level = Level::Warning;
const DEFAULT_FILTER_LEVEL: FilterLevel = FilterLevel::Warning;

// Array of filter levels, indexed by level number.
const FILTER_LEVELS: &[FilterLevel] = &[
    FilterLevel::Critical,
    FilterLevel::Error,
    FilterLevel::Warning,
    FilterLevel::Info,
    FilterLevel::Debug,
    FilterLevel::Trace,
];


/// Initialize logging with given verbosity.
/// The verbosity value has the same meaning as in args::Options::verbosity.
pub fn init(verbosity: isize) -> Result<(), SetLoggerError> {
    let stderr = TerminalDrain{tty: cfg!(unix) && isatty::stderr_isatty()};

    // Out-of-range verbosity is silently clamped to the extreme levels.
    let index = (DEFAULT_FILTER_LEVEL.as_usize() as isize + verbosity - 1)
        .max(0).min(FILTER_LEVELS.len() as isize - 1);
    let filter_level = FILTER_LEVELS[index as usize];

    let mut builder = EnvLogBuilder::new(stderr)
        .filter(None, filter_level)
        .filter(Some("reqwest"), FilterLevel::Warning);
    if let Ok(ref conf) = env::var("RUST_LOG") {
        builder = builder.parse(conf);
    }

    let logger = slog::Logger::root(builder.build().fuse(), o!());
    slog_scope::set_global_logger(logger).cancel_reset();
    slog_stdlog::init()
}


/// Drain that writes log entries to standard error, prefixed with program name.
struct TerminalDrain {
    tty: bool,
}

impl Drain for TerminalDrain {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, _values: &OwnedKVList) -> io::Result<()> {
        let level = record.level();
        let label = if self.tty {
            format!("{}", level_style(level).paint(level.as_str()))
        } else {
            level.as_str().to_owned()
        };

        // Debug & trace messages also say where they come from.
        let msg = if level > Level::Info {
            format!("{}: {} [{}#{}]: {}\n",
                *NAME, label, record.module(), record.line(), record.msg())
        } else {
            format!("{}: {}: {}\n", *NAME, label, record.msg())
        };
        io::stderr().write_all(msg.as_bytes())
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Critical => Colour::Purple.bold(),
        Level::Error => Colour::Red.normal(),
        Level::Warning => Colour::Yellow.normal(),
        Level::Info => Colour::Green.normal(),
        Level::Debug | Level::Trace => Style::new().dimmed(),
    }
}


#[cfg(test)]
mod tests {
    use super::{DEFAULT_LEVEL, DEFAULT_FILTER_LEVEL};

    #[test]
    fn default_level() {
        let level = DEFAULT_LEVEL.as_usize();
        let filter_level = DEFAULT_FILTER_LEVEL.as_usize();
        assert_eq!(level, filter_level,
            "Default logging level is defined inconsistently: Level::{:?} vs. FilterLevel::{:?}",
            DEFAULT_LEVEL, DEFAULT_FILTER_LEVEL);
    }
}
