//! Module implementing logging for the application.

use std::borrow::Cow;
use std::collections::HashMap;
use std::env;
use std::io::{self, Write};

use ansi_term::{Colour, Style};
use log::SetLoggerError;
use slog::{self, Drain, FilterLevel, Level, OwnedKVList, Record};
use slog_envlogger::LogBuilder as EnvLogBuilder;


// Default logging level defined using the two enums used by slog.
// Both values must correspond to the same level. (This is checked by a test).
const DEFAULT_LEVEL: Level = Level::Info;
const DEFAULT_FILTER_LEVEL: FilterLevel = FilterLevel::Info;

// Arrays of log levels, indexed by level number.
const LEVELS: &[Level] = &[
    Level::Critical,
    Level::Error,
    Level::Warning,
    Level::Info,
    Level::Debug,
    Level::Trace,
];
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
    let istty = cfg!(unix) && isatty::stderr_isatty();
    let stderr = TerminalDrain{tty: istty};

    // Determine the log filtering level based on verbosity.
    // If the argument is excessive, log that but clamp to the highest/lowest log level.
    let mut verbosity = verbosity;
    let mut excessive = false;
    let level = verbosity + DEFAULT_LEVEL.as_usize() as isize;
    if level > Level::Trace.as_usize() as isize {
        excessive = true;
        verbosity = (Level::Trace.as_usize() - DEFAULT_LEVEL.as_usize()) as isize;
    } else if level < Level::Critical.as_usize() as isize {
        excessive = true;
        verbosity = -((DEFAULT_LEVEL.as_usize() - Level::Critical.as_usize()) as isize);
    }
    let filter_level = FILTER_LEVELS[
        (DEFAULT_FILTER_LEVEL.as_usize() as isize + verbosity - 1) as usize];

    // Include universal logger options, like the level.
    let mut builder = EnvLogBuilder::new(stderr);
    builder = builder.filter(None, filter_level);

    // Make some of the libraries less chatty.
    builder = builder.filter(Some("hyper"), FilterLevel::Info);
    builder = builder.filter(Some("reqwest"), FilterLevel::Info);

    // Include any additional config from environmental variables.
    // This will override the options above if necessary,
    // so e.g. it is still possible to get full debug output from hyper.
    if let Ok(ref conf) = env::var("RUST_LOG") {
        builder = builder.parse(conf);
    }

    // Initialize the logger, possibly logging the excessive verbosity option.
    let env_logger_drain = builder.build();
    let logger = slog::Logger::root(env_logger_drain.fuse(), o!());
    slog_scope::set_global_logger(logger).cancel_reset();
    slog_stdlog::init()?;

    if excessive {
        warn!("-v/-q flag passed too many times, logging level {:?} assumed",
            LEVELS[(DEFAULT_LEVEL.as_usize() as isize + verbosity - 1) as usize]);
    }
    Ok(())
}


// Log formatting

/// Drain that writes formatted log entries to standard error.
struct TerminalDrain {
    tty: bool,
}

impl Drain for TerminalDrain {
    type Ok = ();
    type Err = io::Error;

    /// Format a single log Record and write it to standard error.
    fn log(&self, record: &Record, _values: &OwnedKVList) -> io::Result<()> {
        // Format the higher level (more fine-grained) messages with greater detail,
        // as they are only visible when user explicitly enables verbose logging.
        let msg = if record.level() > DEFAULT_LEVEL {
            let logtime = format_log_time();
            let level: String = {
                let first_char = record.level().as_str().chars().next().unwrap_or('?');
                first_char.to_uppercase().collect()
            };
            let module = {
                let module = record.module();
                match module.find("::") {
                    Some(idx) => Cow::Borrowed(&module[idx + 2..]),
                    None => "main".into(),
                }
            };
            // Dim the prefix (everything that's not a message) if we're outputting to a TTY.
            let prefix_style = if self.tty { *TTY_FINE_PREFIX_STYLE } else { Style::default() };
            let prefix = format!("{}{} {}#{}]", level, logtime, module, record.line());
            format!("{} {}\n", prefix_style.paint(prefix), record.msg())
        } else {
            // Colorize the level label if we're outputting to a TTY.
            let level: Cow<str> = if self.tty {
                let style = TTY_LEVEL_STYLES.get(&record.level())
                    .cloned()
                    .unwrap_or_else(Style::default);
                format!("{}", style.paint(record.level().as_str())).into()
            } else {
                record.level().as_str().into()
            };
            format!("{}: {}\n", level, record.msg())
        };

        io::stderr().write_all(msg.as_bytes())
    }
}

/// Format the timestamp part of a detailed log entry.
fn format_log_time() -> String {
    let utc_now = time::now().to_utc();
    let mut logtime = format!("{}", utc_now.rfc3339());  // E.g.: 2012-02-22T14:53:18Z

    // Insert millisecond count before the Z.
    let millis = utc_now.tm_nsec / NANOS_IN_MILLISEC;
    logtime.pop();
    format!("{}.{:03}Z", logtime, millis)
}

const NANOS_IN_MILLISEC: i32 = 1000000;

lazy_static! {
    /// Map of log levels to their ANSI terminal styles.
    static ref TTY_LEVEL_STYLES: HashMap<Level, Style> = hashmap!{
        Level::Info => Colour::Green.normal(),
        Level::Warning => Colour::Yellow.normal(),
        Level::Error => Colour::Red.normal(),
        Level::Critical => Colour::Purple.normal(),
    };

    /// ANSI terminal style for the prefix (timestamp etc.) of a fine log message.
    static ref TTY_FINE_PREFIX_STYLE: Style = Style::new().dimmed();
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
