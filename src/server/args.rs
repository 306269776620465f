//! Module for handling command line arguments.

use std::borrow::Cow;
use std::env;
use std::ffi::OsString;
use std::net::{AddrParseError, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use clap::{self, AppSettings, Arg, ArgMatches};
use conv::TryFrom;
use conv::errors::RangeError;
use memegen::{DEFAULT_FONT_DIR, UPSTREAM_URL};
use thiserror::Error;

use super::{NAME, VERSION};


/// Parse command line arguments and return `Options` object.
#[inline]
pub fn parse() -> Result<Options, ArgsError> {
    parse_from_argv(env::args_os())
}

/// Parse application options from given array of arguments
/// (*all* arguments, including binary name).
#[inline]
pub fn parse_from_argv<I, T>(argv: I) -> Result<Options, ArgsError>
    where I: IntoIterator<Item=T>, T: Clone + Into<OsString>
{
    let parser = create_parser();
    let matches = parser.get_matches_from_safe(argv)?;
    Options::try_from(matches)
}


/// Structure to hold options received from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Verbosity of the logging output.
    ///
    /// Corresponds to the number of times the -v flag has been passed.
    /// If -q has been used instead, this will be negative.
    pub verbosity: isize,

    /// Address where the server should listen on.
    pub address: SocketAddr,

    /// Directory with the font files.
    pub font_dir: PathBuf,
    /// URL of the upstream template listing.
    pub upstream_url: String,
    /// Maximum time allowed for a single upstream request.
    pub upstream_timeout: Duration,

    /// Maximum number of threads to use for blocking work (upstream calls & rendering).
    /// If omitted, tokio's default is used.
    pub render_threads: Option<usize>,
    /// Quality of JPEG images produced.
    pub jpeg_quality: Option<u8>,

    // Maximum time allowed for a single request.
    pub request_timeout: Duration,
    // Maximum time the server will wait for pending connections to terminate.
    pub shutdown_timeout: Duration,
}

#[allow(dead_code)]
impl Options {
    #[inline]
    pub fn verbose(&self) -> bool { self.verbosity > 0 }
    #[inline]
    pub fn quiet(&self) -> bool { self.verbosity < 0 }
}

impl<'a> TryFrom<ArgMatches<'a>> for Options {
    type Err = ArgsError;

    fn try_from(matches: ArgMatches<'a>) -> Result<Self, Self::Err> {
        let verbose_count = matches.occurrences_of(OPT_VERBOSE) as isize;
        let quiet_count = matches.occurrences_of(OPT_QUIET) as isize;
        let verbosity = verbose_count - quiet_count;

        let address: SocketAddr = {
            let mut addr: Cow<_> = matches.value_of(ARG_ADDR).unwrap_or("").trim().into();

            // If the address is just a port (e.g. ":4242"),
            // then we will prepend it with the default host.
            if addr.starts_with(':') && addr.chars().skip(1).all(|c| c.is_digit(10)) {
                addr = format!("{}{}", DEFAULT_HOST, addr).into();
            }

            // Alternatively, it can be just an interface address, without a port,
            // in which case we'll add the default port.
            let is_just_ipv4 = addr.contains('.') && !addr.contains(':');
            let is_just_ipv6 = addr.starts_with('[') && addr.ends_with(']');
            if is_just_ipv4 || is_just_ipv6 {
                addr = format!("{}:{}", addr, DEFAULT_PORT).into();
            }

            addr.parse()?
        };

        let font_dir = matches.value_of(OPT_FONT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| DEFAULT_FONT_DIR.clone());
        let upstream_url = matches.value_of(OPT_UPSTREAM_URL)
            .unwrap_or(UPSTREAM_URL).to_owned();
        let upstream_timeout = parse_secs(matches.value_of(OPT_UPSTREAM_TIMEOUT))
            .map_err(ArgsError::UpstreamTimeout)?;

        let render_threads = match matches.value_of(OPT_RENDER_THREADS) {
            Some(rt) => Some(parse_thread_count(rt).map_err(ArgsError::RenderThreads)?),
            None => None,
        };
        let jpeg_quality = match matches.value_of(OPT_JPEG_QUALITY) {
            Some(q) => Some(parse_quality(q).map_err(ArgsError::JpegQuality)?),
            None => None,
        };

        let request_timeout = parse_secs(matches.value_of(OPT_REQUEST_TIMEOUT))
            .map_err(ArgsError::RequestTimeout)?;
        let shutdown_timeout = parse_secs(matches.value_of(OPT_SHUTDOWN_TIMEOUT))
            .map_err(ArgsError::ShutdownTimeout)?;

        Ok(Options{
            verbosity, address,
            font_dir, upstream_url, upstream_timeout,
            render_threads, jpeg_quality,
            request_timeout, shutdown_timeout,
        })
    }
}

/// Parse a string into an image quality percentage.
fn parse_quality(s: &str) -> Result<u8, NumberError> {
    match s.parse::<u8>()? {
        0 => Err(RangeError::NegOverflow(0u64).into()),
        q if q > 100 => Err(RangeError::PosOverflow(q as u64).into()),
        q => Ok(q),
    }
}

/// Parse a string into a positive number of threads.
fn parse_thread_count(s: &str) -> Result<usize, NumberError> {
    match s.parse::<usize>()? {
        0 => Err(RangeError::NegOverflow(0u64).into()),
        n => Ok(n),
    }
}

/// Parse a (defaulted) number of seconds.
fn parse_secs(s: Option<&str>) -> Result<Duration, ParseIntError> {
    s.unwrap_or("0").parse::<u64>().map(Duration::from_secs)
}


/// Error that can occur while parsing of command line arguments.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// General when parsing the arguments.
    #[error("{0}")]
    Parse(#[from] clap::Error),
    /// Error while parsing the server address.
    #[error("invalid server address: {0}")]
    Address(#[from] AddrParseError),
    /// Error while parsing --upstream-timeout flag.
    #[error("invalid --upstream-timeout: {0}")]
    UpstreamTimeout(#[source] ParseIntError),
    /// Error while parsing --render-threads flag.
    #[error("invalid --render-threads: {0}")]
    RenderThreads(#[source] NumberError),
    /// Error while parsing --jpeg-quality flag.
    #[error("invalid --jpeg-quality: {0}")]
    JpegQuality(#[source] NumberError),
    /// Error while parsing --request-timeout flag.
    #[error("invalid --request-timeout: {0}")]
    RequestTimeout(#[source] ParseIntError),
    /// Error while parsing --shutdown-timeout flag.
    #[error("invalid --shutdown-timeout: {0}")]
    ShutdownTimeout(#[source] ParseIntError),
}

/// Error that can occur while parsing a numeric flag.
#[derive(Debug, Error)]
pub enum NumberError {
    /// Error while parsing the value as number.
    #[error("{0}")]
    Parse(#[from] ParseIntError),
    /// Error for when the value is out of range.
    #[error("{0}")]
    Range(#[from] RangeError<u64>),
}


// Parser configuration

/// Type of the argument parser object
/// (which is called an "App" in clap's silly nomenclature).
type Parser<'p> = clap::App<'p, 'p>;


lazy_static! {
    static ref ABOUT: &'static str = option_env!("CARGO_PKG_DESCRIPTION").unwrap_or("");

    static ref DEFAULT_ADDRESS: String = format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT);
    static ref DEFAULT_UPSTREAM_TIMEOUT_STR: String =
        memegen::DEFAULT_UPSTREAM_TIMEOUT.as_secs().to_string();
    static ref DEFAULT_REQUEST_TIMEOUT_STR: String =
        // Disable request timeouts in debug mode unless specifically requested.
        (if cfg!(debug_assertions) { 0 } else { DEFAULT_REQUEST_TIMEOUT }).to_string();
    static ref DEFAULT_SHUTDOWN_TIMEOUT_STR: String =
        // Disable waiting for server to shut down in debug mode by default.
        (if cfg!(debug_assertions) { 0 } else { DEFAULT_SHUTDOWN_TIMEOUT }).to_string();
}

const ARG_ADDR: &str = "address";
const OPT_FONT_DIR: &str = "font-dir";
const OPT_UPSTREAM_URL: &str = "upstream-url";
const OPT_UPSTREAM_TIMEOUT: &str = "upstream-timeout";
const OPT_RENDER_THREADS: &str = "render-threads";
const OPT_JPEG_QUALITY: &str = "jpeg-quality";
const OPT_REQUEST_TIMEOUT: &str = "request-timeout";
const OPT_SHUTDOWN_TIMEOUT: &str = "shutdown-timeout";
const OPT_VERBOSE: &str = "verbose";
const OPT_QUIET: &str = "quiet";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 1337;
const DEFAULT_REQUEST_TIMEOUT: u32 = 10;
const DEFAULT_SHUTDOWN_TIMEOUT: u32 = 30;


/// Create the parser for application's command line.
fn create_parser<'p>() -> Parser<'p> {
    let mut parser = Parser::new(*NAME);
    if let Some(version) = *VERSION {
        parser = parser.version(version);
    }
    parser
        .about(*ABOUT)
        .author(crate_authors!(", "))

        .setting(AppSettings::StrictUtf8)

        .setting(AppSettings::UnifiedHelpMessage)
        .setting(AppSettings::DontCollapseArgsInUsage)
        .setting(AppSettings::DeriveDisplayOrder)
        .setting(AppSettings::ColorNever)

        .arg(Arg::with_name(ARG_ADDR)
            .value_name("ADDRESS:PORT")
            .required(false)
            .default_value(DEFAULT_ADDRESS.as_str())
            .help("Binds the server to given address")
            .long_help(concat!(
                "The address and/or port for the server to listen on.\n\n",
                "This argument can be an IP address of a network interface, ",
                "optionally followed by colon and a port number. ",
                "Alternatively, a colon and port alone is also allowed, ",
                "in which case the server will listen on all network interfaces.")))

        // Resource options.
        .arg(Arg::with_name(OPT_FONT_DIR)
            .long("font-dir")
            .value_name("DIR")
            .required(false)
            .help("Directory with the caption fonts (*.ttf)")
            .long_help(concat!(
                "Directory to load the caption fonts from.\n\n",
                "Font files are named after the font family, e.g. impact.ttf or arial.ttf. ",
                "If omitted, data/fonts under the current directory is used.")))
        .arg(Arg::with_name(OPT_UPSTREAM_URL)
            .long("upstream-url")
            .value_name("URL")
            .required(false)
            .help("URL of the meme template listing"))
        .arg(Arg::with_name(OPT_UPSTREAM_TIMEOUT)
            .long("upstream-timeout")
            .value_name("SECS")
            .required(false)
            .default_value(DEFAULT_UPSTREAM_TIMEOUT_STR.as_str())
            .help("Maximum time allowed for a single upstream request (secs)"))

        // Rendering options.
        .arg(Arg::with_name(OPT_RENDER_THREADS)
            .long("render-threads")
            .value_name("N")
            .required(false)
            .help("Maximum number of render threads to use")
            .long_help(concat!(
                "Maximum number of threads used for rendering & upstream requests.\n\n",
                "If omitted, the default of the async runtime is used.")))
        .arg(Arg::with_name(OPT_JPEG_QUALITY)
            .long("jpeg-quality")
            .value_name("PERCENT")
            .required(false)
            .help("Quality of JPEG images rendered"))

        // Timeout flags.
        .arg(Arg::with_name(OPT_REQUEST_TIMEOUT)
            .long("request-timeout")
            .value_name("SECS")
            .required(false)
            .default_value(DEFAULT_REQUEST_TIMEOUT_STR.as_str())
            .help("Maximum time allowed for a single request (secs)"))
        .arg(Arg::with_name(OPT_SHUTDOWN_TIMEOUT)
            .long("shutdown-timeout")
            .value_name("SECS")
            .required(false)
            .default_value(DEFAULT_SHUTDOWN_TIMEOUT_STR.as_str())
            .help("Time to wait for remaining connections during shutdown (secs)"))

        // Verbosity flags.
        .arg(Arg::with_name(OPT_VERBOSE)
            .long("verbose").short("v")
            .multiple(true)
            .conflicts_with(OPT_QUIET)
            .help("Increase logging verbosity"))
        .arg(Arg::with_name(OPT_QUIET)
            .long("quiet").short("q")
            .multiple(true)
            .conflicts_with(OPT_VERBOSE)
            .help("Decrease logging verbosity"))

        .help_short("H")
        .version_short("V")
}


#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;
    use spectral::prelude::*;
    use crate::NAME;
    use super::parse_from_argv;

    #[test]
    fn no_args() {
        assert_that!(parse_from_argv(Vec::<&str>::new())).is_ok();
        assert_that!(parse_from_argv(vec![*NAME])).is_ok();
    }

    #[test]
    fn verbosity_args() {
        assert_that!(parse_from_argv(vec![*NAME, "-v"])).is_ok();
        assert_that!(parse_from_argv(vec![*NAME, "-v", "-v"])).is_ok();
        assert_that!(parse_from_argv(vec![*NAME, "-vv"]).unwrap().verbosity).is_equal_to(2);
        assert_that!(parse_from_argv(vec![*NAME, "-q"])).is_ok();
        // -v & -q are contradictory
        assert_that!(parse_from_argv(vec![*NAME, "-q", "-v"])).is_err();
    }

    #[test]
    fn address_arg() {
        assert_that!(parse_from_argv(vec![*NAME, ":"])).is_err();
        // IP addresses alone are fine.
        assert_that!(parse_from_argv(vec![*NAME, "127.0.0.1"])).is_ok();
        assert_that!(parse_from_argv(vec![*NAME, "[0::1]"])).is_ok();
        // Port alone is fine, with colon.
        assert_that!(parse_from_argv(vec![*NAME, ":1234"])).is_ok();
        assert_that!(parse_from_argv(vec![*NAME, ":31337"])).is_ok();
        // Both are fine.
        assert_that!(parse_from_argv(vec![*NAME, "127.0.0.1:2345"])).is_ok();
        assert_that!(parse_from_argv(vec![*NAME, "[::1]:2345"])).is_ok();
        // Invalid address.
        assert_that!(parse_from_argv(vec![*NAME, "0.0.1"])).is_err();
        assert_that!(parse_from_argv(vec![*NAME, "[::1"])).is_err();
        assert_that!(parse_from_argv(vec![*NAME, "127.0.0.1:"])).is_err();
        // Invalid port.
        assert_that!(parse_from_argv(vec![*NAME, "4242"])).is_err();  // need colon
        assert_that!(parse_from_argv(vec![*NAME, ":123456789"])).is_err();  // >65536
    }

    #[test]
    fn default_address() {
        let opts = parse_from_argv(vec![*NAME]).unwrap();
        assert_that!(opts.address.port()).is_equal_to(1337);
    }

    #[test]
    fn font_dir_arg() {
        assert_that!(parse_from_argv(vec![*NAME, "--font-dir"])).is_err();
        let opts = parse_from_argv(vec![*NAME, "--font-dir", "/srv/fonts"]).unwrap();
        assert_that!(opts.font_dir.as_path()).is_equal_to(Path::new("/srv/fonts"));
    }

    #[test]
    fn upstream_args() {
        let opts = parse_from_argv(vec![
            *NAME, "--upstream-url", "http://localhost:9000/memes",
            "--upstream-timeout", "3"]).unwrap();
        assert_that!(opts.upstream_url.as_str()).is_equal_to("http://localhost:9000/memes");
        assert_that!(opts.upstream_timeout).is_equal_to(Duration::from_secs(3));
        assert_that!(parse_from_argv(vec![*NAME, "--upstream-timeout", "soon"])).is_err();
    }

    #[test]
    fn render_threads_arg() {
        // Needs a value.
        assert_that!(parse_from_argv(vec![*NAME, "--render-threads"])).is_err();
        // Value must be a number.
        assert_that!(parse_from_argv(vec![*NAME, "--render-threads", "foo"])).is_err();
        // A positive number.
        assert_that!(parse_from_argv(vec![*NAME, "--render-threads", "-42"])).is_err();
        assert_that!(parse_from_argv(vec![*NAME, "--render-threads", "0"])).is_err();
        // This is fine.
        assert_that!(parse_from_argv(vec![*NAME, "--render-threads", "16"])).is_ok();
    }

    #[test]
    fn jpeg_quality_arg() {
        // Needs a value.
        assert_that!(parse_from_argv(vec![*NAME, "--jpeg-quality"])).is_err();
        // Value must be a number.
        assert_that!(parse_from_argv(vec![*NAME, "--jpeg-quality", "foo"])).is_err();
        // A positive number.
        assert_that!(parse_from_argv(vec![*NAME, "--jpeg-quality", "-42"])).is_err();
        // Within range.
        assert_that!(parse_from_argv(vec![*NAME, "--jpeg-quality", "169"])).is_err();
        // This is fine.
        assert_that!(parse_from_argv(vec![*NAME, "--jpeg-quality", "65"])).is_ok();
    }

    #[test]
    fn timeout_args() {
        assert_that!(parse_from_argv(vec![*NAME, "--request-timeout", "x"])).is_err();
        assert_that!(parse_from_argv(vec![*NAME, "--shutdown-timeout", "-1"])).is_err();
        let opts = parse_from_argv(vec![
            *NAME, "--request-timeout", "5", "--shutdown-timeout", "7"]).unwrap();
        assert_that!(opts.request_timeout).is_equal_to(Duration::from_secs(5));
        assert_that!(opts.shutdown_timeout).is_equal_to(Duration::from_secs(7));
    }
}
