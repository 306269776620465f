//!
//! memegend  -- Meme server
//!

// clap 2.x `crate_authors!` expansion trips this deny-by-default lint on newer rustc.
#![allow(dangerous_implicit_autorefs)]

             extern crate ansi_term;
#[macro_use] extern crate clap;
             extern crate conv;
             extern crate exitcode;
             extern crate hyper;
             extern crate isatty;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate maplit;
             extern crate memegen;
             extern crate serde;
#[macro_use] extern crate serde_json;
             extern crate serde_qs;
             extern crate slog_envlogger;
             extern crate slog_scope;
             extern crate slog_stdlog;
             extern crate time;
             extern crate tokio;

// `slog` must precede `log` in declarations here, because we want to simultaneously:
// * use the standard `log` macros
// * be able to initialize the slog logger using slog macros like o!()
#[macro_use] extern crate slog;
#[macro_use] extern crate log;

#[cfg(test)] #[macro_use] extern crate spectral;


mod args;
mod handlers;
mod logging;
mod service;


use std::error::Error;
use std::io::{self, Write};
use std::process::exit;
use std::sync::Arc;

use memegen::{Compositor, HttpUpstream};
use tokio::runtime;

use crate::args::{ArgsError, Options};
use crate::handlers::Backend;


lazy_static! {
    /// Application / package name, as filled out by Cargo.
    static ref NAME: &'static str = option_env!("CARGO_PKG_NAME").unwrap_or("memegend");

    /// Application version, as filled out by Cargo.
    static ref VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

    /// Application revision, such as Git SHA.
    /// This is generated by a build script and written to an output file.
    static ref REVISION: Option<&'static str> = Some(
        include_str!(concat!(env!("OUT_DIR"), "/", "revision"))
    ).map(str::trim).filter(|r| !r.is_empty());
}


fn main() {
    let opts = args::parse().unwrap_or_else(|e| {
        let _ = print_args_error(e);
        exit(exitcode::USAGE);
    });

    if let Err(e) = logging::init(opts.verbosity) {
        let _ = writeln!(&mut io::stderr(), "Failed to initialize logging: {}", e);
        exit(exitcode::SOFTWARE);
    }
    log_signature();
    debug!("{:?}", opts);

    if let Err(e) = start_server(opts) {
        error!("Server failed: {}", e);
        exit(exitcode::UNAVAILABLE);
    }
}

/// Print an error that may occur while parsing arguments.
fn print_args_error(e: ArgsError) -> io::Result<()> {
    match e {
        ArgsError::Parse(ref e) =>
            // In case of generic parse error,
            // message provided by the clap library will be the usage string.
            writeln!(&mut io::stderr(), "{}", e.message),
        e => {
            let mut msg = "Failed to parse arguments".to_owned();
            if let Some(cause) = e.source() {
                msg += &format!(": {}", cause);
            }
            writeln!(&mut io::stderr(), "{}", msg)
        },
    }
}

/// Log the program name, version, and other metadata.
#[inline]
fn log_signature() {
    if log_enabled!(log::Level::Info) {
        let version = VERSION.map(|v| format!("v{}", v))
            .unwrap_or_else(|| "<UNKNOWN VERSION>".into());
        let revision = REVISION.map(|r| format!(" (rev. {})", r))
            .unwrap_or_else(|| "".into());
        info!("{} {}{}", *NAME, version, revision);
    }
}


/// Start the server with given options.
/// This function only terminates when the server finishes.
fn start_server(opts: Options) -> Result<(), Box<dyn Error>> {
    // The blocking HTTP client has to be created outside of the async runtime.
    let upstream = HttpUpstream::with_url(opts.upstream_url.as_str(), opts.upstream_timeout)?;
    info!("Listing meme templates from {}", upstream.url());

    let compositor = Compositor::new(&opts.font_dir);
    if let Some(quality) = opts.jpeg_quality {
        compositor.config_mut().jpeg_quality = quality;
    }
    let fonts = compositor.fonts().available();
    if fonts.is_empty() {
        warn!("No fonts found in {}, captions cannot be rendered",
            opts.font_dir.display());
    } else {
        info!("Found {} font(s) in {}", fonts.len(), opts.font_dir.display());
    }

    let mut backend = Backend::new(upstream, compositor);
    backend.set_task_timeout(opts.request_timeout);
    let backend = Arc::new(backend);

    let mut builder = runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(count) = opts.render_threads {
        debug!("Limiting blocking threads to {}", count);
        builder.max_blocking_threads(count);
    }
    let runtime = builder.build()?;

    runtime.block_on(service::serve(opts.address, backend, opts.shutdown_timeout))?;
    info!("Server finished");
    Ok(())
}
