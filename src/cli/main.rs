//!
//! memegensh -- Memes in the shell
//!

// clap 2.x `crate_authors!` expansion trips this deny-by-default lint on newer rustc.
#![allow(dangerous_implicit_autorefs)]

             extern crate ansi_term;
#[macro_use] extern crate clap;
             extern crate conv;
             extern crate exitcode;
             extern crate isatty;
#[macro_use] extern crate lazy_static;
             extern crate memegen;
             extern crate slog_envlogger;
             extern crate slog_scope;
             extern crate slog_stdlog;

// `slog` must precede `log` in declarations here, because we want to simultaneously:
// * use the standard `log` macros
// * be able to initialize the slog logger using slog macros like o!()
#[macro_use] extern crate slog;
#[macro_use] extern crate log;

#[cfg(test)] #[macro_use] extern crate spectral;


mod args;
mod logging;


use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use memegen::{Compositor, Editor, ExportError, ExportOutput, FetchError, HttpUpstream,
              RenderError, TemplateFetcher};
use thiserror::Error;

use crate::args::{ArgsError, Command, RenderOptions, Source};


lazy_static! {
    /// Application / package name, as filled out by Cargo.
    static ref NAME: &'static str = option_env!("CARGO_PKG_NAME").unwrap_or("memegensh");

    /// Application version, as filled out by Cargo.
    static ref VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
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
    if cfg!(debug_assertions) {
        warn!("Debug mode! The program will likely be much slower.");
    }
    for (i, arg) in env::args().enumerate() {
        debug!("argv[{}] = {:?}", i, arg);
    }
    trace!("Options parsed from argv:\n{:#?}", opts);

    // The HTTP client is blocking, so it's fine to create it up front.
    let fetcher = HttpUpstream::with_url(
            opts.upstream_url.as_str(), memegen::DEFAULT_UPSTREAM_TIMEOUT)
        .map(TemplateFetcher::with_upstream)
        .unwrap_or_else(|e| {
            error!("Cannot create the HTTP client: {}", e);
            exit(exitcode::SOFTWARE);
        });

    let result = match opts.command {
        Command::List => list(&fetcher),
        Command::Render(ro) => render(&fetcher, Compositor::new(&opts.font_dir), ro),
    };
    if let Err(e) = result {
        error!("{}", e);
        exit(e.exit_code());
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
            writeln!(&mut io::stderr(), "Failed to parse arguments: {}", e)
        },
    }
}


/// Print the listing of meme templates to standard output.
fn list(fetcher: &TemplateFetcher) -> Result<(), AppError> {
    let templates = fetcher.list_templates()?;
    debug!("Listing {} meme template(s)", templates.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for t in templates {
        writeln!(out, "{}\t{} ({}x{}, {} text boxes)",
            t.id, t.name, t.width, t.height, t.text_slot_count)
            .map_err(AppError::Write)?;
    }
    Ok(())
}

/// Render the meme and write it to the output.
fn render(fetcher: &TemplateFetcher,
          compositor: Compositor,
          opts: RenderOptions) -> Result<(), AppError> {
    let mut editor = Editor::new(compositor);
    editor.set_style(opts.style)?;

    match opts.source {
        Source::Image(path) => {
            trace!("Reading image from {}...", path.display());
            let bytes = fs::read(&path)
                .map_err(|e| AppError::Read{path: path.clone(), error: e})?;
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            editor.upload_image(&bytes).map_err(|e| match e {
                RenderError::Decode(_) => AppError::BadImage(e),
                e => AppError::Render(e),
            })?;
        }
        Source::Template(id) => {
            let template = fetcher.find_template(&id)?
                .ok_or_else(|| AppError::TemplateNotFound(id))?;
            load_template(fetcher, &mut editor, template)?;
        }
        Source::Random => {
            let template = fetcher.pick_random_template()?;
            info!("Picked random template: {}", template);
            load_template(fetcher, &mut editor, template)?;
        }
    }

    let output = editor.export(opts.format)?;
    match opts.output_path {
        Some(path) => {
            trace!("Opening --output file {}...", path.display());
            let file = fs::OpenOptions::new()
                .create(true).write(true).truncate(true)
                .open(&path)
                .map_err(|e| AppError::Create{path: path.clone(), error: e})?;
            debug!("File {} opened successfully", path.display());
            write_output(output, file)
        }
        None => {
            trace!("No --output given, using standard output");
            if isatty::stdout_isatty() {
                warn!("Standard output is a terminal.");
            }
            write_output(output, io::stdout())
        }
    }
}

fn load_template(fetcher: &TemplateFetcher,
                 editor: &mut Editor,
                 template: memegen::Template) -> Result<(), AppError> {
    let pending = editor.select_template(template.clone());
    match fetcher.load_image(&template) {
        Ok(bytes) => {
            editor.image_loaded(pending, &bytes)?;
            Ok(())
        }
        Err(e) => {
            editor.image_failed(pending, &e);
            Err(e.into())
        }
    }
}

fn write_output<W: Write>(output: ExportOutput, mut out: W) -> Result<(), AppError> {
    trace!("Writing {} bytes of {}...", output.len(), output.format());
    out.write_all(output.bytes())
        .and_then(|_| out.flush())
        .map_err(AppError::Write)
}


/// Error that can occur while running the program.
#[derive(Debug, Error)]
enum AppError {
    #[error("cannot fetch meme templates: {0}")]
    Fetch(#[from] FetchError),
    #[error("template `{0}` not found")]
    TemplateNotFound(String),
    #[error("cannot read image file {}: {error}", .path.display())]
    Read { path: PathBuf, #[source] error: io::Error },
    #[error("invalid image: {0}")]
    BadImage(#[source] RenderError),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("failed to open output file {}: {error}", .path.display())]
    Create { path: PathBuf, #[source] error: io::Error },
    #[error("failed to write the image: {0}")]
    Write(#[source] io::Error),
}

impl AppError {
    /// Exit code of the program that corresponds to this error.
    fn exit_code(&self) -> exitcode::ExitCode {
        match *self {
            AppError::Fetch(..) => exitcode::UNAVAILABLE,
            AppError::TemplateNotFound(..) => exitcode::DATAERR,
            AppError::Read{..} => exitcode::NOINPUT,
            AppError::BadImage(..) => exitcode::DATAERR,
            AppError::Render(..) | AppError::Export(..) => exitcode::SOFTWARE,
            AppError::Create{..} => exitcode::CANTCREAT,
            AppError::Write(..) => exitcode::IOERR,
        }
    }
}
