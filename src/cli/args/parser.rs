//! Module defining the command line argument parser.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use conv::TryFrom;
use conv::errors::RangeError;
use clap::{self, AppSettings, Arg, ArgMatches};
use memegen::{self, Color, ExportFormat, FontFamily, StyleParameters, DEFAULT_FONT_DIR,
              UPSTREAM_URL};

use super::{NAME, VERSION};
use super::model::{ArgsError, Command, NumberError, Options, RenderOptions, Source};


impl<'a> TryFrom<ArgMatches<'a>> for Options {
    type Err = ArgsError;

    fn try_from(matches: ArgMatches<'a>) -> Result<Self, Self::Err> {
        let verbose_count = matches.occurrences_of(OPT_VERBOSE) as isize;
        let quiet_count = matches.occurrences_of(OPT_QUIET) as isize;
        let verbosity = verbose_count - quiet_count;

        let font_dir = matches.value_of(OPT_FONT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| DEFAULT_FONT_DIR.clone());
        let upstream_url = matches.value_of(OPT_UPSTREAM_URL)
            .unwrap_or(UPSTREAM_URL).to_owned();

        let command = if matches.is_present(OPT_LIST) {
            Command::List
        } else {
            Command::Render(render_options(&matches)?)
        };

        Ok(Options{verbosity, font_dir, upstream_url, command})
    }
}

fn render_options(matches: &ArgMatches) -> Result<RenderOptions, ArgsError> {
    let source = if let Some(path) = matches.value_of(OPT_IMAGE) {
        Source::Image(PathBuf::from(path))
    } else if let Some(id) = matches.value_of(OPT_TEMPLATE) {
        Source::Template(id.trim().to_owned())
    } else if matches.is_present(OPT_RANDOM) {
        Source::Random
    } else {
        return Err(ArgsError::NoSource);
    };

    let mut style = StyleParameters::default();
    if let Some(text) = matches.value_of(OPT_TOP) {
        style.top_text = text.to_owned();
    }
    if let Some(text) = matches.value_of(OPT_BOTTOM) {
        style.bottom_text = text.to_owned();
    }
    if let Some(size) = number_flag(matches, OPT_FONT_SIZE, memegen::FONT_SIZE_RANGE)? {
        style.font_size_px = size;
    }
    if let Some(font) = matches.value_of(OPT_FONT) {
        style.font_family = FontFamily::from_str(font)?;
    }
    if let Some(color) = color_flag(matches, OPT_COLOR)? {
        style.text_color = color;
    }
    if let Some(color) = color_flag(matches, OPT_STROKE_COLOR)? {
        style.stroke_color = color;
    }
    if let Some(width) = number_flag(matches, OPT_STROKE_WIDTH, memegen::STROKE_WIDTH_RANGE)? {
        style.stroke_width_px = on_step(width, memegen::STROKE_WIDTH_STEP)
            .map_err(|error| ArgsError::Number{flag: OPT_STROKE_WIDTH, error})?;
    }
    if let Some(pct) = number_flag(matches, OPT_TOP_POS, memegen::TOP_POSITION_RANGE)? {
        style.top_position_pct = pct;
    }
    if let Some(pct) = number_flag(matches, OPT_BOTTOM_POS, memegen::BOTTOM_POSITION_RANGE)? {
        style.bottom_position_pct = pct;
    }

    let format = match matches.value_of(OPT_FORMAT) {
        Some(f) => ExportFormat::from_str(f)?,
        None => ExportFormat::default(),
    };

    // Output path can be set explicit to stdout via `-`.
    let output_path = matches.value_of(OPT_OUTPUT)
        .map(|p| p.trim())
        .and_then(|p| if p == "-" { None } else { Some(p) })
        .map(PathBuf::from);

    Ok(RenderOptions{source, style, format, output_path})
}

/// Parse the value of a numeric flag, checking it against the allowed range.
fn number_flag(matches: &ArgMatches, flag: &'static str,
               range: RangeInclusive<f32>) -> Result<Option<f32>, ArgsError> {
    let value = match matches.value_of(flag) {
        Some(v) => v,
        None => return Ok(None),
    };
    parse_in_range(value, range)
        .map(Some)
        .map_err(|error| ArgsError::Number{flag, error})
}

fn parse_in_range(s: &str, range: RangeInclusive<f32>) -> Result<f32, NumberError> {
    let value = s.trim().parse::<f32>()?;
    let (min, max) = (*range.start(), *range.end());
    let error = if value < min {
        RangeError::NegOverflow(value)
    } else if value > max {
        RangeError::PosOverflow(value)
    } else if value.is_nan() {
        RangeError::NegOverflow(value)
    } else {
        return Ok(value);
    };
    Err(NumberError::Range{error, min, max})
}

/// Check that the value is a whole multiple of `step`.
fn on_step(value: f32, step: f32) -> Result<f32, NumberError> {
    let steps = value / step;
    if (steps - steps.round()).abs() > 1e-4 {
        return Err(NumberError::Step{value, step});
    }
    Ok(value)
}

fn color_flag(matches: &ArgMatches, flag: &'static str) -> Result<Option<Color>, ArgsError> {
    match matches.value_of(flag) {
        Some(v) => Color::from_str(v)
            .map(Some)
            .map_err(|error| ArgsError::Color{flag, error}),
        None => Ok(None),
    }
}


// Parser definition

/// Type of the argument parser object
/// (which is called an "App" in clap's silly nomenclature).
pub type Parser<'p> = clap::App<'p, 'p>;


lazy_static! {
    static ref ABOUT: &'static str = option_env!("CARGO_PKG_DESCRIPTION").unwrap_or("");
}

const OPT_IMAGE: &str = "image";
const OPT_TEMPLATE: &str = "template";
const OPT_RANDOM: &str = "random";
const OPT_LIST: &str = "list";
const OPT_TOP: &str = "top";
const OPT_BOTTOM: &str = "bottom";
const OPT_FONT_SIZE: &str = "font-size";
const OPT_FONT: &str = "font";
const OPT_COLOR: &str = "color";
const OPT_STROKE_COLOR: &str = "stroke-color";
const OPT_STROKE_WIDTH: &str = "stroke-width";
const OPT_TOP_POS: &str = "top-pos";
const OPT_BOTTOM_POS: &str = "bottom-pos";
const OPT_FORMAT: &str = "format";
const OPT_OUTPUT: &str = "output";
const OPT_FONT_DIR: &str = "font-dir";
const OPT_UPSTREAM_URL: &str = "upstream-url";
const OPT_VERBOSE: &str = "verbose";
const OPT_QUIET: &str = "quiet";

const SOURCE_OPTS: &[&str] = &[OPT_IMAGE, OPT_TEMPLATE, OPT_RANDOM];


/// Create the parser for application's command line.
pub fn create_parser<'p>() -> Parser<'p> {
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
        .setting(AppSettings::AllowNegativeNumbers)

        // Image source.
        .arg(Arg::with_name(OPT_IMAGE)
            .long("image").short("i")
            .value_name("PATH")
            .conflicts_with_all(&[OPT_TEMPLATE, OPT_RANDOM])
            .help("Local image file to caption"))
        .arg(Arg::with_name(OPT_TEMPLATE)
            .long("template").short("t")
            .value_name("ID")
            .conflicts_with_all(&[OPT_IMAGE, OPT_RANDOM])
            .help("ID of the meme template to caption")
            .long_help(concat!(
                "ID of the meme template to caption.\n\n",
                "Template IDs can be found in the listing printed by --list.")))
        .arg(Arg::with_name(OPT_RANDOM)
            .long("random")
            .conflicts_with_all(&[OPT_IMAGE, OPT_TEMPLATE])
            .help("Caption a randomly chosen meme template"))
        .arg(Arg::with_name(OPT_LIST)
            .long("list")
            .conflicts_with_all(SOURCE_OPTS)
            .help("Print the available meme templates and exit"))

        // Caption style.
        .arg(Arg::with_name(OPT_TOP)
            .long("top")
            .value_name("TEXT")
            .help("Text at the top of the image"))
        .arg(Arg::with_name(OPT_BOTTOM)
            .long("bottom")
            .value_name("TEXT")
            .help("Text at the bottom of the image"))
        .arg(Arg::with_name(OPT_FONT_SIZE)
            .long("font-size")
            .value_name("PX")
            .help("Size of the caption font (10-100)"))
        .arg(Arg::with_name(OPT_FONT)
            .long("font")
            .value_name("FAMILY")
            .help("Font family of the captions")
            .long_help(concat!(
                "Font family of the captions.\n\n",
                "One of: Impact, Arial, Comic Sans MS, Times New Roman. ",
                "The font file has to be present in the --font-dir.")))
        .arg(Arg::with_name(OPT_COLOR)
            .long("color")
            .value_name("COLOR")
            .help("Color of the caption text (CSS syntax)"))
        .arg(Arg::with_name(OPT_STROKE_COLOR)
            .long("stroke-color")
            .value_name("COLOR")
            .help("Color of the caption outline (CSS syntax)"))
        .arg(Arg::with_name(OPT_STROKE_WIDTH)
            .long("stroke-width")
            .value_name("PX")
            .help("Width of the caption outline (0-10)"))
        .arg(Arg::with_name(OPT_TOP_POS)
            .long("top-pos")
            .value_name("PERCENT")
            .help("Position of the top text, as % of image height (1-50)"))
        .arg(Arg::with_name(OPT_BOTTOM_POS)
            .long("bottom-pos")
            .value_name("PERCENT")
            .help("Position of the bottom text, as % of image height (50-99)"))

        // Output flags.
        .arg(Arg::with_name(OPT_FORMAT)
            .long("format").short("f")
            .value_name("FORMAT")
            .possible_values(&["png", "jpg", "jpeg"])
            .help("Format of the final image (png by default)"))
        .arg(Arg::with_name(OPT_OUTPUT)
            .long("output").short("o")
            .value_name("PATH")
            .required(false)
            .help("File to write the rendered image to")
            .long_help(concat!(
                "What file should the final image be written to.\n\n",
                "By default, or when this flag is set to `-` (single dash), the image is written ",
                "to standard output so it can be e.g. piped to the ImageMagick `display` program.")))

        // Resources.
        .arg(Arg::with_name(OPT_FONT_DIR)
            .long("font-dir")
            .value_name("DIR")
            .help("Directory with the caption fonts (*.ttf)"))
        .arg(Arg::with_name(OPT_UPSTREAM_URL)
            .long("upstream-url")
            .value_name("URL")
            .help("URL of the meme template listing"))

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
