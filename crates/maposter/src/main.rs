//! maposter: render a city map poster from OpenStreetMap data.
//!
//! Geocodes the city with Nominatim, fetches streets, water and parks
//! from Overpass, composes the poster and writes it as PNG, PDF or SVG.
//!
//! # Usage
//!
//! ```text
//! maposter -c Paris -C France -t noir
//! maposter -c Tokyo -C Japan -d 15000 --format pdf --paper-size A3 --print-ready
//! maposter --list-themes
//! ```
//!
//! Progress is logged at `info`; `-q` lowers the level to `warn` and
//! `RUST_LOG` overrides both.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use maposter_core::{
    DEFAULT_THEME_ID, LogObserver, Orientation, PaperSize, PaperSpec, PosterError, PosterRequest,
    ThemeStore, create_poster,
};
use maposter_export::{ExportError, FontSet};
use maposter_io::{
    DirThemeStore, IoError, NominatimGeocoder, OutputFormat, OverpassProvider, RenderConfig,
    load_fonts, output_filename, render, save_artifact,
};

/// Generate a map poster for any city.
#[derive(Debug, Parser)]
#[command(name = "maposter", version)]
struct Cli {
    /// City name.
    #[arg(short = 'c', long, required_unless_present = "list_themes")]
    city: Option<String>,

    /// Country name.
    #[arg(short = 'C', long, required_unless_present = "list_themes")]
    country: Option<String>,

    /// Theme id (a file `<id>.json` in the themes directory).
    #[arg(short = 't', long, default_value = DEFAULT_THEME_ID)]
    theme: String,

    /// Map radius in metres.
    #[arg(short = 'd', long, default_value_t = maposter_core::pipeline::DEFAULT_RADIUS_M,
          value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    distance: u32,

    /// Output directory.
    #[arg(short = 'o', long, default_value = "posters")]
    output: PathBuf,

    /// Raster resolution in dots per inch.
    #[arg(long, default_value_t = maposter_export::DEFAULT_DPI,
          value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    dpi: u32,

    /// Output format: png, pdf or svg.
    #[arg(long, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Paper size for PDF output (A3, A4, A5). Unknown sizes use A4.
    #[arg(long, default_value = "A4")]
    paper_size: String,

    /// Paper orientation (portrait, landscape, square).
    #[arg(long, default_value = "portrait")]
    orientation: String,

    /// Add bleed and crop marks to PDF output.
    #[arg(long)]
    print_ready: bool,

    /// Bleed on every edge in millimetres, with `--print-ready`.
    #[arg(long, default_value_t = maposter_core::paper::DEFAULT_BLEED_MM)]
    bleed_mm: f64,

    /// Directory of theme files.
    #[arg(long, default_value = "themes")]
    themes_dir: PathBuf,

    /// Caption font for PNG output (TrueType/OpenType). Searched for
    /// among the system fonts when omitted, then the bundled DejaVu Sans.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold caption font for PNG output.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// List the available themes and exit.
    #[arg(long)]
    list_themes: bool,

    /// Only log warnings and errors.
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("--city and --country are required")]
    MissingLocation,

    #[error(transparent)]
    Poster(#[from] PosterError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl Cli {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            format: self.format,
            dpi: self.dpi,
            paper: PaperSpec {
                size: PaperSize::from_name(&self.paper_size),
                orientation: Orientation::from_name(&self.orientation),
                bleed_mm: self.bleed_mm,
                print_ready: self.print_ready,
            },
            output_dir: self.output.clone(),
        }
    }

    fn request(&self, config: &RenderConfig) -> Result<PosterRequest, CliError> {
        let (Some(city), Some(country)) = (&self.city, &self.country) else {
            return Err(CliError::MissingLocation);
        };
        Ok(PosterRequest {
            theme_id: self.theme.clone(),
            radius_m: self.distance,
            aspect_ratio: config.aspect_ratio(),
            ..PosterRequest::new(city.as_str(), country.as_str())
        })
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn load_caption_fonts(cli: &Cli, format: OutputFormat) -> Result<FontSet, IoError> {
    if format == OutputFormat::Png {
        load_fonts(cli.font.as_deref(), cli.bold_font.as_deref())
    } else {
        Ok(FontSet::bundled())
    }
}

fn run(cli: &Cli, themes: &DirThemeStore) -> Result<PathBuf, CliError> {
    let config = cli.render_config();
    let request = cli.request(&config)?;
    let fonts = load_caption_fonts(cli, config.format)?;

    let poster = create_poster(
        &request,
        &NominatimGeocoder::default(),
        &OverpassProvider::default(),
        themes,
        &mut LogObserver,
    )?;
    let artifact = render(&poster, &config, &fonts)?;
    let filename = output_filename(
        &request.city,
        &request.theme_id,
        &config,
        chrono::Local::now().naive_local(),
    );
    Ok(save_artifact(&config.output_dir, &filename, &artifact)?)
}

fn list_themes(themes: &DirThemeStore) {
    println!("Available themes in {}:", themes.dir().display());
    for id in themes.list() {
        println!("  - {id}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let themes = DirThemeStore::new(&cli.themes_dir);
    if cli.list_themes {
        list_themes(&themes);
        return ExitCode::SUCCESS;
    }

    match run(&cli, &themes) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
