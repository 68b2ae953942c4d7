use clap::{Parser, ValueEnum};
use dicom_catalog::{
    Catalog, LoadOptions, SortBy, normalizer,
    report::{CatalogSummary, TextReport},
    try_load_catalog,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

/// Organize a directory of DICOM files into studies and series
#[derive(Parser, Debug)]
#[command(name = "dicom-catalog")]
#[command(about = "Organize a directory of DICOM files into studies, series and volumes")]
#[command(version)]
struct Cli {
    /// Directory to scan recursively
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Order of slices within a series
    #[arg(short, long, default_value = "none")]
    sort_by: SortByArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Save the middle slice of the first series as a PNG
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Decode slices on a single thread
    #[arg(long)]
    sequential: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format, without pixel data
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
enum SortByArg {
    /// Keep the order files were found in
    None,
    InstanceNumber,
    SliceLocation,
    ImagePositionPatient,
}

impl From<SortByArg> for SortBy {
    fn from(arg: SortByArg) -> Self {
        match arg {
            SortByArg::None => SortBy::None,
            SortByArg::InstanceNumber => SortBy::InstanceNumber,
            SortByArg::SliceLocation => SortBy::SliceLocation,
            SortByArg::ImagePositionPatient => SortBy::ImagePositionPatient,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let options = LoadOptions::default()
        .with_sort_by(cli.sort_by.into())
        .with_parallel_decode(!cli.sequential);
    info!("Loading DICOM from {}", cli.directory.display());

    let catalog = match try_load_catalog(&cli.directory, &options) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if catalog.is_empty() {
        error!("No DICOM studies found in directory");
    }

    match cli.format {
        OutputFormat::Text => print!("{}", TextReport::new(&catalog)),
        OutputFormat::Json => match serde_json::to_string_pretty(&CatalogSummary::new(&catalog)) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: could not serialize catalog: {e}");
                process::exit(1);
            }
        },
    }

    if let Some(path) = cli.preview {
        if let Err(e) = save_preview(&catalog, &path) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
        info!("Preview saved to {}", path.display());
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn save_preview(catalog: &Catalog, path: &Path) -> Result<(), String> {
    let series = catalog
        .studies()
        .values()
        .flat_map(|study| study.series().values())
        .next()
        .ok_or("no series to preview")?;
    let slice = series
        .volume()
        .slice(series.slice_count() / 2)
        .ok_or("series has no slices")?;
    let image = normalizer::to_luma8(&slice).ok_or("could not build preview image")?;
    image
        .save(path)
        .map_err(|e| format!("could not save preview to {}: {e}", path.display()))
}
