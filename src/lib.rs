//! flexcoco: subsetting and sample materialization for COCO annotations.
//!
//! flexcoco narrows a COCO annotation file down to chosen image files and
//! categories while keeping its cross-references consistent, and turns the
//! result into per-image semantic segmentation samples (an image plus one
//! mask per category).
//!
//! # Modules
//!
//! - [`coco`]: COCO document types, JSON I/O and record filters
//! - [`filter`]: Two-stage dataset filtering by file and category name
//! - [`dataset`]: Indexed datasets and the semantic segmentation sampler
//! - [`mask`]: Polygon and RLE decoding into boolean rasters
//! - [`error`]: Error types for flexcoco operations

pub mod coco;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod mask;
pub mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use dataset::{CocoDataset, SampleDataset, SemanticSegmentationDataset};
use filter::FilterOptions;
use report::{CategoriesReport, MaskReport};

pub use error::FlexCocoError;

/// The flexcoco CLI application.
#[derive(Parser)]
#[command(name = "flexcoco")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Write a filtered copy of an annotation file.
    Filter(FilterArgs),
    /// List the categories of an annotation file with annotation counts.
    Categories(CategoriesArgs),
    /// Materialize one semantic segmentation sample and summarize its masks.
    Masks(MasksArgs),
}

/// Filter criteria shared by all subcommands. Each flag may be repeated.
#[derive(clap::Args, Debug, Default)]
struct FilterFlags {
    /// Keep only images with this file name.
    #[arg(long = "include-file", value_name = "FILE_NAME")]
    include_files: Option<Vec<String>>,

    /// Drop images with this file name.
    #[arg(long = "exclude-file", value_name = "FILE_NAME")]
    exclude_files: Option<Vec<String>>,

    /// Keep only categories with this name.
    #[arg(long = "include-category", value_name = "NAME")]
    include_categories: Option<Vec<String>>,

    /// Drop categories with this name.
    #[arg(long = "exclude-category", value_name = "NAME")]
    exclude_categories: Option<Vec<String>>,
}

impl From<FilterFlags> for FilterOptions {
    fn from(flags: FilterFlags) -> Self {
        FilterOptions {
            include_files: flags.include_files,
            exclude_files: flags.exclude_files,
            include_categories: flags.include_categories,
            exclude_categories: flags.exclude_categories,
        }
    }
}

/// Arguments for the filter subcommand.
#[derive(clap::Args)]
struct FilterArgs {
    /// COCO annotation file to filter.
    input: PathBuf,

    /// Where to write the filtered file (default: `<input>_filtered.json`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    filters: FilterFlags,
}

/// Arguments for the categories subcommand.
#[derive(clap::Args)]
struct CategoriesArgs {
    /// COCO annotation file.
    input: PathBuf,

    #[command(flatten)]
    filters: FilterFlags,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the masks subcommand.
#[derive(clap::Args)]
struct MasksArgs {
    /// COCO annotation file.
    input: PathBuf,

    /// Directory the images' file names are relative to.
    #[arg(long, env = "FLEXCOCO_IMAGE_DIR")]
    image_dir: PathBuf,

    /// Sample index (position in the image list).
    #[arg(long, default_value_t = 0)]
    index: usize,

    #[command(flatten)]
    filters: FilterFlags,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the flexcoco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FlexCocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Filter(args)) => run_filter(args),
        Some(Commands::Categories(args)) => run_categories(args),
        Some(Commands::Masks(args)) => run_masks(args),
        None => {
            println!("flexcoco {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Subset COCO annotations and build segmentation samples.");
            println!();
            println!("Run 'flexcoco --help' for usage information.");
            Ok(())
        }
    }
}

fn run_filter(args: FilterArgs) -> Result<(), FlexCocoError> {
    let opts = FilterOptions::from(args.filters);
    if opts.is_empty() {
        println!("No filter criteria given; {} left as is", args.input.display());
        return Ok(());
    }

    let written =
        filter::create_filtered_annotation_file(&args.input, args.output.as_deref(), &opts)?;
    println!("{}", written.display());
    Ok(())
}

fn run_categories(args: CategoriesArgs) -> Result<(), FlexCocoError> {
    let dataset = load_dataset(&args.input, PathBuf::new(), args.filters.into())?;
    print_report(&CategoriesReport::from_dataset(&dataset), args.output)
}

fn run_masks(args: MasksArgs) -> Result<(), FlexCocoError> {
    let coco = load_dataset(&args.input, args.image_dir, args.filters.into())?;
    let dataset = SemanticSegmentationDataset::new(coco);
    let (image, target) = dataset.get_sample(args.index)?;
    let report = MaskReport::new(args.index, dataset.coco(), &image, &target);
    print_report(&report, args.output)
}

/// Reads and filters in memory, leaving no filtered copy on disk.
fn load_dataset(
    input: &std::path::Path,
    image_dir: PathBuf,
    opts: FilterOptions,
) -> Result<CocoDataset, FlexCocoError> {
    let document = coco::io_coco_json::read_coco_json(input)?;
    let document = filter::filter_dataset(&document, &opts)?.unwrap_or(document);
    Ok(CocoDataset::from_document(image_dir, document))
}

fn print_report<R>(report: &R, format: ReportFormat) -> Result<(), FlexCocoError>
where
    R: Serialize + std::fmt::Display,
{
    match format {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).map_err(FlexCocoError::ReportSerialize)?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}
