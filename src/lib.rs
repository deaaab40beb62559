//! yolo-annotator: the core of a YOLO bounding-box labeling tool.
//!
//! The editor draws normalized corner-form boxes; training tools want YOLO
//! text. This crate converts between the two, validates label text, and
//! assembles export packages and summary statistics.
//!
//! # Modules
//!
//! - [`ir`]: Coordinate model and editor-side types (Project, Image, Annotation, etc.)
//! - [`yolo`]: YOLO label line encoding and decoding
//! - [`validation`]: Strict, all-issues validation of label text
//! - [`export`]: Batch export assembly and package writers
//! - [`stats`]: Annotation statistics
//! - [`error`]: Error types for yolo-annotator operations

pub mod error;
pub mod export;
pub mod ir;
pub mod stats;
pub mod validation;
pub mod yolo;

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::AnnotatorError;

/// The yolo-annotator CLI application.
#[derive(Parser)]
#[command(name = "yolo-annotator")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a YOLO label file and report every issue.
    Validate(ValidateArgs),
    /// Decode a YOLO label file into editor boxes.
    Decode(DecodeArgs),
    /// Show annotation statistics for a project.
    Stats(StatsArgs),
    /// Export a project as a YOLO label package.
    Export(ExportArgs),
    /// Import a YOLO label directory as a project.
    Import(ImportArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Label file to validate.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the decode subcommand.
#[derive(clap::Args)]
struct DecodeArgs {
    /// Label file to decode.
    input: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the stats subcommand.
#[derive(clap::Args)]
struct StatsArgs {
    /// Project JSON file.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Project JSON file.
    input: PathBuf,

    /// Output directory.
    #[arg(short, long)]
    out: PathBuf,

    /// Directory for label files, relative to the output directory.
    #[arg(long)]
    labels_dir: Option<String>,

    /// Write a README.txt manifest.
    #[arg(long)]
    manifest: bool,

    /// Write a data.yaml training config.
    #[arg(long)]
    data_yaml: bool,

    /// Training split path for data.yaml.
    #[arg(long, default_value = "./train")]
    train: String,

    /// Validation split path for data.yaml.
    #[arg(long, default_value = "./valid")]
    val: String,

    /// Test split path for data.yaml.
    #[arg(long, default_value = "./test")]
    test: String,
}

/// Arguments for the import subcommand.
#[derive(clap::Args)]
struct ImportArgs {
    /// YOLO dataset root, or its labels/ directory.
    input: PathBuf,

    /// Project JSON file to write.
    #[arg(short, long)]
    out: PathBuf,
}

/// Run the yolo-annotator CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), AnnotatorError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Decode(args)) => run_decode(args),
        Some(Commands::Stats(args)) => run_stats(args),
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Import(args)) => run_import(args),
        None => {
            println!("yolo-annotator {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("YOLO label conversion, validation and export.");
            println!();
            println!("Run 'yolo-annotator --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), AnnotatorError> {
    let text = fs::read_to_string(&args.input)?;
    let report = validation::validate_yolo_text(&text);

    emit(&report, &args.output)?;

    if report.is_valid() {
        Ok(())
    } else {
        Err(AnnotatorError::ValidationFailed {
            issue_count: report.issue_count(),
            line_count: report.line_count(),
            report,
        })
    }
}

/// Execute the decode subcommand.
///
/// Bad lines are reported but never fail the command.
fn run_decode(args: DecodeArgs) -> Result<(), AnnotatorError> {
    let text = fs::read_to_string(&args.input)?;
    let outcome = yolo::decode_lines(&text);

    match args.output.as_str() {
        "json" => print_json(&outcome),
        "text" => {
            for ann in &outcome.annotations {
                println!(
                    "#{} class {}: x={:.6} y={:.6} w={:.6} h={:.6}",
                    ann.id,
                    ann.category_id,
                    ann.bbox.x(),
                    ann.bbox.y(),
                    ann.bbox.width,
                    ann.bbox.height
                );
            }
            for err in &outcome.errors {
                println!("skipped {}", err);
            }
            println!(
                "{} annotation(s) decoded, {} line(s) skipped",
                outcome.annotations.len(),
                outcome.errors.len()
            );
            Ok(())
        }
        other => Err(unsupported_output(other)),
    }
}

/// Execute the stats subcommand.
fn run_stats(args: StatsArgs) -> Result<(), AnnotatorError> {
    let project = ir::io_json::read_project_json(&args.input)?;
    let report = stats::aggregate_stats(&project.all_annotations(), &project.categories);
    emit(&report, &args.output)
}

/// Execute the export subcommand.
fn run_export(args: ExportArgs) -> Result<(), AnnotatorError> {
    let project = ir::io_json::read_project_json(&args.input)?;

    let options = export::ExportOptions {
        labels_dir: args.labels_dir,
        include_manifest: args.manifest,
        config: args.data_yaml.then(|| export::DatasetConfig {
            train: args.train,
            val: args.val,
            test: args.test,
        }),
    };

    let bundle = export::assemble_export(&project.labeled_images(), &project.categories, &options)?;
    for image_id in &bundle.skipped_images {
        log::info!("image {} has no annotations; no label file written", image_id);
    }

    let mut writer = export::DirectoryWriter::new(&args.out);
    let written = bundle.write_to(&mut writer)?;

    println!(
        "Exported {} file(s) to {} ({} image(s) without annotations skipped)",
        written,
        args.out.display(),
        bundle.skipped_images.len()
    );
    Ok(())
}

/// Execute the import subcommand.
fn run_import(args: ImportArgs) -> Result<(), AnnotatorError> {
    let project = ir::io_yolo_dir::read_yolo_dir(&args.input)?;
    ir::io_json::write_project_json(&args.out, &project)?;

    println!(
        "Imported {} image(s), {} annotation(s), {} class(es) into {}",
        project.images.len(),
        project.annotation_count(),
        project.categories.len(),
        args.out.display()
    );
    Ok(())
}

/// Print a report in the requested output format.
fn emit<T: Serialize + Display>(report: &T, output: &str) -> Result<(), AnnotatorError> {
    match output {
        "json" => print_json(report),
        "text" => {
            print!("{}", report);
            Ok(())
        }
        other => Err(unsupported_output(other)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AnnotatorError> {
    let json = serde_json::to_string_pretty(value).map_err(AnnotatorError::ReportJson)?;
    println!("{}", json);
    Ok(())
}

fn unsupported_output(output: &str) -> AnnotatorError {
    AnnotatorError::UnsupportedFormat(format!("output '{}' (supported: text, json)", output))
}
