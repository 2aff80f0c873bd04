//! Oisample: quota-bounded example selection from OpenImages.
//!
//! Oisample picks a small, class-balanced set of annotated images out of the
//! OpenImages box tables and writes them as JSON Lines manifests ready for
//! a labeling or training job. The pipeline has two stages:
//!
//! 1. The taxonomy resolver turns class names into the set of ontology IDs
//!    they cover, including every narrower label in the hierarchy.
//! 2. The collector streams the box table once, gathering a fixed number of
//!    images per class.
//!
//! # Modules
//!
//! - [`ir`]: Identifier and bounding box types
//! - [`taxonomy`]: Class-name resolution and subclass expansion
//! - [`collect`]: Quota-bounded example collection
//! - [`manifest`]: Manifest I/O, merging, shuffling and splitting
//! - [`error`]: Error types for oisample operations

pub mod collect;
pub mod error;
pub mod ir;
pub mod logging;
pub mod manifest;
pub mod taxonomy;

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

pub use error::OisampleError;

use crate::collect::CollectOptions;
use crate::manifest::ground_truth::{self, GroundTruthBatch};
use crate::manifest::{SplitOptions, DEFAULT_SOURCE_PREFIX, DEFAULT_TRAIN_FRACTION};

/// The oisample CLI application.
#[derive(Parser)]
#[command(name = "oisample")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve class names to ontology IDs and their subclasses.
    Resolve(ResolveArgs),
    /// Collect examples per class and write a manifest.
    Select(SelectArgs),
    /// Merge manifests, shuffle, and split into training and validation.
    Split(SplitArgs),
    /// Consolidate labeling-job output manifests under one attribute name.
    Consolidate(ConsolidateArgs),
}

/// Output format for reports and listings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Taxonomy inputs shared by `resolve` and `select`.
#[derive(clap::Args)]
struct TaxonomyArgs {
    /// Class-description CSV (`label_id,display_name`, no header).
    #[arg(long, env = "OISAMPLE_DESCRIPTIONS")]
    descriptions: PathBuf,

    /// Label hierarchy JSON.
    #[arg(long, env = "OISAMPLE_HIERARCHY")]
    hierarchy: PathBuf,

    /// Class names to look up (case-insensitive).
    #[arg(required = true)]
    classes: Vec<String>,
}

/// Arguments for the resolve subcommand.
#[derive(clap::Args)]
struct ResolveArgs {
    #[command(flatten)]
    taxonomy: TaxonomyArgs,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Arguments for the select subcommand.
#[derive(clap::Args)]
struct SelectArgs {
    #[command(flatten)]
    taxonomy: TaxonomyArgs,

    /// OpenImages box annotation CSV.
    #[arg(long, env = "OISAMPLE_ANNOTATIONS")]
    annotations: PathBuf,

    /// File of image IDs to skip, one per line.
    #[arg(long)]
    exclude: Option<PathBuf>,

    /// Images to keep per class.
    #[arg(short = 'n', long)]
    quota: usize,

    /// Which window of `quota` images to keep (0 = the first).
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// URI prefix that image IDs are appended to in `source-ref`.
    #[arg(long, default_value = DEFAULT_SOURCE_PREFIX)]
    source_prefix: String,

    /// Also write the labeling-job label category document here.
    #[arg(long)]
    label_config: Option<PathBuf>,

    /// Output manifest path.
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    report: OutputFormat,

    /// Fail if any class falls short of its quota.
    #[arg(long)]
    strict: bool,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Manifests to merge.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the training manifest.
    #[arg(long)]
    train: PathBuf,

    /// Output path for the validation manifest.
    #[arg(long)]
    validation: PathBuf,

    /// Share of records used for training.
    #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)]
    train_fraction: f64,

    /// Seed for a reproducible shuffle.
    #[arg(long)]
    seed: Option<u64>,
}

/// A labeling-job output manifest and its label attribute (`PATH:ATTRIBUTE`).
#[derive(Clone, Debug)]
struct JobOutput {
    path: PathBuf,
    attribute: String,
}

fn parse_job_output(s: &str) -> Result<JobOutput, String> {
    match s.rsplit_once(':') {
        Some((path, attribute)) if !path.is_empty() && !attribute.is_empty() => Ok(JobOutput {
            path: PathBuf::from(path),
            attribute: attribute.to_string(),
        }),
        _ => Err(format!("expected PATH:ATTRIBUTE, got '{s}'")),
    }
}

/// Arguments for the consolidate subcommand.
#[derive(clap::Args)]
struct ConsolidateArgs {
    /// Job output manifests as PATH:ATTRIBUTE.
    #[arg(required = true, value_parser = parse_job_output)]
    inputs: Vec<JobOutput>,

    /// Attribute name all jobs are renamed to.
    #[arg(long)]
    attribute: String,

    /// Output manifest path.
    #[arg(short = 'o', long)]
    output: PathBuf,
}

/// Run the oisample CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), OisampleError> {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("Warning: {err}");
    }

    match cli.command {
        Some(Commands::Resolve(args)) => run_resolve(args),
        Some(Commands::Select(args)) => run_select(args),
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Consolidate(args)) => run_consolidate(args),
        None => {
            println!("oisample {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Quota-bounded example selection from OpenImages.");
            println!();
            println!("Run 'oisample --help' for usage information.");
            Ok(())
        }
    }
}

fn load_class_ids(args: &TaxonomyArgs) -> Result<taxonomy::ClassIdSets, OisampleError> {
    let resolved = taxonomy::resolve_class_descriptions_file(&args.descriptions, &args.classes)?;
    let tree = taxonomy::read_hierarchy(&args.hierarchy)?;
    taxonomy::build_class_id_sets(&resolved, &tree)
}

#[derive(Serialize)]
struct ResolvedClass<'a> {
    class: &'a str,
    root_id: &'a str,
    ids: Vec<&'a str>,
}

fn report_json<T: Serialize>(value: &T) -> Result<String, OisampleError> {
    serde_json::to_string_pretty(value).map_err(|source| OisampleError::ReportWrite { source })
}

/// Execute the resolve subcommand.
fn run_resolve(args: ResolveArgs) -> Result<(), OisampleError> {
    let class_ids = load_class_ids(&args.taxonomy)?;

    let listing: Vec<ResolvedClass<'_>> = class_ids
        .iter()
        .map(|class| {
            let mut ids: Vec<&str> = class.ids.iter().map(|id| id.as_str()).collect();
            ids.sort_unstable();
            ResolvedClass {
                class: &class.class_name,
                root_id: class.root_id.as_str(),
                ids,
            }
        })
        .collect();

    match args.output {
        OutputFormat::Json => {
            println!("{}", report_json(&listing)?);
        }
        OutputFormat::Text => {
            for class in &listing {
                println!(
                    "{} -> {} ({} label(s)): {}",
                    class.class,
                    class.root_id,
                    class.ids.len(),
                    class.ids.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Execute the select subcommand.
fn run_select(args: SelectArgs) -> Result<(), OisampleError> {
    let opts = CollectOptions {
        quota: args.quota,
        offset: args.offset,
    };
    collect::validate_collect_options(&opts)?;

    let class_ids = load_class_ids(&args.taxonomy)?;
    let excluded = match &args.exclude {
        Some(path) => collect::read_excluded_ids(path)?,
        None => HashSet::new(),
    };
    info!(excluded = excluded.len(), "loaded exclusion list");

    let rows = collect::read_annotations(&args.annotations)?;
    let collection = collect::collect_examples(&class_ids, rows, &excluded, &opts)?;

    let records = manifest::records_from_groups(&collection.images, &args.source_prefix);
    manifest::write_manifest(&args.output, &records)?;
    info!(path = %args.output.display(), records = records.len(), "wrote manifest");

    if let Some(path) = &args.label_config {
        ground_truth::write_label_category_config(path, &class_ids.class_names())?;
    }

    let report = collection.report;
    match args.report {
        OutputFormat::Json => {
            println!("{}", report_json(&report)?);
        }
        OutputFormat::Text => print!("{report}"),
    }

    if args.strict && !report.is_complete() {
        return Err(OisampleError::QuotaUnmet { report });
    }
    Ok(())
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), OisampleError> {
    let opts = SplitOptions {
        train_fraction: args.train_fraction,
        seed: args.seed,
    };
    manifest::validate_split_options(&opts)?;

    let batches = args
        .inputs
        .iter()
        .map(|path| manifest::read_manifest(path))
        .collect::<Result<Vec<_>, _>>()?;

    let split = manifest::prepare_split(batches, &opts)?;
    manifest::write_manifest(&args.train, &split.train)?;
    manifest::write_manifest(&args.validation, &split.validation)?;

    println!(
        "Wrote {} training and {} validation record(s)",
        split.train.len(),
        split.validation.len()
    );
    Ok(())
}

/// Execute the consolidate subcommand.
fn run_consolidate(args: ConsolidateArgs) -> Result<(), OisampleError> {
    let batches = args
        .inputs
        .iter()
        .map(|job| GroundTruthBatch::read(&job.path, job.attribute.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let lines = ground_truth::consolidate_ground_truth(batches, &args.attribute)?;
    ground_truth::write_ground_truth_manifest(&args.output, &lines)?;

    println!(
        "Consolidated {} record(s) under '{}'",
        lines.len(),
        args.attribute
    );
    Ok(())
}
