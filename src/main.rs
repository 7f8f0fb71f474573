//! CLI entry point for the hospital rater.
//!
//! Provides subcommands for merging the hospital source files into one
//! collection, annotating the rating criteria over that collection, or both.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hospital_rater::analyzers::analyzer::{analyze, analyze_sources, merge_to};
use hospital_rater::analyzers::types::CriteriaTree;
use hospital_rater::config::{self, SourcePaths};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hospital_rater")]
#[command(about = "Merge hospital datasets and compute rating criteria distributions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// JSON manifest listing every source path (overrides the flags below)
    #[arg(long, value_name = "FILE")]
    sources: Option<PathBuf>,

    /// Hospital general information CSV
    #[arg(long)]
    general_info: Option<PathBuf>,

    /// Patient survey (HCAHPS) CSV
    #[arg(long)]
    survey: Option<PathBuf>,

    /// Readmissions and deaths CSV
    #[arg(long)]
    readmissions: Option<PathBuf>,

    /// Optional payment CSV
    #[arg(long)]
    payment: Option<PathBuf>,
}

impl SourceArgs {
    fn resolve(self) -> Result<SourcePaths> {
        if let Some(manifest) = self.sources {
            return SourcePaths::load(&manifest)
                .with_context(|| format!("loading source manifest {}", manifest.display()));
        }

        let defaults = SourcePaths::default();
        Ok(SourcePaths {
            general_information: self.general_info.unwrap_or(defaults.general_information),
            patient_survey: self.survey.unwrap_or(defaults.patient_survey),
            readmissions_and_deaths: self
                .readmissions
                .unwrap_or(defaults.readmissions_and_deaths),
            payment: self.payment,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Join the source CSVs into one JSON document per hospital
    Merge {
        #[command(flatten)]
        sources: SourceArgs,

        /// Where to write the hospital collection
        #[arg(short, long, default_value = config::DEFAULT_HOSPITAL_DATA)]
        output: PathBuf,
    },
    /// Compute the mean and standard deviation of every criteria metric
    Criteria {
        /// Hospital collection produced by `merge`
        #[arg(short, long, default_value = config::DEFAULT_HOSPITAL_DATA)]
        data: PathBuf,

        /// Criteria JSON to annotate (defaults to the built-in criteria)
        #[arg(short, long)]
        criteria: Option<PathBuf>,

        /// Where to write the annotated criteria
        #[arg(short, long, default_value = config::DEFAULT_RATING_CRITERIA)]
        output: PathBuf,
    },
    /// Merge and annotate in one pass; nothing is written unless both succeed
    Run {
        #[command(flatten)]
        sources: SourceArgs,

        /// Criteria JSON to annotate (defaults to the built-in criteria)
        #[arg(short, long)]
        criteria: Option<PathBuf>,

        /// Where to write the hospital collection
        #[arg(long, default_value = config::DEFAULT_HOSPITAL_DATA)]
        data_output: PathBuf,

        /// Where to write the annotated criteria
        #[arg(long, default_value = config::DEFAULT_RATING_CRITERIA)]
        criteria_output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = config::log_file_path();
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("hospital_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge { sources, output } => {
            let paths = sources.resolve()?;
            let hospitals = merge_to(&paths, &output)?;
            info!(hospitals, output = %output.display(), "Merge complete");
        }
        Commands::Criteria {
            data,
            criteria,
            output,
        } => {
            let tree = load_criteria(criteria.as_deref())?;
            let summary = analyze(&data, tree, &output)?;
            info!(leaves = summary.leaves, output = %output.display(), "Criteria complete");
        }
        Commands::Run {
            sources,
            criteria,
            data_output,
            criteria_output,
        } => {
            let paths = sources.resolve()?;
            let tree = load_criteria(criteria.as_deref())?;
            let summary = analyze_sources(&paths, tree, &data_output, &criteria_output)?;
            info!(leaves = summary.leaves, "Run complete");
        }
    }

    Ok(())
}

fn load_criteria(path: Option<&Path>) -> Result<CriteriaTree> {
    match path {
        Some(path) => CriteriaTree::load(path)
            .with_context(|| format!("loading criteria {}", path.display())),
        None => Ok(CriteriaTree::builtin()?),
    }
}
