mod collector;
mod config;
mod dedup;
mod error;
mod pipeline;
mod report;
mod rolling_hash;
mod tokenizer;
mod util;
mod window;

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use config::{Options, PipelineConfig};
use error::PipelineError;
use report::CompactListing;
use window::HashStrategy;

#[derive(Parser)]
#[command(
    name = "texthash",
    version,
    about = "Perceptual text fingerprinting for near-duplicate detection"
)]
struct Cli {
    /// Path to the text document to fingerprint
    document: PathBuf,
    /// Output path for the full report (default: hash.info)
    #[arg(long, value_name = "PATH")]
    full_report: Option<PathBuf>,
    /// Output path for the compact report (default: hash)
    #[arg(long, value_name = "PATH")]
    compact_report: Option<PathBuf>,
    /// Number of normalized characters per window (default: 50)
    #[arg(long, short)]
    kgram: Option<usize>,
    /// Keep only the minimum hash of every W consecutive windows
    #[arg(long, short, value_name = "W")]
    winnow: Option<usize>,
    /// Seed for the hash key table
    #[arg(long)]
    seed: Option<u64>,
    /// Hash windows in parallel
    #[arg(long)]
    parallel: bool,
    /// List only first occurrences in the compact report
    #[arg(long)]
    unique: bool,
    /// Options file (default: texthash_options.yaml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log pipeline progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self, options: &Options) -> PipelineConfig {
        let mut config = PipelineConfig::new(&self.document).with_options(options);
        if let Some(path) = &self.full_report {
            config.full_report_path = path.clone();
        }
        if let Some(path) = &self.compact_report {
            config.compact_report_path = path.clone();
        }
        if let Some(kgram) = self.kgram {
            config.hasher.kgram = kgram;
        }
        if self.winnow.is_some() {
            config.hasher.winnow = self.winnow;
        }
        if let Some(seed) = self.seed {
            config.hasher.seed = seed;
        }
        if self.parallel {
            config.hasher.strategy = HashStrategy::Parallel;
        }
        if self.unique {
            config.compact_listing = CompactListing::Unique;
        }
        config
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprint!("{}", err.render());
            let reason = match err.kind() {
                ErrorKind::MissingRequiredArgument => "not enough input args",
                _ => "invalid input args",
            };
            return fail(&PipelineError::Usage(reason.to_string()));
        }
    };
    init_tracing(cli.verbose);

    let options = match &cli.config {
        Some(path) => Options::load_from(path),
        None => Options::load(),
    };
    let options = match options {
        Ok(options) => options,
        Err(err) => {
            println!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let config = cli.pipeline_config(&options);

    println!("file: {}", config.input_path.display());
    println!("Perceptual hashing...");

    let start = Instant::now();
    let summary = match pipeline::run(&config) {
        Ok(summary) => summary,
        Err(err) => return fail(&err),
    };
    let elapsed = start.elapsed();

    println!("\nFingerprints written successfully!");
    println!("  Tokens: {}", summary.tokens);
    println!("  Windows hashed: {}", summary.windows);
    println!("  Unique hashes: {}", summary.unique);
    println!("  Full report: {}", config.full_report_path.display());
    println!("  Compact report: {}", config.compact_report_path.display());
    println!("  Time elapsed: {:.3}s", elapsed.as_secs_f64());

    ExitCode::SUCCESS
}

fn fail(err: &PipelineError) -> ExitCode {
    match err {
        PipelineError::Usage(message) => println!("{message}"),
        PipelineError::HashingFailed { .. } => {
            tracing::error!("{err}");
            println!("unable to complete text hash function");
        }
        PipelineError::EmptyResult { .. } => {
            tracing::warn!("{err}");
            println!("Text is too short to generate a hash.");
        }
        PipelineError::ArtifactOpenFailed { path, .. } => {
            tracing::error!("{err}");
            println!("Could not open file: {}", path.display());
        }
        PipelineError::InvalidConfig { .. } | PipelineError::ArtifactWriteFailed { .. } => {
            println!("Error: {err}");
        }
    }
    ExitCode::FAILURE
}
