use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::report::{CompactListing, DEFAULT_COMPACT_REPORT, DEFAULT_FULL_REPORT};
use crate::window::{HashStrategy, HasherConfig};

const OPTIONS_FILE: &str = "texthash_options.yaml";

/// Settings read from `texthash_options.yaml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    pub kgram: Option<usize>,
    pub winnow: Option<usize>,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub unique: bool,
    pub full_report: Option<PathBuf>,
    pub compact_report: Option<PathBuf>,
}

impl Options {
    /// Load options from the working directory, then from next to the
    /// executable. No file means defaults.
    pub fn load() -> Result<Self> {
        for path in &options_candidates() {
            if path.exists() {
                return Self::load_from(path);
            }
        }
        Ok(Options::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        let options: Options = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?options, "options loaded");
        Ok(options)
    }
}

fn options_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(OPTIONS_FILE)];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(OPTIONS_FILE));
        }
    }
    candidates
}

/// Everything one pipeline run needs. No working-directory state is implied
/// beyond what the paths themselves say.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub full_report_path: PathBuf,
    pub compact_report_path: PathBuf,
    pub hasher: HasherConfig,
    pub compact_listing: CompactListing,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            full_report_path: PathBuf::from(DEFAULT_FULL_REPORT),
            compact_report_path: PathBuf::from(DEFAULT_COMPACT_REPORT),
            hasher: HasherConfig::default(),
            compact_listing: CompactListing::Full,
        }
    }

    /// Overlay values from an options file.
    pub fn with_options(mut self, options: &Options) -> Self {
        if let Some(kgram) = options.kgram {
            self.hasher.kgram = kgram;
        }
        if options.winnow.is_some() {
            self.hasher.winnow = options.winnow;
        }
        if let Some(seed) = options.seed {
            self.hasher.seed = seed;
        }
        if options.parallel {
            self.hasher.strategy = HashStrategy::Parallel;
        }
        if options.unique {
            self.compact_listing = CompactListing::Unique;
        }
        if let Some(path) = &options.full_report {
            self.full_report_path = path.clone();
        }
        if let Some(path) = &options.compact_report {
            self.compact_report_path = path.clone();
        }
        self
    }
}
