use crate::collector;
use crate::config::PipelineConfig;
use crate::dedup;
use crate::error::{PipelineError, Result};
use crate::report::ReportWriter;
use crate::window::WindowHasher;

pub struct RunSummary {
    pub tokens: usize,
    pub windows: usize,
    pub unique: usize,
}

/// Fingerprint one document and write both reports.
///
/// Runs tokenize → hash → collect → deduplicate → emit. A document with no
/// windows stops with `EmptyResult` before either report is opened.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let hasher = WindowHasher::new(config.hasher.clone())?;

    let seq = collector::collect(&config.input_path, &hasher)?;
    if seq.is_empty() {
        return Err(PipelineError::EmptyResult {
            tokens: seq.token_count(),
            kgram: config.hasher.kgram,
        });
    }

    let unique = dedup::deduplicate(&seq);
    tracing::debug!(windows = seq.len(), unique = unique.len(), "deduplicated");

    ReportWriter::create(&config.full_report_path, &config.compact_report_path)?.write(
        &seq,
        &unique,
        config.compact_listing,
    )?;

    Ok(RunSummary {
        tokens: seq.token_count(),
        windows: seq.len(),
        unique: unique.len(),
    })
}
