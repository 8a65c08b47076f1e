use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid configuration: {parameter}={value}, {reason}")]
    InvalidConfig {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Failed to hash document {}: {source}", path.display())]
    HashingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Text is too short to generate a hash: {tokens} tokens, window of {kgram}")]
    EmptyResult { tokens: usize, kgram: usize },

    #[error("Could not open file: {}: {source}", path.display())]
    ArtifactOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write file: {}: {source}", path.display())]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn invalid_config(parameter: &str, value: impl ToString, reason: &str) -> Self {
        Self::InvalidConfig {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
