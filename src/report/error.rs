use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Failed to write JUnit XML: {0}")]
    Xml(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No report payloads matched: {0}")]
    NoInputs(String),
}

impl From<quick_xml::Error> for ReportError {
    fn from(err: quick_xml::Error) -> Self {
        ReportError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
