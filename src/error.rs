//src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaxaError>;

#[derive(Error, Debug)]
pub enum TaxaError {
    /// Nothing survived filtering, so there is no denominator for percentages.
    #[error("no records left after filtering ({records} records in input)")]
    EmptyInput { records: usize },

    #[error("invalid aggregation config: {0}")]
    InvalidConfig(String),

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("unknown classification status code '{0}' (expected 'C' or 'U')")]
    InvalidStatus(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to serialize hierarchy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
