use std::path::PathBuf;

use thiserror::Error;

use crate::core::OrderStage;

#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("no worker at index {index} (roster has {len})")]
    RecordNotFound { index: usize, len: usize },
    #[error("amounts are locked once the order reaches {stage}")]
    OrderLocked { stage: OrderStage },
}

/// Rejected amount text. The roster keeps its last accepted value.
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("'{input}' is not a number")]
    NotNumeric { input: String },
    #[error("'{input}' is not a finite amount")]
    NotFinite { input: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{flag} must be between 0 and 100")]
    InvalidRate { flag: &'static str },
    #[error("{field} must be between 0 and 1")]
    RateOutOfRange { field: &'static str },
    #[error("labor cap must be a finite amount >= 0")]
    InvalidCap,
    #[error("failed to read roster file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
