use std::path::PathBuf;
use thiserror::Error;

use crate::collect::CollectionReport;

/// The main error type for oisample operations.
#[derive(Debug, Error)]
pub enum OisampleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse label hierarchy from {path}: {source}")]
    HierarchyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse manifest {path} at line {line}: {source}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write manifest to {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report: {source}")]
    ReportWrite {
        #[source]
        source: serde_json::Error,
    },

    #[error("Class name(s) not found in class descriptions: {}", names.join(", "))]
    NameNotFound { names: Vec<String> },

    #[error("Label {label_id} for class '{class_name}' not found in label hierarchy")]
    LabelNotFound { class_name: String, label_id: String },

    #[error("Invalid collection parameters: {message}")]
    InvalidCollectParams { message: String },

    #[error("Invalid split parameters: {message}")]
    InvalidSplitParams { message: String },

    #[error("Invalid Ground Truth manifest {path}, record {record}: {message}")]
    GroundTruthInvalid {
        path: PathBuf,
        record: usize,
        message: String,
    },

    #[error("Quota not met for {} class(es)", report.shortfalls.len())]
    QuotaUnmet { report: CollectionReport },
}
