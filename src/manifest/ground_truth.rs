//! Ground Truth labeling-job manifests.
//!
//! A bounding-box labeling job writes an output manifest whose lines carry
//! the job's results under a label attribute named after the job:
//!
//! ```json
//! {"source-ref":"s3://...","boots-cats-2":{...},"boots-cats-2-metadata":{...}}
//! ```
//!
//! When several jobs label disjoint batches of the same dataset, their
//! outputs must share one attribute name before they can be fed to a
//! training job together. Lines are otherwise treated as opaque JSON objects.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::info;

use super::{read_json_lines, write_json_lines};
use crate::error::OisampleError;

/// Version string labeling jobs expect in the label category document.
pub const LABEL_CONFIG_VERSION: &str = "2018-11-28";

/// One line of a labeling-job manifest.
pub type GroundTruthLine = Map<String, Value>;

/// The output of a single labeling job.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundTruthBatch {
    /// Where the lines came from, for error messages.
    pub path: PathBuf,
    /// The job's label attribute name.
    pub attribute: String,
    pub lines: Vec<GroundTruthLine>,
}

impl GroundTruthBatch {
    /// Reads a job output manifest from disk.
    pub fn read(path: &Path, attribute: impl Into<String>) -> Result<Self, OisampleError> {
        Ok(Self {
            path: path.to_path_buf(),
            attribute: attribute.into(),
            lines: read_ground_truth_manifest(path)?,
        })
    }
}

fn metadata_key(attribute: &str) -> String {
    format!("{attribute}-metadata")
}

/// Renames every batch's label attribute (and its `-metadata` companion) to
/// `target_attribute`, concatenating the batches in order.
///
/// # Errors
/// Returns [`OisampleError::GroundTruthInvalid`] for a line that lacks a
/// `source-ref` or the batch's label attribute.
pub fn consolidate_ground_truth(
    batches: Vec<GroundTruthBatch>,
    target_attribute: &str,
) -> Result<Vec<GroundTruthLine>, OisampleError> {
    let target_metadata = metadata_key(target_attribute);
    let mut consolidated = Vec::new();

    for batch in batches {
        let source_metadata = metadata_key(&batch.attribute);
        let count = batch.lines.len();

        for (i, mut line) in batch.lines.into_iter().enumerate() {
            let invalid = |message: String| OisampleError::GroundTruthInvalid {
                path: batch.path.clone(),
                record: i + 1,
                message,
            };

            if !line.contains_key("source-ref") {
                return Err(invalid("missing 'source-ref'".to_string()));
            }
            let labels = line
                .remove(&batch.attribute)
                .ok_or_else(|| invalid(format!("missing attribute '{}'", batch.attribute)))?;
            line.insert(target_attribute.to_string(), labels);

            if let Some(metadata) = line.remove(&source_metadata) {
                line.insert(target_metadata.clone(), metadata);
            }
            consolidated.push(line);
        }

        info!(
            attribute = %batch.attribute,
            records = count,
            "consolidated labeling job output"
        );
    }

    Ok(consolidated)
}

/// Builds the label category document a labeling job is configured with.
pub fn label_category_config(class_names: &[String]) -> Value {
    let labels: Vec<Value> = class_names
        .iter()
        .map(|name| json!({ "label": name }))
        .collect();
    json!({
        "document-version": LABEL_CONFIG_VERSION,
        "labels": labels,
    })
}

/// Writes the label category document as pretty JSON.
pub fn write_label_category_config(
    path: &Path,
    class_names: &[String],
) -> Result<(), OisampleError> {
    let text = serde_json::to_string_pretty(&label_category_config(class_names)).map_err(
        |source| OisampleError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        },
    )?;
    std::fs::write(path, text + "\n").map_err(OisampleError::Io)
}

/// Reads a labeling-job manifest as free-form JSON objects.
pub fn read_ground_truth_manifest(path: &Path) -> Result<Vec<GroundTruthLine>, OisampleError> {
    read_json_lines(path)
}

/// Writes labeling-job manifest lines.
pub fn write_ground_truth_manifest(
    path: &Path,
    lines: &[GroundTruthLine],
) -> Result<(), OisampleError> {
    write_json_lines(path, lines)
}
