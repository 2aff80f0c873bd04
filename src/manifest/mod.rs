//! JSON Lines manifests for annotation and training jobs.
//!
//! Each line of a manifest is one record:
//!
//! ```json
//! {"source-ref":"s3://open-images-dataset/train/0a1b2c.jpg","labels":[["Cat",0.1,0.5,0.2,0.9]]}
//! ```
//!
//! Besides serialization, this module covers the bookkeeping around
//! manifests: merging batches produced by separate collection runs,
//! shuffling, and splitting into training and validation sets.

pub mod ground_truth;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collect::ImageGroups;
use crate::error::OisampleError;
use crate::ir::{ImageId, LabeledBox};

/// Public bucket holding the OpenImages training images.
pub const DEFAULT_SOURCE_PREFIX: &str = "s3://open-images-dataset/train";

/// Default share of records assigned to the training split.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// One manifest line: an image reference and its boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    #[serde(rename = "source-ref")]
    pub source_ref: String,
    #[serde(default)]
    pub labels: Vec<LabeledBox>,
}

/// Builds the object URI for an image under `prefix`.
pub fn source_ref_for(prefix: &str, image_id: &ImageId) -> String {
    format!("{}/{}.jpg", prefix.trim_end_matches('/'), image_id)
}

/// Converts collected images to manifest records, preserving image order.
pub fn records_from_groups(images: &ImageGroups, source_prefix: &str) -> Vec<ManifestRecord> {
    images
        .iter()
        .map(|(image_id, boxes)| ManifestRecord {
            source_ref: source_ref_for(source_prefix, image_id),
            labels: boxes.to_vec(),
        })
        .collect()
}

/// Merges record batches by `source-ref`.
///
/// Records keep the position where their `source-ref` was first seen; the
/// labels of later records with the same reference are appended.
pub fn merge_batches<I>(batches: I) -> Vec<ManifestRecord>
where
    I: IntoIterator<Item = Vec<ManifestRecord>>,
{
    let mut merged: Vec<ManifestRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in batches.into_iter().flatten() {
        match index.get(&record.source_ref) {
            Some(&i) => merged[i].labels.extend(record.labels),
            None => {
                index.insert(record.source_ref.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// Shuffles records uniformly at random; a seed makes the order reproducible.
pub fn shuffle_records(records: &mut [ManifestRecord], seed: Option<u64>) {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        records.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        records.shuffle(&mut rng);
    }
}

/// Split options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitOptions {
    pub train_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_fraction: DEFAULT_TRAIN_FRACTION,
            seed: None,
        }
    }
}

/// Training and validation partitions of a manifest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManifestSplit {
    pub train: Vec<ManifestRecord>,
    pub validation: Vec<ManifestRecord>,
}

/// Validate split options before running.
pub fn validate_split_options(opts: &SplitOptions) -> Result<(), OisampleError> {
    if !(0.0 < opts.train_fraction && opts.train_fraction < 1.0) {
        return Err(OisampleError::InvalidSplitParams {
            message: "train fraction must be in the interval (0.0, 1.0)".to_string(),
        });
    }
    Ok(())
}

/// Splits records in order: the first `floor(len * train_fraction)` train.
pub fn split_records(
    mut records: Vec<ManifestRecord>,
    train_fraction: f64,
) -> Result<ManifestSplit, OisampleError> {
    validate_split_options(&SplitOptions {
        train_fraction,
        seed: None,
    })?;

    let train_len = (records.len() as f64 * train_fraction).floor() as usize;
    let validation = records.split_off(train_len);
    Ok(ManifestSplit {
        train: records,
        validation,
    })
}

/// Merges batches, shuffles the result, and splits it.
pub fn prepare_split<I>(batches: I, opts: &SplitOptions) -> Result<ManifestSplit, OisampleError>
where
    I: IntoIterator<Item = Vec<ManifestRecord>>,
{
    validate_split_options(opts)?;

    let mut records = merge_batches(batches);
    shuffle_records(&mut records, opts.seed);
    let split = split_records(records, opts.train_fraction)?;

    info!(
        train = split.train.len(),
        validation = split.validation.len(),
        "split manifest"
    );
    Ok(split)
}

/// Reads manifest records from a JSON Lines file.
///
/// Blank lines are skipped.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRecord>, OisampleError> {
    read_json_lines(path)
}

/// Writes manifest records to a JSON Lines file.
pub fn write_manifest(path: &Path, records: &[ManifestRecord]) -> Result<(), OisampleError> {
    write_json_lines(path, records)
}

/// Reads manifest records from a JSON Lines string.
///
/// Useful for testing without file I/O.
pub fn from_manifest_str(text: &str) -> Result<Vec<ManifestRecord>, OisampleError> {
    parse_json_lines(text.as_bytes(), Path::new("<string>"))
}

/// Writes manifest records to a JSON Lines string.
///
/// Useful for testing without file I/O.
pub fn to_manifest_string(records: &[ManifestRecord]) -> Result<String, OisampleError> {
    let mut out = Vec::new();
    emit_json_lines(&mut out, records, Path::new("<string>"))?;
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub(crate) fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, OisampleError> {
    let file = File::open(path).map_err(OisampleError::Io)?;
    parse_json_lines(BufReader::new(file), path)
}

pub(crate) fn write_json_lines<T: Serialize>(
    path: &Path,
    items: &[T],
) -> Result<(), OisampleError> {
    let file = File::create(path).map_err(OisampleError::Io)?;
    let mut writer = BufWriter::new(file);
    emit_json_lines(&mut writer, items, path)?;
    writer.flush().map_err(OisampleError::Io)
}

fn parse_json_lines<T: DeserializeOwned, R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<Vec<T>, OisampleError> {
    let mut items = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|source| OisampleError::ManifestParse {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        items.push(item);
    }
    Ok(items)
}

fn emit_json_lines<T: Serialize, W: Write>(
    writer: &mut W,
    items: &[T],
    path: &Path,
) -> Result<(), OisampleError> {
    for item in items {
        serde_json::to_writer(&mut *writer, item).map_err(|source| {
            OisampleError::ManifestWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
