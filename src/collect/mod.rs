//! Quota-bounded example collection from the OpenImages box table.
//!
//! The box table (`*-annotations-bbox.csv`) is far too large to load, so it
//! is streamed exactly once. Each requested class gathers images whose
//! boxes carry one of its label IDs until it holds `quota * (offset + 1)`
//! distinct images. Reading stops as soon as every class is full.
//!
//! Each class is then trimmed to the **last** `quota` images it gathered,
//! so a larger offset slides the kept window further down the table. Offsets
//! therefore overlap as prefixes while streaming; only the trimmed windows
//! are disjoint.
//!
//! Finally the classes are merged, in request order, into a single mapping
//! from image ID to boxes.

mod groups;
mod report;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::OisampleError;
use crate::ir::{ImageId, LabelId, LabeledBox};
use crate::taxonomy::{ClassIdSets, ClassIds};

pub use groups::ImageGroups;
pub use report::{ClassCount, CollectionReport, QuotaShortfall};

/// One row of the OpenImages box table.
///
/// Columns other than the ones below (`IsOccluded`, `IsGroupOf`, ...) are
/// ignored.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnnotationRow {
    #[serde(rename = "ImageID")]
    pub image_id: ImageId,
    #[serde(rename = "Source", default)]
    pub source: String,
    #[serde(rename = "LabelName")]
    pub label_id: LabelId,
    #[serde(rename = "Confidence", default = "default_confidence")]
    pub confidence: f64,
    #[serde(rename = "XMin")]
    pub xmin: f64,
    #[serde(rename = "XMax")]
    pub xmax: f64,
    #[serde(rename = "YMin")]
    pub ymin: f64,
    #[serde(rename = "YMax")]
    pub ymax: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl AnnotationRow {
    /// Tags this row's box with a requested class name.
    pub fn labeled_box(&self, class_name: &str) -> LabeledBox {
        LabeledBox::new(class_name, self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// Collection options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    /// Images wanted per class.
    pub quota: usize,
    /// Which window of `quota` images to keep (0 = the first).
    pub offset: usize,
}

impl CollectOptions {
    /// Distinct images a class gathers before it stops accepting rows.
    pub fn capacity(&self) -> Result<usize, OisampleError> {
        self.offset
            .checked_add(1)
            .and_then(|windows| windows.checked_mul(self.quota))
            .ok_or_else(|| OisampleError::InvalidCollectParams {
                message: format!(
                    "quota {} with offset {} overflows",
                    self.quota, self.offset
                ),
            })
    }
}

/// Validate collection options before running.
pub fn validate_collect_options(opts: &CollectOptions) -> Result<(), OisampleError> {
    if opts.quota == 0 {
        return Err(OisampleError::InvalidCollectParams {
            message: "quota must be greater than 0".to_string(),
        });
    }
    opts.capacity().map(|_| ())
}

/// The merged output of a collection run.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    pub images: ImageGroups,
    pub report: CollectionReport,
}

struct ClassProgress<'a> {
    class: &'a ClassIds,
    groups: ImageGroups,
    remaining: usize,
}

/// Collects up to `quota` images per class from a stream of box rows.
///
/// Rows whose image is in `excluded` are skipped. A class that exhausts the
/// stream before filling up is reported as a [`QuotaShortfall`] and logged
/// as a warning; collection still succeeds with what was found.
///
/// # Errors
/// Returns an error for invalid options and propagates row read errors.
pub fn collect_examples<I>(
    class_ids: &ClassIdSets,
    rows: I,
    excluded: &HashSet<ImageId>,
    opts: &CollectOptions,
) -> Result<Collection, OisampleError>
where
    I: IntoIterator<Item = Result<AnnotationRow, OisampleError>>,
{
    validate_collect_options(opts)?;
    let capacity = opts.capacity()?;

    let mut progress: Vec<ClassProgress<'_>> = class_ids
        .iter()
        .map(|class| ClassProgress {
            class,
            groups: ImageGroups::new(),
            remaining: capacity,
        })
        .collect();
    let mut unfilled = progress.len();

    let mut report = CollectionReport {
        quota: opts.quota,
        offset: opts.offset,
        ..Default::default()
    };

    let mut rows = rows.into_iter();
    while unfilled > 0 {
        let Some(row) = rows.next() else {
            break;
        };
        let row = row?;
        report.rows_scanned += 1;

        if excluded.contains(&row.image_id) {
            report.rows_excluded += 1;
            continue;
        }

        for p in progress.iter_mut().filter(|p| p.remaining > 0) {
            if !p.class.ids.contains(&row.label_id) {
                continue;
            }
            let labeled = row.labeled_box(&p.class.class_name);
            if p.groups.push(row.image_id.clone(), labeled) {
                p.remaining -= 1;
                if p.remaining == 0 {
                    unfilled -= 1;
                    debug!(
                        class = %p.class.class_name,
                        row = report.rows_scanned,
                        "class reached capacity"
                    );
                }
            }
        }
    }

    let mut images = ImageGroups::new();
    for p in progress {
        let matched = p.groups.len();
        if p.remaining > 0 {
            let shortfall = QuotaShortfall {
                class_name: p.class.class_name.clone(),
                wanted: capacity,
                found: matched,
                missing: p.remaining,
            };
            warn!(
                class = %shortfall.class_name,
                wanted = shortfall.wanted,
                found = shortfall.found,
                "quota not met"
            );
            report.shortfalls.push(shortfall);
        }

        let mut groups = p.groups;
        groups.keep_last(opts.quota);
        report.classes.push(ClassCount {
            class_name: p.class.class_name.clone(),
            matched,
            kept: groups.len(),
            boxes: groups.box_count(),
        });
        images.merge(groups);
    }

    report.total_images = images.len();
    info!(
        images = report.total_images,
        rows = report.rows_scanned,
        "collection finished"
    );

    Ok(Collection { images, report })
}

/// Streams box rows from an OpenImages annotation CSV file.
pub fn read_annotations(
    path: &Path,
) -> Result<impl Iterator<Item = Result<AnnotationRow, OisampleError>>, OisampleError> {
    let file = File::open(path).map_err(OisampleError::Io)?;
    Ok(annotation_rows(BufReader::new(file), path.to_path_buf()))
}

/// Streams box rows from a CSV string.
///
/// Useful for testing without file I/O.
pub fn annotations_from_str(
    csv_str: &str,
) -> impl Iterator<Item = Result<AnnotationRow, OisampleError>> + '_ {
    annotation_rows(csv_str.as_bytes(), PathBuf::from("<string>"))
}

fn annotation_rows<R: Read>(
    reader: R,
    path: PathBuf,
) -> impl Iterator<Item = Result<AnnotationRow, OisampleError>> {
    csv::Reader::from_reader(reader)
        .into_deserialize::<AnnotationRow>()
        .map(move |result| {
            result.map_err(|source| OisampleError::CsvParse {
                path: path.clone(),
                source,
            })
        })
}

/// Reads image IDs to exclude, one per line.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn read_excluded_ids(path: &Path) -> Result<HashSet<ImageId>, OisampleError> {
    let file = File::open(path).map_err(OisampleError::Io)?;
    let mut ids = HashSet::new();
    for line in BufReader::new(file).lines() {
        if let Some(id) = parse_excluded_line(&line?) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Parses an exclusion list from a string.
pub fn excluded_ids_from_str(text: &str) -> HashSet<ImageId> {
    text.lines().filter_map(parse_excluded_line).collect()
}

fn parse_excluded_line(line: &str) -> Option<ImageId> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(ImageId::from(trimmed))
    }
}
