//! Collection report types.
//!
//! A report summarizes a single collection run: how far the annotation
//! stream was read, how many images each class matched and kept, and which
//! classes fell short of their quota.

use serde::Serialize;
use std::fmt;

/// Summary of a collection run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CollectionReport {
    /// Images wanted per class.
    pub quota: usize,
    /// Offset the run was made with.
    pub offset: usize,
    /// Annotation rows read before the stream ended or every class filled.
    pub rows_scanned: usize,
    /// Rows skipped because their image was excluded.
    pub rows_excluded: usize,
    /// Per-class counts in request order.
    pub classes: Vec<ClassCount>,
    /// Classes that did not reach `quota * (offset + 1)` images.
    pub shortfalls: Vec<QuotaShortfall>,
    /// Distinct images in the merged output.
    pub total_images: usize,
}

impl CollectionReport {
    /// Returns true if every class reached its quota.
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Collected {} image(s) from {} row(s) (quota {}, offset {})",
            self.total_images, self.rows_scanned, self.quota, self.offset
        )?;

        for class in &self.classes {
            writeln!(
                f,
                "  {}: {} matched, {} kept, {} box(es)",
                class.class_name, class.matched, class.kept, class.boxes
            )?;
        }

        if !self.shortfalls.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.shortfalls.len())?;
            for shortfall in &self.shortfalls {
                writeln!(f, "  - {}", shortfall)?;
            }
        }

        Ok(())
    }
}

/// Image and box counts for one class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub class_name: String,
    /// Distinct images accumulated while streaming.
    pub matched: usize,
    /// Images left after trimming to the quota.
    pub kept: usize,
    /// Boxes across the kept images.
    pub boxes: usize,
}

/// A class that ran out of matching images before reaching capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuotaShortfall {
    pub class_name: String,
    pub wanted: usize,
    pub found: usize,
    pub missing: usize,
}

impl fmt::Display for QuotaShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class '{}' found {} of {} image(s), {} short",
            self.class_name, self.found, self.wanted, self.missing
        )
    }
}
