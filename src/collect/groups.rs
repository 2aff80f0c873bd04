//! Insertion-ordered image → boxes mapping.

use std::collections::HashMap;

use crate::ir::{ImageId, LabeledBox};

/// Boxes grouped by image, in the order images were first seen.
#[derive(Clone, Debug, Default)]
pub struct ImageGroups {
    entries: Vec<(ImageId, Vec<LabeledBox>)>,
    index: HashMap<ImageId, usize>,
}

impl ImageGroups {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no image has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total number of boxes across all images.
    pub fn box_count(&self) -> usize {
        self.entries.iter().map(|(_, boxes)| boxes.len()).sum()
    }

    /// Returns the boxes for an image, if present.
    pub fn get(&self, image_id: &str) -> Option<&[LabeledBox]> {
        self.index
            .get(image_id)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// Iterates over images in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ImageId, &[LabeledBox])> {
        self.entries
            .iter()
            .map(|(id, boxes)| (id, boxes.as_slice()))
    }

    /// Appends a box to an image. Returns true if the image was new.
    pub fn push(&mut self, image_id: ImageId, labeled: LabeledBox) -> bool {
        self.extend_image(image_id, std::iter::once(labeled))
    }

    /// Appends boxes to an image, keeping its original position if it was
    /// already present. Returns true if the image was new.
    pub fn extend_image<I>(&mut self, image_id: ImageId, boxes: I) -> bool
    where
        I: IntoIterator<Item = LabeledBox>,
    {
        match self.index.get(&image_id) {
            Some(&i) => {
                self.entries[i].1.extend(boxes);
                false
            }
            None => {
                self.index.insert(image_id.clone(), self.entries.len());
                self.entries.push((image_id, boxes.into_iter().collect()));
                true
            }
        }
    }

    /// Drops all but the last `n` images.
    pub fn keep_last(&mut self, n: usize) {
        if self.entries.len() <= n {
            return;
        }
        let drop = self.entries.len() - n;
        self.entries.drain(..drop);
        self.reindex();
    }

    /// Moves every image of `other` into `self`, concatenating boxes for
    /// images present in both.
    pub fn merge(&mut self, other: ImageGroups) {
        for (image_id, boxes) in other.entries {
            self.extend_image(image_id, boxes);
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();
    }
}

impl PartialEq for ImageGroups {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
