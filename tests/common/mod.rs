#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const DESCRIPTIONS: &str = "/m/011k07,Tortoise\n/m/01x3z,Boot\n/m/0jbk,Cat\n";

pub const HIERARCHY: &str = r#"{
  "LabelName": "/m/0bl9f",
  "Subcategory": [
    {"LabelName": "/m/01x3z"},
    {"LabelName": "/m/0jbk", "Subcategory": [{"LabelName": "/m/kitten"}]},
    {"LabelName": "/m/011k07"}
  ]
}"#;

// Boot images in order: img1, img2, img5, img7
// Cat images in order:  img1, img3 (kitten), img4, img8
pub const ANNOTATIONS: &str = "\
ImageID,Source,LabelName,Confidence,XMin,XMax,YMin,YMax,IsOccluded,IsTruncated
img1,xclick,/m/01x3z,1,0.1,0.5,0.2,0.6,0,0
img1,xclick,/m/0jbk,1,0.2,0.7,0.1,0.9,0,0
img2,xclick,/m/01x3z,1,0.0,0.4,0.3,0.8,1,0
img3,xclick,/m/kitten,1,0.3,0.6,0.3,0.6,0,0
img4,activemil,/m/0jbk,1,0.1,0.9,0.1,0.9,0,1
img5,xclick,/m/01x3z,1,0.2,0.3,0.2,0.3,0,0
img6,xclick,/m/011k07,1,0.0,1.0,0.0,1.0,0,0
img7,xclick,/m/01x3z,1,0.5,0.9,0.5,0.9,0,0
img8,xclick,/m/0jbk,1,0.4,0.8,0.1,0.5,0,0
";

/// A temp directory pre-populated with the taxonomy and annotation tables.
pub struct Fixture {
    pub dir: TempDir,
    pub descriptions: PathBuf,
    pub hierarchy: PathBuf,
    pub annotations: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let descriptions = write(dir.path(), "class-descriptions-boxable.csv", DESCRIPTIONS);
        let hierarchy = write(dir.path(), "bbox_labels_600_hierarchy.json", HIERARCHY);
        let annotations = write(dir.path(), "train-annotations-bbox.csv", ANNOTATIONS);
        Self {
            dir,
            descriptions,
            hierarchy,
            annotations,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        write(self.dir.path(), name, contents)
    }
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture file");
    path
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read output file")
        .lines()
        .map(str::to_string)
        .collect()
}
