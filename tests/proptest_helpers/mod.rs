#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use oisample::collect::AnnotationRow;
use oisample::ir::{ImageId, LabelId};
use oisample::taxonomy::{ClassIdSets, ClassIds};
use oisample::OisampleError;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const IMAGE_POOL: usize = 12;
pub const LABELS: [&str; 4] = ["/m/a", "/m/b", "/m/c", "/m/x"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Class "A" covers `/m/a`; class "B" covers `/m/b` and its subclass `/m/c`.
/// `/m/x` matches nothing.
pub fn two_classes() -> ClassIdSets {
    ClassIdSets::from_classes(vec![
        ClassIds {
            class_name: "A".into(),
            root_id: LabelId::from("/m/a"),
            ids: [LabelId::from("/m/a")].into_iter().collect(),
        },
        ClassIds {
            class_name: "B".into(),
            root_id: LabelId::from("/m/b"),
            ids: [LabelId::from("/m/b"), LabelId::from("/m/c")]
                .into_iter()
                .collect(),
        },
    ])
}

pub fn make_row(image: usize, label: usize) -> AnnotationRow {
    AnnotationRow {
        image_id: ImageId::new(format!("img{image}")),
        source: "xclick".into(),
        label_id: LabelId::from(LABELS[label]),
        confidence: 1.0,
        xmin: 0.0,
        xmax: 1.0,
        ymin: 0.0,
        ymax: 1.0,
    }
}

pub fn arb_rows(max_rows: usize) -> impl Strategy<Value = Vec<AnnotationRow>> {
    prop::collection::vec((0..IMAGE_POOL, 0..LABELS.len()), 0..max_rows).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(image, label)| make_row(image, label))
            .collect()
    })
}

pub fn arb_excluded() -> impl Strategy<Value = HashSet<ImageId>> {
    prop::collection::hash_set(0..IMAGE_POOL, 0..4).prop_map(|ids| {
        ids.into_iter()
            .map(|i| ImageId::new(format!("img{i}")))
            .collect()
    })
}

pub fn ok_rows(rows: &[AnnotationRow]) -> Vec<Result<AnnotationRow, OisampleError>> {
    rows.iter().cloned().map(Ok).collect()
}

/// Independent model of one class: the images it gathers, in order, until
/// it reaches `capacity`, with the number of boxes each received.
pub fn model_class(
    rows: &[AnnotationRow],
    ids: &HashSet<LabelId>,
    excluded: &HashSet<ImageId>,
    capacity: usize,
) -> Vec<(ImageId, usize)> {
    let mut order: Vec<ImageId> = Vec::new();
    let mut boxes: HashMap<ImageId, usize> = HashMap::new();

    for row in rows {
        if order.len() >= capacity {
            break;
        }
        if excluded.contains(&row.image_id) || !ids.contains(&row.label_id) {
            continue;
        }
        if !boxes.contains_key(&row.image_id) {
            order.push(row.image_id.clone());
        }
        *boxes.entry(row.image_id.clone()).or_insert(0) += 1;
    }

    order
        .into_iter()
        .map(|id| {
            let n = boxes[&id];
            (id, n)
        })
        .collect()
}

/// Random upper/lower casing of an ASCII name.
pub fn arb_casing(name: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), name.len()).prop_map(move |flags| {
        name.chars()
            .zip(flags)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}
