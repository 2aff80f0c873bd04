use std::collections::HashSet;

use oisample::collect::{collect_examples, CollectOptions};
use oisample::taxonomy::{class_descriptions_from_str, resolve_class_names};
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_casing, arb_excluded, arb_rows, model_class, ok_rows, two_classes};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn collection_matches_suffix_of_model_prefix(
        rows in arb_rows(60),
        excluded in arb_excluded(),
        quota in 1usize..5,
        offset in 0usize..3,
    ) {
        let classes = two_classes();
        let opts = CollectOptions { quota, offset };
        let collection = collect_examples(&classes, ok_rows(&rows), &excluded, &opts)
            .expect("collect");

        let capacity = quota * (offset + 1);
        let mut expected_total = HashSet::new();

        for class in classes.iter() {
            let gathered = model_class(&rows, &class.ids, &excluded, capacity);
            let keep_from = gathered.len().saturating_sub(quota);
            let kept = &gathered[keep_from..];

            let actual: Vec<_> = collection
                .images
                .iter()
                .filter_map(|(id, boxes)| {
                    let n = boxes.iter().filter(|b| b.class_name == class.class_name).count();
                    (n > 0).then(|| (id.clone(), n))
                })
                .collect();

            let mut expected = kept.to_vec();
            expected.sort();
            let mut actual_sorted = actual.clone();
            actual_sorted.sort();
            prop_assert_eq!(actual_sorted, expected);

            let short = collection
                .report
                .shortfalls
                .iter()
                .any(|s| s.class_name == class.class_name);
            prop_assert_eq!(short, gathered.len() < capacity);

            expected_total.extend(kept.iter().map(|(id, _)| id.clone()));
        }

        prop_assert_eq!(collection.images.len(), expected_total.len());
        prop_assert_eq!(collection.report.total_images, expected_total.len());
    }

    #[test]
    fn excluded_images_never_appear(
        rows in arb_rows(60),
        excluded in arb_excluded(),
        quota in 1usize..5,
    ) {
        let collection = collect_examples(
            &two_classes(),
            ok_rows(&rows),
            &excluded,
            &CollectOptions { quota, offset: 0 },
        )
        .expect("collect");

        for (id, _) in collection.images.iter() {
            prop_assert!(!excluded.contains(id));
        }
    }

    #[test]
    fn each_class_keeps_at_most_quota_images(
        rows in arb_rows(60),
        quota in 1usize..5,
        offset in 0usize..3,
    ) {
        let collection = collect_examples(
            &two_classes(),
            ok_rows(&rows),
            &HashSet::new(),
            &CollectOptions { quota, offset },
        )
        .expect("collect");

        for count in &collection.report.classes {
            prop_assert!(count.kept <= quota);
            prop_assert!(count.matched <= quota * (offset + 1));
        }
        prop_assert!(collection.images.len() <= 2 * quota);
    }

    #[test]
    fn resolution_ignores_case(boot in arb_casing("boot"), cat in arb_casing("cat")) {
        let table = "/m/011k07,Tortoise\n/m/01x3z,Boot\n/m/0jbk,Cat\n";
        let names = vec![boot.clone(), cat.clone()];
        let resolved = resolve_class_names(&names, class_descriptions_from_str(table))
            .expect("resolve");

        prop_assert_eq!(&resolved[0].name, &boot);
        prop_assert_eq!(resolved[0].root_id.as_ref().map(|id| id.as_str()), Some("/m/01x3z"));
        prop_assert_eq!(resolved[1].root_id.as_ref().map(|id| id.as_str()), Some("/m/0jbk"));
    }
}
