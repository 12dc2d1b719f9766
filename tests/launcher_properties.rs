//! Property tests for the launcher registry merge

use proptest::prelude::*;
use tweakset::merge;

const STALE: &str = "object-";

/// Registry entries: a mix of stock applet names and generated ids
fn registry_entry() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z]{1,8}(-[a-z]{1,6})?").expect("valid regex"),
        (0u32..40).prop_map(|n| format!("{}{}", STALE, n)),
    ]
}

fn generated_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(0u32..40, 0..8)
        .prop_map(|ids| ids.into_iter().map(|n| format!("{}{}", STALE, n)).collect())
}

proptest! {
    /// Stale entries only survive when they were generated this run
    #[test]
    fn stale_entries_come_from_generated(
        existing in prop::collection::vec(registry_entry(), 0..16),
        generated in generated_ids(),
    ) {
        let merged = merge(&existing, &generated, STALE);
        for id in merged.iter().filter(|id| id.contains(STALE)) {
            prop_assert!(generated.contains(id), "{} was not generated", id);
        }
    }

    /// Merging twice with the same ids changes nothing
    #[test]
    fn merge_is_idempotent(
        existing in prop::collection::vec(registry_entry(), 0..16),
        generated in generated_ids(),
    ) {
        let once = merge(&existing, &generated, STALE);
        let twice = merge(&once, &generated, STALE);
        prop_assert_eq!(once, twice);
    }

    /// Kept entries keep their relative order, generated ids follow in order
    #[test]
    fn merge_preserves_order(
        existing in prop::collection::vec(registry_entry(), 0..16),
        generated in generated_ids(),
    ) {
        let merged = merge(&existing, &generated, STALE);
        let kept: Vec<String> = existing
            .iter()
            .filter(|id| !id.contains(STALE))
            .cloned()
            .collect();

        prop_assert_eq!(merged.len(), kept.len() + generated.len());
        prop_assert_eq!(&merged[..kept.len()], kept.as_slice());
        prop_assert_eq!(&merged[kept.len()..], generated.as_slice());
    }
}
