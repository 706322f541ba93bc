// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Property tests for the content store
//!
//! Merge semantics, record ordering, lookup totality and snapshot
//! serialization over generated inputs.

use std::collections::HashMap;

use proptest::prelude::*;

use lexio_core::{CacheSnapshot, ContentStore, EntryMap, FieldValue, StoreRecord};

fn entry_maps() -> impl Strategy<Value = EntryMap> {
    prop::collection::hash_map(
        "[a-z]{0,8}",
        prop::collection::hash_map("[a-z]{0,4}", "[a-zA-Z0-9 ]{0,12}", 0..4),
        0..6,
    )
}

fn field_values() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Int),
        "[a-zA-Z ]{0,12}".prop_map(FieldValue::Text),
        prop::collection::hash_map("[a-z]{2}", "[a-zA-Z ]{0,8}", 0..3)
            .prop_map(FieldValue::Localized),
    ]
}

fn record(id: &str) -> StoreRecord {
    StoreRecord {
        id: id.to_string(),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-02T00:00:00Z".to_string(),
        fields: HashMap::new(),
    }
}

proptest! {
    #[test]
    fn prop_merge_applies_patch_and_keeps_the_rest(
        base in entry_maps(),
        patch in entry_maps(),
    ) {
        let mut store = ContentStore::new();
        store.merge_entries("tab:t", base.clone());
        store.merge_entries("tab:t", patch.clone());

        // Every patched value wins.
        for (key, langs) in &patch {
            for (lang, value) in langs {
                prop_assert_eq!(store.get("tab:t", key, lang), Some(value.as_str()));
            }
        }
        // Every base value the patch does not touch survives.
        for (key, langs) in &base {
            for (lang, value) in langs {
                let expected = patch
                    .get(key)
                    .and_then(|l| l.get(lang))
                    .unwrap_or(value);
                prop_assert_eq!(store.get("tab:t", key, lang), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn prop_records_come_back_ordered_and_deduplicated(
        ids in prop::collection::vec("[a-z0-9]{1,6}", 0..12),
    ) {
        let mut store = ContentStore::new();
        store.merge_records("faq", ids.iter().map(|id| record(id)).collect());

        let out: Vec<String> = store.records("faq").into_iter().map(|r| r.id).collect();
        let mut expected = ids;
        expected.sort();
        expected.dedup();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_lookups_are_total(
        slug in ".{0,10}",
        key in ".{0,10}",
        lang in ".{0,5}",
    ) {
        let store = ContentStore::new();
        prop_assert_eq!(store.get(&slug, &key, &lang), None);
        prop_assert!(store.get_all(&slug, &lang).is_empty());
        prop_assert!(store.records(&slug).is_empty());
    }

    #[test]
    fn prop_snapshot_round_trips(
        entries in entry_maps(),
        language in "[a-z]{2}",
    ) {
        let mut store = ContentStore::new();
        store.merge_entries("tab:home", entries);
        store.merge_records("faq", vec![record("r1"), record("r2")]);

        let snapshot = CacheSnapshot { language, content: store };
        let json = serde_json::to_string(&snapshot).unwrap();
        let loaded: CacheSnapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(loaded, snapshot);
    }

    #[test]
    fn prop_field_values_round_trip(value in field_values()) {
        let json = serde_json::to_string(&value).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, value);
    }
}
