// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for key encoding and collection round-trips

use std::collections::BTreeMap;

use firekv::{KeyCodec, Operator, Store, StoreConfig};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    label: String,
    score: i64,
    active: bool,
}

/// Names and ids drawn from the full byte range the encoder escapes.
fn arb_component() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![Just('\u{0}'), Just('\u{1}'), Just('a'), Just('b'), any::<char>()],
        0..8,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_record() -> impl Strategy<Value = Record> {
    ("[A-Za-z ]{0,20}", -1000i64..1000, any::<bool>()).prop_map(|(label, score, active)| {
        Record {
            label,
            score,
            active,
        }
    })
}

fn memory_store(runtime: &tokio::runtime::Runtime, batch: usize) -> Store {
    runtime.block_on(async {
        Store::open_with_config(StoreConfig {
            scan_batch_size: batch,
            ..StoreConfig::in_memory()
        })
        .await
        .unwrap()
    })
}

proptest! {
    #[test]
    fn test_key_round_trip(name in arb_component(), id in arb_component()) {
        let key = KeyCodec::encode(&name, &id);
        prop_assert_eq!(KeyCodec::decode(&key).unwrap(), (name.clone(), id));
        prop_assert!(key.starts_with(&KeyCodec::prefix(&name)));
    }

    #[test]
    fn test_key_encoding_is_injective(
        a in (arb_component(), arb_component()),
        b in (arb_component(), arb_component())
    ) {
        let ka = KeyCodec::encode(&a.0, &a.1);
        let kb = KeyCodec::encode(&b.0, &b.1);
        prop_assert_eq!(ka == kb, a == b);
    }

    #[test]
    fn test_key_order_matches_tuple_order(
        a in (arb_component(), arb_component()),
        b in (arb_component(), arb_component())
    ) {
        let ka = KeyCodec::encode(&a.0, &a.1);
        let kb = KeyCodec::encode(&b.0, &b.1);
        let tuple_order = (a.0.as_bytes(), a.1.as_bytes()).cmp(&(b.0.as_bytes(), b.1.as_bytes()));
        prop_assert_eq!(ka.cmp(&kb), tuple_order);
    }

    #[test]
    fn test_prefix_isolates_collections(
        name in arb_component(),
        other in arb_component(),
        id in arb_component()
    ) {
        prop_assume!(name != other);
        let key = KeyCodec::encode(&other, &id);
        prop_assert!(!key.starts_with(&KeyCodec::prefix(&name)));
    }

    #[test]
    fn test_add_then_get(record in arb_record()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let store = memory_store(&runtime, 4);
        runtime.block_on(async {
            let records = store.collection::<Record>("records");
            let id = records.add(&record).await.unwrap();
            prop_assert_eq!(records.get(&id).await.unwrap(), Some(record));
            Ok(())
        })?;
    }

    #[test]
    fn test_scans_agree_with_model(
        records in prop::collection::btree_map("[a-z0-9]{1,6}", arb_record(), 0..20),
        batch in 1usize..6,
        threshold in -1000i64..1000,
        limit in 0usize..8,
        offset in 0usize..25
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let store = memory_store(&runtime, batch);
        runtime.block_on(async {
            let coll = store.collection::<Record>("records");
            let noise = store.collection::<Record>("records-other");
            for (id, record) in &records {
                coll.set(id, record).await.unwrap();
                noise.set(id, record).await.unwrap();
            }
            let model: BTreeMap<_, _> = records.clone();

            let all = coll.get_all().await.unwrap();
            prop_assert_eq!(&all, &model.values().cloned().collect::<Vec<_>>());

            let filtered = coll.query("score", Operator::Gte, threshold).await.unwrap();
            let expected: Vec<_> = model
                .values()
                .filter(|r| r.score >= threshold)
                .cloned()
                .collect();
            prop_assert_eq!(filtered, expected);

            let page = coll.paginate(limit, offset).await.unwrap();
            let expected: Vec<_> = model.values().skip(offset).take(limit).cloned().collect();
            prop_assert_eq!(page, expected);

            prop_assert_eq!(coll.count().await.unwrap(), model.len());
            Ok(())
        })?;
    }
}
