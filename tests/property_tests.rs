//! Property-based tests for the entry codec and the match algebra.
//!
//! These tests verify invariants that should hold regardless of input:
//! - Entries read back exactly what was written, for every field shape
//! - And/Or/AndNot agree with set intersection/union/difference for any
//!   buffer size
//! - Matches yield strictly ascending ids and stay exhausted

use std::collections::BTreeSet;

use proptest::prelude::*;

use quarry::entry::{FieldType, IndexEntryReader, IndexEntryWriter};
use quarry::index::Index;
use quarry::index::config::IndexConfig;
use quarry::query::{AndMatch, AndNotMatch, Match, MemoizedMatch, OrMatch, collect_ids};

mod codec_props {
    use super::*;

    prop_compose! {
        fn arb_tuple()(
            text in prop::collection::vec(any::<u8>(), 0..24),
            long in any::<i64>(),
            double in -1.0e12f64..1.0e12,
        ) -> (Vec<u8>, i64, f64) {
            (text, long, double)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn every_shape_round_trips(
            raw in prop::collection::vec(any::<u8>(), 0..64),
            tuple in arb_tuple(),
            list in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..12),
            tuples in prop::collection::vec(arb_tuple(), 1..12),
        ) {
            let mut buffer = vec![0u8; 4096];
            let mut writer = IndexEntryWriter::with_field_count(&mut buffer, 5);
            writer.write(0, &raw).unwrap();
            writer.write_tuple(1, &tuple.0, tuple.1, tuple.2).unwrap();
            writer.write_list(2, &list).unwrap();
            let texts: Vec<&[u8]> = tuples.iter().map(|t| t.0.as_slice()).collect();
            let longs: Vec<i64> = tuples.iter().map(|t| t.1).collect();
            let doubles: Vec<f64> = tuples.iter().map(|t| t.2).collect();
            writer.write_tuple_list(3, &texts, &longs, &doubles).unwrap();
            let entry = writer.finish().unwrap();

            let reader = IndexEntryReader::new(entry).unwrap();
            prop_assert_eq!(reader.field_type(4), FieldType::Missing);
            prop_assert_eq!(reader.read(0).unwrap(), Some(raw.as_slice()));

            let value = reader.read_tuple(1).unwrap().unwrap();
            prop_assert_eq!(value.bytes, tuple.0.as_slice());
            prop_assert_eq!(value.long(), Some(tuple.1));
            prop_assert_eq!(value.double().map(f64::to_bits), Some(tuple.2.to_bits()));

            let mut cursor = reader.read_many(2).unwrap();
            prop_assert_eq!(cursor.count(), list.len());
            for expected in &list {
                prop_assert!(cursor.read_next().unwrap());
                prop_assert_eq!(cursor.sequence().unwrap(), expected.as_slice());
            }
            prop_assert!(!cursor.read_next().unwrap());

            for (index, (text, long, double)) in tuples.iter().enumerate().rev() {
                let value = reader.read_value_at(3, index).unwrap().unwrap();
                prop_assert_eq!(value.bytes, text.as_slice());
                prop_assert_eq!(value.long(), Some(*long));
                prop_assert_eq!(value.double().map(f64::to_bits), Some(double.to_bits()));
            }
        }
    }
}

mod algebra_props {
    use super::*;

    fn ids(set: &BTreeSet<u64>) -> Box<dyn Match> {
        Box::new(MemoizedMatch::from_sorted(set.iter().copied().collect()).unwrap())
    }

    fn drain_checked(matcher: &mut dyn Match, buffer_size: usize) -> Vec<u64> {
        let out = collect_ids(matcher, buffer_size).unwrap();
        let mut buffer = vec![0; buffer_size];
        assert_eq!(matcher.fill(&mut buffer).unwrap(), 0);
        assert_eq!(matcher.fill(&mut buffer).unwrap(), 0);
        out
    }

    fn strictly_ascending(ids: &[u64]) -> bool {
        ids.windows(2).all(|pair| pair[0] < pair[1])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn combinators_agree_with_sets(
            left in prop::collection::btree_set(1u64..400, 0..120),
            right in prop::collection::btree_set(1u64..400, 0..120),
            merge_buffer in 1usize..33,
            drain_buffer in 1usize..33,
        ) {
            let mut and = AndMatch::new(ids(&left), ids(&right), merge_buffer);
            let got = drain_checked(&mut and, drain_buffer);
            prop_assert!(strictly_ascending(&got));
            prop_assert_eq!(got, left.intersection(&right).copied().collect::<Vec<_>>());

            let mut or = OrMatch::new(ids(&left), ids(&right), merge_buffer);
            let got = drain_checked(&mut or, drain_buffer);
            prop_assert!(strictly_ascending(&got));
            prop_assert_eq!(got, left.union(&right).copied().collect::<Vec<_>>());

            let mut and_not = AndNotMatch::new(ids(&left), ids(&right), merge_buffer);
            let got = drain_checked(&mut and_not, drain_buffer);
            prop_assert_eq!(got, left.difference(&right).copied().collect::<Vec<_>>());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn indexed_terms_agree_with_sets(
            tags in prop::collection::vec((any::<bool>(), any::<bool>()), 1..80),
            drain_buffer in 1usize..17,
        ) {
            let index = Index::open(IndexConfig::with_fields(["Id", "Tags"])).unwrap();
            let mut writer = index.writer().unwrap();
            let mut with_a = BTreeSet::new();
            let mut with_b = BTreeSet::new();
            for (i, (a, b)) in tags.iter().enumerate() {
                let id = (i + 1) as u64;
                let mut values = vec!["any"];
                if *a {
                    values.push("a");
                    with_a.insert(id);
                }
                if *b {
                    values.push("b");
                    with_b.insert(id);
                }
                let mut buffer = vec![0u8; 128];
                let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
                entry.write(0, format!("doc/{i}").as_bytes()).unwrap();
                entry.write_list(1, &values).unwrap();
                writer.index(format!("doc/{i}"), entry.finish().unwrap()).unwrap();
            }
            writer.commit().unwrap();

            let searcher = index.searcher().unwrap();
            let term = |t: &str| searcher.term_query("Tags", t).unwrap();

            let mut and = searcher.and(term("a"), term("b"));
            prop_assert_eq!(drain_checked(&mut and, drain_buffer), with_a.intersection(&with_b).copied().collect::<Vec<_>>());

            let mut or = searcher.or(term("a"), term("b"));
            prop_assert_eq!(drain_checked(&mut or, drain_buffer), with_a.union(&with_b).copied().collect::<Vec<_>>());

            let mut all = searcher.and(searcher.all_entries().unwrap(), term("any"));
            prop_assert_eq!(drain_checked(&mut all, drain_buffer).len(), tags.len());

            let mut in_query = searcher.in_query("Tags", ["b", "a"]).unwrap();
            let got = drain_checked(&mut in_query, drain_buffer);
            prop_assert!(strictly_ascending(&got));
            prop_assert_eq!(got.len(), with_a.union(&with_b).count());
        }
    }
}
