use std::collections::BTreeSet;

use quarry::analysis::config::{AnalyzerConfig, FilterConfig};
use quarry::entry::IndexEntryWriter;
use quarry::error::{QuarryError, Result};
use quarry::index::Index;
use quarry::index::config::IndexConfig;
use quarry::query::{Match, collect_ids};

const ID: u16 = 0;
const CONTENT: u16 = 1;

fn index_with(fields: &[&str]) -> Result<Index> {
    Index::open(IndexConfig::with_fields(fields.iter().copied()))
}

fn list_entry(index: &Index, id: &str, content: &[&str]) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; 1024];
    let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
    entry.write(ID, id.as_bytes())?;
    entry.write_list(CONTENT, content)?;
    Ok(entry.finish()?.to_vec())
}

fn numeric_entry(index: &Index, id: &str, value: i64) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; 256];
    let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
    entry.write(ID, id.as_bytes())?;
    entry.write_tuple(CONTENT, value.to_string().as_bytes(), value, value as f64)?;
    Ok(entry.finish()?.to_vec())
}

fn drain(mut matcher: Box<dyn Match>) -> Result<Vec<u64>> {
    collect_ids(&mut matcher, 256)
}

#[test]
fn test_single_term() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    writer.index("entry/1", &list_entry(&index, "entry/1", &["road", "lake"])?)?;
    writer.commit()?;

    let searcher = index.searcher()?;
    let found = drain(searcher.term_query("Id", "entry/1")?)?;
    assert_eq!(found.len(), 1);
    assert_eq!(searcher.get_identity_for(found[0])?, "entry/1");

    let unknown = searcher.term_query("Unknown", "x")?;
    assert_eq!(unknown.count(), 0);
    assert!(drain(unknown)?.is_empty());

    let absent = searcher.term_query("Content", "sky")?;
    assert_eq!(absent.count(), 0);
    assert!(drain(absent)?.is_empty());
    Ok(())
}

#[test]
fn test_and_or_over_many_documents() -> Result<()> {
    const N: usize = 100_000;
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    let groups: [&[&str]; 3] = [&["road", "lake", "mountain"], &["road", "mountain"], &["sky", "space", "lake"]];
    for i in 0..N {
        let id = format!("entry/{i}");
        writer.index(id.as_str(), &list_entry(&index, &id, groups[i % 3])?)?;
    }
    let stats = writer.commit()?;
    assert_eq!(stats.indexed, N);

    let searcher = index.searcher()?;
    assert_eq!(searcher.document_count()?, N as u64);

    let and = searcher.and(
        searcher.in_query("Content", ["lake", "mountain"])?,
        searcher.term_query("Content", "sky")?,
    );
    assert_eq!(drain(and)?.len(), 33_333);

    let or = searcher.or(
        searcher.and(
            searcher.term_query("Content", "lake")?,
            searcher.term_query("Content", "mountain")?,
        ),
        searcher.term_query("Content", "sky")?,
    );
    let ids = drain(or)?;
    assert_eq!(ids.len(), 66_667);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

#[test]
fn test_not_equals_composition() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    let documents: [&[i64]; 7] = [&[1], &[7], &[1, 2], &[1, 2, 3], &[1, 2, 3, 5], &[2, 5], &[2, 5, 7]];
    for (i, values) in documents.iter().enumerate() {
        let id = format!("entry/{i}");
        let texts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let doubles: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        let mut buffer = vec![0u8; 512];
        let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
        entry.write(ID, id.as_bytes())?;
        entry.write_tuple_list(CONTENT, &texts, values, &doubles)?;
        writer.index(id.as_str(), entry.finish()?)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    let not_equals = |value: i64| searcher.not_equals(searcher.all_entries()?, "Content", value);
    let union = searcher.or(searcher.or(not_equals(8)?, not_equals(9)?), not_equals(10)?);
    let all = searcher.and(searcher.starts_with_query("Id", "entry/", true)?, union);
    assert_eq!(drain(all)?.len(), 7);

    // documents holding a 5 are excluded
    assert_eq!(drain(not_equals(5)?)?.len(), 4);
    Ok(())
}

#[test]
fn test_between_on_numeric_tuples() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    for value in 1..=1000 {
        let id = format!("entry/{value}");
        writer.index(id.as_str(), &numeric_entry(&index, &id, value)?)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    let between = drain(searcher.between(searcher.all_entries()?, "Content", 100.0, 200.0)?)?;
    assert_eq!(between, (100..=200).collect::<Vec<u64>>());

    let not_between = drain(searcher.not_between(searcher.all_entries()?, "Content", 100.0, 200.0)?)?;
    assert_eq!(not_between.len(), 1000 - 101);
    assert!(not_between.iter().all(|id| !(100..=200).contains(id)));

    let longs = drain(searcher.between(searcher.all_entries()?, "Content", 100i64, 200i64)?)?;
    assert_eq!(longs, between);

    let above = drain(searcher.greater_than(searcher.all_entries()?, "Content", 990)?)?;
    assert_eq!(above, (991..=1000).collect::<Vec<u64>>());
    let at_most = drain(searcher.less_than_or_equal(searcher.all_entries()?, "Content", 3)?)?;
    assert_eq!(at_most, vec![1, 2, 3]);
    let below = drain(searcher.less_than(searcher.all_entries()?, "Content", -5.5)?)?;
    assert!(below.is_empty());
    let equal = drain(searcher.equals(searcher.all_entries()?, "Content", 42)?)?;
    assert_eq!(equal, vec![42]);
    Ok(())
}

#[test]
fn test_order_by_take() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    for (id, age) in [("a", 30), ("b", 10), ("c", 20)] {
        writer.index(id, &numeric_entry(&index, id, age)?)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    let mut ascending = searcher.order_by_ascending(searcher.all_entries()?, "Content", Some(2))?;
    assert_eq!(ascending.total_results(), 3);
    let ids = collect_ids(&mut ascending, 1)?;
    let names: Vec<String> = ids
        .iter()
        .map(|id| searcher.get_identity_for(*id))
        .collect::<Result<_>>()?;
    assert_eq!(names, vec!["b", "c"]);

    let mut descending = searcher.order_by_descending(searcher.all_entries()?, "Content", Some(10))?;
    assert_eq!(descending.total_results(), 3);
    assert_eq!(collect_ids(&mut descending, 8)?, vec![1, 3, 2]);
    assert_eq!(descending.fill(&mut [0; 8])?, 0);
    Ok(())
}

#[test]
fn test_order_by_ties_and_missing_values() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    for (id, age) in [("a", Some(5)), ("b", None), ("c", Some(5)), ("d", Some(1)), ("e", Some(5))] {
        let entry = match age {
            Some(age) => numeric_entry(&index, id, age)?,
            None => {
                let mut buffer = vec![0u8; 64];
                let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
                entry.write(ID, id.as_bytes())?;
                entry.finish()?.to_vec()
            }
        };
        writer.index(id, &entry)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    let ids = |name: &str| -> Result<u64> {
        searcher
            .internal_id_of(name)?
            .ok_or_else(|| QuarryError::not_found(name))
    };
    let (a, b, c, d, e) = (ids("a")?, ids("b")?, ids("c")?, ids("d")?, ids("e")?);

    let mut ascending = searcher.order_by_ascending(searcher.all_entries()?, "Content", None)?;
    assert_eq!(ascending.total_results(), 5);
    assert_eq!(collect_ids(&mut ascending, 2)?, vec![d, a, c, e, b]);

    let mut descending = searcher.order_by_descending(searcher.all_entries()?, "Content", None)?;
    assert_eq!(collect_ids(&mut descending, 3)?, vec![a, c, e, d, b]);

    let mut top = searcher.order_by_descending(searcher.all_entries()?, "Content", Some(3))?;
    assert_eq!(top.total_results(), 5);
    assert_eq!(collect_ids(&mut top, 1)?, vec![a, c, e]);
    Ok(())
}

#[test]
fn test_shape_errors_are_eager() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    writer.index("a", &list_entry(&index, "a", &["road"])?)?;
    writer.commit()?;

    let searcher = index.searcher()?;
    assert!(matches!(
        searcher.greater_than(searcher.all_entries()?, "Content", 5),
        Err(QuarryError::TypeMismatch(_))
    ));
    assert!(matches!(
        searcher.order_by_ascending(searcher.all_entries()?, "Id", None),
        Err(QuarryError::TypeMismatch(_))
    ));
    assert!(matches!(
        searcher.between(searcher.all_entries()?, "Unknown", "a", 5),
        Err(QuarryError::Query(_))
    ));

    // unknown fields are empty, not errors
    assert!(drain(searcher.greater_than(searcher.all_entries()?, "Unknown", 5)?)?.is_empty());
    assert_eq!(drain(searcher.not_equals(searcher.all_entries()?, "Unknown", 5)?)?, vec![1]);
    Ok(())
}

#[test]
fn test_text_term_providers() -> Result<()> {
    let mut config = IndexConfig::with_fields(["Id", "Content"]);
    config = config.analyzer(
        "Content",
        AnalyzerConfig::Whitespace {
            filters: vec![FilterConfig::Lowercase],
        },
    );
    let index = Index::open(config)?;
    let mut writer = index.writer()?;
    for (id, text) in [("a", "Road Lake"), ("b", "Mountain road"), ("c", "Sky SPACE")] {
        let mut buffer = vec![0u8; 256];
        let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
        entry.write(ID, id.as_bytes())?;
        entry.write(CONTENT, text.as_bytes())?;
        writer.index(id, entry.finish()?)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    assert_eq!(drain(searcher.term_query("Content", "ROAD")?)?, vec![1, 2]);
    assert_eq!(drain(searcher.starts_with_query("Content", "ro", true)?)?, vec![1, 2]);
    assert_eq!(drain(searcher.starts_with_query("Content", "Mo", false)?)?, vec![2]);
    assert_eq!(drain(searcher.ends_with_query("Content", "ce", true)?)?, vec![3]);
    assert_eq!(drain(searcher.contains_query("Content", "AK", false)?)?, vec![1]);
    assert_eq!(drain(searcher.not_starts_with_query("Content", "ro", true)?)?, vec![1, 2, 3]);
    assert_eq!(drain(searcher.not_contains_query("Content", "a", true)?)?, vec![3]);
    assert_eq!(drain(searcher.not_ends_with_query("Content", "e", true)?)?, vec![1, 2, 3]);
    assert_eq!(drain(searcher.exists_query("Content")?)?, vec![1, 2, 3]);
    assert_eq!(drain(searcher.regex_query("Content", "^(sky|lake)$")?)?, vec![1, 3]);
    assert!(matches!(searcher.regex_query("Content", "("), Err(QuarryError::Query(_))));
    assert!(matches!(searcher.term_query("Content", "two words"), Err(QuarryError::Query(_))));
    Ok(())
}

#[test]
fn test_updates_and_deletes() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    writer.index("a", &list_entry(&index, "a", &["road"])?)?;
    writer.index("b", &list_entry(&index, "b", &["road", "lake"])?)?;
    writer.commit()?;

    writer.index("a", &list_entry(&index, "a", &["lake"])?)?;
    writer.delete("b")?;
    let stats = writer.commit()?;
    assert_eq!((stats.updated, stats.deleted), (1, 1));

    let searcher = index.searcher()?;
    assert!(drain(searcher.term_query("Content", "road")?)?.is_empty());
    assert_eq!(drain(searcher.term_query("Content", "lake")?)?, vec![1]);
    assert_eq!(drain(searcher.all_entries()?)?, vec![1]);
    assert_eq!(searcher.internal_id_of("b")?, None);
    assert!(matches!(searcher.get_identity_for(2), Err(QuarryError::NotFound(_))));
    assert!(searcher.get_reader_for(2).is_err());

    let reader = searcher.get_reader_for(1)?;
    let mut list = reader.read_many(CONTENT)?;
    assert_eq!(list.count(), 1);
    assert!(list.read_next()?);
    assert_eq!(list.sequence()?, b"lake");
    Ok(())
}

#[test]
fn test_snapshot_isolation() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    writer.index("a", &list_entry(&index, "a", &["road"])?)?;
    writer.commit()?;

    let before = index.searcher()?;
    writer.index("b", &list_entry(&index, "b", &["road"])?)?;
    writer.commit()?;
    let after = index.searcher()?;

    assert_eq!(drain(before.term_query("Content", "road")?)?, vec![1]);
    assert_eq!(drain(after.term_query("Content", "road")?)?, vec![1, 2]);
    assert!(after.generation() > before.generation());
    Ok(())
}

#[test]
fn test_rollback_and_failed_entries() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    writer.index("a", &list_entry(&index, "a", &["road"])?)?;
    writer.rollback();
    assert_eq!(writer.pending_docs(), 0);
    writer.commit()?;

    let searcher = index.searcher()?;
    assert_eq!(searcher.all_entries()?.count(), 0);
    Ok(())
}

#[test]
fn test_inspect_and_memoize() -> Result<()> {
    let index = index_with(&["Id", "Content"])?;
    let mut writer = index.writer()?;
    for (id, content) in [("a", ["road", "lake"]), ("b", ["sky", "lake"])] {
        writer.index(id, &list_entry(&index, id, &content)?)?;
    }
    writer.commit()?;

    let searcher = index.searcher()?;
    let query = searcher.and(
        searcher.term_query("Content", "lake")?,
        searcher.in_query("Content", ["road", "sky", "road"])?,
    );
    let node = query.inspect();
    assert_eq!(node.name, "And");
    assert_eq!(node.children[1].name, "In");
    assert!(node.to_json()?.contains("\"Term\""));

    let memo = searcher.memoize(query)?;
    let first: BTreeSet<u64> = collect_ids(&mut memo.replay(), 1)?.into_iter().collect();
    let second: BTreeSet<u64> = collect_ids(&mut memo.replay(), 7)?.into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    Ok(())
}
