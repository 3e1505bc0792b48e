//! Join, group join, group-by and the lookup-building terminals.

mod common;

use common::{collect, counting};
use futures::executor::block_on;
use lazyq::prelude::*;
use lazyq::LookupSpec;

fn inner_rows() -> Vec<(i32, &'static str)> {
    vec![(1, "a"), (1, "b"), (3, "c")]
}

#[test]
fn test_join_emits_matching_pairs_in_outer_then_inner_order() {
    let joined = from_vec(vec![1, 2, 3]).join(
        from_vec(inner_rows()),
        |o| *o,
        |i| i.0,
        |o, i| (*o, i.1),
    );
    assert_eq!(
        collect(&joined).unwrap(),
        vec![(1, "a"), (1, "b"), (3, "c")]
    );
}

#[test]
fn test_group_join_emits_one_result_per_outer_element() {
    let joined = from_vec(vec![1, 2, 3]).group_join(
        from_vec(inner_rows()),
        |o| *o,
        |i| i.0,
        |o, matches| (o, matches.iter().map(|m| m.1).collect::<Vec<_>>()),
    );
    let results = collect(&joined).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], (1, vec!["a", "b"]));
    assert_eq!(results[1], (2, vec![]));
    assert_eq!(results[2], (3, vec!["c"]));
}

#[test]
fn test_join_with_empty_outer_never_opens_inner() {
    let (inner, counters) = counting(inner_rows());
    let joined = empty::<i32>().join(inner, |o| *o, |i| i.0, |o, i| (*o, i.1));
    assert!(collect(&joined).unwrap().is_empty());
    assert_eq!(counters.opened(), 0);

    let (inner, counters) = counting(inner_rows());
    let grouped = empty::<i32>().group_join(inner, |o| *o, |i| i.0, |o, m| (o, m.len()));
    assert!(collect(&grouped).unwrap().is_empty());
    assert_eq!(counters.opened(), 0);
}

#[test]
fn test_join_rebuilds_index_per_enumeration() {
    let (inner, counters) = counting(inner_rows());
    let joined = from_vec(vec![3, 1]).join(inner, |o| *o, |i| i.0, |_, i| i.1);
    assert_eq!(collect(&joined).unwrap(), vec!["c", "a", "b"]);
    assert_eq!(collect(&joined).unwrap(), vec!["c", "a", "b"]);
    assert_eq!(counters.opened(), 2);
    assert_eq!(counters.released(), 2);
}

#[test]
fn test_join_inner_released_before_first_result() {
    let (inner, counters) = counting(inner_rows());
    let joined = from_vec(vec![1, 2, 3]).join(inner, |o| *o, |i| i.0, |o, i| (*o, i.1));
    let cancel = CancellationToken::new();
    let mut handle = joined.enumerate(&cancel);
    assert_eq!(block_on(handle.next_item()).unwrap(), Some((1, "a")));
    assert_eq!(counters.produced(), 3);
    assert_eq!(counters.released(), 1);
}

#[test]
fn test_join_skips_null_keys() {
    let outer = from_vec(vec![Some(1), None, Some(2)]);
    let inner = from_vec(vec![(None, "x"), (Some(1), "a"), (None, "y"), (Some(2), "b")]);
    let joined = outer.clone().join_with(
        inner.clone(),
        |o| *o,
        |i| i.0,
        |o, i| (*o, i.1),
        OptionalKey::new(),
        &QueryConfig::default(),
    );
    assert_eq!(
        collect(&joined).unwrap(),
        vec![(Some(1), "a"), (Some(2), "b")]
    );

    let grouped = outer.group_join_with(
        inner,
        |o| *o,
        |i| i.0,
        |o, m| (o, m.len()),
        OptionalKey::new(),
        &QueryConfig::default(),
    );
    assert_eq!(
        collect(&grouped).unwrap(),
        vec![(Some(1), 1), (None, 0), (Some(2), 1)]
    );
}

#[test]
fn test_plain_equality_treats_none_as_a_key() {
    let outer = from_vec(vec![None, Some(1)]);
    let inner = from_vec(vec![(None::<i32>, "x"), (Some(1), "a")]);
    let joined = outer.join(inner, |o| *o, |i| i.0, |_, i| i.1);
    assert_eq!(collect(&joined).unwrap(), vec!["x", "a"]);
}

#[test]
fn test_lookup_keeps_null_keys() {
    let cancel = CancellationToken::new();
    let source = from_vec(vec![(None, 1), (Some("k"), 2), (None, 3)]);
    let lookup = block_on(source.to_lookup_with(
        |row| row.0,
        |row| row.1,
        OptionalKey::new(),
        &QueryConfig::default(),
        &cancel,
    ))
    .unwrap();
    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.elements(&None), &[1, 3]);
    assert_eq!(lookup.elements(&Some("k")), &[2]);
}

#[test]
fn test_group_by_yields_groupings_in_first_seen_order() {
    let words = from_vec(vec!["banana", "apple", "blueberry", "cherry", "avocado"]);
    let groups = collect(&words.group_by(|w| w.as_bytes()[0])).unwrap();
    let summary: Vec<(char, Vec<&str>)> = groups
        .iter()
        .map(|g| (*g.key() as char, g.elements().to_vec()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ('b', vec!["banana", "blueberry"]),
            ('a', vec!["apple", "avocado"]),
            ('c', vec!["cherry"]),
        ]
    );
}

#[test]
fn test_group_by_with_element_projection() {
    let pipeline = range(1, 10).group_by_with(
        |x| x % 3,
        |x| x * 100,
        DefaultEquality,
        &QueryConfig::default(),
    );
    let groups = collect(&pipeline).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(*groups[0].key(), 1);
    assert_eq!(groups[0].elements(), &[100, 400, 700, 1000]);
}

#[test]
fn test_to_lookup_groups_by_key() {
    let cancel = CancellationToken::new();
    let lookup = block_on(from_vec(vec![5, 1, 8, 3, 2]).to_lookup(|x| x % 2, &cancel)).unwrap();
    assert_eq!(lookup.keys().copied().collect::<Vec<_>>(), vec![1, 0]);
    assert_eq!(lookup.elements(&1), &[5, 1, 3]);
    assert_eq!(lookup.elements(&0), &[8, 2]);
    assert!(lookup.elements(&7).is_empty());
}

#[test]
fn test_to_dictionary_rejects_duplicate_keys() {
    let cancel = CancellationToken::new();
    let people = from_vec(vec![("ann", 31), ("bob", 27), ("ann", 40)]);
    let result = block_on(people.to_dictionary(|p| p.0, |p| p.1, &cancel));
    assert_eq!(result.err(), Some(Error::DuplicateKey));

    let unique = from_vec(vec![("ann", 31), ("bob", 27)]);
    let dict = block_on(unique.to_dictionary(|p| p.0, |p| p.1, &cancel)).unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(&"bob"), Some(&27));
}

#[test]
fn test_lookup_spec_reports_missing_arguments() {
    let cancel = CancellationToken::new();

    let missing_source = LookupSpec::new().key_selector(|x: &i32| x % 2);
    assert_eq!(
        missing_source.build(&cancel).err(),
        Some(Error::ArgumentNull("source"))
    );

    let missing_key = LookupSpec::<i32, i32, i32>::new().source(from_vec(vec![1, 2]).shared());
    assert_eq!(
        missing_key.build(&cancel).err(),
        Some(Error::ArgumentNull("key_selector"))
    );

    let complete = LookupSpec::new()
        .source(from_vec(vec![1, 2, 3, 4]).shared())
        .key_selector(|x: &i32| x % 2 == 0);
    let lookup = block_on(complete.build(&cancel).unwrap()).unwrap();
    assert_eq!(lookup.elements(&true), &[2, 4]);
}

#[test]
fn test_lookup_spec_for_join_drops_null_keys() {
    let cancel = CancellationToken::new();
    let rows = vec![(Some(1), "a"), (None, "b"), (Some(1), "c")];
    let request = LookupSpec::new()
        .source(from_vec(rows).shared())
        .key_selector(|row: &(Option<i32>, &'static str)| row.0)
        .element_selector(|row: (Option<i32>, &'static str)| row.1)
        .equality(OptionalKey::new())
        .for_join();
    let lookup = block_on(request.build(&cancel).unwrap()).unwrap();
    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.elements(&Some(1)), &["a", "c"]);
    assert!(lookup.elements(&None).is_empty());
}
