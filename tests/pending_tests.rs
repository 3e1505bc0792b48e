//! Every operator resumes correctly when its sources suspend between
//! elements.

mod common;

use common::{collect, pending};
use futures::executor::block_on;
use lazyq::prelude::*;

#[test]
fn test_filter_map_over_suspending_source() {
    let pipeline = pending(vec![1, 2, 3, 4, 5])
        .filter(|x| x % 2 == 1)
        .map(|x| x * 10);
    assert_eq!(collect(&pipeline).unwrap(), vec![10, 30, 50]);
}

#[test]
fn test_concat_union_distinct_over_suspending_sources() {
    let concat = pending(vec![1, 2]).concat(pending(vec![3])).concat(pending(vec![]));
    assert_eq!(collect(&concat).unwrap(), vec![1, 2, 3]);

    let union = pending(vec![1, 2, 2, 3]).union(pending(vec![2, 4]));
    assert_eq!(collect(&union).unwrap(), vec![1, 2, 3, 4]);

    let distinct = pending(vec!["x", "y", "x"]).distinct();
    assert_eq!(collect(&distinct).unwrap(), vec!["x", "y"]);
}

#[test]
fn test_append_prepend_over_suspending_source() {
    let pipeline = pending(vec![1, 2, 3]).append(9).prepend(0);
    assert_eq!(collect(&pipeline).unwrap(), vec![0, 1, 2, 3, 9]);
}

#[test]
fn test_joins_over_suspending_sources() {
    let inner = vec![(1, "a"), (1, "b"), (3, "c")];

    let joined = pending(vec![1, 2, 3]).join(
        pending(inner.clone()),
        |o| *o,
        |i| i.0,
        |o, i| (*o, i.1),
    );
    assert_eq!(
        collect(&joined).unwrap(),
        vec![(1, "a"), (1, "b"), (3, "c")]
    );

    let grouped = pending(vec![1, 2, 3]).group_join(
        pending(inner),
        |o| *o,
        |i| i.0,
        |o, m| (o, m.len()),
    );
    assert_eq!(collect(&grouped).unwrap(), vec![(1, 2), (2, 0), (3, 1)]);
}

#[test]
fn test_group_by_and_order_by_over_suspending_source() {
    let groups = collect(&pending(vec![3, 1, 4, 1, 5, 9, 2, 6]).group_by(|x| x % 2)).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].elements(), &[3, 1, 1, 5, 9]);
    assert_eq!(groups[1].elements(), &[4, 2, 6]);

    let sorted = pending(vec![(2, 'a'), (1, 'b'), (2, 'c')]).order_by(|p| p.0);
    assert_eq!(
        collect(&sorted).unwrap(),
        vec![(1, 'b'), (2, 'a'), (2, 'c')]
    );
}

#[test]
fn test_terminals_over_suspending_source() {
    let cancel = CancellationToken::new();
    assert_eq!(block_on(pending(vec![7, 8]).first(&cancel)), Ok(7));
    assert_eq!(block_on(pending(vec![7, 8]).last(&cancel)), Ok(8));
    assert_eq!(block_on(pending(vec![7]).single(&cancel)), Ok(7));
    assert_eq!(block_on(pending(vec![1, 2, 3]).sum(&cancel)), Ok(6));
    assert_eq!(block_on(pending(Vec::<i32>::new()).count(&cancel)), Ok(0));
}
