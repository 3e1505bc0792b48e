//! One cancellation signal per enumeration, observed at every advance.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::Duration;

use common::counting;
use futures::executor::block_on;
use futures::task::{waker, ArcWake};
use lazyq::prelude::*;

struct WakeFlag(AtomicBool);

impl ArcWake for WakeFlag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_cancel_before_first_advance() {
    let (source, counters) = counting(vec![1, 2, 3]);
    let pipeline = source.map(|x| x + 1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut handle = pipeline.enumerate(&cancel);
    assert_eq!(block_on(handle.move_next()), Err(Error::Cancelled));
    assert!(handle.current().is_none());
    assert_eq!(handle.state(), StageState::Disposed);
    assert_eq!(counters.opened(), 0);
    assert_eq!(counters.released(), 0);
}

#[test]
fn test_cancel_mid_enumeration_releases_and_stops() {
    let (source, counters) = counting(vec![1, 2, 3, 4]);
    let pipeline = source.filter(|_| true);
    let cancel = CancellationToken::new();
    let mut handle = pipeline.enumerate(&cancel);

    assert_eq!(block_on(handle.next_item()), Ok(Some(1)));
    assert_eq!(block_on(handle.next_item()), Ok(Some(2)));
    cancel.cancel();
    assert_eq!(block_on(handle.next_item()), Err(Error::Cancelled));
    assert_eq!(counters.produced(), 2);
    assert_eq!(counters.released(), 1);

    assert_eq!(block_on(handle.move_next()), Ok(false));
    assert_eq!(counters.released(), 1);
}

#[test]
fn test_cancel_wakes_suspended_stage() {
    let never = from_stream(futures::stream::pending::<i32>);
    let pipeline = never.map(|x| x * 2);
    let cancel = CancellationToken::new();
    let mut handle = pipeline.enumerate(&cancel);

    let flag = Arc::new(WakeFlag(AtomicBool::new(false)));
    let waker = waker(Arc::clone(&flag));
    let mut cx = Context::from_waker(&waker);

    assert!(handle.poll_move_next(&mut cx).is_pending());
    assert!(!flag.0.load(Ordering::SeqCst));

    cancel.cancel();
    assert!(flag.0.load(Ordering::SeqCst));
    assert!(matches!(
        handle.poll_move_next(&mut cx),
        Poll::Ready(Err(Error::Cancelled))
    ));
}

#[test]
fn test_cancel_from_another_thread_ends_blocked_consumer() {
    let never = from_stream(futures::stream::pending::<u64>);
    let pipeline = never.filter(|_| true).concat(range_u64());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        trigger.cancel();
    });

    let result = block_on(pipeline.to_vec(&cancel));
    canceller.join().unwrap();
    assert_eq!(result, Err(Error::Cancelled));
}

fn range_u64() -> impl AsyncSequence<Item = u64> {
    range(0, 3).map(|x| x as u64)
}

#[test]
fn test_cancel_during_join_releases_both_sides() {
    let (outer, outer_counters) = counting(vec![1, 3, 1]);
    let (inner, inner_counters) = counting(vec![(1, "a"), (3, "c")]);
    let joined = outer.join(inner, |o| *o, |i| i.0, |_, i| i.1);
    let cancel = CancellationToken::new();
    let mut handle = joined.enumerate(&cancel);

    assert_eq!(block_on(handle.next_item()), Ok(Some("a")));
    cancel.cancel();
    assert_eq!(block_on(handle.next_item()), Err(Error::Cancelled));
    assert_eq!(outer_counters.released(), 1);
    assert_eq!(inner_counters.released(), 1);
    assert_eq!(outer_counters.produced(), 1);
}

#[test]
fn test_terminal_operator_reports_cancellation() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        block_on(range(0, 10).order_by(|x| -x).to_vec(&cancel)),
        Err(Error::Cancelled)
    );
    assert_eq!(
        block_on(range(0, 10).count(&cancel)),
        Err(Error::Cancelled)
    );
}
