//! Structured events emitted with the `tracing` feature.

#![cfg(feature = "tracing")]

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};

use common::collect;
use lazyq::prelude::*;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines_with(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_index_built_event_names_the_owning_stage() {
    let captured = Captured::default();
    let _guard = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(captured.clone()))
        .finish()
        .set_default();

    let grouped = from_vec(vec![1, 2, 3]).group_join(
        from_vec(vec![(1, "a"), (3, "b")]),
        |o| *o,
        |i| i.0,
        |o, m| (o, m.len()),
    );
    assert_eq!(collect(&grouped).unwrap(), vec![(1, 1), (2, 0), (3, 1)]);

    let built = captured.lines_with("index built");
    assert_eq!(built.len(), 1);
    assert!(built[0].contains("group_join"));

    let joined = from_vec(vec![1]).join(from_vec(vec![1]), |o| *o, |i| *i, |o, _| *o);
    assert_eq!(collect(&joined).unwrap(), vec![1]);

    let built = captured.lines_with("index built");
    assert_eq!(built.len(), 2);
    assert!(built[1].contains("join") && !built[1].contains("group_join"));
}

#[test]
fn test_group_by_reports_grouping_count() {
    let captured = Captured::default();
    let _guard = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(captured.clone()))
        .finish()
        .set_default();

    let grouped = from_vec(vec![1, 2, 3, 4, 5]).group_by(|x| x % 2);
    assert_eq!(collect(&grouped).unwrap().len(), 2);

    let built = captured.lines_with("index built");
    assert_eq!(built.len(), 1);
    assert!(built[0].contains("group_by"));
    assert!(built[0].contains("groupings=2"));
}
