//! Iterator lifecycle state machine shared by every operator.
//!
//! `Stage<L>` wraps an operator's `StageLogic` and owns the lifecycle:
//!
//! ```text
//! Unstarted --first advance--> Running --exhausted | failed | cancelled | dispose--> Disposed
//!     \------------------------cancelled | dispose------------------------------------^
//! ```
//!
//! Invariants:
//! - Upstream handles are opened on the first advance, never at construction.
//! - `StageLogic::release` runs exactly once, whatever the exit path
//!   (exhaustion, error, cancellation, explicit dispose, drop, unwinding).
//! - The logic is never polled after release.
//! - The cancellation signal is checked on every advance, and the waker is
//!   registered with it while the stage is suspended.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::enumerator::AsyncEnumerator;
use crate::error::{Error, Result};
use crate::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageState {
    Unstarted,
    Running,
    Disposed,
}

/// Why a stage reached `Disposed`. Reported to tracing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposeReason {
    Exhausted,
    Abandoned,
    Cancelled,
    Failed,
}

/// Operator-specific part of a stage.
///
/// Implementations keep their resume point as an explicit enum and their
/// upstream handles as owned fields; `Stage` drives the lifecycle around them.
pub trait StageLogic: Send {
    type Item;

    /// Stable operator name for tracing.
    const NAME: &'static str;

    /// Open upstream handles. Called once, on the first advance.
    fn open(&mut self, cancel: &CancellationToken) -> Result<()>;

    /// Produce the next element, `Ok(None)` on exhaustion.
    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Self::Item>>>;

    /// Dispose every upstream handle still owned and drop buffered state.
    fn release(&mut self);
}

pub struct Stage<L: StageLogic> {
    logic: L,
    state: StageState,
    cancel: CancellationToken,
    // Registered only after the first `Pending`, so the common synchronous
    // path never allocates.
    cancel_wait: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    current: Option<L::Item>,
}

impl<L: StageLogic> Stage<L> {
    pub fn new(logic: L, cancel: &CancellationToken) -> Self {
        Self {
            logic,
            state: StageState::Unstarted,
            cancel: cancel.clone(),
            cancel_wait: None,
            current: None,
        }
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    fn finish(&mut self, reason: DisposeReason) {
        if self.state == StageState::Disposed {
            return;
        }
        let was_open = self.state == StageState::Running;
        self.state = StageState::Disposed;
        self.current = None;
        self.cancel_wait = None;
        if was_open {
            self.logic.release();
        }
        trace::stage_disposed(L::NAME, reason);
    }

    fn cancelled(&mut self) -> Poll<Result<bool>> {
        self.finish(DisposeReason::Cancelled);
        Poll::Ready(Err(Error::Cancelled))
    }
}

impl<L> AsyncEnumerator for Stage<L>
where
    L: StageLogic,
    L::Item: Send,
{
    type Item = L::Item;

    fn poll_move_next(&mut self, cx: &mut Context<'_>) -> Poll<Result<bool>> {
        if self.state == StageState::Disposed {
            return Poll::Ready(Ok(false));
        }
        if self.cancel.is_cancelled() {
            return self.cancelled();
        }
        if self.state == StageState::Unstarted {
            // Release also runs when `open` fails halfway, so the logic can
            // drop whatever it managed to open.
            self.state = StageState::Running;
            if let Err(e) = self.logic.open(&self.cancel) {
                self.finish(DisposeReason::Failed);
                return Poll::Ready(Err(e));
            }
            trace::stage_opened(L::NAME);
        }

        self.current = None;
        match self.logic.poll_produce(cx) {
            Poll::Ready(Ok(Some(item))) => {
                self.current = Some(item);
                Poll::Ready(Ok(true))
            }
            Poll::Ready(Ok(None)) => {
                self.finish(DisposeReason::Exhausted);
                Poll::Ready(Ok(false))
            }
            Poll::Ready(Err(Error::Cancelled)) => self.cancelled(),
            Poll::Ready(Err(e)) => {
                self.finish(DisposeReason::Failed);
                Poll::Ready(Err(e))
            }
            Poll::Pending => {
                let cancel = &self.cancel;
                let wait = self
                    .cancel_wait
                    .get_or_insert_with(|| Box::pin(cancel.clone().cancelled_owned()));
                if wait.as_mut().poll(cx).is_ready() {
                    return self.cancelled();
                }
                Poll::Pending
            }
        }
    }

    fn current(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }

    fn take_current(&mut self) -> Option<Self::Item> {
        self.current.take()
    }

    fn dispose(&mut self) {
        self.finish(DisposeReason::Abandoned);
    }

    fn state(&self) -> StageState {
        self.state
    }
}

impl<L: StageLogic> Drop for Stage<L> {
    fn drop(&mut self) {
        self.finish(DisposeReason::Abandoned);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::executor::block_on;

    use super::*;
    use crate::enumerator::AsyncEnumeratorExt;

    struct Counting {
        next: u32,
        end: u32,
        fail_at: Option<u32>,
        opened: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl Counting {
        fn new(end: u32) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let opened = Arc::new(AtomicUsize::new(0));
            let released = Arc::new(AtomicUsize::new(0));
            let logic = Counting {
                next: 0,
                end,
                fail_at: None,
                opened: Arc::clone(&opened),
                released: Arc::clone(&released),
            };
            (logic, opened, released)
        }
    }

    impl StageLogic for Counting {
        type Item = u32;
        const NAME: &'static str = "counting";

        fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<u32>>> {
            if Some(self.next) == self.fail_at {
                return Poll::Ready(Err(Error::callback("boom")));
            }
            if self.next == self.end {
                return Poll::Ready(Ok(None));
            }
            self.next += 1;
            Poll::Ready(Ok(Some(self.next - 1)))
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lazy_open_and_single_release_on_exhaustion() {
        let (logic, opened, released) = Counting::new(2);
        let mut stage = Stage::new(logic, &CancellationToken::new());
        assert_eq!(stage.state(), StageState::Unstarted);
        assert_eq!(opened.load(Ordering::SeqCst), 0);

        assert!(block_on(stage.move_next()).unwrap());
        assert_eq!(stage.state(), StageState::Running);
        assert_eq!(stage.current(), Some(&0));
        assert!(block_on(stage.move_next()).unwrap());
        assert!(!block_on(stage.move_next()).unwrap());
        assert_eq!(stage.state(), StageState::Disposed);
        assert_eq!(stage.current(), None);

        // Advancing after exhaustion does not reopen anything.
        assert!(!block_on(stage.move_next()).unwrap());
        stage.dispose();
        drop(stage);
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let (logic, _opened, released) = Counting::new(10);
        let mut stage = Stage::new(logic, &CancellationToken::new());
        assert!(block_on(stage.move_next()).unwrap());
        stage.dispose();
        stage.dispose();
        drop(stage);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unstarted_dispose_never_opens() {
        let (logic, opened, released) = Counting::new(10);
        let mut stage = Stage::new(logic, &CancellationToken::new());
        stage.dispose();
        assert!(!block_on(stage.move_next()).unwrap());
        assert_eq!(opened.load(Ordering::SeqCst), 0);
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_releases_before_propagating() {
        let (mut logic, _opened, released) = Counting::new(10);
        logic.fail_at = Some(1);
        let mut stage = Stage::new(logic, &CancellationToken::new());
        assert!(block_on(stage.move_next()).unwrap());
        let err = block_on(stage.move_next()).unwrap_err();
        assert_eq!(err, Error::Callback("boom".into()));
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(stage.state(), StageState::Disposed);
    }

    #[test]
    fn test_cancel_before_first_advance() {
        let token = CancellationToken::new();
        let (logic, opened, _released) = Counting::new(10);
        let mut stage = Stage::new(logic, &token);
        token.cancel();
        assert_eq!(block_on(stage.move_next()), Err(Error::Cancelled));
        assert_eq!(opened.load(Ordering::SeqCst), 0);
        assert!(!block_on(stage.move_next()).unwrap());
    }

    #[test]
    fn test_cancel_mid_enumeration_releases() {
        let token = CancellationToken::new();
        let (logic, _opened, released) = Counting::new(10);
        let mut stage = Stage::new(logic, &token);
        assert!(block_on(stage.move_next()).unwrap());
        token.cancel();
        assert_eq!(block_on(stage.move_next()), Err(Error::Cancelled));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
