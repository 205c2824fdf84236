//! Interrupt edge synchronization.
//!
//! [`EdgeLatch`] carries interrupt edges from an ISR context to the async
//! read loop. An edge that arrives before the loop starts waiting is
//! latched and consumed by the next wait, so no wakeup is lost regardless
//! of ordering. The latch holds at most one pending edge; coalescing
//! is fine because the consumer drains everything the hardware has
//! buffered on every wakeup.

use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use critical_section::Mutex;

enum LatchState {
    /// No pending edge, nobody waiting.
    Idle,
    /// A consumer is parked on the latch.
    Waiting(Waker),
    /// An edge arrived and has not been consumed yet.
    Signaled,
}

/// One-slot edge latch, safe to signal from interrupt context.
pub struct EdgeLatch {
    state: Mutex<RefCell<LatchState>>,
}

impl EdgeLatch {
    /// Creates a new latch with no pending edge.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(LatchState::Idle)),
        }
    }

    /// Records an interrupt edge.
    ///
    /// Wakes the parked consumer if there is one, otherwise latches the
    /// edge for the next wait. Safe to call from an ISR.
    pub fn signal(&self) {
        let waker = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            match core::mem::replace(&mut *state, LatchState::Signaled) {
                LatchState::Waiting(waker) => Some(waker),
                _ => None,
            }
        });
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Consumes a pending edge without waiting. Returns true if one was
    /// latched.
    pub fn try_consume(&self) -> bool {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if matches!(*state, LatchState::Signaled) {
                *state = LatchState::Idle;
                true
            } else {
                false
            }
        })
    }

    /// Discards any pending edge and any parked waiter.
    pub fn reset(&self) {
        critical_section::with(|cs| {
            *self.state.borrow_ref_mut(cs) = LatchState::Idle;
        });
    }

    /// Waits until an edge is recorded, consuming it.
    ///
    /// Only one consumer may wait at a time; a second waiter replaces
    /// the first.
    pub fn wait(&self) -> impl Future<Output = ()> + '_ {
        EdgeWait { latch: self }
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

struct EdgeWait<'a> {
    latch: &'a EdgeLatch,
}

impl Future for EdgeWait<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        critical_section::with(|cs| {
            let mut state = self.latch.state.borrow_ref_mut(cs);
            if matches!(*state, LatchState::Signaled) {
                *state = LatchState::Idle;
                Poll::Ready(())
            } else {
                *state = LatchState::Waiting(cx.waker().clone());
                Poll::Pending
            }
        })
    }
}
