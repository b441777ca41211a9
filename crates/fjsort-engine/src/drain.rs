//! Tracking of outstanding tasks so a sort can wait for all of them.
//!
//! Every task or continuation that may touch the caller's slice holds a
//! `Ticket`. `DrainGuard` blocks in `drop` until no ticket is left, whether the
//! sort is returning normally or unwinding.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

#[derive(Default)]
struct Inner {
    live: Mutex<usize>,
    idle: Condvar,
}

#[derive(Default)]
pub(crate) struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ticket(&self) -> Ticket {
        *self.inner.live.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ticket {
            inner: Arc::clone(&self.inner),
        }
    }

    pub(crate) fn drain_on_drop(&self) -> DrainGuard<'_> {
        DrainGuard(self)
    }

    fn wait_idle(&self) {
        let live = self.inner.live.lock().unwrap_or_else(PoisonError::into_inner);
        drop(
            self.inner
                .idle
                .wait_while(live, |n| *n > 0)
                .unwrap_or_else(PoisonError::into_inner),
        );
    }
}

pub(crate) struct Ticket {
    inner: Arc<Inner>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut live = self.inner.live.lock().unwrap_or_else(PoisonError::into_inner);
        *live -= 1;
        if *live == 0 {
            self.inner.idle.notify_all();
        }
    }
}

pub(crate) struct DrainGuard<'a>(&'a InFlight);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.wait_idle();
    }
}
