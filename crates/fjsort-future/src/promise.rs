//! The future cell.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use fjsort_core::contract;

type Continuation<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

// Tagged state. Transitions:
//   Empty -> Value | Error                (write, no consumer yet)
//   Empty -> Continuation -> Forwarded    (consumer chained first)
//   Value | Error -> Forwarded            (consumer chained after the write)
// Nothing ever leaves Value/Error except by being handed to a continuation.
enum Slot<T, E> {
    Empty,
    Value(T),
    Error(E),
    Continuation(Continuation<T, E>),
    // The result was moved into a continuation; nothing is left to read.
    Forwarded,
}

impl<T, E> Slot<T, E> {
    fn is_ready(&self) -> bool {
        matches!(self, Slot::Value(_) | Slot::Error(_) | Slot::Forwarded)
    }

    fn name(&self) -> &'static str {
        match self {
            Slot::Empty => "empty",
            Slot::Value(_) => "value",
            Slot::Error(_) => "error",
            Slot::Continuation(_) => "continuation",
            Slot::Forwarded => "forwarded",
        }
    }
}

/// Outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    Ready,
    Timeout,
}

/// Single-assignment result cell. Share it between producer and consumer with
/// `Arc`.
pub struct Promise<T, E> {
    slot: Mutex<Slot<T, E>>,
    ready: Condvar,
}

impl<T, E> Promise<T, E> {
    pub fn new() -> Self {
        Self::with_slot(Slot::Empty)
    }

    /// A cell that already holds `value`.
    pub fn ready(value: T) -> Self {
        Self::with_slot(Slot::Value(value))
    }

    /// A cell that already holds `error`.
    pub fn failed(error: E) -> Self {
        Self::with_slot(Slot::Error(error))
    }

    fn with_slot(slot: Slot<T, E>) -> Self {
        Self {
            slot: Mutex::new(slot),
            ready: Condvar::new(),
        }
    }

    // Every critical section leaves the slot in a valid state before any code
    // that might panic runs, so a poisoned lock carries no torn state.
    fn lock(&self) -> MutexGuard<'_, Slot<T, E>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn wait_ready(&self) -> MutexGuard<'_, Slot<T, E>> {
        let slot = self
            .ready
            .wait_while(self.lock(), |slot| !slot.is_ready())
            .unwrap_or_else(PoisonError::into_inner);
        Self::readable(slot)
    }

    // A forwarded cell is "ready" but has nothing left to observe.
    #[track_caller]
    fn readable(slot: MutexGuard<'_, Slot<T, E>>) -> MutexGuard<'_, Slot<T, E>> {
        if matches!(*slot, Slot::Forwarded) {
            drop(slot);
            contract::violated("future cell result was handed to a continuation");
        }
        slot
    }

    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        self.lock().is_ready()
    }

    #[track_caller]
    pub fn set_value(&self, value: T) {
        self.complete(Ok(value));
    }

    #[track_caller]
    pub fn set_error(&self, error: E) {
        self.complete(Err(error));
    }

    /// Producer write. Runs a pending continuation (outside the lock) before
    /// returning; otherwise stores the result and wakes waiters.
    ///
    /// Writing a cell twice is a contract violation.
    #[track_caller]
    pub fn complete(&self, result: Result<T, E>) {
        let mut slot = self.lock();
        match mem::replace(&mut *slot, Slot::Forwarded) {
            Slot::Empty => {
                *slot = match result {
                    Ok(v) => Slot::Value(v),
                    Err(e) => Slot::Error(e),
                };
                drop(slot);
                self.ready.notify_all();
            }
            Slot::Continuation(f) => {
                drop(slot);
                // Nobody should be blocked here, but never strand one who is.
                self.ready.notify_all();
                f(result);
            }
            prev => {
                *slot = prev;
                drop(slot);
                contract::violated("future cell written twice");
            }
        }
    }

    /// Block until the cell is ready.
    ///
    /// Like every blocking query, this is a contract violation on a cell
    /// whose result went to a continuation.
    #[track_caller]
    pub fn wait(&self) {
        drop(self.wait_ready());
    }

    /// Block for at most `timeout`. Does not consume the result.
    #[track_caller]
    pub fn wait_for(&self, timeout: Duration) -> WaitStatus {
        let (slot, res) = self
            .ready
            .wait_timeout_while(self.lock(), timeout, |slot| !slot.is_ready())
            .unwrap_or_else(PoisonError::into_inner);
        if res.timed_out() {
            WaitStatus::Timeout
        } else {
            drop(Self::readable(slot));
            WaitStatus::Ready
        }
    }

    /// Block until `deadline` at the latest. Does not consume the result.
    #[track_caller]
    pub fn wait_until(&self, deadline: Instant) -> WaitStatus {
        self.wait_for(deadline.saturating_duration_since(Instant::now()))
    }

    /// Block until ready, then return a copy of the value or the error.
    /// Repeated calls return the same outcome.
    ///
    /// Calling this on a cell whose result went to a continuation is a
    /// contract violation.
    #[track_caller]
    pub fn get(&self) -> Result<T, E>
    where
        T: Clone,
        E: Clone,
    {
        let slot = self.wait_ready();
        let outcome = match &*slot {
            Slot::Value(v) => Some(Ok(v.clone())),
            Slot::Error(e) => Some(Err(e.clone())),
            _ => None,
        };
        drop(slot);
        match outcome {
            Some(result) => result,
            None => contract::violated("future cell result was handed to a continuation"),
        }
    }

    /// Non-blocking `get`: `None` while the cell is not ready.
    #[track_caller]
    pub fn try_get(&self) -> Option<Result<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        if self.is_ready() {
            Some(self.get())
        } else {
            None
        }
    }

    /// Block until ready; true if the cell holds a value.
    #[track_caller]
    pub fn has_value(&self) -> bool {
        matches!(*self.wait_ready(), Slot::Value(_))
    }

    /// Block until ready; true if the cell holds an error.
    #[track_caller]
    pub fn has_error(&self) -> bool {
        matches!(*self.wait_ready(), Slot::Error(_))
    }

    /// Block until ready; the stored error, if any.
    #[track_caller]
    pub fn error(&self) -> Option<E>
    where
        E: Clone,
    {
        match &*self.wait_ready() {
            Slot::Error(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Register the raw continuation. It receives the result, value or error.
    ///
    /// If the cell is ready, `f` runs now on this thread. Otherwise the next
    /// `set_value`/`set_error` runs it. A second registration is a contract
    /// violation.
    #[track_caller]
    pub fn on_ready<F>(&self, f: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        let mut slot = self.lock();
        match mem::replace(&mut *slot, Slot::Forwarded) {
            Slot::Empty => {
                *slot = Slot::Continuation(Box::new(f));
            }
            Slot::Value(v) => {
                drop(slot);
                f(Ok(v));
            }
            Slot::Error(e) => {
                drop(slot);
                f(Err(e));
            }
            prev => {
                *slot = prev;
                drop(slot);
                contract::violated("future cell already has a continuation");
            }
        }
    }

    /// Chain `f` onto the value. Returns the future of `f`'s own result.
    ///
    /// An error in this cell skips `f` entirely and is forwarded as-is.
    #[track_caller]
    pub fn set_continuation<U, F>(&self, f: F) -> Arc<Promise<U, E>>
    where
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
        U: Send + 'static,
        E: Send + 'static,
    {
        let next = Arc::new(Promise::new());
        let sink = Arc::clone(&next);
        self.on_ready(move |result| match result {
            Ok(value) => sink.complete(f(value)),
            Err(err) => sink.set_error(err),
        });
        next
    }
}

impl<T, E> Promise<Arc<Promise<T, E>>, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Collapse a future of a future into one future, without blocking.
    ///
    /// This cell's continuation slot and the inner cell's continuation slot
    /// are both consumed.
    #[track_caller]
    pub fn flatten(&self) -> Arc<Promise<T, E>> {
        let out = Arc::new(Promise::new());
        let sink = Arc::clone(&out);
        self.on_ready(move |result| match result {
            Ok(inner) => inner.on_ready(move |r| sink.complete(r)),
            Err(err) => sink.set_error(err),
        });
        out
    }
}

impl<T, E> Default for Promise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.lock().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    type Cell = Promise<u32, String>;

    #[test]
    fn value_then_get_is_idempotent() {
        let p = Cell::new();
        assert!(!p.is_ready());
        assert_eq!(p.try_get(), None);
        p.set_value(7);
        assert!(p.is_ready());
        assert_eq!(p.get(), Ok(7));
        assert_eq!(p.get(), Ok(7));
        assert!(p.has_value());
        assert!(!p.has_error());
        assert_eq!(p.error(), None);
    }

    #[test]
    fn error_then_get() {
        let p = Cell::new();
        p.set_error("bad".into());
        assert_eq!(p.get(), Err("bad".to_string()));
        assert_eq!(p.get(), Err("bad".to_string()));
        assert!(p.has_error());
        assert_eq!(p.error(), Some("bad".to_string()));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn second_value_fails_fast() {
        let p = Cell::new();
        p.set_value(1);
        p.set_value(2);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn error_after_value_fails_fast() {
        let p = Cell::new();
        p.set_value(1);
        p.set_error("late".into());
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn second_continuation_fails_fast() {
        let p = Cell::new();
        let _a = p.set_continuation(|v| Ok::<_, String>(v + 1));
        let _b = p.set_continuation(|v| Ok::<_, String>(v + 2));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn write_after_forwarding_fails_fast() {
        let p = Cell::new();
        let _next = p.set_continuation(|v| Ok::<_, String>(v));
        p.set_value(1);
        p.set_value(2);
    }

    #[test]
    fn continuation_on_ready_cell_runs_inline() {
        let p = Cell::ready(20);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let next = p.set_continuation(move |v| {
            flag.store(true, Ordering::SeqCst);
            Ok(v * 2)
        });
        // Inline: already done before set_continuation returned.
        assert!(ran.load(Ordering::SeqCst));
        assert!(next.is_ready());
        assert_eq!(next.get(), Ok(40));
    }

    #[test]
    fn continuation_before_write_runs_inside_the_write() {
        let p = Cell::new();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let next = p.set_continuation(move |v| {
            flag.store(true, Ordering::SeqCst);
            Ok(format!("v={v}"))
        });
        assert!(!ran.load(Ordering::SeqCst));
        assert!(!next.is_ready());

        p.set_value(3);
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(next.get(), Ok("v=3".to_string()));
    }

    #[test]
    fn error_skips_the_transform() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let p = Cell::new();
        let next = p.set_continuation(move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(v)
        });
        p.set_error("upstream".into());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(next.get(), Err("upstream".to_string()));
    }

    #[test]
    fn transform_error_propagates() {
        let p = Cell::ready(1);
        let next = p.set_continuation(|_| Err::<u32, _>("transform".to_string()));
        let last = next.set_continuation(|v| Ok(v + 1));
        assert_eq!(last.get(), Err("transform".to_string()));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn get_after_forwarding_fails_fast() {
        let p = Cell::ready(1);
        let _next = p.set_continuation(|v| Ok::<_, String>(v));
        let _ = p.get();
    }

    fn forwarded() -> Cell {
        let p = Cell::ready(1);
        let _next = p.set_continuation(|v| Ok::<_, String>(v));
        p
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn wait_after_forwarding_fails_fast() {
        forwarded().wait();
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn has_value_after_forwarding_fails_fast() {
        let _ = forwarded().has_value();
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn has_error_after_forwarding_fails_fast() {
        let _ = forwarded().has_error();
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn error_after_forwarding_fails_fast() {
        let _ = forwarded().error();
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn bounded_wait_after_forwarding_fails_fast() {
        let _ = forwarded().wait_for(Duration::from_millis(5));
    }

    #[test]
    fn forwarded_cell_still_reports_ready() {
        let p = forwarded();
        assert!(p.is_ready());
        assert_eq!(format!("{p:?}"), r#"Promise { state: "forwarded" }"#);
    }

    #[test]
    fn bounded_waits_report_status() {
        let p = Cell::new();
        assert_eq!(p.wait_for(Duration::from_millis(5)), WaitStatus::Timeout);
        assert_eq!(p.wait_until(Instant::now()), WaitStatus::Timeout);
        // Still unresolved and still writable after a timeout.
        p.set_value(9);
        assert_eq!(p.wait_for(Duration::from_millis(5)), WaitStatus::Ready);
        assert_eq!(p.wait_until(Instant::now()), WaitStatus::Ready);
        assert_eq!(p.get(), Ok(9));
    }

    #[test]
    fn flatten_waits_for_both_layers() {
        let outer: Promise<Arc<Cell>, String> = Promise::new();
        let flat = outer.flatten();
        let inner = Arc::new(Cell::new());
        outer.set_value(Arc::clone(&inner));
        assert!(!flat.is_ready());
        inner.set_value(5);
        assert_eq!(flat.get(), Ok(5));
    }

    #[test]
    fn flatten_forwards_outer_error() {
        let outer: Promise<Arc<Cell>, String> = Promise::failed("outer".into());
        assert_eq!(outer.flatten().get(), Err("outer".to_string()));
    }

    #[test]
    fn debug_shows_state() {
        let p = Cell::new();
        assert_eq!(format!("{p:?}"), r#"Promise { state: "empty" }"#);
        p.set_value(1);
        assert_eq!(format!("{p:?}"), r#"Promise { state: "value" }"#);
    }
}
