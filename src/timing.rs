//! Debounce and throttle wrappers over a cancellable task scheduler.
//!
//! DESIGN
//! ======
//! Timers are reached through [`Scheduler`] so wrappers can run against the
//! browser event loop (`browser::TimeoutScheduler`) or a virtual clock
//! ([`ManualScheduler`]) that tests advance by hand. A scheduled task is
//! cancelled by dropping its handle, matching `gloo_timers::callback::Timeout`.

#[cfg(test)]
#[path = "timing_test.rs"]
mod timing_test;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// One-shot delayed callbacks on the current thread.
pub trait Scheduler: Clone + 'static {
    /// Handle to a pending task. Dropping it cancels the task if it has not
    /// run yet.
    type Task: 'static;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Task;
}

// =============================================================
// Debounce
// =============================================================

struct DebounceInner<A, S: Scheduler> {
    func: Rc<dyn Fn(A)>,
    wait_ms: u32,
    scheduler: S,
    /// Latest task plus a flag the task sets once it has run.
    pending: RefCell<Option<(S::Task, Rc<Cell<bool>>)>>,
}

/// Trailing-edge debounced callable returned by [`debounce`].
pub struct Debounced<A, S: Scheduler> {
    inner: Rc<DebounceInner<A, S>>,
}

impl<A, S: Scheduler> Clone for Debounced<A, S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

/// Wrap `func` so it runs only after `wait_ms` passed without another call.
///
/// Each call restarts the delay; the eventual invocation receives the
/// arguments of the last call.
pub fn debounce<A, S, F>(scheduler: &S, wait_ms: u32, func: F) -> Debounced<A, S>
where
    A: 'static,
    S: Scheduler,
    F: Fn(A) + 'static,
{
    Debounced {
        inner: Rc::new(DebounceInner {
            func: Rc::new(func),
            wait_ms,
            scheduler: scheduler.clone(),
            pending: RefCell::new(None),
        }),
    }
}

impl<A: 'static, S: Scheduler> Debounced<A, S> {
    pub fn call(&self, args: A) {
        let func = Rc::clone(&self.inner.func);
        let ran = Rc::new(Cell::new(false));
        let ran_in_task = Rc::clone(&ran);
        let task = self.inner.scheduler.schedule(
            self.inner.wait_ms,
            Box::new(move || {
                ran_in_task.set(true);
                func(args);
            }),
        );
        // Dropping the previous handle cancels its task.
        let previous = self.inner.pending.replace(Some((task, ran)));
        drop(previous);
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        let previous = self.inner.pending.borrow_mut().take();
        drop(previous);
    }

    /// Whether a call is still waiting for its quiet period to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().as_ref().is_some_and(|(_, ran)| !ran.get())
    }
}

// =============================================================
// Throttle
// =============================================================

struct ThrottleInner<A, S: Scheduler> {
    func: Box<dyn Fn(A)>,
    limit_ms: u32,
    scheduler: S,
    cooling: Cell<bool>,
    cooldown: RefCell<Option<S::Task>>,
}

/// Leading-edge throttled callable returned by [`throttle`].
pub struct Throttled<A, S: Scheduler> {
    inner: Rc<ThrottleInner<A, S>>,
}

impl<A, S: Scheduler> Clone for Throttled<A, S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

/// Wrap `func` so it runs at most once per `limit_ms`.
///
/// A call outside the cooldown runs immediately and starts a new cooldown;
/// calls inside it are dropped, not queued.
pub fn throttle<A, S, F>(scheduler: &S, limit_ms: u32, func: F) -> Throttled<A, S>
where
    A: 'static,
    S: Scheduler,
    F: Fn(A) + 'static,
{
    Throttled {
        inner: Rc::new(ThrottleInner {
            func: Box::new(func),
            limit_ms,
            scheduler: scheduler.clone(),
            cooling: Cell::new(false),
            cooldown: RefCell::new(None),
        }),
    }
}

impl<A: 'static, S: Scheduler> Throttled<A, S> {
    /// Returns whether `func` ran for this call.
    pub fn call(&self, args: A) -> bool {
        if self.inner.cooling.replace(true) {
            return false;
        }
        (self.inner.func)(args);

        let weak: Weak<ThrottleInner<A, S>> = Rc::downgrade(&self.inner);
        let task = self.inner.scheduler.schedule(
            self.inner.limit_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.cooling.set(false);
                }
            }),
        );
        let previous = self.inner.cooldown.replace(Some(task));
        drop(previous);
        true
    }

    #[must_use]
    pub fn is_cooling(&self) -> bool {
        self.inner.cooling.get()
    }
}

// =============================================================
// Virtual clock
// =============================================================

type TaskKey = (u64, u64);

#[derive(Default)]
struct ClockInner {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    queue: RefCell<BTreeMap<TaskKey, Box<dyn FnOnce()>>>,
}

/// Scheduler driven by [`ManualScheduler::advance`] instead of wall time.
///
/// Tasks due at the same instant run in scheduling order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<ClockInner>,
}

/// Handle returned by [`ManualScheduler::schedule`].
pub struct ManualTask {
    key: TaskKey,
    clock: Weak<ClockInner>,
}

impl Drop for ManualTask {
    fn drop(&mut self) {
        let Some(clock) = self.clock.upgrade() else {
            return;
        };
        // Bind first so the queue borrow ends before the task's captures drop.
        let removed = clock.queue.borrow_mut().remove(&self.key);
        drop(removed);
    }
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds elapsed on the virtual clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.inner.now_ms.get()
    }

    /// Number of tasks scheduled and not yet run or cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Move the clock forward by `ms`, running every task that comes due,
    /// including tasks scheduled by tasks within the window.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms().saturating_add(ms);
        loop {
            let next = {
                let mut queue = self.inner.queue.borrow_mut();
                let due = queue.first_key_value().map(|(&(due, _), _)| due);
                if due.is_some_and(|due| due <= target) { queue.pop_first() } else { None }
            };
            let Some(((due, _), task)) = next else {
                break;
            };
            self.inner.now_ms.set(due);
            task();
        }
        self.inner.now_ms.set(target);
    }
}

impl Scheduler for ManualScheduler {
    type Task = ManualTask;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualTask {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let key = (self.now_ms() + u64::from(delay_ms), id);
        self.inner.queue.borrow_mut().insert(key, task);
        ManualTask { key, clock: Rc::downgrade(&self.inner) }
    }
}
