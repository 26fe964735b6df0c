#![forbid(unsafe_code)]

//! Timer subscriptions.
//!
//! A model declares the event sources it currently wants as a set of
//! subscriptions; after every update the runtime reconciles that set against
//! what is running: new ids start, missing ids stop, unchanged ids keep
//! their thread. The splash screen uses this for its animation tick and the
//! clock screen for its readout cadence (which changes with the view mode,
//! so reconciliation is what swaps the 1 s ticker for the 100 ms one).

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Identifier used to deduplicate subscriptions across update cycles.
pub type SubId = u64;

/// A continuous message source running on a background thread.
pub trait Subscription<M: Send + 'static>: Send {
    /// Stable identifier; equal ids are considered the same subscription.
    fn id(&self) -> SubId;

    /// Produce messages until the channel closes or `stop` fires.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal);
}

/// Cooperative stop flag shared between the runtime and a subscription
/// thread. The thread parks on [`StopSignal::wait_timeout`] instead of
/// sleeping so a stop wakes it immediately.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    /// Trip the flag and wake every waiter.
    fn stop(&self) {
        let (flag, cvar) = &*self.inner;
        let mut stopped = flag.lock().expect("stop flag poisoned");
        *stopped = true;
        cvar.notify_all();
    }

    /// Whether the flag has been tripped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock().expect("stop flag poisoned")
    }

    /// Park for up to `duration`. Returns `true` if the signal fired,
    /// `false` on timeout. Loops over spurious wakeups.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let start = Instant::now();
        let mut stopped = flag.lock().expect("stop flag poisoned");
        loop {
            if *stopped {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            let (guard, _) = cvar
                .wait_timeout(stopped, duration - elapsed)
                .expect("stop flag poisoned");
            stopped = guard;
        }
    }
}

/// A subscription that emits a message at a fixed interval.
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    /// Create an interval subscription with an explicit id.
    ///
    /// Ids are chosen by the caller so that two logically different tickers
    /// with the same interval stay distinct.
    pub fn new(id: SubId, interval: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self {
            id,
            interval,
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        // Interval participates so switching cadence restarts the ticker.
        self.id ^ (self.interval.as_nanos() as u64).rotate_left(17)
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        loop {
            if stop.wait_timeout(self.interval) {
                return;
            }
            if sender.send((self.make_msg)()).is_err() {
                return;
            }
        }
    }
}

/// A started subscription: its stop handle and thread.
struct Running {
    id: SubId,
    signal: StopSignal,
    thread: Option<thread::JoinHandle<()>>,
}

impl Running {
    fn stop(mut self) {
        self.signal.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        // Wake the thread but do not block on join here.
        self.signal.stop();
    }
}

/// Tracks running subscriptions and reconciles them against the declared set.
pub struct SubscriptionManager<M: Send + 'static> {
    active: Vec<Running>,
    sender: mpsc::Sender<M>,
}

impl<M: Send + 'static> SubscriptionManager<M> {
    /// Create a manager that feeds messages into `sender`.
    pub fn new(sender: mpsc::Sender<M>) -> Self {
        Self {
            active: Vec::new(),
            sender,
        }
    }

    /// Start newly declared subscriptions, stop undeclared ones, leave the
    /// rest running.
    pub fn reconcile(&mut self, declared: Vec<Box<dyn Subscription<M>>>) {
        let wanted: HashSet<SubId> = declared.iter().map(|s| s.id()).collect();

        let mut kept = Vec::with_capacity(self.active.len());
        for running in self.active.drain(..) {
            if wanted.contains(&running.id) {
                kept.push(running);
            } else {
                debug!(sub_id = running.id, "stopping subscription");
                running.stop();
            }
        }
        self.active = kept;

        let mut have: HashSet<SubId> = self.active.iter().map(|r| r.id).collect();
        for sub in declared {
            let id = sub.id();
            if !have.insert(id) {
                continue;
            }
            debug!(sub_id = id, "starting subscription");
            let signal = StopSignal::new();
            let thread_signal = signal.clone();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, thread_signal));
            self.active.push(Running {
                id,
                signal,
                thread: Some(thread),
            });
        }
    }

    /// Number of running subscriptions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Stop everything (end of program).
    pub fn stop_all(&mut self) {
        for running in self.active.drain(..) {
            running.stop();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
