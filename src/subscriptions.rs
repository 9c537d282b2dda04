//! Named ownership of every listener, timer and observer the UI installs.
//! Dropping a handle unsubscribes it, so `teardown` leaves the page clean.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::AnimationFrame;
use gloo::timers::callback::Interval;
use web_sys::{Event, EventTarget};

enum Handle {
    Listener(#[allow(dead_code)] EventListener),
    Interval(#[allow(dead_code)] Interval),
    Frame(#[allow(dead_code)] AnimationFrame),
    Disconnect(Option<Box<dyn FnOnce()>>),
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Handle::Disconnect(disconnect) = self {
            if let Some(disconnect) = disconnect.take() {
                disconnect();
            }
        }
    }
}

struct Subscription {
    name: &'static str,
    #[allow(dead_code)]
    handle: Handle,
}

/// Timers started after binding (count-ups, pending saves), keyed so a new
/// timer can replace an older one. Dropping a timer cancels it.
pub struct TimerPool<T> {
    inner: Rc<RefCell<PoolState<T>>>,
}

struct PoolState<T> {
    next_key: u64,
    live: BTreeMap<u64, T>,
}

impl<T> Clone for TimerPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for TimerPool<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PoolState {
                next_key: 0,
                live: BTreeMap::new(),
            })),
        }
    }
}

impl<T> TimerPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&self) -> u64 {
        let mut state = self.inner.borrow_mut();
        state.next_key += 1;
        state.next_key
    }

    /// Stores `timer` under `key`; a timer already there is cancelled.
    pub fn insert(&self, key: u64, timer: T) {
        let replaced = self.inner.borrow_mut().live.insert(key, timer);
        drop(replaced);
    }

    /// Safe to call from the timer's own callback.
    pub fn remove(&self, key: u64) -> bool {
        let removed = self.inner.borrow_mut().live.remove(&key);
        removed.is_some()
    }

    pub fn clear(&self) {
        let drained = std::mem::take(&mut self.inner.borrow_mut().live);
        drop(drained);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passive listener; the callback cannot cancel the event.
    pub fn listen<F>(&mut self, name: &'static str, target: &EventTarget, event: &'static str, callback: F)
    where
        F: FnMut(&Event) + 'static,
    {
        let listener = EventListener::new(target, event, callback);
        self.push(name, Handle::Listener(listener));
    }

    /// Listener allowed to call `prevent_default` (submit, keydown).
    pub fn listen_cancelable<F>(
        &mut self,
        name: &'static str,
        target: &EventTarget,
        event: &'static str,
        callback: F,
    ) where
        F: FnMut(&Event) + 'static,
    {
        let listener = EventListener::new_with_options(
            target,
            event,
            EventListenerOptions::enable_prevent_default(),
            callback,
        );
        self.push(name, Handle::Listener(listener));
    }

    pub fn hold_interval(&mut self, name: &'static str, interval: Interval) {
        self.push(name, Handle::Interval(interval));
    }

    /// Replaces the frame held under `name`; the previous one is cancelled.
    pub fn hold_frame(&mut self, name: &'static str, frame: AnimationFrame) {
        self.entries.retain(|s| s.name != name);
        self.push(name, Handle::Frame(frame));
    }

    /// Registers a closure that runs once on teardown (observer disconnects and the like).
    pub fn on_teardown<F>(&mut self, name: &'static str, disconnect: F)
    where
        F: FnOnce() + 'static,
    {
        self.push(name, Handle::Disconnect(Some(Box::new(disconnect))));
    }

    /// A pool whose timers are cancelled on teardown.
    pub fn timer_pool<T: 'static>(&mut self, name: &'static str) -> TimerPool<T> {
        let pool = TimerPool::new();
        let owned = pool.clone();
        self.on_teardown(name, move || owned.clear());
        pool
    }

    fn push(&mut self, name: &'static str, handle: Handle) {
        self.entries.push(Subscription { name, handle });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, name: &str) -> usize {
        self.entries.iter().filter(|s| s.name == name).count()
    }

    pub fn teardown(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        log::debug!("released {dropped} subscriptions");
    }
}
