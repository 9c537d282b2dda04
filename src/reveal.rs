//! Scroll-triggered fade-in and the counting animation on stat values.

use gloo::timers::callback::Interval;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::cards::FADE_IN_CLASS;
use crate::dom;
use crate::error::Result;
use crate::subscriptions::{Subscriptions, TimerPool};

/// Integer prefix of `text`, the way `parseInt` reads it; `0` when absent.
pub fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterAnimation {
    target: f64,
    step: f64,
    current: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, duration_ms: u32, tick_ms: u32) -> Self {
        let ticks = (f64::from(duration_ms) / f64::from(tick_ms.max(1))).max(1.0);
        let target = target as f64;
        Self {
            target,
            step: target / ticks,
            current: 0.0,
        }
    }

    /// Advances one tick; returns the value to display and whether the
    /// animation has reached its target.
    pub fn tick(&mut self) -> (i64, bool) {
        self.current += self.step;
        let done = self.current >= self.target;
        if done {
            self.current = self.target;
        }
        (self.current.floor() as i64, done)
    }
}

fn observer_init(threshold: f64, root_margin: Option<&str>) -> IntersectionObserverInit {
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        init.set_root_margin(margin);
    }
    init
}

/// Observes `targets`, calling `on_visible` for each entry that intersects.
fn observe<F>(
    name: &'static str,
    targets: Vec<Element>,
    init: &IntersectionObserverInit,
    subs: &mut Subscriptions,
    mut on_visible: F,
) -> Result<()>
where
    F: FnMut(&Element, &IntersectionObserver) + 'static,
{
    if targets.is_empty() {
        return Ok(());
    }
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if entry.is_intersecting() {
                    on_visible(&entry.target(), &observer);
                }
            }
        },
    );
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), init)?;
    for target in &targets {
        observer.observe(target);
    }
    subs.on_teardown(name, move || {
        observer.disconnect();
        drop(callback);
    });
    Ok(())
}

pub fn bind_scroll_reveal(selector: &str, subs: &mut Subscriptions) -> Result<()> {
    let init = observer_init(0.1, Some("0px 0px -50px 0px"));
    observe("scroll-reveal", dom::query_all(selector), &init, subs, |target, _| {
        dom::add_class(target, FADE_IN_CLASS);
        let delay = js_sys::Math::random() * 0.5;
        dom::set_style(target, "animation-delay", &format!("{delay}s"));
    })
}

pub fn bind_counters(selector: &str, duration_ms: u32, tick_ms: u32, subs: &mut Subscriptions) -> Result<()> {
    let init = observer_init(0.5, None);
    let ticking = subs.timer_pool::<Interval>("counter-ticks");
    observe("counters", dom::query_all(selector), &init, subs, move |target, observer| {
        observer.unobserve(target);
        animate_counter(target.clone(), duration_ms, tick_ms, &ticking);
    })
}

fn animate_counter(element: Element, duration_ms: u32, tick_ms: u32, ticking: &TimerPool<Interval>) {
    let target = leading_int(&element.text_content().unwrap_or_default());
    let mut counter = CounterAnimation::new(target, duration_ms, tick_ms);
    let key = ticking.next_key();
    let finished = ticking.clone();
    let interval = Interval::new(tick_ms, move || {
        let (value, done) = counter.tick();
        element.set_text_content(Some(&value.to_string()));
        if done {
            finished.remove(key);
        }
    });
    ticking.insert(key, interval);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_prefix() {
        assert_eq!(leading_int("42"), 42);
        assert_eq!(leading_int("  17 días"), 17);
        assert_eq!(leading_int("-3"), -3);
        assert_eq!(leading_int("3.9"), 3);
        assert_eq!(leading_int("racha"), 0);
        assert_eq!(leading_int(""), 0);
    }

    #[test]
    fn counter_reaches_target_exactly() {
        let mut counter = CounterAnimation::new(100, 2000, 16);
        let mut last = (0, false);
        let mut ticks = 0;
        while !last.1 {
            last = counter.tick();
            ticks += 1;
            assert!(last.0 <= 100);
            assert!(ticks <= 200, "counter never finished");
        }
        assert_eq!(last.0, 100);
        assert!((120..=130).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn counter_values_never_decrease() {
        let mut counter = CounterAnimation::new(7, 2000, 16);
        let mut previous = 0;
        loop {
            let (value, done) = counter.tick();
            assert!(value >= previous);
            previous = value;
            if done {
                break;
            }
        }
        assert_eq!(previous, 7);
    }

    #[test]
    fn zero_target_finishes_immediately() {
        let mut counter = CounterAnimation::new(0, 2000, 16);
        assert_eq!(counter.tick(), (0, true));
    }
}
