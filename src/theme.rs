use gloo::timers::callback::Interval;
use leptos::prelude::document;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::subscriptions::Subscriptions;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intensity {
    pub cyber: f64,
    pub glow: f64,
}

pub const NIGHT: Intensity = Intensity { cyber: 1.2, glow: 0.8 };
pub const EVENING: Intensity = Intensity { cyber: 1.0, glow: 0.6 };
pub const DAY: Intensity = Intensity { cyber: 0.8, glow: 0.4 };

/// Night runs 22:00–06:59, evening 18:00–21:59, day the rest.
pub fn intensity_for_hour(hour: u32) -> Intensity {
    match hour {
        22..=23 | 0..=6 => NIGHT,
        18..=21 => EVENING,
        _ => DAY,
    }
}

fn root() -> Option<HtmlElement> {
    document()
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn apply(intensity: Intensity) {
    let Some(root) = root() else {
        return;
    };
    let style = root.style();
    let _ = style.set_property("--cyber-intensity", &format!("{:.1}", intensity.cyber));
    let _ = style.set_property("--glow-intensity", &format!("{:.1}", intensity.glow));
}

pub fn refresh() {
    let hour = js_sys::Date::new_0().get_hours();
    apply(intensity_for_hour(hour));
}

/// Applies the current intensity now and again every `period_ms`.
pub fn start(period_ms: u32, subs: &mut Subscriptions) {
    if let Some(root) = root() {
        let now = js_sys::Date::now();
        let _ = root.style().set_property("--current-time", &format!("{now}"));
    }
    refresh();
    subs.hold_interval("theme-clock", Interval::new(period_ms, refresh));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_hours() {
        for hour in [22, 23, 0, 3, 6] {
            assert_eq!(intensity_for_hour(hour), NIGHT, "hour {hour}");
        }
    }

    #[test]
    fn evening_hours() {
        for hour in 18..22 {
            assert_eq!(intensity_for_hour(hour), EVENING, "hour {hour}");
        }
    }

    #[test]
    fn day_hours() {
        for hour in 7..18 {
            assert_eq!(intensity_for_hour(hour), DAY, "hour {hour}");
        }
    }

    #[test]
    fn css_values_render_with_one_decimal() {
        assert_eq!(format!("{:.1}", EVENING.cyber), "1.0");
        assert_eq!(format!("{:.1}", NIGHT.glow), "0.8");
    }
}
