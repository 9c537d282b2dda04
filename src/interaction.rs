use gloo::timers::callback::Timeout;
use leptos::prelude::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MouseEvent};

use crate::dom;
use crate::subscriptions::Subscriptions;

pub const CARD_LIFT: &str = "translateY(-8px) scale(1.02)";
pub const CARD_REST: &str = "translateY(0) scale(1)";
const CARD_HOVER_SHADOW: &str = "0 0 40px rgba(0, 255, 255, 0.4)";
const CARD_REST_SHADOW: &str = "0 0 20px rgba(0, 255, 255, 0.3)";
pub const BUTTON_LIFT: &str = "translateY(-3px) scale(1.05)";
const TILT_DIVISOR: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    fn of(element: &Element) -> Self {
        let r = element.get_bounding_client_rect();
        Self {
            left: r.left(),
            top: r.top(),
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Lift plus a tilt proportional to the pointer's offset from the card centre.
pub fn tilt_transform(rect: Rect, client_x: f64, client_y: f64) -> String {
    let x = client_x - rect.left;
    let y = client_y - rect.top;
    let rotate_x = (y - rect.height / 2.0) / TILT_DIVISOR;
    let rotate_y = (rect.width / 2.0 - x) / TILT_DIVISOR;
    format!("{CARD_LIFT} rotateX({rotate_x}deg) rotateY({rotate_y}deg)")
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

/// A square ripple as large as the card's longest side, centred on the pointer.
pub fn ripple_geometry(rect: Rect, client_x: f64, client_y: f64) -> RippleGeometry {
    let size = rect.width.max(rect.height);
    RippleGeometry {
        size,
        left: client_x - rect.left - size / 2.0,
        top: client_y - rect.top - size / 2.0,
    }
}

fn ripple_css(g: RippleGeometry) -> String {
    format!(
        "position: absolute; width: {size}px; height: {size}px; left: {left}px; top: {top}px; \
         background: radial-gradient(circle, rgba(0, 255, 255, 0.3) 0%, transparent 70%); \
         border-radius: 50%; pointer-events: none; animation: ripple 0.8s ease-out forwards; z-index: 1;",
        size = g.size,
        left = g.left,
        top = g.top,
    )
}

const GLOW_CSS: &str = "position: absolute; top: -2px; left: -2px; right: -2px; bottom: -2px; \
     background: linear-gradient(45deg, #00ffff, #ff00ff, #00ff00, #ffff00); border-radius: inherit; \
     z-index: -1; opacity: 0.7; filter: blur(8px); animation: buttonGlow 2s ease-in-out infinite;";

/// Appends a decorative child that removes itself after `lifetime_ms`.
fn spawn_transient(host: &Element, class: Option<&str>, css: &str, lifetime_ms: u32) {
    let Ok(node) = document().create_element("div") else {
        return;
    };
    if let Some(class) = class {
        node.set_class_name(class);
    }
    dom::set_css_text(&node, css);
    dom::set_style(host, "position", "relative");
    if host.append_child(&node).is_err() {
        return;
    }
    Timeout::new(lifetime_ms, move || node.remove()).forget();
}

#[derive(Clone, Copy, Debug)]
pub struct InteractionEffects {
    pub ripple_ms: u32,
    pub glow_ms: u32,
}

impl InteractionEffects {
    pub fn bind_cards(&self, selector: &str, subs: &mut Subscriptions) {
        for card in dom::query_all(selector) {
            let effects = *self;
            let target = card.clone();
            subs.listen("card-hover", &card, "mouseenter", move |event| {
                effects.card_enter(&target, event);
            });
            let target = card.clone();
            subs.listen("card-hover", &card, "mouseleave", move |_| {
                dom::set_style(&target, "transform", CARD_REST);
                dom::set_style(&target, "box-shadow", CARD_REST_SHADOW);
            });
            let target = card.clone();
            subs.listen("card-tilt", &card, "mousemove", move |event| {
                if let Some((x, y)) = pointer(event) {
                    dom::set_style(&target, "transform", &tilt_transform(Rect::of(&target), x, y));
                }
            });
        }
    }

    pub fn bind_buttons(&self, selector: &str, subs: &mut Subscriptions) {
        for button in dom::query_all(selector) {
            let glow_ms = self.glow_ms;
            let target = button.clone();
            subs.listen("button-hover", &button, "mouseenter", move |_| {
                dom::set_style(&target, "transform", BUTTON_LIFT);
                spawn_transient(&target, Some("button-glow"), GLOW_CSS, glow_ms);
            });
            let target = button.clone();
            subs.listen("button-hover", &button, "mouseleave", move |_| {
                dom::set_style(&target, "transform", CARD_REST);
            });
        }
    }

    fn card_enter(&self, card: &Element, event: &Event) {
        dom::set_style(card, "transform", CARD_LIFT);
        dom::set_style(card, "box-shadow", CARD_HOVER_SHADOW);
        if let Some((x, y)) = pointer(event) {
            let geometry = ripple_geometry(Rect::of(card), x, y);
            spawn_transient(card, None, &ripple_css(geometry), self.ripple_ms);
        }
    }
}

fn pointer(event: &Event) -> Option<(f64, f64)> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|e| (f64::from(e.client_x()), f64::from(e.client_y())))
}
