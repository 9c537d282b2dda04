//! Bootstrap-facing extras: modal transitions, tooltips, keyboard shortcuts
//! and the calendar hook. Bootstrap itself is optional; without it the
//! related behaviour is skipped.

use js_sys::{Function, Reflect};
use leptos::prelude::{document, window};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, KeyboardEvent};

use crate::dom;
use crate::subscriptions::Subscriptions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    QuickSearch,
    NewEntry,
    CloseOverlays,
}

impl Shortcut {
    pub fn from_key(key: &str, ctrl: bool, meta: bool) -> Option<Self> {
        let command = ctrl || meta;
        match key {
            "k" if command => Some(Self::QuickSearch),
            "n" if command => Some(Self::NewEntry),
            "Escape" => Some(Self::CloseOverlays),
            _ => None,
        }
    }

    /// Custom event dispatched on `document` so templates can react.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::QuickSearch => "diario:quick-search",
            Self::NewEntry => "diario:new-entry",
            Self::CloseOverlays => "diario:close-overlays",
        }
    }

    pub fn prevents_default(self) -> bool {
        !matches!(self, Self::CloseOverlays)
    }
}

pub fn bind_shortcuts(subs: &mut Subscriptions) {
    subs.listen_cancelable("shortcuts", &document(), "keydown", |event| {
        let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let Some(shortcut) =
            Shortcut::from_key(&key_event.key(), key_event.ctrl_key(), key_event.meta_key())
        else {
            return;
        };
        if shortcut.prevents_default() {
            event.prevent_default();
        }
        log::debug!("shortcut {shortcut:?}");
        if shortcut == Shortcut::CloseOverlays {
            close_all_overlays();
        }
        if let Ok(custom) = CustomEvent::new(shortcut.event_name()) {
            let _ = document().dispatch_event(&custom);
        }
    });
}

fn bootstrap_member(name: &str) -> Option<Function> {
    let bootstrap = Reflect::get(&window(), &JsValue::from_str("bootstrap")).ok()?;
    if bootstrap.is_undefined() || bootstrap.is_null() {
        return None;
    }
    Reflect::get(&bootstrap, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn close_all_overlays() {
    let Some(modal_class) = bootstrap_member("Modal") else {
        return;
    };
    let Some(get_instance) = Reflect::get(&modal_class, &JsValue::from_str("getInstance"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        return;
    };
    for modal in dom::query_all(".modal.show") {
        let Ok(instance) = get_instance.call1(&modal_class, &modal) else {
            continue;
        };
        if instance.is_null() || instance.is_undefined() {
            continue;
        }
        let hide = Reflect::get(&instance, &JsValue::from_str("hide"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());
        if let Some(hide) = hide {
            let _ = hide.call0(&instance);
        }
    }
}

pub fn bind_modals(selector: &str, subs: &mut Subscriptions) {
    for modal in dom::query_all(selector) {
        let shown = modal.clone();
        subs.listen("modal", &modal, "show.bs.modal", move |_| {
            dom::set_style(&shown, "backdrop-filter", "blur(10px)");
            if let Ok(Some(dialog)) = shown.query_selector(".modal-dialog") {
                dom::set_style(&dialog, "animation", "modalSlideIn 0.5s ease-out");
            }
        });
        let hidden = modal.clone();
        subs.listen("modal", &modal, "hide.bs.modal", move |_| {
            if let Ok(Some(dialog)) = hidden.query_selector(".modal-dialog") {
                dom::set_style(&dialog, "animation", "modalSlideOut 0.5s ease-out");
            }
        });
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TooltipOptions {
    custom_class: &'static str,
}

/// Returns how many tooltips were created.
pub fn init_tooltips(selector: &str) -> usize {
    let targets = dom::query_all(selector);
    if targets.is_empty() {
        return 0;
    }
    let Some(tooltip) = bootstrap_member("Tooltip") else {
        log::debug!("bootstrap not loaded; {} tooltips left native", targets.len());
        return 0;
    };
    let Ok(options) = serde_wasm_bindgen::to_value(&TooltipOptions {
        custom_class: "cyber-tooltip",
    }) else {
        return 0;
    };
    targets
        .iter()
        .filter(|el| Reflect::construct(&tooltip, &js_sys::Array::of2(el, &options)).is_ok())
        .count()
}

pub fn init_calendar(selector: &str) {
    if dom::query(selector).is_some() {
        log::info!("calendar container present; waiting for the calendar library");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shortcuts_need_modifier() {
        assert_eq!(Shortcut::from_key("k", true, false), Some(Shortcut::QuickSearch));
        assert_eq!(Shortcut::from_key("k", false, true), Some(Shortcut::QuickSearch));
        assert_eq!(Shortcut::from_key("n", true, false), Some(Shortcut::NewEntry));
        assert_eq!(Shortcut::from_key("k", false, false), None);
        assert_eq!(Shortcut::from_key("x", true, false), None);
    }

    #[test]
    fn escape_works_alone_and_keeps_default() {
        let shortcut = Shortcut::from_key("Escape", false, false).unwrap();
        assert_eq!(shortcut, Shortcut::CloseOverlays);
        assert!(!shortcut.prevents_default());
        assert!(Shortcut::NewEntry.prevents_default());
    }

    #[test]
    fn event_names_are_namespaced() {
        assert_eq!(Shortcut::QuickSearch.event_name(), "diario:quick-search");
        assert_eq!(Shortcut::NewEntry.event_name(), "diario:new-entry");
    }
}
