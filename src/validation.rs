use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::dom;
use crate::notifications::{NotificationCenter, NotificationKind};
use crate::subscriptions::Subscriptions;

pub const ERROR_CLASS: &str = "error";
pub const ERROR_NODE_CLASS: &str = "field-error";
const ERROR_NODE_STYLE: &str =
    "color: #ff0040; font-size: 0.8rem; margin-top: 0.25rem; animation: shake 0.5s ease-in-out;";
const FORM_INVALID_MESSAGE: &str = "Por favor, completa todos los campos requeridos";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Este campo es requerido")]
    Required,
    #[error("Ingresa un email válido")]
    InvalidEmail,
    #[error("Ingresa una URL válida")]
    InvalidUrl,
    #[error("Ingresa un número válido")]
    InvalidNumber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Url,
    Number,
    Other,
}

impl FieldKind {
    pub fn from_type(input_type: &str) -> Self {
        match input_type.to_ascii_lowercase().as_str() {
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "number" => FieldKind::Number,
            _ => FieldKind::Other,
        }
    }
}

/// Applies the rules in order; the first failure is reported.
pub fn check(kind: FieldKind, required: bool, raw: &str) -> Result<(), ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return if required {
            Err(ValidationError::Required)
        } else {
            Ok(())
        };
    }
    match kind {
        FieldKind::Email if !is_email(value) => Err(ValidationError::InvalidEmail),
        FieldKind::Url if !is_http_url(value) => Err(ValidationError::InvalidUrl),
        FieldKind::Number if !is_numeric(value) => Err(ValidationError::InvalidNumber),
        _ => Ok(()),
    }
}

pub fn is_email(value: &str) -> bool {
    static RE_EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = RE_EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(value)
}

pub fn is_http_url(value: &str) -> bool {
    static RE_URL: OnceLock<Regex> = OnceLock::new();
    let re = RE_URL.get_or_init(|| Regex::new(r"^https?://.+").unwrap());
    re.is_match(value)
}

/// Numeric literal as the browser's `Number()` coercion accepts it.
pub fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    let unsigned = value.trim_start_matches(['+', '-']);
    if value.len() - unsigned.len() > 1 {
        return false;
    }
    if unsigned == "Infinity" {
        return true;
    }
    // Rust also accepts "inf"/"nan" spellings; coercion does not.
    if unsigned
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')))
    {
        return false;
    }
    unsigned.parse::<f64>().is_ok()
}

fn field_value(field: &Element) -> Option<String> {
    if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    field.dyn_ref::<HtmlSelectElement>().map(|s| s.value())
}

fn field_kind(field: &Element) -> FieldKind {
    field
        .dyn_ref::<HtmlInputElement>()
        .map(|input| FieldKind::from_type(&input.type_()))
        .unwrap_or(FieldKind::Other)
}

/// Field-level and form-level validation with inline error nodes.
#[derive(Clone, Copy)]
pub struct FormValidator {
    notifications: NotificationCenter,
}

impl FormValidator {
    pub fn new(notifications: NotificationCenter) -> Self {
        Self { notifications }
    }

    pub fn validate_field(&self, field: &Element) -> bool {
        let Some(value) = field_value(field) else {
            return true;
        };
        clear_field_error(field);
        match check(field_kind(field), field.has_attribute("required"), &value) {
            Ok(()) => true,
            Err(err) => {
                show_field_error(field, &err.to_string());
                false
            }
        }
    }

    /// Validates every required field of the submitted form and cancels the
    /// submission if any of them fails.
    pub fn validate_form(&self, event: &Event) -> bool {
        let Some(form) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return true;
        };
        let valid = dom::query_all_in(&form, "[required]")
            .iter()
            .fold(true, |ok, field| self.validate_field(field) && ok);
        if !valid {
            event.prevent_default();
            self.notifications
                .show_with(FORM_INVALID_MESSAGE, NotificationKind::Error, None);
        }
        valid
    }

    pub fn bind(&self, selector: &str, subs: &mut Subscriptions) {
        for form in dom::query_all(selector) {
            let validator = *self;
            subs.listen_cancelable("form-submit", &form, "submit", move |event| {
                validator.validate_form(event);
            });
            for field in dom::query_all_in(&form, "input, textarea, select") {
                let validator = *self;
                let blurred = field.clone();
                subs.listen("field-blur", &field, "blur", move |_| {
                    validator.validate_field(&blurred);
                });
                let edited = field.clone();
                subs.listen("field-input", &field, "input", move |_| {
                    clear_field_error(&edited);
                });
            }
        }
    }
}

pub fn show_field_error(field: &Element, message: &str) {
    dom::add_class(field, ERROR_CLASS);
    let Some(parent) = field.parent_element() else {
        return;
    };
    let existing = parent
        .query_selector(&format!(".{ERROR_NODE_CLASS}"))
        .ok()
        .flatten();
    let node = match existing {
        Some(node) => node,
        None => {
            let Ok(node) = leptos::prelude::document().create_element("div") else {
                return;
            };
            node.set_class_name(ERROR_NODE_CLASS);
            let _ = parent.append_child(&node);
            node
        }
    };
    node.set_text_content(Some(message));
    dom::set_css_text(&node, ERROR_NODE_STYLE);
}

pub fn clear_field_error(field: &Element) {
    dom::remove_class(field, ERROR_CLASS);
    if let Some(parent) = field.parent_element() {
        if let Ok(Some(node)) = parent.query_selector(&format!(".{ERROR_NODE_CLASS}")) {
            node.remove();
        }
    }
}

const FOCUS_INPUT_SHADOW: &str = "0 0 20px rgba(0, 255, 255, 0.5)";
const BLUR_INPUT_SHADOW: &str = "0 0 15px rgba(0, 255, 255, 0.4)";

/// Glow on `.cyber-form-control` and its sibling label while focused.
pub fn bind_focus_effects(selector: &str, subs: &mut Subscriptions) {
    for input in dom::query_all(selector) {
        for (event, focused) in [("focus", true), ("blur", false)] {
            let target = input.clone();
            subs.listen("form-focus", &input, event, move |_| {
                apply_focus_style(&target, focused);
            });
        }
    }
}

fn apply_focus_style(input: &Element, focused: bool) {
    let (shadow, color, text_shadow) = if focused {
        (FOCUS_INPUT_SHADOW, "#00ffff", "0 0 10px rgba(0, 255, 255, 0.5)")
    } else {
        (BLUR_INPUT_SHADOW, "#4dd0e1", "0 0 5px rgba(0, 255, 255, 0.3)")
    };
    dom::set_style(input, "box-shadow", shadow);
    let label = input
        .parent_element()
        .and_then(|p| p.query_selector(".cyber-form-label").ok().flatten());
    if let Some(label) = label {
        dom::set_style(&label, "color", color);
        dom::set_style(&label, "text-shadow", text_shadow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_empty_fails_first() {
        assert_eq!(check(FieldKind::Email, true, "   "), Err(ValidationError::Required));
        assert_eq!(check(FieldKind::Other, true, ""), Err(ValidationError::Required));
        assert_eq!(check(FieldKind::Email, false, ""), Ok(()));
    }

    #[test]
    fn email_rule() {
        for good in ["a@b.co", "marco.aurelio@roma.it", "x+y@sub.domain.org"] {
            assert_eq!(check(FieldKind::Email, true, good), Ok(()), "{good}");
        }
        for bad in ["plain", "a@b", "@b.co", "a b@c.d", "a@b c.d", "a@@b.co"] {
            assert_eq!(
                check(FieldKind::Email, false, bad),
                Err(ValidationError::InvalidEmail),
                "{bad}"
            );
        }
    }

    #[test]
    fn email_is_checked_on_trimmed_value() {
        assert_eq!(check(FieldKind::Email, false, "  a@b.co  "), Ok(()));
    }

    #[test]
    fn url_rule_requires_http_scheme() {
        assert_eq!(check(FieldKind::Url, false, "https://stoa.org"), Ok(()));
        assert_eq!(check(FieldKind::Url, false, "http://x"), Ok(()));
        assert_eq!(
            check(FieldKind::Url, false, "ftp://stoa.org"),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            check(FieldKind::Url, false, "https://"),
            Err(ValidationError::InvalidUrl)
        );
    }

    #[test]
    fn number_rule_follows_coercion() {
        for good in ["42", "-3.5", "1e3", ".5", "1.", "Infinity", "-Infinity", "0x1F", "0b101"] {
            assert!(is_numeric(good), "{good}");
        }
        for bad in ["abc", "12abc", "inf", "NaN", "1_000", "--1", "0x", "0xZZ"] {
            assert!(!is_numeric(bad), "{bad}");
        }
        let long_hex = format!("0x{}", "F".repeat(40));
        assert!(is_numeric(&long_hex));
        assert!(is_numeric(&format!("0b{}", "1".repeat(200))));
        assert!(!is_numeric("0o78"));
        assert_eq!(
            check(FieldKind::Number, true, "diez"),
            Err(ValidationError::InvalidNumber)
        );
    }

    #[test]
    fn other_types_only_check_presence() {
        assert_eq!(check(FieldKind::Other, true, "anything"), Ok(()));
        assert_eq!(FieldKind::from_type("EMAIL"), FieldKind::Email);
        assert_eq!(FieldKind::from_type("textarea"), FieldKind::Other);
    }
}
