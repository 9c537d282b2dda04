//! Thin helpers over `web_sys` lookups. Misses return `None`/empty so callers
//! can no-op when a page lacks a region.

use leptos::prelude::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

pub fn query_all(selector: &str) -> Vec<Element> {
    query_all_in(&document(), selector)
}

pub fn query_all_in<P: QueryRoot>(parent: &P, selector: &str) -> Vec<Element> {
    let Ok(list) = parent.select_all(selector) else {
        log::debug!("invalid selector {selector}");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok().flatten()
}

/// Common surface of `Document` and `Element` for selector queries.
pub trait QueryRoot {
    fn select_all(&self, selector: &str) -> Result<web_sys::NodeList, wasm_bindgen::JsValue>;
}

impl QueryRoot for web_sys::Document {
    fn select_all(&self, selector: &str) -> Result<web_sys::NodeList, wasm_bindgen::JsValue> {
        self.query_selector_all(selector)
    }
}

impl QueryRoot for Element {
    fn select_all(&self, selector: &str) -> Result<web_sys::NodeList, wasm_bindgen::JsValue> {
        self.query_selector_all(selector)
    }
}

pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property(property, value);
    }
}

pub fn set_css_text(element: &Element, css: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        el.style().set_css_text(css);
    }
}

pub fn add_class(element: &Element, class: &str) {
    let _ = element.class_list().add_1(class);
}

pub fn remove_class(element: &Element, class: &str) {
    let _ = element.class_list().remove_1(class);
}

/// Reads `data-<key>` in its attribute form (`dueDate` → `data-due-date`).
pub fn data_attr(element: &Element, key: &str) -> Option<String> {
    element.get_attribute(&data_attribute_name(key))
}

pub fn data_attribute_name(key: &str) -> String {
    let mut name = String::from("data-");
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            name.push('-');
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

pub fn viewport_size() -> (f64, f64) {
    let window = leptos::prelude::window();
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_keys_map_to_dashed_attributes() {
        assert_eq!(data_attribute_name("date"), "data-date");
        assert_eq!(data_attribute_name("dueDate"), "data-due-date");
        assert_eq!(data_attribute_name("sortKeyName"), "data-sort-key-name");
    }
}
