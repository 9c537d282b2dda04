use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlSelectElement};

use crate::dom;
use crate::subscriptions::Subscriptions;

pub const FILTER_ALL: &str = "all";
pub const EXPANDED_CLASS: &str = "expanded";
pub const ACTIVE_CLASS: &str = "active";
pub const FADE_IN_CLASS: &str = "animate-fade-in";

pub fn filter_matches(filter: &str, category: Option<&str>) -> bool {
    filter == FILTER_ALL || category == Some(filter)
}

/// Body styles for a card in the given state: `(max-height, opacity)`.
pub fn expansion_style(expanded: bool, scroll_height: i32) -> (String, &'static str) {
    if expanded {
        (format!("{scroll_height}px"), "1")
    } else {
        ("0".to_string(), "0")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Field(String),
}

impl SortKey {
    pub fn parse(key: &str) -> Self {
        if key == "date" {
            Self::Date
        } else {
            Self::Field(key.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Date => "date",
            Self::Field(name) => name,
        }
    }
}

/// Accepts the date shapes the diary templates emit.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Stable ordering of `values` by `key`: dates newest first with
/// unparseable ones last, anything else ascending through `text_order`.
pub fn sort_order<F>(key: &SortKey, values: &[String], text_order: F) -> Vec<usize>
where
    F: Fn(&str, &str) -> Ordering,
{
    let mut order: Vec<usize> = (0..values.len()).collect();
    match key {
        SortKey::Date => {
            let dates: Vec<Option<NaiveDateTime>> = values.iter().map(|v| parse_date(v)).collect();
            order.sort_by(|&a, &b| match (dates[a], dates[b]) {
                (Some(da), Some(db)) => db.cmp(&da),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        SortKey::Field(_) => order.sort_by(|&a, &b| text_order(&values[a], &values[b])),
    }
    order
}

fn locale_compare(a: &str, b: &str) -> Ordering {
    js_sys::JsString::from(a)
        .locale_compare(b, &js_sys::Array::new(), &js_sys::Object::new())
        .cmp(&0)
}

fn sort_value(card: &Element, key: &SortKey) -> String {
    dom::data_attr(card, key.name())
        .filter(|v| !v.is_empty())
        .or_else(|| card.text_content())
        .unwrap_or_default()
}

pub struct CardController;

impl CardController {
    pub fn bind_expansion(selector: &str, subs: &mut Subscriptions) {
        for card in dom::query_all(selector) {
            let Ok(Some(header)) = card.query_selector(".cyber-card-header") else {
                continue;
            };
            dom::set_style(&header, "cursor", "pointer");
            subs.listen("card-expand", &header, "click", move |_| {
                Self::toggle_expansion(&card);
            });
        }
    }

    pub fn toggle_expansion(card: &Element) {
        let Ok(Some(body)) = card.query_selector(".cyber-card-body") else {
            return;
        };
        let expanding = !card.class_list().contains(EXPANDED_CLASS);
        let (max_height, opacity) = expansion_style(expanding, body.scroll_height());
        dom::set_style(&body, "max-height", &max_height);
        dom::set_style(&body, "opacity", opacity);
        if expanding {
            dom::add_class(card, EXPANDED_CLASS);
        } else {
            dom::remove_class(card, EXPANDED_CLASS);
        }
    }

    pub fn bind_filters(selector: &str, subs: &mut Subscriptions) {
        for control in dom::query_all(selector) {
            let clicked = control.clone();
            subs.listen("card-filter", &control, "click", move |_| {
                let filter = dom::data_attr(&clicked, "filter").unwrap_or_default();
                Self::filter(&filter);
                Self::mark_active_filter(&clicked);
            });
        }
    }

    pub fn filter(filter: &str) {
        for card in dom::query_all("[data-category]") {
            let category = dom::data_attr(&card, "category");
            if filter_matches(filter, category.as_deref()) {
                dom::set_style(&card, "display", "block");
                dom::add_class(&card, FADE_IN_CLASS);
            } else {
                dom::set_style(&card, "display", "none");
            }
        }
    }

    fn mark_active_filter(active: &Element) {
        for control in dom::query_all("[data-filter]") {
            dom::remove_class(&control, ACTIVE_CLASS);
        }
        dom::add_class(active, ACTIVE_CLASS);
    }

    pub fn bind_sorting(selector: &str, subs: &mut Subscriptions) {
        let Some(select) = dom::query(selector) else {
            return;
        };
        let changed = select.clone();
        subs.listen("card-sort", &select, "change", move |_| {
            if let Some(select) = changed.dyn_ref::<HtmlSelectElement>() {
                Self::sort(&SortKey::parse(&select.value()));
            }
        });
    }

    pub fn sort(key: &SortKey) {
        let Some(container) = dom::query("[data-sortable-container]") else {
            return;
        };
        let cards = dom::query_all_in(&container, "[data-sortable]");
        let values: Vec<String> = cards.iter().map(|c| sort_value(c, key)).collect();
        let order = sort_order(key, &values, locale_compare);
        for (position, &idx) in order.iter().enumerate() {
            let card = &cards[idx];
            let _ = container.append_child(card);
            dom::set_style(card, "animation-delay", &format!("{}s", position as f64 * 0.1));
            dom::add_class(card, FADE_IN_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_matches_everything() {
        assert!(filter_matches("all", Some("estoicismo")));
        assert!(filter_matches("all", None));
    }

    #[test]
    fn specific_filter_matches_exactly() {
        assert!(filter_matches("habitos", Some("habitos")));
        assert!(!filter_matches("habitos", Some("Habitos")));
        assert!(!filter_matches("habitos", Some("notas")));
        assert!(!filter_matches("habitos", None));
    }

    #[test]
    fn date_sort_is_descending() {
        let values = strings(&["2024-01-01", "2024-03-01", "2024-02-01"]);
        let order = sort_order(&SortKey::Date, &values, str::cmp);
        let sorted: Vec<&str> = order.iter().map(|&i| values[i].as_str()).collect();
        assert_eq!(sorted, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn unparseable_dates_sink_and_keep_order() {
        let values = strings(&["pronto", "2024-01-01", "ayer", "2024-05-01T10:00:00Z"]);
        let order = sort_order(&SortKey::Date, &values, str::cmp);
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn text_sort_is_ascending_and_stable() {
        let values = strings(&["b", "a", "b", "a"]);
        let order = sort_order(&SortKey::parse("title"), &values, str::cmp);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn date_formats() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2024-02-29 08:30").is_some());
        assert!(parse_date("2024-02-29T08:30:00+02:00").is_some());
        assert!(parse_date("29/02/2024").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn expansion_styles() {
        assert_eq!(expansion_style(true, 240), ("240px".to_string(), "1"));
        assert_eq!(expansion_style(false, 240), ("0".to_string(), "0"));
    }

    #[test]
    fn sort_key_names() {
        assert_eq!(SortKey::parse("date"), SortKey::Date);
        assert_eq!(SortKey::parse("titulo").name(), "titulo");
    }
}
