use std::collections::BTreeMap;

use gloo::storage::{LocalStorage, Storage};
use gloo::timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use web_sys::{FormData, HtmlFormElement};

use crate::dom;
use crate::error::Result;
use crate::notifications::{NotificationCenter, NotificationKind};
use crate::subscriptions::Subscriptions;

pub const KEY_PREFIX: &str = "autosave-";
pub const DEFAULT_FORM_ID: &str = "autosave-form";

pub fn storage_key(form_id: &str) -> String {
    let id = if form_id.trim().is_empty() {
        DEFAULT_FORM_ID
    } else {
        form_id
    };
    format!("{KEY_PREFIX}{id}")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoSaveSnapshot {
    #[serde(skip)]
    pub form_id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl AutoSaveSnapshot {
    /// Later entries with the same name replace earlier ones.
    pub fn from_entries<I>(form_id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            form_id: form_id.into(),
            fields: entries.into_iter().collect(),
        }
    }

    pub fn key(&self) -> String {
        storage_key(&self.form_id)
    }

    pub fn from_json(form_id: impl Into<String>, raw: &str) -> serde_json::Result<Self> {
        let mut snapshot: Self = serde_json::from_str(raw)?;
        snapshot.form_id = form_id.into();
        Ok(snapshot)
    }

    pub fn persist(&self) -> Result<()> {
        LocalStorage::set(self.key(), &self.fields)?;
        Ok(())
    }

    /// Reads a stored snapshot back. Not wired into page load.
    pub fn restore(form_id: &str) -> Option<Self> {
        let fields = LocalStorage::get::<BTreeMap<String, String>>(storage_key(form_id)).ok()?;
        Some(Self {
            form_id: form_id.to_string(),
            fields,
        })
    }

    pub fn clear(form_id: &str) {
        LocalStorage::delete(storage_key(form_id));
    }
}

fn form_entries(form: &HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(iter)) = js_sys::try_iter(data.as_ref()) else {
        return Vec::new();
    };
    iter.filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let pair = js_sys::Array::from(&entry);
            // File entries have no string value and are skipped.
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

#[derive(Clone, Copy)]
pub struct AutoSave {
    notifications: NotificationCenter,
    debounce_ms: u32,
}

impl AutoSave {
    pub fn new(notifications: NotificationCenter, debounce_ms: u32) -> Self {
        Self {
            notifications,
            debounce_ms,
        }
    }

    /// Each form keeps at most one pending save; an edit replaces (and so
    /// cancels) the one before it. Teardown cancels whatever is pending.
    pub fn bind(&self, selector: &str, subs: &mut Subscriptions) {
        let pending = subs.timer_pool::<Timeout>("autosave-pending");
        for form in dom::query_all(selector) {
            let Ok(form) = form.dyn_into::<HtmlFormElement>() else {
                continue;
            };
            let key = pending.next_key();
            let root: &web_sys::Element = form.as_ref();
            for field in dom::query_all_in(root, "input, textarea, select") {
                let autosave = *self;
                let pending = pending.clone();
                let form = form.clone();
                subs.listen("autosave-input", &field, "input", move |_| {
                    let settled = pending.clone();
                    let form = form.clone();
                    let timeout = Timeout::new(autosave.debounce_ms, move || {
                        settled.remove(key);
                        autosave.save_form(&form);
                    });
                    pending.insert(key, timeout);
                });
            }
        }
    }

    pub fn save_form(&self, form: &HtmlFormElement) {
        let snapshot = AutoSaveSnapshot::from_entries(form.id(), form_entries(form));
        match snapshot.persist() {
            Ok(()) => {
                log::debug!("autosaved {} fields under {}", snapshot.fields.len(), snapshot.key());
                self.notifications.show_saved_banner();
            }
            Err(err) => {
                log::error!("autosave of {} failed: {err}", snapshot.key());
                self.notifications.show_with(
                    "No se pudo guardar el borrador",
                    NotificationKind::Warning,
                    None,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_form_id_or_default() {
        assert_eq!(storage_key("entrada"), "autosave-entrada");
        assert_eq!(storage_key(""), "autosave-autosave-form");
        assert_eq!(storage_key("  "), "autosave-autosave-form");
    }

    #[test]
    fn repeated_names_keep_last_value() {
        let snapshot = AutoSaveSnapshot::from_entries(
            "f",
            vec![
                ("titulo".to_string(), "a".to_string()),
                ("titulo".to_string(), "b".to_string()),
                ("cuerpo".to_string(), "texto".to_string()),
            ],
        );
        assert_eq!(snapshot.fields.len(), 2);
        assert_eq!(snapshot.fields["titulo"], "b");
    }

    #[test]
    fn snapshot_serializes_as_flat_field_map() {
        let snapshot = AutoSaveSnapshot::from_entries(
            "f",
            vec![("titulo".to_string(), "Hoy".to_string())],
        );
        let raw = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(raw, r#"{"titulo":"Hoy"}"#);

        let back = AutoSaveSnapshot::from_json("f", &raw).unwrap();
        assert_eq!(back, snapshot);
    }
}
