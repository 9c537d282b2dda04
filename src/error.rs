use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, UiError>;

impl From<gloo::net::Error> for UiError {
    fn from(err: gloo::net::Error) -> Self {
        match err {
            gloo::net::Error::SerdeError(e) => UiError::Decode(e.to_string()),
            other => UiError::Network(other.to_string()),
        }
    }
}

impl From<gloo::storage::errors::StorageError> for UiError {
    fn from(err: gloo::storage::errors::StorageError) -> Self {
        UiError::Storage(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for UiError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        UiError::Decode(err.to_string())
    }
}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        UiError::Js(js_error_message(&value))
    }
}

impl From<UiError> for JsValue {
    fn from(err: UiError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort message for a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
