//! Browser-side behaviour for the Diario journal pages: notifications, the
//! request gateway for the three journal actions, form validation and
//! autosave, card interactions and the decorative background.
//!
//! Load the generated module, then keep the handle returned by
//! `Diario.mount()` for as long as the page lives.

pub mod actions;
pub mod app;
pub mod autosave;
pub mod bindings;
pub mod cards;
pub mod config;
pub mod dom;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod notifications;
pub mod particles;
pub mod request;
pub mod reveal;
pub mod subscriptions;
pub mod theme;
pub mod validation;
pub mod widgets;

pub use app::Diario;
pub use error::{Result, UiError};
