use serde::{Deserialize, Serialize};

/// Attribute on `<body>` carrying a JSON override of [`UiConfig`].
pub const CONFIG_ATTRIBUTE: &str = "data-diario-config";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub log_level: String,
    pub particle_count: usize,
    pub notification_duration_ms: u32,
    pub notification_exit_ms: u32,
    /// Upper bound on concurrently visible toasts; `None` leaves the stack unbounded.
    pub max_notifications: Option<usize>,
    pub autosave_debounce_ms: u32,
    pub autosave_indicator_ms: u32,
    pub theme_refresh_ms: u32,
    pub mobile_breakpoint_px: f64,
    pub ripple_ms: u32,
    pub glow_ms: u32,
    pub counter_duration_ms: u32,
    pub counter_tick_ms: u32,
    pub endpoints: Endpoints,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub habit_toggle: String,
    pub wellbeing_update: String,
    pub note_create: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            habit_toggle: "/diario/prosoche/habito/toggle/".to_string(),
            wellbeing_update: "/diario/eudaimonia/actualizar/".to_string(),
            note_create: "/diario/gnosis/crear/".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            particle_count: 50,
            notification_duration_ms: 5000,
            notification_exit_ms: 500,
            max_notifications: Some(8),
            autosave_debounce_ms: 2000,
            autosave_indicator_ms: 3000,
            theme_refresh_ms: 60_000,
            mobile_breakpoint_px: 768.0,
            ripple_ms: 800,
            glow_ms: 2000,
            counter_duration_ms: 2000,
            counter_tick_ms: 16,
            endpoints: Endpoints::default(),
        }
    }
}

impl UiConfig {
    /// Parses an override blob. Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the override from `<body data-diario-config>`, falling back to defaults.
    pub fn from_document() -> Self {
        let raw = leptos::prelude::document()
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));
        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring malformed {CONFIG_ATTRIBUTE}: {e}");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = UiConfig::from_json(r#"{"particle_count": 10, "log_level": "debug"}"#).unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.level(), log::Level::Debug);
        assert_eq!(config.autosave_debounce_ms, 2000);
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn unbounded_stack_can_be_requested() {
        let config = UiConfig::from_json(r#"{"max_notifications": null}"#).unwrap();
        assert_eq!(config.max_notifications, None);
    }

    #[test]
    fn nested_endpoint_override() {
        let config =
            UiConfig::from_json(r#"{"endpoints": {"note_create": "/api/notes/"}}"#).unwrap();
        assert_eq!(config.endpoints.note_create, "/api/notes/");
        assert_eq!(config.endpoints.habit_toggle, "/diario/prosoche/habito/toggle/");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = UiConfig {
            log_level: "loud".to_string(),
            ..UiConfig::default()
        };
        assert_eq!(config.level(), log::Level::Info);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(UiConfig::from_json("{particle_count:").is_err());
    }
}
