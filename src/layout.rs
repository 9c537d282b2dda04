use leptos::prelude::{document, window};

use crate::dom;
use crate::subscriptions::Subscriptions;

pub const MOBILE_CLASS: &str = "mobile-view";
pub const PAUSED_CLASS: &str = "animations-paused";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Mobile,
    Desktop,
}

impl LayoutMode {
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn card_margin(self) -> &'static str {
        match self {
            Self::Mobile => "0.5rem 0",
            Self::Desktop => "1rem 0",
        }
    }
}

pub fn apply_layout(breakpoint: f64) -> Option<LayoutMode> {
    let body = document().body()?;
    let (width, _) = dom::viewport_size();
    let mode = LayoutMode::for_width(width, breakpoint);
    match mode {
        LayoutMode::Mobile => dom::add_class(&body, MOBILE_CLASS),
        LayoutMode::Desktop => dom::remove_class(&body, MOBILE_CLASS),
    }
    for card in dom::query_all(".cyber-card") {
        dom::set_style(&card, "margin", mode.card_margin());
    }
    Some(mode)
}

/// Adds the paused marker while the tab is hidden.
pub fn apply_visibility(hidden: bool) {
    let Some(body) = document().body() else {
        return;
    };
    if hidden {
        dom::add_class(&body, PAUSED_CLASS);
    } else {
        dom::remove_class(&body, PAUSED_CLASS);
    }
}

pub fn bind(breakpoint: f64, subs: &mut Subscriptions) {
    subs.listen("layout-resize", &window(), "resize", move |_| {
        apply_layout(breakpoint);
    });
    subs.listen("visibility", &document(), "visibilitychange", |_| {
        apply_visibility(document().hidden());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(LayoutMode::for_width(767.9, 768.0), LayoutMode::Mobile);
        assert_eq!(LayoutMode::for_width(768.0, 768.0), LayoutMode::Desktop);
        assert_eq!(LayoutMode::for_width(1920.0, 768.0), LayoutMode::Desktop);
    }

    #[test]
    fn margins_per_mode() {
        assert_eq!(LayoutMode::Mobile.card_margin(), "0.5rem 0");
        assert_eq!(LayoutMode::Desktop.card_margin(), "1rem 0");
    }
}
