//! Every selector the UI scans for, with the behaviour it drives.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
    HoverCard,
    HoverButton,
    ScrollReveal,
    ExpandCard,
    FilterCards,
    SortCards,
    ValidateForm,
    FocusGlow,
    AutoSave,
    ModalTransition,
    Tooltip,
    CountUp,
    Calendar,
}

/// When a binding is resolved relative to page load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// As soon as the UI mounts.
    Mount,
    /// Once the document has finished parsing.
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub selector: &'static str,
    pub behavior: Behavior,
    pub phase: Phase,
}

const fn bind(selector: &'static str, behavior: Behavior, phase: Phase) -> Binding {
    Binding {
        selector,
        behavior,
        phase,
    }
}

pub const BINDINGS: &[Binding] = &[
    bind(".cyber-card", Behavior::HoverCard, Phase::Mount),
    bind(".cyber-btn", Behavior::HoverButton, Phase::Mount),
    bind(
        ".cyber-card, .cyber-stat, .entrada-item, .habito-item",
        Behavior::ScrollReveal,
        Phase::Mount,
    ),
    bind("[data-expandable]", Behavior::ExpandCard, Phase::Ready),
    bind("[data-filter]", Behavior::FilterCards, Phase::Ready),
    bind("[data-sort]", Behavior::SortCards, Phase::Ready),
    bind("form[data-validate]", Behavior::ValidateForm, Phase::Ready),
    bind(".cyber-form-control", Behavior::FocusGlow, Phase::Ready),
    bind("[data-autosave]", Behavior::AutoSave, Phase::Ready),
    bind(".modal", Behavior::ModalTransition, Phase::Ready),
    bind("[data-bs-toggle=\"tooltip\"]", Behavior::Tooltip, Phase::Ready),
    bind(".cyber-stat-value", Behavior::CountUp, Phase::Ready),
    bind("#calendar", Behavior::Calendar, Phase::Ready),
];

pub fn in_phase(phase: Phase) -> impl Iterator<Item = &'static Binding> {
    BINDINGS.iter().filter(move |b| b.phase == phase)
}

pub fn selector_for(behavior: Behavior) -> Option<&'static str> {
    BINDINGS
        .iter()
        .find(|b| b.behavior == behavior)
        .map(|b| b.selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_behavior_bound_once() {
        let behaviors: HashSet<_> = BINDINGS.iter().map(|b| b.behavior).collect();
        assert_eq!(behaviors.len(), BINDINGS.len());
    }

    #[test]
    fn data_attribute_contract_is_covered() {
        let selectors: Vec<&str> = BINDINGS.iter().map(|b| b.selector).collect();
        for attr in [
            "[data-expandable]",
            "[data-filter]",
            "[data-sort]",
            "[data-autosave]",
            "[data-bs-toggle=\"tooltip\"]",
        ] {
            assert!(selectors.contains(&attr), "{attr} missing");
        }
        assert_eq!(selector_for(Behavior::ValidateForm), Some("form[data-validate]"));
    }

    #[test]
    fn card_behaviour_waits_for_ready() {
        let ready: Vec<Behavior> = in_phase(Phase::Ready).map(|b| b.behavior).collect();
        assert!(ready.contains(&Behavior::ExpandCard));
        assert!(ready.contains(&Behavior::AutoSave));
        assert!(!ready.contains(&Behavior::HoverCard));
        assert_eq!(
            in_phase(Phase::Mount).count() + ready.len(),
            BINDINGS.len()
        );
    }
}
