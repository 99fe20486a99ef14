//! Click-action visibility automaton.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{Action, Effect, ElementId};

/// Opacity transition used by fade toggles.
pub const FADE_TRANSITION: &str = "opacity 0.3s ease";

/// Whether an element receives pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvents {
    /// Interactive.
    Auto,
    /// Click-through.
    None,
}

impl PointerEvents {
    /// CSS keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
        }
    }
}

/// How a host should present an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Presentation {
    /// 0 when hidden, 1 when shown.
    pub opacity: f32,
    /// Disabled while hidden.
    pub pointer_events: PointerEvents,
    /// Opacity transition, if the change should animate.
    pub transition: Option<&'static str>,
}

impl Presentation {
    /// Presentation for a hidden flag reached through `effect`.
    #[must_use]
    pub const fn for_hidden(hidden: bool, effect: Effect) -> Self {
        let transition = match effect {
            Effect::ToggleFade => Some(FADE_TRANSITION),
            Effect::ToggleVisibility => None,
        };
        if hidden {
            Self {
                opacity: 0.0,
                pointer_events: PointerEvents::None,
                transition,
            }
        } else {
            Self {
                opacity: 1.0,
                pointer_events: PointerEvents::Auto,
                transition,
            }
        }
    }

    /// Presentation of an element no action has touched.
    #[must_use]
    pub const fn visible() -> Self {
        Self::for_hidden(false, Effect::ToggleVisibility)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TargetState {
    hidden: bool,
    last_effect: Effect,
}

/// Hidden flags of every action target.
#[derive(Debug, Clone, Default)]
pub struct VisibilityState {
    targets: HashMap<ElementId, TargetState>,
}

impl VisibilityState {
    /// Everything visible.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `actions` in order. Targets for which `exists` is false are skipped.
    ///
    /// Returns the targets that were toggled.
    pub fn activate(
        &mut self,
        actions: &[Action],
        exists: impl Fn(ElementId) -> bool,
    ) -> Vec<ElementId> {
        let mut toggled = Vec::new();
        for action in actions {
            if !exists(action.target) {
                tracing::debug!("Skipping action {} on missing target {}", action.id, action.target);
                continue;
            }
            let entry = self.targets.entry(action.target).or_insert(TargetState {
                hidden: false,
                last_effect: action.effect,
            });
            entry.hidden = !entry.hidden;
            entry.last_effect = action.effect;
            toggled.push(action.target);
        }
        toggled
    }

    /// Whether an element is currently hidden.
    #[must_use]
    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.targets.get(&id).is_some_and(|t| t.hidden)
    }

    /// How an element should be presented.
    #[must_use]
    pub fn presentation(&self, id: ElementId) -> Presentation {
        self.targets
            .get(&id)
            .map_or_else(Presentation::visible, |t| {
                Presentation::for_hidden(t.hidden, t.last_effect)
            })
    }

    /// Make everything visible again.
    pub fn reset(&mut self) {
        self.targets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ElementId {
        ElementId::new(n)
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut state = VisibilityState::new();
        let actions = [Action::new(Effect::ToggleVisibility, id(2))];

        state.activate(&actions, |_| true);
        assert!(state.is_hidden(id(2)));
        state.activate(&actions, |_| true);
        assert!(!state.is_hidden(id(2)));
    }

    #[test]
    fn test_actions_apply_in_order() {
        let mut state = VisibilityState::new();
        let actions = [
            Action::new(Effect::ToggleVisibility, id(2)),
            Action::new(Effect::ToggleFade, id(2)),
            Action::new(Effect::ToggleFade, id(3)),
        ];
        let toggled = state.activate(&actions, |_| true);

        assert_eq!(toggled, vec![id(2), id(2), id(3)]);
        assert!(!state.is_hidden(id(2)));
        assert!(state.is_hidden(id(3)));
    }

    #[test]
    fn test_missing_targets_are_skipped() {
        let mut state = VisibilityState::new();
        let actions = [
            Action::new(Effect::ToggleVisibility, id(9)),
            Action::new(Effect::ToggleVisibility, id(2)),
        ];
        let toggled = state.activate(&actions, |target| target != id(9));
        assert_eq!(toggled, vec![id(2)]);
        assert!(!state.is_hidden(id(9)));
    }

    #[test]
    fn test_presentation_follows_effect() {
        let mut state = VisibilityState::new();
        state.activate(&[Action::new(Effect::ToggleFade, id(4))], |_| true);
        let p = state.presentation(id(4));
        assert!(p.opacity.abs() < f32::EPSILON);
        assert_eq!(p.pointer_events, PointerEvents::None);
        assert_eq!(p.transition, Some(FADE_TRANSITION));

        state.activate(&[Action::new(Effect::ToggleVisibility, id(4))], |_| true);
        let p = state.presentation(id(4));
        assert!((p.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(p.pointer_events, PointerEvents::Auto);
        assert_eq!(p.transition, None);
    }

    #[test]
    fn test_reset_shows_everything() {
        let mut state = VisibilityState::new();
        state.activate(&[Action::new(Effect::ToggleVisibility, id(1))], |_| true);
        state.reset();
        assert!(!state.is_hidden(id(1)));
        assert_eq!(state.presentation(id(1)), Presentation::visible());
    }
}
