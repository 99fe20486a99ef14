//! Carousel slide automaton.
//!
//! One state machine drives every host: the editor preview steps it directly,
//! and exported bundles embed its [`TransitionTable`] so the script replays
//! the same transitions.

use serde::{Deserialize, Serialize};

use crate::element::CarouselTransition;

/// Navigation input for a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "input", content = "index")]
pub enum CarouselInput {
    /// Next slide, wrapping to the first.
    Advance,
    /// Previous slide, wrapping to the last.
    Retreat,
    /// Jump to a slide by index.
    Jump(usize),
}

/// Direction of a slide change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    /// Towards higher indices.
    Forward,
    /// Towards lower indices.
    Backward,
}

impl SlideDirection {
    /// Class added to the slide coming in under the slide transition style.
    #[must_use]
    pub const fn enter_class(self) -> &'static str {
        match self {
            Self::Forward => "slide-in-right",
            Self::Backward => "slide-in-left",
        }
    }

    /// Class added to the slide going out under the slide transition style.
    #[must_use]
    pub const fn exit_class(self) -> &'static str {
        match self {
            Self::Forward => "slide-out-left",
            Self::Backward => "slide-out-right",
        }
    }
}

/// A single slide change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideTransition {
    /// Slide shown before.
    pub from: usize,
    /// Slide shown after.
    pub to: usize,
    /// Direction of travel.
    pub direction: SlideDirection,
}

impl SlideTransition {
    /// Enter and exit classes for this change under `style`, if it animates
    /// with classes at all.
    #[must_use]
    pub const fn classes(&self, style: CarouselTransition) -> Option<(&'static str, &'static str)> {
        match style {
            CarouselTransition::Slide => {
                Some((self.direction.enter_class(), self.direction.exit_class()))
            }
            CarouselTransition::Fade | CarouselTransition::None => None,
        }
    }
}

/// Compute the transition `input` causes from slide `index` of `len`.
///
/// Returns `None` for empty carousels, out-of-range jumps, and any input that
/// would land on the current slide (including advance or retreat with one slide).
#[must_use]
pub fn step(index: usize, len: usize, input: CarouselInput) -> Option<SlideTransition> {
    if len == 0 {
        return None;
    }
    let (to, direction) = match input {
        CarouselInput::Advance => ((index + 1) % len, SlideDirection::Forward),
        CarouselInput::Retreat => ((index + len - 1) % len, SlideDirection::Backward),
        CarouselInput::Jump(k) if k >= len || k == index => return None,
        CarouselInput::Jump(k) if k > index => (k, SlideDirection::Forward),
        CarouselInput::Jump(k) => (k, SlideDirection::Backward),
    };
    if to == index {
        return None;
    }
    Some(SlideTransition {
        from: index,
        to,
        direction,
    })
}

/// Current slide of one carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    index: usize,
    len: usize,
}

impl CarouselState {
    /// A carousel of `len` slides showing `start`, clamped into range.
    #[must_use]
    pub fn new(len: usize, start: usize) -> Self {
        Self {
            index: start.min(len.saturating_sub(1)),
            len,
        }
    }

    /// Index of the visible slide.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of slides.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the carousel has no slides.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Apply an input, returning the transition taken.
    pub fn apply(&mut self, input: CarouselInput) -> Option<SlideTransition> {
        let transition = step(self.index, self.len, input)?;
        tracing::debug!(
            "Carousel slide {} -> {} ({:?})",
            transition.from,
            transition.to,
            transition.direction
        );
        self.index = transition.to;
        Some(transition)
    }

    /// Visibility flag per slide; exactly one is set unless empty.
    #[must_use]
    pub fn visibility(&self) -> Vec<bool> {
        (0..self.len).map(|i| i == self.index).collect()
    }
}

/// Every transition of an `len`-slide carousel, precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    /// Number of slides.
    pub len: usize,
    /// Target of advance from each slide.
    pub advance: Vec<usize>,
    /// Target of retreat from each slide.
    pub retreat: Vec<usize>,
    /// `jump[i][k]`: direction of jumping from `i` to `k`, `None` when `i == k`.
    pub jump: Vec<Vec<Option<SlideDirection>>>,
}

impl TransitionTable {
    /// Build the table by running the automaton from every state.
    #[must_use]
    pub fn build(len: usize) -> Self {
        let target = |i: usize, input| step(i, len, input).map_or(i, |t| t.to);
        Self {
            len,
            advance: (0..len).map(|i| target(i, CarouselInput::Advance)).collect(),
            retreat: (0..len).map(|i| target(i, CarouselInput::Retreat)).collect(),
            jump: (0..len)
                .map(|i| {
                    (0..len)
                        .map(|k| step(i, len, CarouselInput::Jump(k)).map(|t| t.direction))
                        .collect()
                })
                .collect(),
        }
    }
}
