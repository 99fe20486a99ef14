//! Playback runtime shared by the live preview and exported bundles.

pub mod carousel;
pub mod interaction;

pub use carousel::{
    CarouselInput, CarouselState, SlideDirection, SlideTransition, TransitionTable,
};
pub use interaction::{Presentation, PointerEvents, VisibilityState, FADE_TRANSITION};
