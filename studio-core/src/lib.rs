//! # Creative Studio Core
//!
//! Editor logic for banner-style rich media creatives.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 studio-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model      │  Geometry Engine        │
//! │  - Elements       │  - Drag with axis locks │
//! │  - Typed styles   │  - Corner resize        │
//! │  - Stacking order │  - Aspect lock          │
//! ├─────────────────────────────────────────────┤
//! │  Runtime                │  Preview          │
//! │  - Carousel automaton   │  - Live session   │
//! │  - Click visibility     │  - Deferred JS    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod preview;
pub mod runtime;
pub mod scene;
pub mod state;
pub mod style;

pub use document::{CreativeDocument, DOCUMENT_VERSION};
pub use element::{
    Action, AlignPreset, Animation, AnimationKind, ArrowStyle, AxisLock, Carousel,
    CarouselImage, CarouselTransition, Effect, Element, ElementId, ElementKind, ElementType,
    Frame, Trigger, MIN_ELEMENT_SIZE,
};
pub use error::{StudioError, StudioResult};
pub use geometry::{GestureEngine, PointerEvent, PointerPhase, ResizeHandle};
pub use preview::{DeferredScript, PreviewConfig, PreviewSession, ScriptHost, SlideFrame};
pub use scene::{CanvasConfig, ElementPatch, Scene};
pub use state::{EditorState, SessionContext};
pub use style::{Color, Length, ObjectFit, Style, StyleProperty, StyleValue};

/// Studio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
