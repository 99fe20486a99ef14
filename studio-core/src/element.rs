//! Creative elements - the building blocks of a scene.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::style::{Color, Length, ObjectFit, Style};

/// Smallest width or height an element may have, in canvas pixels.
pub const MIN_ELEMENT_SIZE: f32 = 20.0;

/// Canvas width the per-type default sizes are designed for.
const REFERENCE_WIDTH: f32 = 320.0;

/// Font family every new element starts with.
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// Unique identifier for an element.
///
/// Assigned by the [`Scene`](crate::Scene) from a monotonically increasing
/// counter and never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u32);

impl ElementId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Editable text block.
    Text,
    /// Clickable button.
    Button,
    /// Still image.
    Image,
    /// Looping video.
    Video,
    /// Colored box, optionally with a background image.
    Box,
    /// Image carousel.
    Carousel,
}

impl ElementType {
    /// Lowercase type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Image => "image",
            Self::Video => "video",
            Self::Box => "box",
            Self::Carousel => "carousel",
        }
    }
}

/// Type-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Text block; the text lives in [`Element::content`].
    Text,
    /// Button with an optional click-through link.
    Button {
        /// Destination opened on click.
        #[serde(rename = "linkUrl", default, skip_serializing_if = "Option::is_none")]
        link_url: Option<String>,
    },
    /// Image; the media reference lives in [`Element::content`].
    Image,
    /// Video; the media reference lives in [`Element::content`].
    Video,
    /// Box; [`Element::content`] is an optional background image reference.
    Box,
    /// Carousel of slides.
    Carousel(Carousel),
}

impl ElementKind {
    /// The tag for this kind.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text => ElementType::Text,
            Self::Button { .. } => ElementType::Button,
            Self::Image => ElementType::Image,
            Self::Video => ElementType::Video,
            Self::Box => ElementType::Box,
            Self::Carousel(_) => ElementType::Carousel,
        }
    }
}

/// Position and size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Named keyframe animation applied to an element or slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKind {
    /// Grow and shrink.
    #[serde(rename = "custom-pulse")]
    Pulse,
    /// Vertical bounce.
    #[serde(rename = "animate-bounce")]
    Bounce,
    /// Full rotation.
    #[serde(rename = "animate-spin")]
    Spin,
    /// Expanding ripple.
    #[serde(rename = "animate-ping")]
    Ping,
    /// Horizontal shake.
    #[serde(rename = "custom-shake")]
    Shake,
    /// Opacity fade in.
    #[serde(rename = "custom-fade-in")]
    FadeIn,
    /// Slide up into place.
    #[serde(rename = "custom-slide-up")]
    SlideUp,
}

impl AnimationKind {
    /// Stylesheet class that runs this animation.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Pulse => "custom-pulse",
            Self::Bounce => "animate-bounce",
            Self::Spin => "animate-spin",
            Self::Ping => "animate-ping",
            Self::Shake => "custom-shake",
            Self::FadeIn => "custom-fade-in",
            Self::SlideUp => "custom-slide-up",
        }
    }
}

/// Element animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Which animation.
    pub kind: AnimationKind,
    /// Override of the animation duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f32>,
    /// Scale multiplier (used by pulse).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    /// Repeat forever.
    #[serde(default = "default_true")]
    pub looping: bool,
}

impl Animation {
    /// A looping animation with default timing.
    #[must_use]
    pub const fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            duration_secs: None,
            scale: None,
            looping: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Which axes an alignment preset has pinned.
///
/// `X` pins the horizontal position, so drags only move the element
/// vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisLock {
    /// Free movement.
    #[default]
    None,
    /// Horizontal position pinned.
    X,
    /// Vertical position pinned.
    Y,
    /// Both pinned.
    Both,
}

impl AxisLock {
    /// Whether drags may write the x coordinate.
    #[must_use]
    pub const fn allows_x(self) -> bool {
        matches!(self, Self::None | Self::Y)
    }

    /// Whether drags may write the y coordinate.
    #[must_use]
    pub const fn allows_y(self) -> bool {
        matches!(self, Self::None | Self::X)
    }
}

/// Nine-point alignment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum AlignPreset {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tc")]
    TopCenter,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "ml")]
    MiddleLeft,
    #[serde(rename = "mc")]
    MiddleCenter,
    #[serde(rename = "mr")]
    MiddleRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "bc")]
    BottomCenter,
    #[serde(rename = "br")]
    BottomRight,
}

impl AlignPreset {
    /// All presets, row by row.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Target position of an element of `size` inside a canvas of `canvas` size.
    #[must_use]
    pub fn position(self, canvas: (f32, f32), size: (f32, f32)) -> (f32, f32) {
        let (cw, ch) = canvas;
        let (w, h) = size;
        let center_x = ((cw - w) / 2.0).round();
        let center_y = ((ch - h) / 2.0).round();
        let right = cw - w;
        let bottom = ch - h;

        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (center_x, 0.0),
            Self::TopRight => (right, 0.0),
            Self::MiddleLeft => (0.0, center_y),
            Self::MiddleCenter => (center_x, center_y),
            Self::MiddleRight => (right, center_y),
            Self::BottomLeft => (0.0, bottom),
            Self::BottomCenter => (center_x, bottom),
            Self::BottomRight => (right, bottom),
        }
    }

    /// Axis lock applied together with this preset.
    #[must_use]
    pub const fn axis_lock(self) -> AxisLock {
        match self {
            Self::TopCenter | Self::BottomCenter => AxisLock::X,
            Self::MiddleLeft | Self::MiddleRight => AxisLock::Y,
            Self::MiddleCenter => AxisLock::Both,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight => {
                AxisLock::None
            }
        }
    }
}

/// Carousel navigation arrow shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// Chevron.
    #[default]
    Simple,
    /// Chevron in a circle.
    Circle,
    /// Filled triangle.
    Triangle,
    /// Long arrow with shaft.
    Long,
}

/// How a carousel moves between slides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselTransition {
    /// Directional slide with fade.
    #[default]
    Slide,
    /// Opacity cross-dissolve.
    Fade,
    /// Instant switch.
    None,
}

/// One slide of a carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselImage {
    /// Unique slide id.
    pub id: String,
    /// Media reference.
    pub url: String,
    /// How the image fills the slide.
    #[serde(default)]
    pub object_fit: ObjectFit,
    /// Slide background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// Looping animation of this slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationKind>,
    /// Independent scale factor.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl CarouselImage {
    /// A new slide with a fresh id.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            object_fit: ObjectFit::Cover,
            background_color: None,
            animation: None,
            scale: 1.0,
        }
    }
}

fn default_scale() -> f32 {
    1.0
}

fn default_arrow_size() -> f32 {
    24.0
}

fn default_arrow_color() -> Color {
    Color::from_static("#000000")
}

/// Carousel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carousel {
    /// Slides in display order.
    #[serde(rename = "carouselImages", default)]
    pub images: Vec<CarouselImage>,
    /// Arrow shape.
    #[serde(default)]
    pub arrow_type: ArrowStyle,
    /// Arrow color.
    #[serde(default = "default_arrow_color")]
    pub arrow_color: Color,
    /// Arrow size in pixels.
    #[serde(default = "default_arrow_size")]
    pub arrow_size: f32,
    /// Slide transition.
    #[serde(rename = "carouselTransition", default)]
    pub transition: CarouselTransition,
    /// Slide shown while editing; also the first slide in preview.
    #[serde(default)]
    pub editing_index: usize,
    /// Show indicator dots.
    #[serde(default = "default_true")]
    pub show_dots: bool,
}

impl Default for Carousel {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            arrow_type: ArrowStyle::Simple,
            arrow_color: default_arrow_color(),
            arrow_size: default_arrow_size(),
            transition: CarouselTransition::Slide,
            editing_index: 0,
            show_dots: true,
        }
    }
}

/// What triggers an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Pointer click on the source element.
    #[default]
    Click,
}

/// What an action does to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// Show or hide instantly.
    #[default]
    ToggleVisibility,
    /// Show or hide with an opacity fade.
    ToggleFade,
}

/// A click action attached to a source element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Unique action id.
    pub id: String,
    /// Trigger.
    #[serde(default)]
    pub trigger: Trigger,
    /// Effect.
    pub effect: Effect,
    /// Target element. May dangle after the target is deleted.
    pub target: ElementId,
}

impl Action {
    /// A click action with a fresh id.
    #[must_use]
    pub fn new(effect: Effect, target: ElementId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trigger: Trigger::Click,
            effect,
            target,
        }
    }
}

/// A creative element with content, frame, and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Display name in the layer list.
    pub name: String,
    /// Type-specific data.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Position and size.
    #[serde(flatten)]
    pub frame: Frame,
    /// Text content or primary media reference.
    #[serde(default)]
    pub content: String,
    /// Visual style.
    #[serde(default)]
    pub style: Style,
    /// Click actions, in firing order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Element animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Axes pinned by the active alignment preset.
    #[serde(rename = "lockAxis", default)]
    pub lock: AxisLock,
    /// Active alignment preset.
    #[serde(rename = "alignmentLock", default, skip_serializing_if = "Option::is_none")]
    pub align: Option<AlignPreset>,
}

impl Element {
    /// Create an element of the given type with its defaults, sized for a
    /// canvas `canvas_width` pixels wide.
    #[must_use]
    pub fn with_defaults(id: ElementId, element_type: ElementType, x: f32, y: f32, canvas_width: f32) -> Self {
        let scale = canvas_width / REFERENCE_WIDTH;
        let scaled_px = |v: f32| Some(Length::Px((v * scale).round()));

        let mut style = Style {
            font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
            ..Style::default()
        };

        let (base_w, base_h) = match element_type {
            ElementType::Text => (200.0, 60.0),
            ElementType::Button => (120.0, 40.0),
            ElementType::Image | ElementType::Box => (200.0, 200.0),
            ElementType::Video => (300.0, 200.0),
            ElementType::Carousel => (320.0, 180.0),
        };
        let width = (base_w * scale).round();
        let height = (base_h * scale).round();

        let (kind, content) = match element_type {
            ElementType::Text => {
                style.font_size = scaled_px(16.0);
                style.color = Some(Color::from_static("#000000"));
                (ElementKind::Text, "Double click to edit".to_string())
            }
            ElementType::Button => {
                style.background_color = Some(Color::from_static("#9500cb"));
                style.color = Some(Color::from_static("#ffffff"));
                style.border_radius = scaled_px(6.0);
                style.font_size = scaled_px(16.0);
                (ElementKind::Button { link_url: None }, "Click Me".to_string())
            }
            ElementType::Image => {
                style.object_fit = Some(ObjectFit::Cover);
                (ElementKind::Image, "https://picsum.photos/400".to_string())
            }
            ElementType::Video => (
                ElementKind::Video,
                "https://www.w3schools.com/html/mov_bbb.mp4".to_string(),
            ),
            ElementType::Box => {
                style.background_color = Some(Color::from_static("#e5e7eb"));
                style.object_fit = Some(ObjectFit::Cover);
                (ElementKind::Box, String::new())
            }
            ElementType::Carousel => {
                let slide = |n: u32| {
                    let mut image = CarouselImage::new(format!(
                        "https://picsum.photos/{width}/{height}?random={n}"
                    ));
                    image.background_color = Some(Color::from_static("transparent"));
                    image
                };
                let carousel = Carousel {
                    images: vec![slide(1), slide(2)],
                    arrow_size: (24.0 * scale).round(),
                    ..Carousel::default()
                };
                (ElementKind::Carousel(carousel), String::new())
            }
        };

        Self {
            id,
            name: format!("{} {id}", element_type.as_str()),
            kind,
            frame: Frame::new(x, y, width, height),
            content,
            style,
            actions: Vec::new(),
            animation: None,
            lock: AxisLock::None,
            align: None,
        }
    }

    /// The element type tag.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Carousel data, if this is a carousel.
    #[must_use]
    pub fn carousel(&self) -> Option<&Carousel> {
        match &self.kind {
            ElementKind::Carousel(carousel) => Some(carousel),
            _ => None,
        }
    }

    /// Mutable carousel data, if this is a carousel.
    pub fn carousel_mut(&mut self) -> Option<&mut Carousel> {
        match &mut self.kind {
            ElementKind::Carousel(carousel) => Some(carousel),
            _ => None,
        }
    }

    /// Button link, if this is a button with a non-empty link.
    #[must_use]
    pub fn link_url(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Button { link_url } => {
                link_url.as_deref().filter(|url| !url.trim().is_empty())
            }
            _ => None,
        }
    }

    /// A deep copy with fresh ids for every nested slide and action.
    #[must_use]
    pub fn deep_copy(&self, id: ElementId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.name = format!("{} (Copy)", self.name);
        if let Some(carousel) = copy.carousel_mut() {
            for image in &mut carousel.images {
                image.id = Uuid::new_v4().to_string();
            }
        }
        for action in &mut copy.actions {
            action.id = Uuid::new_v4().to_string();
        }
        copy
    }
}
