//! Editor state management.

use crate::element::{
    Action, AlignPreset, AxisLock, Carousel, CarouselImage, Effect, Element, ElementId,
    ElementType,
};
use crate::runtime::carousel::{CarouselInput, CarouselState, SlideTransition};
use crate::scene::{ElementPatch, Scene};
use crate::style::Style;
use crate::{StudioError, StudioResult};

/// Smallest zoom level.
pub const MIN_ZOOM: f32 = 0.1;
/// Largest zoom level.
pub const MAX_ZOOM: f32 = 3.0;
/// Zoom change per step.
pub const ZOOM_STEP: f32 = 0.1;

/// Per-session view state passed to gesture and editing operations.
///
/// Not persisted with the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Selected element, if any.
    pub selected: Option<ElementId>,
    /// Canvas zoom (1.0 = 100%).
    zoom: f32,
    /// Client-space x of the canvas origin.
    pub origin_x: f32,
    /// Client-space y of the canvas origin.
    pub origin_y: f32,
    /// Keep width/height proportional while resizing.
    pub lock_aspect_ratio: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            selected: None,
            zoom: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
            lock_aspect_ratio: false,
        }
    }
}

impl SessionContext {
    /// Create a session at 100% zoom with the canvas at the client origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the canvas origin in client coordinates.
    #[must_use]
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Set the zoom level.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Enable or disable the aspect-ratio lock.
    #[must_use]
    pub fn with_aspect_lock(mut self, locked: bool) -> Self {
        self.lock_aspect_ratio = locked;
        self
    }

    /// Current zoom.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Convert a client-space point to canvas pixels.
    #[must_use]
    pub fn to_canvas(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        (
            (client_x - self.origin_x) / self.zoom,
            (client_y - self.origin_y) / self.zoom,
        )
    }
}

/// The complete editor state.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    /// The scene being edited.
    pub scene: Scene,
    /// View state.
    pub session: SessionContext,
    /// Stylesheet appended after the built-in styles.
    pub custom_css: String,
    /// Script run after the built-in runtime.
    pub custom_js: String,
}

impl EditorState {
    /// Create an editor around a scene.
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// Add an element with its defaults and select it.
    pub fn add_element(&mut self, element_type: ElementType, x: f32, y: f32) -> ElementId {
        let id = self.scene.add_element(element_type, x, y);
        self.session.selected = Some(id);
        id
    }

    /// Duplicate an element and select the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn duplicate_element(&mut self, id: ElementId) -> StudioResult<ElementId> {
        let copy = self.scene.duplicate_element(id)?;
        self.session.selected = Some(copy);
        Ok(copy)
    }

    /// Delete an element, clearing the selection if it pointed there.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn delete_element(&mut self, id: ElementId) -> StudioResult<Element> {
        let removed = self.scene.remove_element(id)?;
        if self.session.selected == Some(id) {
            self.session.selected = None;
        }
        Ok(removed)
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: Option<ElementId>) -> StudioResult<()> {
        if let Some(id) = id {
            if !self.scene.contains(id) {
                return Err(StudioError::ElementNotFound(id));
            }
        }
        self.session.selected = id;
        Ok(())
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.session.selected.and_then(|id| self.scene.get_element(id))
    }

    /// Apply a partial update to an element.
    ///
    /// # Errors
    ///
    /// See [`Scene::update_element`].
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> StudioResult<()> {
        self.scene.update_element(id, patch)
    }

    /// Overlay style properties on an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn update_style(&mut self, id: ElementId, style: Style) -> StudioResult<()> {
        self.scene.update_element(id, ElementPatch::style(style))
    }

    fn element_mut(&mut self, id: ElementId) -> StudioResult<&mut Element> {
        self.scene
            .get_element_mut(id)
            .ok_or(StudioError::ElementNotFound(id))
    }

    /// Add a toggle-visibility click action to `source`.
    ///
    /// The target defaults to the first other element in the scene. With no
    /// other element the target is id 0, which never resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the source element is not found.
    pub fn add_action(&mut self, source: ElementId) -> StudioResult<String> {
        let target = self
            .scene
            .elements()
            .iter()
            .map(|e| e.id)
            .find(|&id| id != source)
            .unwrap_or(ElementId::new(0));
        let action = Action::new(Effect::ToggleVisibility, target);
        let action_id = action.id.clone();
        self.element_mut(source)?.actions.push(action);
        Ok(action_id)
    }

    /// Change an action's effect and target.
    ///
    /// # Errors
    ///
    /// Returns an error if the source element or the action is not found.
    pub fn update_action(
        &mut self,
        source: ElementId,
        action_id: &str,
        effect: Effect,
        target: ElementId,
    ) -> StudioResult<()> {
        let action = self
            .element_mut(source)?
            .actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| StudioError::InvalidOperation(format!("no action {action_id}")))?;
        action.effect = effect;
        action.target = target;
        Ok(())
    }

    /// Remove an action.
    ///
    /// # Errors
    ///
    /// Returns an error if the source element or the action is not found.
    pub fn remove_action(&mut self, source: ElementId, action_id: &str) -> StudioResult<Action> {
        let actions = &mut self.element_mut(source)?.actions;
        let index = actions
            .iter()
            .position(|a| a.id == action_id)
            .ok_or_else(|| StudioError::InvalidOperation(format!("no action {action_id}")))?;
        Ok(actions.remove(index))
    }

    fn carousel_element(&mut self, id: ElementId) -> StudioResult<&mut Carousel> {
        self.element_mut(id)?
            .carousel_mut()
            .ok_or_else(|| StudioError::InvalidOperation(format!("element {id} is not a carousel")))
    }

    /// Append a slide and show it.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a carousel.
    pub fn add_carousel_image(&mut self, id: ElementId, url: impl Into<String>) -> StudioResult<String> {
        let carousel = self.carousel_element(id)?;
        let image = CarouselImage::new(url);
        let image_id = image.id.clone();
        carousel.images.push(image);
        carousel.editing_index = carousel.images.len() - 1;
        Ok(image_id)
    }

    /// Replace a slide.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a carousel or `index` is out of range.
    pub fn update_carousel_image(
        &mut self,
        id: ElementId,
        index: usize,
        image: CarouselImage,
    ) -> StudioResult<()> {
        let carousel = self.carousel_element(id)?;
        let len = carousel.images.len();
        let slot = carousel
            .images
            .get_mut(index)
            .ok_or(StudioError::IndexOutOfRange { index, len })?;
        *slot = image;
        Ok(())
    }

    /// Remove a slide, keeping the editing index in range.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a carousel or `index` is out of range.
    pub fn remove_carousel_image(&mut self, id: ElementId, index: usize) -> StudioResult<CarouselImage> {
        let carousel = self.carousel_element(id)?;
        let len = carousel.images.len();
        if index >= len {
            return Err(StudioError::IndexOutOfRange { index, len });
        }
        let removed = carousel.images.remove(index);
        carousel.editing_index = carousel
            .editing_index
            .min(carousel.images.len().saturating_sub(1));
        Ok(removed)
    }

    /// Step the slide shown while editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a carousel.
    pub fn show_carousel_slide(
        &mut self,
        id: ElementId,
        input: CarouselInput,
    ) -> StudioResult<Option<SlideTransition>> {
        let carousel = self.carousel_element(id)?;
        let mut state = CarouselState::new(carousel.images.len(), carousel.editing_index);
        let transition = state.apply(input);
        carousel.editing_index = state.index();
        Ok(transition)
    }

    /// Snap an element to an alignment preset and pin the matching axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn align_preset(&mut self, id: ElementId, preset: AlignPreset) -> StudioResult<()> {
        let frame = self
            .scene
            .get_element(id)
            .ok_or(StudioError::ElementNotFound(id))?
            .frame;
        let canvas = (self.scene.config.width, self.scene.config.height);
        let (x, y) = preset.position(canvas, (frame.width, frame.height));
        let patch = ElementPatch {
            align: Some(Some(preset)),
            ..ElementPatch::position(x, y).with_lock(preset.axis_lock())
        };
        self.scene.update_element(id, patch)
    }

    /// Stretch an element over the whole canvas and pin both axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn fit_to_canvas(&mut self, id: ElementId) -> StudioResult<()> {
        let config = &self.scene.config;
        let patch = ElementPatch {
            width: Some(config.width),
            height: Some(config.height),
            align: Some(None),
            ..ElementPatch::position(0.0, 0.0).with_lock(AxisLock::Both)
        };
        self.scene.update_element(id, patch)
    }

    /// Release an alignment preset so the element moves freely again.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn clear_alignment(&mut self, id: ElementId) -> StudioResult<()> {
        let patch = ElementPatch {
            align: Some(None),
            lock: Some(AxisLock::None),
            ..ElementPatch::default()
        };
        self.scene.update_element(id, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut session = SessionContext::new();
        for _ in 0..40 {
            session.zoom_in();
        }
        assert!((session.zoom() - MAX_ZOOM).abs() < f32::EPSILON);
        for _ in 0..40 {
            session.zoom_out();
        }
        assert!((session.zoom() - MIN_ZOOM).abs() < f32::EPSILON);
    }

    #[test]
    fn test_to_canvas_divides_by_zoom() {
        let session = SessionContext::new().with_origin(100.0, 50.0).with_zoom(2.0);
        assert_eq!(session.to_canvas(140.0, 70.0), (20.0, 10.0));
    }

    #[test]
    fn test_add_and_duplicate_select() {
        let mut editor = EditorState::default();
        let id = editor.add_element(ElementType::Text, 0.0, 0.0);
        assert_eq!(editor.session.selected, Some(id));

        let copy = editor.duplicate_element(id).expect("duplicate");
        assert_eq!(editor.session.selected, Some(copy));
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut editor = EditorState::default();
        let a = editor.add_element(ElementType::Text, 0.0, 0.0);
        let b = editor.add_element(ElementType::Box, 0.0, 0.0);

        editor.delete_element(a).expect("delete");
        assert_eq!(editor.session.selected, Some(b));
        editor.delete_element(b).expect("delete");
        assert_eq!(editor.session.selected, None);
    }

    #[test]
    fn test_add_action_defaults_to_first_other_element() {
        let mut editor = EditorState::default();
        let button = editor.add_element(ElementType::Button, 0.0, 0.0);
        let lonely = editor.add_action(button).expect("action");
        assert_eq!(
            editor.scene.get_element(button).expect("button").actions[0].target,
            ElementId::new(0)
        );
        editor.remove_action(button, &lonely).expect("remove");

        let image = editor.add_element(ElementType::Image, 0.0, 0.0);
        let action_id = editor.add_action(button).expect("action");
        let action = &editor.scene.get_element(button).expect("button").actions[0];
        assert_eq!(action.target, image);
        assert_eq!(action.effect, Effect::ToggleVisibility);

        editor
            .update_action(button, &action_id, Effect::ToggleFade, button)
            .expect("update");
        let action = &editor.scene.get_element(button).expect("button").actions[0];
        assert_eq!(action.effect, Effect::ToggleFade);
        assert!(editor.remove_action(button, "missing").is_err());
    }

    #[test]
    fn test_carousel_editing() {
        let mut editor = EditorState::default();
        let id = editor.add_element(ElementType::Carousel, 0.0, 0.0);

        editor.add_carousel_image(id, "blob:abc").expect("add");
        let carousel = editor.scene.get_element(id).and_then(Element::carousel).expect("c");
        assert_eq!(carousel.images.len(), 3);
        assert_eq!(carousel.editing_index, 2);

        let t = editor
            .show_carousel_slide(id, CarouselInput::Advance)
            .expect("show")
            .expect("transition");
        assert_eq!(t.to, 0);

        editor
            .show_carousel_slide(id, CarouselInput::Jump(2))
            .expect("show");
        editor.remove_carousel_image(id, 2).expect("remove");
        let carousel = editor.scene.get_element(id).and_then(Element::carousel).expect("c");
        assert_eq!(carousel.editing_index, 1);

        let text = editor.add_element(ElementType::Text, 0.0, 0.0);
        assert!(editor.add_carousel_image(text, "x").is_err());
    }

    #[test]
    fn test_align_presets() {
        let mut editor = EditorState::default();
        let id = editor.add_element(ElementType::Button, 7.0, 9.0);

        editor.align_preset(id, AlignPreset::TopCenter).expect("align");
        let el = editor.scene.get_element(id).expect("el");
        assert_eq!((el.frame.x, el.frame.y), (100.0, 0.0));
        assert_eq!(el.lock, AxisLock::X);
        assert_eq!(el.align, Some(AlignPreset::TopCenter));

        editor.align_preset(id, AlignPreset::BottomRight).expect("align");
        let el = editor.scene.get_element(id).expect("el");
        assert_eq!((el.frame.x, el.frame.y), (200.0, 440.0));
        assert_eq!(el.lock, AxisLock::None);

        editor.fit_to_canvas(id).expect("fit");
        let el = editor.scene.get_element(id).expect("el");
        assert_eq!(el.frame, crate::element::Frame::new(0.0, 0.0, 320.0, 480.0));
        assert_eq!(el.lock, AxisLock::Both);
    }
}
