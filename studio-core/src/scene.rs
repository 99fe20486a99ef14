//! Scene model: the ordered element list of a creative.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::element::{
    Action, AlignPreset, Animation, AxisLock, Carousel, Element, ElementId, ElementKind,
    ElementType, MIN_ELEMENT_SIZE,
};
use crate::style::{Color, Style};
use crate::{StudioError, StudioResult};

/// Offset applied to duplicated elements.
const DUPLICATE_OFFSET: f32 = 20.0;

/// Canvas dimensions and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Canvas background.
    pub background_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 480.0,
            background_color: Color::from_static("#ffffff"),
        }
    }
}

/// Partial update of an element.
///
/// Unset fields are left alone. `style` is merged property by property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    /// New display name.
    pub name: Option<String>,
    /// New left edge.
    pub x: Option<f32>,
    /// New top edge.
    pub y: Option<f32>,
    /// New width (clamped to the minimum size).
    pub width: Option<f32>,
    /// New height (clamped to the minimum size).
    pub height: Option<f32>,
    /// New text or media reference.
    pub content: Option<String>,
    /// Style properties to overlay.
    pub style: Option<Style>,
    /// New button link; `Some(None)` clears it. Buttons only.
    pub link_url: Option<Option<String>>,
    /// New animation; `Some(None)` removes it.
    pub animation: Option<Option<Animation>>,
    /// New axis lock.
    pub lock: Option<AxisLock>,
    /// New alignment preset; `Some(None)` clears it.
    pub align: Option<Option<AlignPreset>>,
    /// Replacement action list.
    pub actions: Option<Vec<Action>>,
    /// Replacement carousel settings. Carousels only.
    pub carousel: Option<Carousel>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that resizes an element.
    #[must_use]
    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that overlays style properties.
    #[must_use]
    pub fn style(style: Style) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    /// Also set the left edge.
    #[must_use]
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    /// Also set the top edge.
    #[must_use]
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    /// Also set the axis lock.
    #[must_use]
    pub fn with_lock(mut self, lock: AxisLock) -> Self {
        self.lock = Some(lock);
        self
    }
}

/// A creative scene: elements in stacking order (last is on top).
///
/// Deserializing repairs what a hand-edited document can break: sizes below
/// the floor, zero or repeated ids, and a stale id counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SceneData")]
pub struct Scene {
    /// Canvas settings.
    #[serde(default)]
    pub config: CanvasConfig,
    /// Elements; the index is the stacking order.
    #[serde(default)]
    elements: Vec<Element>,
    /// Next id to hand out.
    #[serde(default = "first_id")]
    next_id: u32,
}

fn first_id() -> u32 {
    1
}

/// Scene as stored, before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneData {
    #[serde(default)]
    config: CanvasConfig,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default = "first_id")]
    next_id: u32,
}

impl TryFrom<SceneData> for Scene {
    type Error = StudioError;

    fn try_from(data: SceneData) -> StudioResult<Self> {
        let mut scene = Self {
            config: data.config,
            elements: data.elements,
            next_id: data.next_id,
        };
        scene.normalize()?;
        Ok(scene)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
            next_id: first_id(),
        }
    }

    /// Saturates at `u32::MAX`; loading rejects documents whose ids reach it.
    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn try_allocate_id(&mut self) -> StudioResult<ElementId> {
        if self.next_id == u32::MAX {
            return Err(StudioError::InvalidOperation(
                "element ids exhausted".to_string(),
            ));
        }
        Ok(self.allocate_id())
    }

    /// Add a new element of `element_type` at `(x, y)` with its per-type defaults.
    pub fn add_element(&mut self, element_type: ElementType, x: f32, y: f32) -> ElementId {
        let id = self.allocate_id();
        let element = Element::with_defaults(id, element_type, x, y, self.config.width);
        tracing::debug!("Added {} element {id}", element_type.as_str());
        self.elements.push(element);
        id
    }

    /// Insert a prebuilt element on top, assigning it a fresh id.
    pub fn insert_element(&mut self, mut element: Element) -> ElementId {
        let id = self.allocate_id();
        element.id = id;
        self.elements.push(element);
        id
    }

    /// Duplicate an element: fresh id, " (Copy)" name, offset by 20px, placed on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn duplicate_element(&mut self, id: ElementId) -> StudioResult<ElementId> {
        let source = self
            .get_element(id)
            .ok_or(StudioError::ElementNotFound(id))?
            .clone();
        let new_id = self.allocate_id();
        let mut copy = source.deep_copy(new_id);
        copy.frame.x += DUPLICATE_OFFSET;
        copy.frame.y += DUPLICATE_OFFSET;
        tracing::debug!("Duplicated element {id} as {new_id}");
        self.elements.push(copy);
        Ok(new_id)
    }

    /// Apply a partial update to an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found, or if the patch sets
    /// type-specific data on an element of another type.
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> StudioResult<()> {
        let element = self
            .get_element_mut(id)
            .ok_or(StudioError::ElementNotFound(id))?;

        let kind = element.element_type();
        if patch.link_url.is_some() && kind != ElementType::Button {
            return Err(StudioError::InvalidOperation(format!(
                "link on {} element {id}",
                kind.as_str()
            )));
        }
        if patch.carousel.is_some() && kind != ElementType::Carousel {
            return Err(StudioError::InvalidOperation(format!(
                "carousel settings on {} element {id}",
                kind.as_str()
            )));
        }

        if let (Some(link), ElementKind::Button { link_url }) = (patch.link_url, &mut element.kind) {
            *link_url = link;
        }
        if let (Some(carousel), Some(current)) = (patch.carousel, element.carousel_mut()) {
            *current = carousel;
        }

        if let Some(name) = patch.name {
            element.name = name;
        }
        if let Some(x) = patch.x {
            element.frame.x = x;
        }
        if let Some(y) = patch.y {
            element.frame.y = y;
        }
        if let Some(width) = patch.width {
            element.frame.width = width.max(MIN_ELEMENT_SIZE);
        }
        if let Some(height) = patch.height {
            element.frame.height = height.max(MIN_ELEMENT_SIZE);
        }
        if let Some(content) = patch.content {
            element.content = content;
        }
        if let Some(style) = patch.style {
            element.style.merge(&style);
        }
        if let Some(animation) = patch.animation {
            element.animation = animation;
        }
        if let Some(lock) = patch.lock {
            element.lock = lock;
        }
        if let Some(align) = patch.align {
            element.align = align;
        }
        if let Some(actions) = patch.actions {
            element.actions = actions;
        }
        Ok(())
    }

    /// Remove an element. Actions targeting it are left dangling.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> StudioResult<Element> {
        let index = self
            .position_of(id)
            .ok_or(StudioError::ElementNotFound(id))?;
        tracing::debug!("Removed element {id}");
        Ok(self.elements.remove(index))
    }

    /// Move the element at `from` to `to`; every other element keeps its
    /// relative order.
    ///
    /// # Errors
    ///
    /// Returns an error if either index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> StudioResult<()> {
        let len = self.elements.len();
        for index in [from, to] {
            if index >= len {
                return Err(StudioError::IndexOutOfRange { index, len });
            }
        }
        let element = self.elements.remove(from);
        self.elements.insert(to, element);
        Ok(())
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable element by ID.
    pub(crate) fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Stacking index of an element.
    #[must_use]
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Whether an element exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.position_of(id).is_some()
    }

    /// Elements in stacking order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The id the next new element will receive.
    #[must_use]
    pub fn next_id(&self) -> ElementId {
        ElementId::new(self.next_id)
    }

    /// Make sure `next_id` is above every stored id.
    fn repair_next_id(&mut self) -> StudioResult<()> {
        let max = self.elements.iter().map(|e| e.id.get()).max().unwrap_or(0);
        let above = max
            .checked_add(1)
            .filter(|next| *next < u32::MAX)
            .ok_or_else(|| StudioError::InvalidOperation(format!("element id {max} is out of range")))?;
        self.next_id = self.next_id.max(above).max(first_id());
        if self.next_id == u32::MAX {
            return Err(StudioError::InvalidOperation(
                "element id counter is out of range".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StudioResult<String> {
        serde_json::to_string(self).map_err(StudioError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the stored ids are out of range.
    pub fn from_json(json: &str) -> StudioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fix up invariants after loading from an external source.
    ///
    /// The first element holding an id keeps it; zero and repeated ids get
    /// fresh ones.
    fn normalize(&mut self) -> StudioResult<()> {
        let mut seen = HashSet::new();
        let mut collisions = Vec::new();
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.frame.width = element.frame.width.max(MIN_ELEMENT_SIZE);
            element.frame.height = element.frame.height.max(MIN_ELEMENT_SIZE);
            if element.id.get() == 0 || !seen.insert(element.id) {
                collisions.push(index);
            }
        }

        self.repair_next_id()?;
        for index in collisions {
            let id = self.try_allocate_id()?;
            let element = &mut self.elements[index];
            tracing::warn!("Renumbered element {} ({}) to {id}", element.id, element.name);
            element.id = id;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Effect;
    use crate::style::Length;

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::default();
        assert!(scene.is_empty());

        let id = scene.add_element(ElementType::Text, 10.0, 10.0);
        assert_eq!(id, ElementId::new(1));
        assert_eq!(scene.element_count(), 1);
        assert!(scene.get_element(id).is_some());

        scene.remove_element(id).expect("should remove");
        assert!(scene.is_empty());
        assert!(scene.remove_element(id).is_err());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut scene = Scene::default();
        let a = scene.add_element(ElementType::Box, 0.0, 0.0);
        scene.remove_element(a).expect("remove");
        let b = scene.add_element(ElementType::Box, 0.0, 0.0);
        assert!(b > a);
    }

    #[test]
    fn test_duplicate_offsets_and_stacks_on_top() {
        let mut scene = Scene::default();
        let id = scene.add_element(ElementType::Button, 30.0, 40.0);
        scene.add_element(ElementType::Text, 0.0, 0.0);
        let copy = scene.duplicate_element(id).expect("duplicate");

        assert_eq!(scene.position_of(copy), Some(2));
        let el = scene.get_element(copy).expect("copy");
        assert!((el.frame.x - 50.0).abs() < f32::EPSILON);
        assert!((el.frame.y - 60.0).abs() < f32::EPSILON);
        assert_eq!(el.name, "button 1 (Copy)");
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut scene = Scene::default();
        let id = scene.add_element(ElementType::Text, 0.0, 0.0);
        let copy = scene.duplicate_element(id).expect("duplicate");

        let patch = ElementPatch::style(Style {
            font_size: Some(Length::Px(30.0)),
            ..Style::default()
        });
        scene.update_element(copy, patch).expect("update");

        let original = scene.get_element(id).expect("original");
        assert_eq!(original.style.font_size, Some(Length::Px(16.0)));
    }

    #[test]
    fn test_update_clamps_size() {
        let mut scene = Scene::default();
        let id = scene.add_element(ElementType::Image, 0.0, 0.0);
        scene
            .update_element(id, ElementPatch::size(5.0, -3.0))
            .expect("update");
        let frame = scene.get_element(id).expect("el").frame;
        assert!((frame.width - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);
        assert!((frame.height - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_rejects_mismatched_kind_data() {
        let mut scene = Scene::default();
        let id = scene.add_element(ElementType::Text, 0.0, 0.0);
        let patch = ElementPatch {
            link_url: Some(Some("https://example.com".to_string())),
            ..ElementPatch::default()
        };
        assert!(matches!(
            scene.update_element(id, patch),
            Err(StudioError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_reorder_preserves_relative_order() {
        let mut scene = Scene::default();
        let ids: Vec<_> = (0..4)
            .map(|_| scene.add_element(ElementType::Box, 0.0, 0.0))
            .collect();

        scene.reorder(0, 2).expect("reorder");
        let order: Vec<_> = scene.elements().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0], ids[3]]);

        assert!(matches!(
            scene.reorder(0, 4),
            Err(StudioError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_remove_leaves_dangling_actions() {
        let mut scene = Scene::default();
        let source = scene.add_element(ElementType::Button, 0.0, 0.0);
        let target = scene.add_element(ElementType::Image, 0.0, 0.0);
        let patch = ElementPatch {
            actions: Some(vec![Action::new(Effect::ToggleVisibility, target)]),
            ..ElementPatch::default()
        };
        scene.update_element(source, patch).expect("update");
        scene.remove_element(target).expect("remove");

        let actions = &scene.get_element(source).expect("source").actions;
        assert_eq!(actions[0].target, target);
    }

    #[test]
    fn test_json_round_trip_repairs_next_id() {
        let mut scene = Scene::default();
        scene.add_element(ElementType::Text, 0.0, 0.0);
        scene.add_element(ElementType::Carousel, 0.0, 0.0);

        let json = scene.to_json().expect("serialize");
        let restored = Scene::from_json(&json).expect("deserialize");
        assert_eq!(restored, scene);

        let stale = json.replace("\"nextId\":3", "\"nextId\":1");
        let mut repaired = Scene::from_json(&stale).expect("deserialize");
        assert_eq!(repaired.next_id(), ElementId::new(3));
        assert_eq!(
            repaired.add_element(ElementType::Box, 0.0, 0.0),
            ElementId::new(3)
        );
    }
}
