//! Live preview host for the playback runtime.
//!
//! [`PreviewSession`] plays a scene snapshot with the same carousel and
//! interaction automata the exported script uses. [`DeferredScript`] runs the
//! user script after a quiet period, cancelling any run still pending.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::element::{Action, CarouselTransition, ElementId};
use crate::runtime::carousel::{CarouselInput, CarouselState, SlideTransition};
use crate::runtime::interaction::{Presentation, VisibilityState};
use crate::scene::Scene;
use crate::StudioResult;

/// Default delay before the user script runs.
pub const DEFAULT_SCRIPT_DELAY: Duration = Duration::from_millis(1000);

/// Preview configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Quiet period after the last script edit before it runs.
    pub script_delay: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            script_delay: DEFAULT_SCRIPT_DELAY,
        }
    }
}

#[derive(Debug, Clone)]
struct CarouselSlot {
    state: CarouselState,
    style: CarouselTransition,
    last: Option<SlideTransition>,
}

/// What a host should draw for a carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideFrame {
    /// Visibility per slide; also the active indicator dot.
    pub visible: Vec<bool>,
    /// Slide entering and its class, for the last transition.
    pub enter: Option<(usize, &'static str)>,
    /// Slide leaving and its class, for the last transition.
    pub exit: Option<(usize, &'static str)>,
}

/// A running preview of a scene.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    visibility: VisibilityState,
    carousels: HashMap<ElementId, CarouselSlot>,
    actions: HashMap<ElementId, Vec<Action>>,
    existing: HashSet<ElementId>,
}

impl PreviewSession {
    /// Start a preview: everything visible, carousels on their editing slide.
    #[must_use]
    pub fn start(scene: &Scene) -> Self {
        let mut carousels = HashMap::new();
        let mut actions = HashMap::new();
        let mut existing = HashSet::new();

        for element in scene.elements() {
            existing.insert(element.id);
            if !element.actions.is_empty() {
                actions.insert(element.id, element.actions.clone());
            }
            if let Some(carousel) = element.carousel() {
                carousels.insert(
                    element.id,
                    CarouselSlot {
                        state: CarouselState::new(carousel.images.len(), carousel.editing_index),
                        style: carousel.transition,
                        last: None,
                    },
                );
            }
        }

        tracing::debug!(
            "Preview started with {} elements, {} carousels",
            existing.len(),
            carousels.len()
        );

        Self {
            visibility: VisibilityState::new(),
            carousels,
            actions,
            existing,
        }
    }

    /// Click on an element, firing its actions. Returns the toggled targets.
    pub fn activate(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(actions) = self.actions.get(&id) else {
            return Vec::new();
        };
        let existing = &self.existing;
        self.visibility
            .activate(actions, |target| existing.contains(&target))
    }

    /// Send a navigation input to a carousel.
    pub fn carousel_input(&mut self, id: ElementId, input: CarouselInput) -> Option<SlideTransition> {
        let slot = self.carousels.get_mut(&id)?;
        let transition = slot.state.apply(input)?;
        slot.last = Some(transition);
        Some(transition)
    }

    /// Current slide of a carousel.
    #[must_use]
    pub fn current_slide(&self, id: ElementId) -> Option<usize> {
        self.carousels.get(&id).map(|slot| slot.state.index())
    }

    /// How an element should be presented.
    #[must_use]
    pub fn presentation(&self, id: ElementId) -> Presentation {
        self.visibility.presentation(id)
    }

    /// Slide visibility and transition classes of a carousel.
    #[must_use]
    pub fn slide_frame(&self, id: ElementId) -> Option<SlideFrame> {
        let slot = self.carousels.get(&id)?;
        let classes = slot
            .last
            .and_then(|t| t.classes(slot.style).map(|(enter, exit)| (t, enter, exit)));
        Some(SlideFrame {
            visible: slot.state.visibility(),
            enter: classes.map(|(t, enter, _)| (t.to, enter)),
            exit: classes.map(|(t, _, exit)| (t.from, exit)),
        })
    }

    /// Show everything again and drop carousel transition history.
    pub fn reset(&mut self) {
        self.visibility.reset();
        for slot in self.carousels.values_mut() {
            slot.last = None;
        }
    }
}

/// Something that can evaluate a user script.
pub trait ScriptHost: Send + Sync + 'static {
    /// Run a script.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Script`](crate::StudioError::Script) if the script throws.
    fn execute(&self, script: &str) -> StudioResult<()>;
}

/// Debounced execution of the user script.
///
/// Requires a Tokio runtime.
pub struct DeferredScript<H: ScriptHost> {
    host: Arc<H>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl<H: ScriptHost> DeferredScript<H> {
    /// Create a scheduler for `host`.
    #[must_use]
    pub fn new(host: Arc<H>, config: &PreviewConfig) -> Self {
        Self {
            host,
            delay: config.script_delay,
            pending: None,
        }
    }

    /// Replace the script: any pending run is cancelled, and a non-empty
    /// script is scheduled after the delay.
    pub fn set_script(&mut self, script: impl Into<String>) {
        self.cancel();
        let script = script.into();
        if script.trim().is_empty() {
            return;
        }

        let host = Arc::clone(&self.host);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = host.execute(&script) {
                tracing::warn!("Custom script failed: {e}");
            }
        }));
    }

    /// Cancel the pending run, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a run is scheduled and has not finished.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<H: ScriptHost> Drop for DeferredScript<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<H: ScriptHost> std::fmt::Debug for DeferredScript<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredScript")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::element::{Effect, ElementType};
    use crate::scene::ElementPatch;
    use crate::StudioError;

    #[derive(Default)]
    struct RecordingHost {
        runs: Mutex<Vec<String>>,
    }

    impl ScriptHost for RecordingHost {
        fn execute(&self, script: &str) -> StudioResult<()> {
            self.runs.lock().expect("lock").push(script.to_string());
            if script.contains("throw") {
                return Err(StudioError::Script("boom".to_string()));
            }
            Ok(())
        }
    }

    fn interactive_scene() -> (Scene, ElementId, ElementId, ElementId) {
        let mut scene = Scene::default();
        let button = scene.add_element(ElementType::Button, 0.0, 0.0);
        let image = scene.add_element(ElementType::Image, 0.0, 0.0);
        let carousel = scene.add_element(ElementType::Carousel, 0.0, 0.0);
        let patch = ElementPatch {
            actions: Some(vec![Action::new(Effect::ToggleFade, image)]),
            ..ElementPatch::default()
        };
        scene.update_element(button, patch).expect("actions");
        (scene, button, image, carousel)
    }

    #[test]
    fn test_activate_hides_target() {
        let (scene, button, image, _) = interactive_scene();
        let mut preview = PreviewSession::start(&scene);

        assert_eq!(preview.activate(button), vec![image]);
        assert!(preview.presentation(image).opacity.abs() < f32::EPSILON);
        assert!(preview.activate(image).is_empty());

        preview.reset();
        assert!((preview.presentation(image).opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_carousel_starts_on_editing_slide() {
        let (mut scene, _, _, carousel) = interactive_scene();
        let mut data = scene
            .get_element(carousel)
            .and_then(|e| e.carousel())
            .cloned()
            .expect("carousel");
        data.editing_index = 1;
        let patch = ElementPatch {
            carousel: Some(data),
            ..ElementPatch::default()
        };
        scene.update_element(carousel, patch).expect("update");

        let mut preview = PreviewSession::start(&scene);
        assert_eq!(preview.current_slide(carousel), Some(1));

        preview.carousel_input(carousel, CarouselInput::Advance);
        let frame = preview.slide_frame(carousel).expect("frame");
        assert_eq!(frame.visible, vec![true, false]);
        assert_eq!(frame.enter, Some((0, "slide-in-right")));
        assert_eq!(frame.exit, Some((1, "slide-out-left")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_runs_after_delay() {
        let host = Arc::new(RecordingHost::default());
        let mut script = DeferredScript::new(Arc::clone(&host), &PreviewConfig::default());

        script.set_script("console.log(1)");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(host.runs.lock().expect("lock").is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*host.runs.lock().expect("lock"), vec!["console.log(1)".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_script_cancels_pending_run() {
        let host = Arc::new(RecordingHost::default());
        let mut script = DeferredScript::new(Arc::clone(&host), &PreviewConfig::default());

        script.set_script("first()");
        tokio::time::sleep(Duration::from_millis(800)).await;
        script.set_script("second()");
        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert_eq!(*host.runs.lock().expect("lock"), vec!["second()".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_errors_are_contained() {
        let host = Arc::new(RecordingHost::default());
        let mut script = DeferredScript::new(Arc::clone(&host), &PreviewConfig::default());

        script.set_script("throw new Error()");
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(host.runs.lock().expect("lock").len(), 1);
        assert!(!script.is_pending());

        script.set_script("   ");
        assert!(!script.is_pending());
    }
}
