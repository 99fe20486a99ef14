//! Bundle script synthesis.
//!
//! The script is a fixed runtime parameterized by an embedded JSON
//! [`RuntimeConfig`]. Carousels replay the precomputed [`TransitionTable`] of
//! the shared automaton, so exported creatives step exactly like the preview.

use std::collections::HashSet;

use serde::Serialize;

use studio_core::element::{CarouselTransition, Effect, Element, ElementId};
use studio_core::runtime::{TransitionTable, FADE_TRANSITION};

use crate::error::ExportResult;
use crate::markup::{DOT_ACTIVE, DOT_INACTIVE};

/// One carousel as seen by the bundle runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselRuntime {
    /// DOM id of the carousel element.
    pub element: String,
    /// Visual transition style.
    pub transition: CarouselTransition,
    /// Every transition, starting from slide 0.
    pub table: TransitionTable,
}

/// A single click action as seen by the bundle runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRuntime {
    /// DOM id of the target.
    pub target: String,
    /// Effect applied to the target.
    pub effect: Effect,
}

/// Actions fired by clicking one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRuntime {
    /// DOM id of the clicked element.
    pub element: String,
    /// Actions in the order they apply.
    pub actions: Vec<ActionRuntime>,
}

/// Parameters of the bundle runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Every carousel in scene order.
    pub carousels: Vec<CarouselRuntime>,
    /// Every element with actions, in scene order.
    pub interactions: Vec<InteractionRuntime>,
    /// Opacity transition used by fade toggles.
    pub fade_transition: &'static str,
    /// Color of the active indicator dot.
    pub dot_active: &'static str,
    /// Color of inactive indicator dots.
    pub dot_inactive: &'static str,
}

fn dom_id(id: ElementId) -> String {
    format!("el-{id}")
}

impl RuntimeConfig {
    /// Collect runtime parameters from elements in scene order.
    ///
    /// Actions aimed at elements that are not part of the scene are dropped.
    #[must_use]
    pub fn from_elements(elements: &[Element]) -> Self {
        let existing: HashSet<ElementId> = elements.iter().map(|e| e.id).collect();

        let carousels = elements
            .iter()
            .filter_map(|element| {
                element.carousel().map(|carousel| CarouselRuntime {
                    element: dom_id(element.id),
                    transition: carousel.transition,
                    table: TransitionTable::build(carousel.images.len()),
                })
            })
            .collect();

        let interactions = elements
            .iter()
            .filter_map(|element| {
                let actions: Vec<ActionRuntime> = element
                    .actions
                    .iter()
                    .filter(|action| {
                        let exists = existing.contains(&action.target);
                        if !exists {
                            tracing::debug!(
                                "Dropping action on {} aimed at missing element {}",
                                element.id,
                                action.target
                            );
                        }
                        exists
                    })
                    .map(|action| ActionRuntime {
                        target: dom_id(action.target),
                        effect: action.effect,
                    })
                    .collect();
                (!actions.is_empty()).then(|| InteractionRuntime {
                    element: dom_id(element.id),
                    actions,
                })
            })
            .collect();

        Self {
            carousels,
            interactions,
            fade_transition: FADE_TRANSITION,
            dot_active: DOT_ACTIVE,
            dot_inactive: DOT_INACTIVE,
        }
    }

    /// JSON safe to embed in a `<script>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_embedded_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string(self)?.replace("</", "<\\/"))
    }
}

const RUNTIME_HEAD: &str = r"(function() {
    var STUDIO = ";

const RUNTIME_BODY: &str = r"    var SLIDE_CLASSES = ['slide-in-right', 'slide-out-left', 'slide-in-left', 'slide-out-right'];

    function bindClickTargets() {
        var targets = document.querySelectorAll('.click-target');
        for (var i = 0; i < targets.length; i++) {
            targets[i].addEventListener('click', function(e) {
                e.preventDefault();
                window.open(window.clickTag, '_blank');
            });
        }
    }

    function initCarousel(cfg) {
        var root = document.getElementById(cfg.element);
        var c = root && root.querySelector('.rm-carousel');
        if (!c) return;
        var images = c.querySelectorAll('.rm-carousel-img');
        var dots = c.querySelectorAll('.rm-dot');
        var table = cfg.table;
        if (table.len === 0 || images.length !== table.len) return;
        var idx = 0;

        function render(from, to, direction) {
            for (var i = 0; i < images.length; i++) {
                var on = i === to;
                for (var k = 0; k < SLIDE_CLASSES.length; k++) images[i].classList.remove(SLIDE_CLASSES[k]);
                images[i].style.opacity = on ? '1' : '0';
                images[i].style.zIndex = on ? '1' : '0';
                if (cfg.transition === 'none') images[i].style.transition = 'none';
                if (dots[i]) dots[i].style.backgroundColor = on ? STUDIO.dotActive : STUDIO.dotInactive;
            }
            if (cfg.transition === 'slide' && direction && from !== to) {
                var forward = direction === 'forward';
                images[to].classList.add(forward ? 'slide-in-right' : 'slide-in-left');
                images[from].classList.add(forward ? 'slide-out-left' : 'slide-out-right');
            }
        }

        function go(to, direction) {
            var from = idx;
            if (to === from) return;
            idx = to;
            render(from, to, direction);
        }

        var next = c.querySelector('.rm-next');
        var prev = c.querySelector('.rm-prev');
        if (next) next.addEventListener('click', function(e) { e.stopPropagation(); go(table.advance[idx], 'forward'); });
        if (prev) prev.addEventListener('click', function(e) { e.stopPropagation(); go(table.retreat[idx], 'backward'); });
        for (var d = 0; d < dots.length; d++) {
            (function(k) {
                dots[k].addEventListener('click', function(e) {
                    e.stopPropagation();
                    var direction = table.jump[idx][k];
                    if (direction) go(k, direction);
                });
            })(d);
        }

        render(idx, idx, null);
    }

    function initCarousels() {
        for (var i = 0; i < STUDIO.carousels.length; i++) initCarousel(STUDIO.carousels[i]);
    }

    function initInteractions() {
        var hidden = {};
        STUDIO.interactions.forEach(function(source) {
            var el = document.getElementById(source.element);
            if (!el) return;
            el.addEventListener('click', function() {
                for (var i = 0; i < source.actions.length; i++) {
                    var action = source.actions[i];
                    var target = document.getElementById(action.target);
                    if (!target) continue;
                    var isHidden = !hidden[action.target];
                    hidden[action.target] = isHidden;
                    target.style.transition = action.effect === 'toggle-fade'
                        ? STUDIO.fadeTransition + ', transform 0.3s ease'
                        : 'transform 0.3s ease';
                    target.style.opacity = isHidden ? '0' : '1';
                    target.style.pointerEvents = isHidden ? 'none' : 'auto';
                }
            });
        });
    }

    function runCustomScript() {
";

const RUNTIME_TAIL: &str = r"
    }

    function startAd() {
        try { bindClickTargets(); } catch (e) { console.error('Click setup failed:', e); }
        try { initCarousels(); } catch (e) { console.error('Carousel init failed:', e); }
        try { initInteractions(); } catch (e) { console.error('Interaction init failed:', e); }
        try { runCustomScript(); } catch (e) { console.error('Custom script error:', e); }
    }

    if (document.readyState === 'complete' || document.readyState === 'interactive') {
        startAd();
    } else {
        window.addEventListener('DOMContentLoaded', startAd);
    }
})();
";

/// The complete bundle script. `custom_js` runs last, inside its own error
/// boundary.
///
/// # Errors
///
/// Returns an error if the runtime configuration cannot be serialized.
pub fn bundle_script(elements: &[Element], custom_js: &str) -> ExportResult<String> {
    let config = RuntimeConfig::from_elements(elements).to_embedded_json()?;
    Ok(format!(
        "{RUNTIME_HEAD}{config};\n\n{RUNTIME_BODY}{custom_js}{RUNTIME_TAIL}"
    ))
}
