//! Project file format.

use serde::{Deserialize, Serialize};

use crate::scene::Scene;
use crate::state::EditorState;
use crate::StudioResult;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// A saved creative: scene plus custom CSS and JS.
///
/// Session state (selection, zoom) is not part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeDocument {
    /// Format version.
    #[serde(default = "CreativeDocument::default_version")]
    pub version: u32,
    /// The scene.
    pub scene: Scene,
    /// Stylesheet appended after the built-in styles.
    #[serde(default)]
    pub custom_css: String,
    /// Script run after the built-in runtime.
    #[serde(default)]
    pub custom_js: String,
}

impl Default for CreativeDocument {
    fn default() -> Self {
        Self::new(Scene::default())
    }
}

impl From<&EditorState> for CreativeDocument {
    fn from(state: &EditorState) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            scene: state.scene.clone(),
            custom_css: state.custom_css.clone(),
            custom_js: state.custom_js.clone(),
        }
    }
}

impl From<CreativeDocument> for EditorState {
    fn from(document: CreativeDocument) -> Self {
        Self {
            scene: document.scene,
            custom_css: document.custom_css,
            custom_js: document.custom_js,
            ..Self::default()
        }
    }
}

impl CreativeDocument {
    const fn default_version() -> u32 {
        DOCUMENT_VERSION
    }

    /// Wrap a scene with no custom code.
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            scene,
            custom_css: String::new(),
            custom_js: String::new(),
        }
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StudioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document. The scene is repaired on the way in (see [`Scene`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid document.
    pub fn from_json(json: &str) -> StudioResult<Self> {
        let mut document: Self = serde_json::from_str(json)?;
        if document.version > DOCUMENT_VERSION {
            tracing::warn!(
                "Document version {} is newer than supported version {DOCUMENT_VERSION}",
                document.version
            );
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;

    #[test]
    fn test_round_trip_through_editor_state() {
        let mut editor = EditorState::default();
        editor.add_element(ElementType::Text, 10.0, 10.0);
        editor.add_element(ElementType::Carousel, 0.0, 100.0);
        editor.custom_css = ".rm-element { outline: none; }".to_string();
        editor.custom_js = "console.log('hi')".to_string();

        let json = CreativeDocument::from(&editor).to_json().expect("serialize");
        let restored: EditorState = CreativeDocument::from_json(&json).expect("parse").into();

        assert_eq!(restored.scene, editor.scene);
        assert_eq!(restored.custom_css, editor.custom_css);
        assert_eq!(restored.custom_js, editor.custom_js);
        assert_eq!(restored.session.selected, None);
    }

    #[test]
    fn test_minimal_document() {
        let json = r##"{
            "scene": {
                "elements": [
                    {"id": 4, "type": "text", "name": "Title", "x": 0, "y": 0,
                     "width": 100, "height": 40, "content": "Hello",
                     "style": {"fontSize": 18, "color": "#ff0000"}}
                ]
            }
        }"##;
        let document = CreativeDocument::from_json(json).expect("parse");
        assert_eq!(document.version, DOCUMENT_VERSION);
        assert_eq!(document.scene.element_count(), 1);
        assert_eq!(document.scene.next_id().get(), 5);
        assert!((document.scene.config.width - 320.0).abs() < f32::EPSILON);
    }
}
