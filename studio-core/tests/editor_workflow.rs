//! End-to-end editing workflows across the scene, editor state and preview.

use studio_core::runtime::carousel::CarouselInput;
use studio_core::style::Length;
use studio_core::{
    AlignPreset, AxisLock, CreativeDocument, Effect, EditorState, ElementPatch, ElementType,
    PreviewSession, Style, MIN_ELEMENT_SIZE,
};

// ============================================================================
// Duplication
// ============================================================================

#[test]
fn test_duplicate_never_aliases_source() {
    let mut editor = EditorState::default();
    let carousel = editor.add_element(ElementType::Carousel, 0.0, 0.0);
    let target = editor.add_element(ElementType::Image, 0.0, 0.0);
    let action = editor.add_action(carousel).expect("action");
    editor
        .update_action(carousel, &action, Effect::ToggleFade, target)
        .expect("update action");

    let copy = editor.duplicate_element(carousel).expect("duplicate");

    editor
        .update_style(
            copy,
            Style {
                padding: Some(Length::Px(8.0)),
                ..Style::default()
            },
        )
        .expect("style");
    editor.add_carousel_image(copy, "blob:extra").expect("slide");
    let copy_action = editor.scene.get_element(copy).expect("copy").actions[0].id.clone();
    editor.remove_action(copy, &copy_action).expect("remove");

    let source = editor.scene.get_element(carousel).expect("source");
    assert_eq!(source.style.padding, None);
    assert_eq!(source.carousel().expect("carousel").images.len(), 2);
    assert_eq!(source.actions.len(), 1);
    assert_eq!(source.actions[0].target, target);
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn test_deleted_target_is_a_no_op_in_preview() {
    let mut editor = EditorState::default();
    let button = editor.add_element(ElementType::Button, 0.0, 0.0);
    let image = editor.add_element(ElementType::Image, 0.0, 0.0);
    editor.add_action(button).expect("action");

    editor.delete_element(image).expect("delete");
    assert_eq!(
        editor.scene.get_element(button).expect("button").actions[0].target,
        image
    );

    let mut preview = PreviewSession::start(&editor.scene);
    assert!(preview.activate(button).is_empty());
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_alignment_then_drag_respects_lock() {
    let mut editor = EditorState::default();
    let id = editor.add_element(ElementType::Box, 0.0, 0.0);
    editor.align_preset(id, AlignPreset::MiddleLeft).expect("align");

    let el = editor.scene.get_element(id).expect("box");
    assert_eq!(el.lock, AxisLock::Y);
    assert_eq!((el.frame.x, el.frame.y), (0.0, 140.0));

    let mut engine = studio_core::GestureEngine::new();
    engine.begin_drag(&editor.scene, &mut editor.session, id, 10.0, 150.0);
    engine.pointer_move(&mut editor.scene, &editor.session, 60.0, 400.0);
    engine.pointer_up();

    let el = editor.scene.get_element(id).expect("box");
    assert_eq!((el.frame.x, el.frame.y), (50.0, 140.0));
}

#[test]
fn test_reorder_changes_stacking() {
    let mut editor = EditorState::default();
    let a = editor.add_element(ElementType::Text, 0.0, 0.0);
    let b = editor.add_element(ElementType::Box, 0.0, 0.0);
    editor.scene.reorder(1, 0).expect("reorder");
    assert_eq!(editor.scene.position_of(b), Some(0));
    assert_eq!(editor.scene.position_of(a), Some(1));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_document_round_trip_keeps_counter() {
    let mut editor = EditorState::default();
    let first = editor.add_element(ElementType::Video, 0.0, 0.0);
    editor.add_element(ElementType::Text, 0.0, 0.0);
    editor.delete_element(first).expect("delete");
    editor
        .show_carousel_slide(first, CarouselInput::Advance)
        .expect_err("deleted element");

    let json = CreativeDocument::from(&editor).to_json().expect("json");
    let mut restored: EditorState = CreativeDocument::from_json(&json).expect("parse").into();
    let next = restored.add_element(ElementType::Box, 0.0, 0.0);
    assert_eq!(next.get(), 3);

    restored
        .update_element(next, ElementPatch::position(12.0, 34.0))
        .expect("move");
    assert_eq!(restored.scene.get_element(next).expect("box").frame.x, 12.0);
}

// ============================================================================
// Loading hand-edited documents
// ============================================================================

fn element_json(id: u32, width: u32, height: u32) -> String {
    format!(
        r#"{{"id": {id}, "type": "box", "name": "box {id}", "x": 0, "y": 0,
            "width": {width}, "height": {height}, "content": ""}}"#
    )
}

fn document_json(elements: &[String], next_id: u32) -> String {
    format!(
        r#"{{"scene": {{"elements": [{}], "nextId": {next_id}}}}}"#,
        elements.join(",")
    )
}

#[test]
fn test_loading_renumbers_zero_and_repeated_ids() {
    let json = document_json(
        &[element_json(7, 50, 50), element_json(7, 60, 60), element_json(0, 70, 70)],
        1,
    );
    let document = CreativeDocument::from_json(&json).expect("parse");
    let ids: Vec<u32> = document.scene.elements().iter().map(|e| e.id.get()).collect();

    assert_eq!(ids, vec![7, 8, 9]);
    assert_eq!(document.scene.next_id().get(), 10);
    assert_eq!(document.scene.elements()[1].frame.width, 60.0);
}

#[test]
fn test_loading_raises_sizes_to_the_floor() {
    let json = document_json(&[element_json(1, 5, 0)], 2);
    let document = CreativeDocument::from_json(&json).expect("parse");
    let frame = document.scene.elements()[0].frame;
    assert_eq!((frame.width, frame.height), (MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE));
}

#[test]
fn test_loading_rejects_exhausted_ids() {
    let at_max = document_json(&[element_json(u32::MAX, 50, 50)], 1);
    assert!(CreativeDocument::from_json(&at_max).is_err());

    let counter_at_max = document_json(&[], u32::MAX);
    assert!(CreativeDocument::from_json(&counter_at_max).is_err());

    let below_max = document_json(&[element_json(u32::MAX - 2, 50, 50)], 1);
    let document = CreativeDocument::from_json(&below_max).expect("parse");
    assert_eq!(document.scene.next_id().get(), u32::MAX - 1);
}
