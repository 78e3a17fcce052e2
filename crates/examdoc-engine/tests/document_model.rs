//! End-to-end properties of the document model: anything built solely
//! through the mutation API must parse, resolve and round-trip cleanly, and
//! anything broken by raw buffer edits must degrade to diagnostics instead
//! of failing.

use examdoc_engine::{
    DocumentState, ImageSource, InsertAt, LineStyle, LinesSpec, RenderItem, RenderTarget, Segment,
    StyleKind, parse, reconcile, render, toggle_style,
};
use pretty_assertions::assert_eq;

fn upload(name: &str) -> ImageSource {
    ImageSource::Upload {
        name: name.to_string(),
        url: format!("https://example.test/{name}"),
    }
}

fn lines_spec(n: f64) -> LinesSpec {
    LinesSpec {
        number_of_lines: n,
        line_height: 30,
        line_style: LineStyle::Solid,
        opacity: 0.5,
    }
}

#[test]
fn mutation_api_output_renders_without_diagnostics() {
    let mut state = DocumentState::new();
    state.replace_buffer("Label the diagram ".to_string());

    let image_id = state.insert_image(upload("diagram.png"), InsertAt::End);
    state.insert_lines(lines_spec(4.5), InsertAt::End).unwrap();
    state.resize_image(image_id, Some(320), Some(180)).unwrap();
    state.set_image_position(image_id, 12.0, 30.0);

    let plan = render(&state, RenderTarget::Question);

    assert!(!plan.has_diagnostics());
    assert!(reconcile(&state).is_consistent());
}

#[test]
fn legacy_and_current_tokens_parse_alike_and_resize_normalizes() {
    // Both historical encodings must be recognized on read
    let legacy = parse("[IMAGE:1:50px]");
    let current = parse("[IMAGE:1:50x80px]");
    assert!(matches!(
        legacy[0],
        Segment::ImageRef {
            id,
            width: 50,
            height: None,
        } if id == 1.0
    ));
    assert!(matches!(
        current[0],
        Segment::ImageRef {
            id,
            width: 50,
            height: Some(80),
        } if id == 1.0
    ));

    // Resizing a legacy token rewrites to the current form only
    let mut state = DocumentState::new();
    state.replace_buffer("[IMAGE:1:50px]".to_string());
    state.images_mut().put(examdoc_engine::ImageRecord {
        id: 1.0,
        url: String::new(),
        name: "fig".to_string(),
        width: 50,
        height: 80,
    });
    state.resize_image(1.0, Some(75), None).unwrap();

    assert_eq!(state.buffer(), "[IMAGE:1:75x80px]");
}

#[test]
fn tolerant_id_matching_survives_serialization_noise() {
    let mut state = DocumentState::new();
    state.replace_buffer("[IMAGE:12345.000000001:100x50px]".to_string());
    state.images_mut().put(examdoc_engine::ImageRecord {
        id: 12345.0,
        url: String::new(),
        name: "fig".to_string(),
        width: 100,
        height: 50,
    });

    let plan = render(&state, RenderTarget::Question);

    assert!(!plan.has_diagnostics());
}

#[test]
fn broken_embeds_degrade_per_embed_not_per_document() {
    let mut state = DocumentState::new();
    state.replace_buffer("ok text [IMAGE:9:100px] more [LINES:8] tail".to_string());

    let plan = render(&state, RenderTarget::Answer);

    // Text still renders; each broken embed yields exactly one placeholder
    assert_eq!(plan.items.len(), 5);
    assert_eq!(plan.diagnostics().count(), 2);
    assert!(matches!(
        plan.items[1],
        RenderItem::MissingImage { id, width: 100, height: None, .. } if id == 9.0
    ));
    assert!(matches!(
        plan.items[3],
        RenderItem::MissingLines { id, .. } if id == 8.0
    ));
}

#[test]
fn removal_is_complete_after_repeated_resizes() {
    let mut state = DocumentState::new();
    let id = state.insert_image(upload("resize-me.png"), InsertAt::End);

    state.resize_image(id, Some(350), None).unwrap();
    state.resize_image(id, None, Some(250)).unwrap();
    state.resize_image(id, Some(120), Some(90)).unwrap();
    state.remove_image(id);

    assert_eq!(state.buffer(), "");
    assert!(state.images().is_empty());
    assert!(reconcile(&state).is_consistent());
}

#[test]
fn removal_strips_hand_mixed_encodings() {
    // A host raw-edit can leave the same id in both encodings; removal must
    // strip every occurrence of both.
    let mut state = DocumentState::new();
    state.replace_buffer("x [IMAGE:3:50px] y [IMAGE:3:60x40px] z".to_string());
    state.images_mut().put(examdoc_engine::ImageRecord {
        id: 3.0,
        url: String::new(),
        name: "fig".to_string(),
        width: 60,
        height: 40,
    });

    state.remove_image(3.0);

    assert!(!state.buffer().contains("[IMAGE"));
    assert!(state.images().is_empty());
}

#[test]
fn half_line_blocks_render_a_trailing_half_unit() {
    let mut state = DocumentState::new();
    let id = state.insert_lines(lines_spec(2.5), InsertAt::End).unwrap();

    let plan = render(&state, RenderTarget::Answer);

    match &plan.items[0] {
        RenderItem::Lines { id: rendered, units } => {
            assert_eq!(*rendered, id);
            assert_eq!(units.len(), 3);
            assert_eq!(
                units
                    .iter()
                    .filter(|u| u.height == examdoc_engine::render::UnitHeight::Full)
                    .count(),
                2
            );
            assert_eq!(
                units
                    .iter()
                    .filter(|u| u.height == examdoc_engine::render::UnitHeight::Half)
                    .count(),
                1
            );
        }
        other => panic!("expected Lines, got {other:?}"),
    }
}

#[test]
fn format_toggle_round_trips_through_the_buffer() {
    let once = toggle_style("a cat sat", 2..5, StyleKind::Bold).unwrap();
    assert_eq!(once, "a **cat** sat");

    let twice = toggle_style(&once, 2..9, StyleKind::Bold).unwrap();
    assert_eq!(twice, "a cat sat");
}

#[test]
fn full_scenario_with_markup_image_and_lines() {
    let mut state = DocumentState::new();
    state.replace_buffer(
        "See __Fig__ below [IMAGE:1:300x200px] and *Homo sapiens* here [LINES:2]".to_string(),
    );
    state.images_mut().put(examdoc_engine::ImageRecord {
        id: 1.0,
        url: "https://example.test/fig.png".to_string(),
        name: "fig.png".to_string(),
        width: 300,
        height: 200,
    });
    state.lines_mut().put(examdoc_engine::LinesConfig {
        id: 2.0,
        number_of_lines: 3.0,
        line_height: 30,
        line_style: LineStyle::Solid,
        opacity: 0.5,
    });

    let plan = render(&state, RenderTarget::Question);

    assert!(!plan.has_diagnostics());
    assert_eq!(
        plan.items[1],
        RenderItem::Styled {
            kind: StyleKind::Underline,
            content: "Fig".to_string(),
        }
    );
    assert!(matches!(
        plan.items[3],
        RenderItem::Image { id, width: 300, height: Some(200), .. } if id == 1.0
    ));
    assert_eq!(
        plan.items[5],
        RenderItem::Styled {
            kind: StyleKind::Italic,
            content: "Homo sapiens".to_string(),
        }
    );
    assert!(matches!(
        &plan.items[7],
        RenderItem::Lines { units, .. } if units.len() == 3
    ));
}

#[test]
fn wire_round_trip_reproduces_an_equivalent_plan() {
    let mut state = DocumentState::new();
    state.replace_buffer("q: ".to_string());
    let id = state.insert_image(upload("fig.png"), InsertAt::End);
    state.set_image_position(id, 4.0, 8.0);
    state.insert_lines(lines_spec(3.0), InsertAt::End).unwrap();

    let payload = state.to_payload();
    let json = serde_json::to_string(&payload).unwrap();
    let restored =
        DocumentState::from_payload(serde_json::from_str(&json).unwrap()).unwrap();

    assert_eq!(
        render(&restored, RenderTarget::Question),
        render(&state, RenderTarget::Question)
    );
}
