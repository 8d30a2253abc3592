use crate::{
    Color, FontSpec, Frame, Operator, OverlayRenderer,
    tests::support::{DrawOp, FixedClock, RecordingSurface, fixed_time},
};

use std::sync::{Arc, PoisonError};

const WATERMARK: &str = "Tài khoản dùng thử";

fn render(operator: &Operator, frame: Option<&Frame>) -> (RecordingSurface, Vec<DrawOp>) {
    let renderer = OverlayRenderer::new(Arc::new(FixedClock(fixed_time())), WATERMARK);
    let mut surface = RecordingSurface::new(1280, 960);
    renderer.render(&mut surface, frame, "ABC123", operator);
    let ops = surface
        .ops
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    (surface, ops)
}

fn fill_at(ops: &[DrawOp], wanted: &str) -> Option<(f32, f32, Color)> {
    ops.iter().find_map(|op| match op {
        DrawOp::Fill {
            text, x, y, color, ..
        } if text == wanted => Some((*x, *y, *color)),
        _ => None,
    })
}

/// WHAT: Every annotation is drawn for a standard operator
/// WHY: Each recorded frame must identify the parcel, time and packer
#[test]
fn given_standard_operator_when_rendered_then_all_annotations_drawn() {
    // Given: A standard operator and a camera frame
    let operator = Operator::new("jdoe", false);
    let frame = Frame::new(2, 2, vec![0; 16]);

    // When: Rendering one tick
    let (surface, ops) = render(&operator, Some(&frame));

    // Then: Code, date, time and username are filled, no watermark
    let texts: Vec<String> = surface
        .fills()
        .into_iter()
        .filter_map(|op| match op {
            DrawOp::Fill { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["ABC123", "15/10/2026", "14:05:09", "jdoe"]);
    assert_eq!(ops.first(), Some(&DrawOp::Clear));
    assert_eq!(ops.get(1), Some(&DrawOp::Frame));
    assert_eq!(ops.last(), Some(&DrawOp::Present));
}

/// WHAT: Annotations sit at their fixed baselines
/// WHY: Text positions are part of the footage layout operators rely on
#[test]
fn given_surface_when_rendered_then_text_placed_on_baselines() {
    // Given: A standard operator
    let operator = Operator::new("jdoe", false);

    // When: Rendering
    let (_, ops) = render(&operator, None);

    // Then: Fixed positions, time right of the date, name at the bottom
    assert_eq!(fill_at(&ops, "ABC123"), Some((20.0, 50.0, Color::LIGHT_GRAY)));
    assert_eq!(fill_at(&ops, "15/10/2026"), Some((20.0, 100.0, Color::LIGHT_GRAY)));
    let date_width = RecordingSurface::text_width("15/10/2026", &FontSpec::PRIMARY);
    let time = fill_at(&ops, "14:05:09");
    assert!(time.is_some_and(|(x, y, _)| x > 20.0 + date_width && y == 100.0));
    assert_eq!(fill_at(&ops, "jdoe"), Some((20.0, 910.0, Color::LIGHT_GRAY)));
}

/// WHAT: Every annotation is outlined one pixel down-right of its fill
/// WHY: Light text must stay readable over bright parcels
#[test]
fn given_annotation_when_rendered_then_outline_precedes_fill_with_offset() {
    // Given: A standard operator
    let operator = Operator::new("jdoe", false);

    // When: Rendering
    let (_, ops) = render(&operator, None);

    // Then: The stroke comes right before its fill, offset by one pixel
    let fill_index = ops
        .iter()
        .position(|op| matches!(op, DrawOp::Fill { text, .. } if text == "ABC123"));
    assert_eq!(fill_index, Some(2));
    assert_eq!(
        ops[1],
        DrawOp::Stroke {
            text: "ABC123".to_string(),
            x: 21.0,
            y: 51.0,
            color: Color::BLACK,
            line_width: 2.0,
        }
    );
}

/// WHAT: Trial operators get a centred yellow watermark
/// WHY: Footage from trial accounts must be visibly marked
#[test]
fn given_trial_operator_when_rendered_then_watermark_centred() {
    // Given: A trial operator
    let operator = Operator::new("trial-user", true);

    // When: Rendering
    let (_, ops) = render(&operator, None);

    // Then: The watermark is drawn in the watermark font, centred
    let width = RecordingSurface::text_width(WATERMARK, &FontSpec::WATERMARK);
    let watermark = ops.iter().find_map(|op| match op {
        DrawOp::Fill {
            text, x, y, font, color,
        } if text == WATERMARK => Some((*x, *y, *font, *color)),
        _ => None,
    });
    assert_eq!(
        watermark,
        Some(((1280.0 - width) / 2.0, 480.0, FontSpec::WATERMARK, Color::YELLOW))
    );
}

/// WHAT: Missing camera frames still produce an annotated tick
/// WHY: The recording keeps its timing even if the camera stalls
#[test]
fn given_no_frame_when_rendered_then_text_drawn_without_frame() {
    // Given: No frame available yet
    let operator = Operator::new("jdoe", false);

    // When: Rendering
    let (_, ops) = render(&operator, None);

    // Then: No frame op, but the tick is presented
    assert!(!ops.contains(&DrawOp::Frame));
    assert_eq!(ops.last(), Some(&DrawOp::Present));
}
