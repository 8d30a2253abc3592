//! Per-tick compositing of the camera frame and the packing annotations.

use crate::{
    Operator,
    capture::Frame,
    overlay::{Clock, Color, DrawSurface, FontSpec},
};

use std::sync::Arc;

use tracing::trace;

/// Trial watermark shown when no text is configured ("trial account").
pub const DEFAULT_WATERMARK_TEXT: &str = "Tài khoản dùng thử";

const TEXT_LEFT: f32 = 20.0;
const TRACKING_BASELINE: f32 = 50.0;
const DATE_BASELINE: f32 = 100.0;
const BOTTOM_MARGIN: f32 = 50.0;
/// Outline is drawn one pixel down-right of the fill.
const OUTLINE_OFFSET: f32 = 1.0;
const TIME_GAP: f32 = 20.0;
const LINE_WIDTH: f32 = 2.0;

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Draws the overlay onto a [`DrawSurface`] once per tick.
pub struct OverlayRenderer {
    clock: Arc<dyn Clock>,
    watermark_text: String,
}

impl OverlayRenderer {
    /// Create a renderer reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>, watermark_text: impl Into<String>) -> Self {
        Self {
            clock,
            watermark_text: watermark_text.into(),
        }
    }

    /// Compose one tick: camera frame, tracking code, date and time,
    /// operator name and, for trial operators, the watermark.
    ///
    /// A missing camera frame leaves the surface cleared under the text.
    pub fn render(
        &self,
        surface: &mut dyn DrawSurface,
        frame: Option<&Frame>,
        tracking_code: &str,
        operator: &Operator,
    ) {
        let now = self.clock.now();
        let date = now.format(DATE_FORMAT).to_string();
        let time = now.format(TIME_FORMAT).to_string();
        let height = surface.height() as f32;

        surface.clear();

        if let Some(frame) = frame {
            surface.draw_frame(frame);
        }

        outlined(surface, tracking_code, TEXT_LEFT, TRACKING_BASELINE);
        outlined(surface, &date, TEXT_LEFT, DATE_BASELINE);

        let date_width = surface.measure_text(&date, &FontSpec::PRIMARY);
        let time_left = TEXT_LEFT + date_width + TIME_GAP;
        outlined(surface, &time, time_left, DATE_BASELINE);

        outlined(
            surface,
            &operator.username,
            TEXT_LEFT,
            height - BOTTOM_MARGIN,
        );

        if operator.is_trial {
            let width = surface.measure_text(&self.watermark_text, &FontSpec::WATERMARK);
            let x = ((surface.width() as f32 - width) / 2.0).max(0.0);
            surface.fill_text(
                &self.watermark_text,
                x,
                height / 2.0,
                &FontSpec::WATERMARK,
                Color::YELLOW,
            );
        }

        surface.present();

        trace!(tracking_code, date = %date, time = %time, "Overlay tick");
    }
}

fn outlined(surface: &mut dyn DrawSurface, text: &str, x: f32, y: f32) {
    surface.stroke_text(
        text,
        x + OUTLINE_OFFSET,
        y + OUTLINE_OFFSET,
        &FontSpec::PRIMARY,
        Color::BLACK,
        LINE_WIDTH,
    );
    surface.fill_text(text, x, y, &FontSpec::PRIMARY, Color::LIGHT_GRAY);
}
