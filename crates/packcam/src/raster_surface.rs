//! Offscreen RGBA canvas the overlay is composed on.

use std::{fs, panic::Location, path::Path};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use error_location::ErrorLocation;
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_text_mut, text_size};
use packcam_core::{
    CaptureError, Color, CoreResult, DrawSurface, FontFamily, FontSpec, Frame, FrameFeed,
};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Pixel offsets at which the outline colour is drawn to emulate a stroke
/// of `line_width` pixels.
pub(crate) fn stroke_offsets(line_width: f32) -> Vec<(i32, i32)> {
    let radius = (line_width / 2.0).ceil().max(1.0) as i32;
    (-radius..=radius)
        .flat_map(|dx| (-radius..=radius).map(move |dy| (dx, dy)))
        .filter(|&offset| offset != (0, 0))
        .collect()
}

/// Top edge of a text box whose alphabetic baseline sits at `baseline`.
pub(crate) fn top_from_baseline(baseline: f32, ascent: f32) -> i32 {
    (baseline - ascent).round() as i32
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

#[track_caller]
fn load_font(path: &Path) -> CoreResult<FontVec> {
    let bytes = fs::read(path).map_err(|e| CaptureError::SurfaceUnavailable {
        reason: format!("Failed to read font {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    FontVec::try_from_vec(bytes).map_err(|e| CaptureError::SurfaceUnavailable {
        reason: format!("Invalid font {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// [`DrawSurface`] backed by an `image` canvas and `imageproc` text.
///
/// `present` publishes a copy of the canvas on the frame feed.
pub(crate) struct RasterSurface {
    canvas: RgbaImage,
    monospace: FontVec,
    sans_serif: FontVec,
    feed: watch::Sender<Option<Frame>>,
}

impl RasterSurface {
    /// Create a `width` x `height` surface with fonts loaded from disk.
    #[track_caller]
    #[instrument]
    pub(crate) fn load(
        width: u32,
        height: u32,
        monospace_path: &Path,
        sans_serif_path: &Path,
    ) -> CoreResult<Self> {
        let monospace = load_font(monospace_path)?;
        let sans_serif = load_font(sans_serif_path)?;
        debug!(width, height, "Raster surface created");
        Ok(Self::new(width, height, monospace, sans_serif))
    }

    pub(crate) fn new(width: u32, height: u32, monospace: FontVec, sans_serif: FontVec) -> Self {
        let (feed, _) = watch::channel(None);
        Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0xFF])),
            monospace,
            sans_serif,
            feed,
        }
    }

    fn font(&self, spec: &FontSpec) -> &FontVec {
        match spec.family {
            FontFamily::Monospace => &self.monospace,
            FontFamily::SansSerif => &self.sans_serif,
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, spec: &FontSpec, color: Rgba<u8>) {
        let scale = PxScale::from(spec.size_px);
        let font = match spec.family {
            FontFamily::Monospace => &self.monospace,
            FontFamily::SansSerif => &self.sans_serif,
        };
        let top = top_from_baseline(y, font.as_scaled(scale).ascent());
        draw_text_mut(
            &mut self.canvas,
            color,
            x.round() as i32,
            top,
            scale,
            font,
            text,
        );
    }
}

impl DrawSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0xFF]);
        }
    }

    fn draw_frame(&mut self, frame: &Frame) {
        let Some(source) =
            RgbaImage::from_raw(frame.width, frame.height, frame.pixels.as_ref().clone())
        else {
            warn!(
                width = frame.width,
                height = frame.height,
                bytes = frame.pixels.len(),
                "Camera frame does not match its dimensions"
            );
            return;
        };

        if source.dimensions() == self.canvas.dimensions() {
            self.canvas = source;
        } else {
            let scaled = imageops::resize(
                &source,
                self.canvas.width(),
                self.canvas.height(),
                imageops::FilterType::Triangle,
            );
            imageops::replace(&mut self.canvas, &scaled, 0, 0);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color) {
        self.draw_text(text, x, y, font, rgba(color));
    }

    fn stroke_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        color: Color,
        line_width: f32,
    ) {
        let color = rgba(color);
        for (dx, dy) in stroke_offsets(line_width) {
            self.draw_text(text, x + dx as f32, y + dy as f32, font, color);
        }
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        let (width, _) = text_size(PxScale::from(font.size_px), self.font(font), text);
        width as f32
    }

    fn present(&mut self) {
        let frame = Frame::new(
            self.canvas.width(),
            self.canvas.height(),
            self.canvas.as_raw().clone(),
        );
        self.feed.send_replace(Some(frame));
    }

    fn capture_stream(&mut self) -> FrameFeed {
        self.feed.subscribe()
    }
}
