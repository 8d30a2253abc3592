use crate::capture::{Frame, FrameFeed};

/// RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// `#EEE`, primary annotation fill.
    pub const LIGHT_GRAY: Self = Self::rgb(0xEE, 0xEE, 0xEE);
    /// Outline colour.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Trial watermark fill.
    pub const YELLOW: Self = Self::rgb(0xFF, 0xFF, 0);

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }
}

/// Generic font family, resolved to a concrete face by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    /// Fixed-width face for annotations.
    Monospace,
    /// Proportional face for the watermark.
    SansSerif,
}

/// Font request for a text draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Family.
    pub family: FontFamily,
    /// Pixel size.
    pub size_px: f32,
    /// Bold weight.
    pub bold: bool,
}

impl FontSpec {
    /// `bold 40px monospace`.
    pub const PRIMARY: Self = Self {
        family: FontFamily::Monospace,
        size_px: 40.0,
        bold: true,
    };

    /// `bold 48px sans-serif`.
    pub const WATERMARK: Self = Self {
        family: FontFamily::SansSerif,
        size_px: 48.0,
        bold: true,
    };
}

/// Offscreen 2D drawing surface whose composed output feeds the recorder.
///
/// Text coordinates are left-aligned with `y` on the alphabetic baseline.
pub trait DrawSurface: Send {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Reset every pixel.
    fn clear(&mut self);

    /// Draw `frame` scaled to cover the whole surface.
    fn draw_frame(&mut self, frame: &Frame);

    /// Fill `text` at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color);

    /// Outline `text` at `(x, y)` with a stroke of `line_width` pixels.
    fn stroke_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        color: Color,
        line_width: f32,
    );

    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f32;

    /// Publish the composed surface to the capture stream.
    fn present(&mut self);

    /// Stream of presented frames.
    fn capture_stream(&mut self) -> FrameFeed;
}
