mod clock;
mod renderer;
mod surface;

pub use {
    clock::{Clock, SystemClock},
    renderer::{DEFAULT_WATERMARK_TEXT, OverlayRenderer},
    surface::{Color, DrawSurface, FontFamily, FontSpec},
};
