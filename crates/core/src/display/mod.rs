//! Rotation-aware raster display.
//!
//! Callers draw in logical coordinates whose extents depend on the current
//! [`Rotation`]. Every primitive clips against the logical extents, maps the
//! surviving pixels onto the physical [`Canvas`], and [`Display::flip`] pushes
//! the finished frame to the [`FrameSink`]. The display is meant for a single
//! rendering loop and does no internal locking.

pub mod canvas;
pub mod color;
pub mod font;
pub mod image;
pub mod orientation;
mod render;
pub mod ttf;

use std::fmt;

pub use canvas::{Canvas, FrameSink, FramebufferDevice};
pub use color::Rgb565;
pub use font::FontSize;
pub use self::image::{DecodedImage, Image, ImageCrateDecoder, ImageDecoder};
pub use orientation::Rotation;
pub use render::{line_points, text_width, LinePoints};
pub use ttf::{FontCache, FontFace, FontLoader, GlyphBitmap, HorizontalMetrics, VerticalMetrics};

use crate::{config::DisplayConfig, Result};

/// Double-buffered display: a back buffer in memory and a sink it is
/// flipped to.
pub struct Display {
    canvas: Canvas,
    rotation: Rotation,
    logical_width: usize,
    logical_height: usize,
    sink: Box<dyn FrameSink>,
    decoder: Box<dyn ImageDecoder>,
    fonts: FontCache,
}

impl Display {
    /// Creates a display of the given physical size that presents to `sink`.
    pub fn new(width: usize, height: usize, sink: Box<dyn FrameSink>) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            rotation: Rotation::Deg0,
            logical_width: width,
            logical_height: height,
            sink,
            decoder: Box::new(ImageCrateDecoder),
            fonts: FontCache::default(),
        }
    }

    /// Opens the configured framebuffer device. Failing to open it is the
    /// one hard error of the whole layer.
    pub fn open(config: &DisplayConfig) -> Result<Self> {
        let device = FramebufferDevice::open(&config.device)?;
        match device.reported_size() {
            Some(size) if size != (config.width, config.height) => tracing::warn!(
                expected = ?(config.width, config.height),
                reported = ?size,
                "framebuffer resolution differs from configuration"
            ),
            _ => {}
        }
        tracing::info!(device = ?device.path(), "framebuffer opened");

        let mut display = Self::new(config.width, config.height, Box::new(device));
        display.set_rotation(config.rotation);
        Ok(display)
    }

    /// Replaces the image decoding collaborator.
    pub fn set_image_decoder(&mut self, decoder: Box<dyn ImageDecoder>) {
        self.decoder = decoder;
    }

    /// Installs the font collaborator used by the TTF text calls.
    pub fn set_font_loader(&mut self, loader: Box<dyn FontLoader>) {
        self.fonts = FontCache::new(loader);
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Changes the orientation for subsequent draws. Pixels already in the
    /// back buffer stay where they are.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        let (width, height) = rotation.logical_size(self.canvas.width(), self.canvas.height());
        self.logical_width = width;
        self.logical_height = height;
    }

    /// Logical width for the current rotation.
    pub fn width(&self) -> usize {
        self.logical_width
    }

    /// Logical height for the current rotation.
    pub fn height(&self) -> usize {
        self.logical_height
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn clear(&mut self, color: Rgb565) {
        self.canvas.clear(color);
    }

    /// Presents the back buffer.
    pub fn flip(&mut self) -> Result<()> {
        self.sink.present(self.canvas.as_bytes())?;
        Ok(())
    }

    /// Blanks the panel and drops the cached font.
    pub fn shutdown(&mut self) -> Result<()> {
        self.fonts.release();
        self.canvas.clear(Rgb565::BLACK);
        self.flip()
    }

    /// Reads back a logical pixel.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let (fx, fy) = self.to_physical(x, y);
        self.canvas.get(fx, fy)
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.logical_width && (y as usize) < self.logical_height
    }

    fn to_physical(&self, x: i32, y: i32) -> (i32, i32) {
        self.rotation
            .to_physical(x, y, self.canvas.width(), self.canvas.height())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .field("rotation", &self.rotation)
            .field("fonts", &self.fonts)
            .finish()
    }
}
