//! TrueType text on top of an external glyph rasterizer.
//!
//! Rasterization and shaping live behind [`FontLoader`] / [`FontFace`]. This
//! module keeps at most one loaded face, lays glyphs out along a baseline with
//! pairwise kerning and plots coverage above a fixed threshold.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use super::{Display, Rgb565};
use crate::{PagerError, Result};

/// Coverage values at or below this are treated as background.
const COVERAGE_THRESHOLD: u8 = 32;

/// Line metrics in pixels for a given size. `descent` is negative below the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// Horizontal metrics in pixels for one codepoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalMetrics {
    pub advance: f32,
    pub left_side_bearing: f32,
}

/// 8-bit coverage bitmap positioned relative to the pen on the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub x_offset: i32,
    pub y_offset: i32,
    pub coverage: Vec<u8>,
}

/// A loaded font able to measure and rasterize codepoints at a pixel size.
pub trait FontFace: Send {
    fn vertical_metrics(&self, px: f32) -> VerticalMetrics;
    fn horizontal_metrics(&self, ch: char, px: f32) -> HorizontalMetrics;
    /// `None` for codepoints without outline (e.g. space).
    fn rasterize(&self, ch: char, px: f32) -> Option<GlyphBitmap>;
    fn kerning(&self, left: char, right: char, px: f32) -> f32;
}

/// Font resource loader.
pub trait FontLoader: Send {
    fn load(&self, path: &Path) -> Result<Box<dyn FontFace>>;
}

/// Holds the loader and the single active face.
#[derive(Default)]
pub struct FontCache {
    loader: Option<Box<dyn FontLoader>>,
    active: Option<(PathBuf, Box<dyn FontFace>)>,
}

impl FontCache {
    pub fn new(loader: Box<dyn FontLoader>) -> Self {
        Self {
            loader: Some(loader),
            active: None,
        }
    }

    /// Returns the face for `path`, replacing the cached one if it differs.
    pub fn face(&mut self, path: &Path) -> Result<&dyn FontFace> {
        let cached = matches!(&self.active, Some((active, _)) if active == path);
        if !cached {
            self.active = None;
            let loader = self
                .loader
                .as_ref()
                .ok_or(PagerError::Unavailable("font loader"))?;
            let face = loader.load(path).map_err(|err| {
                tracing::warn!(?path, %err, "failed to load font");
                err
            })?;
            tracing::debug!(?path, "font cached");
            self.active = Some((path.to_path_buf(), face));
        }
        match &self.active {
            Some((_, face)) => Ok(face.as_ref()),
            None => Err(PagerError::Unavailable("font")),
        }
    }

    pub fn cached_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|(path, _)| path.as_path())
    }

    /// Drops the cached face.
    pub fn release(&mut self) {
        self.active = None;
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("has_loader", &self.loader.is_some())
            .field("cached", &self.cached_path())
            .finish()
    }
}

/// Pen advance after `ch`, including kerning against the following codepoint.
fn pen_advance(face: &dyn FontFace, ch: char, next: Option<char>, px: f32) -> i32 {
    let mut advance = face.horizontal_metrics(ch, px).advance as i32;
    if let Some(next) = next {
        advance += face.kerning(ch, next, px) as i32;
    }
    advance
}

fn measure(face: &dyn FontFace, text: &str, px: f32) -> i32 {
    let mut chars = text.chars().peekable();
    let mut width = 0;
    while let Some(ch) = chars.next() {
        width += pen_advance(face, ch, chars.peek().copied(), px);
    }
    width
}

/// Pixels to plot for `text` with the pen starting at `(x, y)` (top of line),
/// plus the total advance.
fn layout(face: &dyn FontFace, text: &str, px: f32, x: i32, y: i32) -> (Vec<(i32, i32)>, i32) {
    let baseline = face.vertical_metrics(px).ascent as i32;
    let mut points = Vec::new();
    let mut cursor_x = x;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(glyph) = face.rasterize(ch, px) {
            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let covered = glyph
                        .coverage
                        .get(row * glyph.width + col)
                        .is_some_and(|&alpha| alpha > COVERAGE_THRESHOLD);
                    if covered {
                        points.push((
                            cursor_x + glyph.x_offset + col as i32,
                            y + baseline + glyph.y_offset + row as i32,
                        ));
                    }
                }
            }
        }
        cursor_x += pen_advance(face, ch, chars.peek().copied(), px);
    }

    (points, cursor_x - x)
}

impl Display {
    /// Draws TTF text with the top of the line at `y`. Returns the advance.
    pub fn draw_ttf(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        color: Rgb565,
        font: impl AsRef<Path>,
        px: f32,
    ) -> Result<i32> {
        let face = self.fonts.face(font.as_ref())?;
        let (points, width) = layout(face, text, px, x, y);
        for (gx, gy) in points {
            self.set_pixel(gx, gy, color);
        }
        Ok(width)
    }

    pub fn ttf_width(&mut self, text: &str, font: impl AsRef<Path>, px: f32) -> Result<i32> {
        let face = self.fonts.face(font.as_ref())?;
        Ok(measure(face, text, px))
    }

    /// Line height (ascent minus descent).
    pub fn ttf_height(&mut self, font: impl AsRef<Path>, px: f32) -> Result<i32> {
        let metrics = self.fonts.face(font.as_ref())?.vertical_metrics(px);
        Ok((metrics.ascent - metrics.descent) as i32)
    }

    pub fn draw_ttf_centered(
        &mut self,
        y: i32,
        text: &str,
        color: Rgb565,
        font: impl AsRef<Path>,
        px: f32,
    ) -> Result<()> {
        let font = font.as_ref();
        let width = self.ttf_width(text, font, px)?;
        if width > 0 {
            let x = (self.logical_width as i32 - width) / 2;
            self.draw_ttf(x, y, text, color, font, px)?;
        }
        Ok(())
    }

    /// Draws TTF text flush with the right edge, `padding` pixels in.
    pub fn draw_ttf_right(
        &mut self,
        y: i32,
        text: &str,
        color: Rgb565,
        font: impl AsRef<Path>,
        px: f32,
        padding: i32,
    ) -> Result<()> {
        let font = font.as_ref();
        let width = self.ttf_width(text, font, px)?;
        if width > 0 {
            let x = self.logical_width as i32 - width - padding;
            self.draw_ttf(x, y, text, color, font, px)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::display::tests::test_display;

    /// Every glyph is a solid `px/2 x px/2` block sitting on the baseline,
    /// advancing by `px/2 + 1`. "AV" kerns by -1.
    struct BlockFace;

    impl FontFace for BlockFace {
        fn vertical_metrics(&self, px: f32) -> VerticalMetrics {
            VerticalMetrics {
                ascent: px * 0.75,
                descent: -px * 0.25,
            }
        }

        fn horizontal_metrics(&self, _ch: char, px: f32) -> HorizontalMetrics {
            HorizontalMetrics {
                advance: px / 2.0 + 1.0,
                left_side_bearing: 0.0,
            }
        }

        fn rasterize(&self, ch: char, px: f32) -> Option<GlyphBitmap> {
            if ch == ' ' {
                return None;
            }
            let side = (px / 2.0) as usize;
            let mut coverage = vec![255; side * side];
            // a faint corner below the threshold
            coverage[0] = 20;
            Some(GlyphBitmap {
                width: side,
                height: side,
                x_offset: 0,
                y_offset: -(side as i32),
                coverage,
            })
        }

        fn kerning(&self, left: char, right: char, _px: f32) -> f32 {
            if (left, right) == ('A', 'V') {
                -1.0
            } else {
                0.0
            }
        }
    }

    struct CountingLoader(Arc<AtomicUsize>);

    impl FontLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<Box<dyn FontFace>> {
            if path.ends_with("missing.ttf") {
                return Err(PagerError::Font("no such font".into()));
            }
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(BlockFace))
        }
    }

    fn display_with_font(width: usize, height: usize) -> (Display, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut display, _) = test_display(width, height);
        display.set_font_loader(Box::new(CountingLoader(loads.clone())));
        (display, loads)
    }

    #[test]
    fn measures_with_kerning() {
        let (mut display, _) = display_with_font(10, 10);
        assert_eq!(display.ttf_width("AB", "a.ttf", 8.0).unwrap(), 10);
        assert_eq!(display.ttf_width("AV", "a.ttf", 8.0).unwrap(), 9);
        assert_eq!(display.ttf_height("a.ttf", 8.0).unwrap(), 8);
    }

    #[test]
    fn draws_glyphs_on_the_baseline() {
        let (mut display, _) = display_with_font(20, 20);
        let width = display
            .draw_ttf(0, 0, "A", Rgb565::WHITE, "a.ttf", 8.0)
            .unwrap();
        assert_eq!(width, 5);
        // ascent 6 => block rows 2..6, columns 0..4
        assert_eq!(display.pixel(1, 2), Some(Rgb565::WHITE));
        assert_eq!(display.pixel(3, 5), Some(Rgb565::WHITE));
        assert_eq!(display.pixel(0, 2), Some(Rgb565::BLACK));
        assert_eq!(display.pixel(1, 6), Some(Rgb565::BLACK));
        assert_eq!(display.pixel(4, 3), Some(Rgb565::BLACK));
    }

    #[test]
    fn keeps_a_single_cached_font() {
        let (mut display, loads) = display_with_font(10, 10);
        display.ttf_width("A", "a.ttf", 8.0).unwrap();
        display.ttf_width("B", "a.ttf", 8.0).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        display.ttf_width("A", "b.ttf", 8.0).unwrap();
        display.ttf_width("A", "a.ttf", 8.0).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn aligned_variants_use_logical_width() {
        let (mut display, _) = display_with_font(30, 10);
        display
            .draw_ttf_right(0, "A", Rgb565::WHITE, "a.ttf", 8.0, 2)
            .unwrap();
        // width 5 => x = 30 - 5 - 2 = 23, solid columns 23..27 except the faint corner
        assert_eq!(display.pixel(24, 2), Some(Rgb565::WHITE));
        assert_eq!(display.pixel(22, 3), Some(Rgb565::BLACK));

        display
            .draw_ttf_centered(0, "A", Rgb565::RED, "a.ttf", 8.0)
            .unwrap();
        // x = (30 - 5) / 2 = 12
        assert_eq!(display.pixel(13, 3), Some(Rgb565::RED));
    }

    #[test]
    fn unavailable_fonts_are_errors() {
        let (mut bare, _) = test_display(4, 4);
        assert!(matches!(
            bare.ttf_height("a.ttf", 8.0),
            Err(PagerError::Unavailable(_))
        ));

        let (mut display, _) = display_with_font(4, 4);
        assert!(display.ttf_width("A", "missing.ttf", 8.0).is_err());
    }

    #[test]
    fn shutdown_releases_the_cache() {
        let (mut display, loads) = display_with_font(4, 4);
        display.ttf_width("A", "a.ttf", 8.0).unwrap();
        display.shutdown().unwrap();
        display.ttf_width("A", "a.ttf", 8.0).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
