use std::path::Path;

use super::{Display, Rgb565};
use crate::{PagerError, Result};

/// Raw output of the image collaborator: 8-bit RGB triples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Image decoding collaborator.
pub trait ImageDecoder: Send {
    /// Decodes a file into RGB888 pixels.
    fn decode(&self, path: &Path) -> Result<DecodedImage>;

    /// Reads only the dimensions of a file.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}

/// Decoder backed by the `image` crate (JPEG, PNG, BMP, GIF first frame).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let rgb = ::image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(DecodedImage {
            width,
            height,
            rgb: rgb.into_raw(),
        })
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        Ok(::image::image_dimensions(path)?)
    }
}

/// Image converted to the panel's pixel format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
}

impl Image {
    /// Converts RGB888 triples; `rgb` must hold exactly `width * height * 3` bytes.
    pub fn from_rgb888(width: usize, height: usize, rgb: &[u8]) -> Result<Self> {
        if rgb.len() != width * height * 3 {
            return Err(PagerError::msg(format!(
                "expected {} RGB bytes for a {width}x{height} image, got {}",
                width * height * 3,
                rgb.len()
            )));
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|px| Rgb565::from_rgb(px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_decoded(decoded: &DecodedImage) -> Result<Self> {
        Self::from_rgb888(decoded.width as usize, decoded.height as usize, &decoded.rgb)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

impl Display {
    /// Decodes an image file into panel pixels.
    pub fn load_image(&self, path: impl AsRef<Path>) -> Result<Image> {
        let path = path.as_ref();
        let decoded = self.decoder.decode(path).map_err(|err| {
            tracing::warn!(?path, %err, "failed to load image");
            err
        })?;
        Image::from_decoded(&decoded)
    }

    /// Dimensions of an image file without decoding its pixels.
    pub fn image_info(&self, path: impl AsRef<Path>) -> Result<(u32, u32)> {
        self.decoder.dimensions(path.as_ref())
    }

    /// Draws an image 1:1 with its top-left corner at logical `(x, y)`.
    pub fn draw_image(&mut self, x: i32, y: i32, image: &Image) {
        for iy in 0..image.height {
            for ix in 0..image.width {
                let color = image.pixels[iy * image.width + ix];
                self.set_pixel(x + ix as i32, y + iy as i32, color);
            }
        }
    }

    /// Draws an image stretched to `dst_w x dst_h` using nearest-neighbour
    /// sampling.
    pub fn draw_image_scaled(&mut self, x: i32, y: i32, dst_w: i32, dst_h: i32, image: &Image) {
        if dst_w <= 0 || dst_h <= 0 || image.width == 0 || image.height == 0 {
            return;
        }
        for dy in 0..dst_h {
            let src_y = dy as usize * image.height / dst_h as usize;
            for dx in 0..dst_w {
                let src_x = dx as usize * image.width / dst_w as usize;
                let color = image.pixels[src_y * image.width + src_x];
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Loads and draws an image in one call.
    pub fn draw_image_file(&mut self, x: i32, y: i32, path: impl AsRef<Path>) -> Result<()> {
        let image = self.load_image(path)?;
        self.draw_image(x, y, &image);
        Ok(())
    }

    /// Loads and draws an image scaled to `dst_w x dst_h` in one call.
    pub fn draw_image_file_scaled(
        &mut self,
        x: i32,
        y: i32,
        dst_w: i32,
        dst_h: i32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let image = self.load_image(path)?;
        self.draw_image_scaled(x, y, dst_w, dst_h, &image);
        Ok(())
    }
}
