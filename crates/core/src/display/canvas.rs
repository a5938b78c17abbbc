use std::{
    fs::{File, OpenOptions},
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::{display::Rgb565, PagerError, Result};

/// Physical pixel store of the panel, one RGB565 value per pixel, row-major.
///
/// Every write is bounds-checked against the physical extents; writes
/// outside them are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u16>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// The frame exactly as it is written to the device.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn clear(&mut self, color: Rgb565) {
        self.pixels.fill(color.raw());
    }

    /// Reads a physical pixel.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.index(x, y).map(|index| Rgb565(self.pixels[index]))
    }

    /// Writes a physical pixel, ignoring out-of-range coordinates.
    pub fn set(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = color.raw();
        }
    }

    /// Fills `len` pixels of row `y` starting at `x`, clipped to the row.
    pub fn fill_span(&mut self, x: i32, y: i32, len: usize, color: Rgb565) {
        if y < 0 || y as usize >= self.height || len == 0 {
            return;
        }
        let start = x.max(0) as usize;
        let end = (x as i64 + len as i64).clamp(0, self.width as i64) as usize;
        if start >= end {
            return;
        }
        let row = y as usize * self.width;
        self.pixels[row + start..row + end].fill(color.raw());
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }
}

/// Destination of a finished frame.
pub trait FrameSink: Send {
    /// Pushes a complete frame of native-endian RGB565 bytes.
    fn present(&mut self, frame: &[u8]) -> std::io::Result<()>;
}

/// Linux framebuffer character device written in full on every flip.
#[derive(Debug)]
pub struct FramebufferDevice {
    path: PathBuf,
    file: File,
}

impl FramebufferDevice {
    /// Opens the framebuffer for writing. A missing device is fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| PagerError::DisplayUnavailable {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolution reported by sysfs (`/sys/class/graphics/<dev>/virtual_size`),
    /// if the node exists.
    pub fn reported_size(&self) -> Option<(usize, usize)> {
        let name = self.path.file_name()?;
        let sysfs = Path::new("/sys/class/graphics").join(name).join("virtual_size");
        let text = std::fs::read_to_string(sysfs).ok()?;
        parse_virtual_size(&text)
    }
}

impl FrameSink for FramebufferDevice {
    fn present(&mut self, frame: &[u8]) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(frame)?;
        self.file.flush()
    }
}

fn parse_virtual_size(text: &str) -> Option<(usize, usize)> {
    let (w, h) = text.trim().split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
