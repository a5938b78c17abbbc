use serde::{Deserialize, Serialize};

/// 16-bit colour packed as `RRRRRGGGGGGBBBBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    pub const YELLOW: Self = Self::from_rgb(255, 255, 0);
    pub const CYAN: Self = Self::from_rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::from_rgb(255, 0, 255);
    pub const ORANGE: Self = Self::from_rgb(255, 165, 0);
    pub const PURPLE: Self = Self::from_rgb(128, 0, 128);
    pub const GRAY: Self = Self::from_rgb(128, 128, 128);
    pub const DARK_GRAY: Self = Self::from_rgb(64, 64, 64);
    pub const LIGHT_GRAY: Self = Self::from_rgb(192, 192, 192);

    /// Packs three 8-bit channels by dropping the low bits of each.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3))
    }

    /// Packs a `0xRRGGBB` value.
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for Rgb565 {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Rgb565> for u16 {
    fn from(value: Rgb565) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_primary_colours() {
        assert_eq!(Rgb565::WHITE.raw(), 0xFFFF);
        assert_eq!(Rgb565::RED.raw(), 0xF800);
        assert_eq!(Rgb565::GREEN.raw(), 0x07E0);
        assert_eq!(Rgb565::BLUE.raw(), 0x001F);
        assert_eq!(Rgb565::BLACK.raw(), 0);
    }

    #[test]
    fn truncates_low_bits() {
        // 0b1000_0111 keeps the top five bits of red only
        assert_eq!(Rgb565::from_rgb(0x87, 0, 0).raw(), 0x10 << 11);
        assert_eq!(Rgb565::from_rgb(0, 0x07, 0x07).raw(), 0x0001 << 5);
        assert_eq!(Rgb565::from_hex(0xFFA500), Rgb565::ORANGE);
    }
}
