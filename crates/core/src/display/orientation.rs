use serde::{Deserialize, Serialize};

/// Clockwise rotation of the logical canvas relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// Portrait, the panel's native orientation.
    #[default]
    Deg0,
    /// Landscape.
    Deg90,
    /// Portrait, upside down.
    Deg180,
    /// Landscape, upside down.
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Maps a degree value onto a rotation. Anything other than 0/90/180/270
    /// is rejected.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether logical width and height are swapped against the panel.
    pub fn is_landscape(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Logical `(width, height)` for a panel of the given physical size.
    pub fn logical_size(self, phys_width: usize, phys_height: usize) -> (usize, usize) {
        if self.is_landscape() {
            (phys_height, phys_width)
        } else {
            (phys_width, phys_height)
        }
    }

    /// Maps a logical coordinate to the physical panel.
    ///
    /// The caller clips against the logical extents first; inputs inside
    /// them always land inside the physical extents.
    pub fn to_physical(
        self,
        lx: i32,
        ly: i32,
        phys_width: usize,
        phys_height: usize,
    ) -> (i32, i32) {
        let w = phys_width as i32;
        let h = phys_height as i32;
        match self {
            Rotation::Deg0 => (lx, ly),
            Rotation::Deg90 => (ly, h - 1 - lx),
            Rotation::Deg180 => (w - 1 - lx, h - 1 - ly),
            Rotation::Deg270 => (w - 1 - ly, lx),
        }
    }
}
