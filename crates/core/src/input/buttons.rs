bitflags::bitflags! {
    /// Instantaneous state of the device buttons, one bit per button.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const UP    = 0b0000_0001;
        const DOWN  = 0b0000_0010;
        const LEFT  = 0b0000_0100;
        const RIGHT = 0b0000_1000;
        const A     = 0b0001_0000;
        const B     = 0b0010_0000;
        const POWER = 0b0100_0000;
        const DPAD = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Buttons {
    /// Buttons that went down between `old` and `self`.
    pub fn pressed_since(self, old: Buttons) -> Buttons {
        self & !old
    }

    /// Buttons that came up between `old` and `self`.
    pub fn released_since(self, old: Buttons) -> Buttons {
        !self & old
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Press,
    Release,
}

/// A single button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Exactly one bit.
    pub button: Buttons,
    pub kind: EventKind,
    /// Milliseconds since the device clock started.
    pub timestamp_ms: u32,
}

impl InputEvent {
    pub fn is_press(&self) -> bool {
        self.kind == EventKind::Press
    }
}

/// Result of one snapshot poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Everything held right now.
    pub current: Buttons,
    /// Went down since the previous poll.
    pub pressed: Buttons,
    /// Came up since the previous poll.
    pub released: Buttons,
}
