use std::sync::{Arc, OnceLock};

use super::{Actuators, Endpoint};
use crate::{PagerError, Result};

/// Panel backlight as a percentage of the hardware ceiling.
pub struct Backlight {
    actuators: Arc<dyn Actuators>,
    max: OnceLock<i64>,
}

impl Backlight {
    pub fn new(actuators: Arc<dyn Actuators>) -> Self {
        Self {
            actuators,
            max: OnceLock::new(),
        }
    }

    /// Raw ceiling of the brightness attribute. Cached after the first
    /// successful read.
    pub fn max_brightness(&self) -> Option<i64> {
        if let Some(max) = self.max.get() {
            return Some(*max);
        }
        let max = self.actuators.read_numeric(&Endpoint::BacklightMax)?;
        Some(*self.max.get_or_init(|| max))
    }

    /// Current brightness in percent, if a backlight is present.
    pub fn brightness(&self) -> Option<u8> {
        let max = self.max_brightness().filter(|max| *max > 0)?;
        let value = self
            .actuators
            .read_numeric(&Endpoint::Backlight)
            .filter(|value| *value >= 0)?;
        Some((value * 100 / max).min(100) as u8)
    }

    /// Sets brightness in percent, clamped to 0..=100.
    pub fn set_brightness(&self, percent: i32) -> Result<()> {
        let max = self
            .max_brightness()
            .filter(|max| *max > 0)
            .ok_or(PagerError::Unavailable("backlight"))?;
        let value = max * i64::from(percent.clamp(0, 100)) / 100;
        if self.actuators.set_numeric(&Endpoint::Backlight, value) {
            Ok(())
        } else {
            Err(PagerError::Unavailable("backlight"))
        }
    }
}

impl std::fmt::Debug for Backlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backlight")
            .field("max", &self.max.get())
            .finish()
    }
}
