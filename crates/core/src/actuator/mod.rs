//! Numeric actuator endpoints: buzzer, vibrator, LEDs and backlight.
//!
//! Everything is written through the [`Actuators`] capability. Writes are
//! best effort: a missing endpoint makes the call return `false` and the
//! device keeps running.

pub mod backlight;
pub mod haptics;
pub mod leds;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock, PoisonError},
};

pub use backlight::Backlight;
pub use leds::DpadLed;

use crate::config::ActuatorConfig;

/// Buzzer brightness that turns the tone on.
pub const BUZZER_ON: i64 = 255;

/// Logical actuator endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    BuzzerFrequency,
    BuzzerBrightness,
    Vibrator,
    /// Brightness of a named LED, 0..=255.
    Led(String),
    Backlight,
    /// Read-only ceiling of [`Endpoint::Backlight`].
    BacklightMax,
}

/// Capability to set and read numeric values at logical endpoints.
pub trait Actuators: Send + Sync {
    /// Returns `false` if the value could not be written.
    fn set_numeric(&self, endpoint: &Endpoint, value: i64) -> bool;

    fn read_numeric(&self, endpoint: &Endpoint) -> Option<i64>;
}

/// Actuators backed by sysfs attribute files.
#[derive(Debug)]
pub struct SysfsActuators {
    config: ActuatorConfig,
    backlight_dir: OnceLock<Option<PathBuf>>,
}

impl SysfsActuators {
    pub fn new(config: ActuatorConfig) -> Self {
        Self {
            config,
            backlight_dir: OnceLock::new(),
        }
    }

    /// Backlight class directory, discovered on first use.
    pub fn backlight_dir(&self) -> Option<&Path> {
        self.backlight_dir
            .get_or_init(|| {
                let found = find_backlight(&self.config);
                match &found {
                    Some(dir) => tracing::debug!(?dir, "backlight found"),
                    None => tracing::debug!("no backlight found"),
                }
                found
            })
            .as_deref()
    }

    fn path_for(&self, endpoint: &Endpoint) -> Option<PathBuf> {
        match endpoint {
            Endpoint::BuzzerFrequency => Some(self.config.buzzer_frequency.clone()),
            Endpoint::BuzzerBrightness => Some(self.config.buzzer_brightness.clone()),
            Endpoint::Vibrator => Some(self.config.vibrator.clone()),
            Endpoint::Led(name) => Some(self.config.led_root.join(name).join("brightness")),
            Endpoint::Backlight => self.backlight_dir().map(|dir| dir.join("brightness")),
            Endpoint::BacklightMax => self.backlight_dir().map(|dir| dir.join("max_brightness")),
        }
    }
}

impl Actuators for SysfsActuators {
    fn set_numeric(&self, endpoint: &Endpoint, value: i64) -> bool {
        let Some(path) = self.path_for(endpoint) else {
            return false;
        };
        match fs::write(&path, value.to_string()) {
            Ok(()) => true,
            Err(err) => {
                tracing::trace!(?path, %err, "actuator write failed");
                false
            }
        }
    }

    fn read_numeric(&self, endpoint: &Endpoint) -> Option<i64> {
        let path = self.path_for(endpoint)?;
        let text = fs::read_to_string(&path).ok()?;
        text.trim().parse().ok()
    }
}

/// First writable candidate, else the first directory under the backlight
/// root that has a `brightness` attribute.
fn find_backlight(config: &ActuatorConfig) -> Option<PathBuf> {
    let writable = config.backlight_candidates.iter().find(|dir| {
        fs::OpenOptions::new()
            .write(true)
            .open(dir.join("brightness"))
            .is_ok()
    });
    if let Some(dir) = writable {
        return Some(dir.clone());
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(&config.backlight_root)
        .ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|dir| dir.join("brightness").is_file())
        .collect();
    dirs.sort();
    dirs.into_iter().next()
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<Endpoint, i64>,
    writes: Vec<(Endpoint, i64)>,
    missing: Vec<Endpoint>,
}

/// In-memory actuators that record every write. Useful off-device.
#[derive(Debug, Default)]
pub struct MemoryActuators {
    state: Mutex<MemoryState>,
}

impl MemoryActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets a value, e.g. the backlight ceiling.
    pub fn with_value(self, endpoint: Endpoint, value: i64) -> Self {
        self.lock().values.insert(endpoint, value);
        self
    }

    /// Makes every access to `endpoint` fail.
    pub fn without(self, endpoint: Endpoint) -> Self {
        self.lock().missing.push(endpoint);
        self
    }

    /// Current value at `endpoint`.
    pub fn value(&self, endpoint: &Endpoint) -> Option<i64> {
        self.lock().values.get(endpoint).copied()
    }

    /// Every successful write so far, oldest first.
    pub fn writes(&self) -> Vec<(Endpoint, i64)> {
        self.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuators for MemoryActuators {
    fn set_numeric(&self, endpoint: &Endpoint, value: i64) -> bool {
        let mut state = self.lock();
        if state.missing.contains(endpoint) {
            return false;
        }
        state.values.insert(endpoint.clone(), value);
        state.writes.push((endpoint.clone(), value));
        true
    }

    fn read_numeric(&self, endpoint: &Endpoint) -> Option<i64> {
        let state = self.lock();
        if state.missing.contains(endpoint) {
            return None;
        }
        state.values.get(endpoint).copied()
    }
}
