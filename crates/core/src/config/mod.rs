use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{display::Rotation, Result};

/// Top-level configuration structure for the device layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub actuators: ActuatorConfig,
    pub tone: ToneConfig,
}

impl PagerConfig {
    /// Parses a JSON document. Missing sections and fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Framebuffer geometry and frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub device: PathBuf,
    pub width: usize,
    pub height: usize,
    pub target_fps: u32,
    pub rotation: Rotation,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb0"),
            width: 222,
            height: 480,
            target_fps: 20,
            rotation: Rotation::Deg0,
        }
    }
}

/// Button input devices and event queue sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Candidate evdev nodes, tried in order.
    pub devices: Vec<PathBuf>,
    pub queue_capacity: usize,
    pub wait_poll_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            devices: vec![
                PathBuf::from("/dev/input/event0"),
                PathBuf::from("/dev/input/event1"),
            ],
            queue_capacity: 32,
            wait_poll_ms: 10,
        }
    }
}

/// Sysfs endpoints of the buzzer, vibrator, LEDs and backlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub buzzer_frequency: PathBuf,
    pub buzzer_brightness: PathBuf,
    pub vibrator: PathBuf,
    pub led_root: PathBuf,
    pub backlight_candidates: Vec<PathBuf>,
    /// Directory scanned when none of the candidates is writable.
    pub backlight_root: PathBuf,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            buzzer_frequency: PathBuf::from("/sys/class/leds/buzzer/frequency"),
            buzzer_brightness: PathBuf::from("/sys/class/leds/buzzer/brightness"),
            vibrator: PathBuf::from("/sys/class/gpio/vibrator/value"),
            led_root: PathBuf::from("/sys/class/leds"),
            backlight_candidates: vec![
                PathBuf::from("/sys/class/backlight/backlight"),
                PathBuf::from("/sys/class/backlight/lcd-backlight"),
                PathBuf::from("/sys/class/backlight/panel0-backlight"),
            ],
            backlight_root: PathBuf::from("/sys/class/backlight"),
        }
    }
}

impl ActuatorConfig {
    /// Rewrites every endpoint to live under `root`, keeping the relative
    /// sysfs layout. Used to point the layer at a fake sysfs tree.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            buzzer_frequency: reroot(root, &defaults.buzzer_frequency),
            buzzer_brightness: reroot(root, &defaults.buzzer_brightness),
            vibrator: reroot(root, &defaults.vibrator),
            led_root: reroot(root, &defaults.led_root),
            backlight_candidates: defaults
                .backlight_candidates
                .iter()
                .map(|path| reroot(root, path))
                .collect(),
            backlight_root: reroot(root, &defaults.backlight_root),
        }
    }
}

fn reroot(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

/// Ringtone playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// How long `stop` waits for a cancelled session to wind down.
    pub stop_grace_ms: u64,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self { stop_grace_ms: 250 }
    }
}
