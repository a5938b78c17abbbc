//! Hardware control layer for the Pager handheld.
//!
//! The crate drives three pieces of hardware for a single full-screen
//! application: a framebuffer drawn through a rotation-aware logical canvas,
//! the button pad exposed as both snapshots and a consumable event queue,
//! and the buzzer/vibrator pair playing ringtone notation. [`Pager`] bundles
//! them into one context with explicit init and teardown.

pub mod actuator;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod timing;
pub mod tone;

pub use actuator::{Actuators, Backlight, DpadLed, Endpoint, MemoryActuators, SysfsActuators};
pub use config::{ActuatorConfig, DisplayConfig, InputConfig, PagerConfig, ToneConfig};
pub use device::Pager;
pub use display::{Canvas, Display, FontSize, FrameSink, Image, Rgb565, Rotation};
pub use error::{PagerError, Result};
pub use input::{Buttons, EventKind, InputEvent, InputHub, InputSnapshot};
pub use logging::init_tracing;
pub use timing::{Clock, FrameLimiter, ShutdownSignal, Xorshift32};
pub use tone::{Melody, PlaybackMode, TonePlayer};
