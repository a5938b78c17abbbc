use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::Melody;
use crate::actuator::{haptics, Actuators};

/// Which actuators a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    SoundOnly,
    SoundAndVibrate,
    /// Pulses the vibrator in the melody's rhythm; pitch is ignored.
    VibrateOnly,
}

impl PlaybackMode {
    pub fn uses_sound(self) -> bool {
        matches!(self, PlaybackMode::SoundOnly | PlaybackMode::SoundAndVibrate)
    }

    pub fn uses_vibration(self) -> bool {
        matches!(self, PlaybackMode::SoundAndVibrate | PlaybackMode::VibrateOnly)
    }
}

/// Plays `melody` to completion or until `cancel` receives a message or is
/// disconnected. Returns `true` if every note played.
///
/// Each note sounds for 90% of its length followed by a 10% gap; rests are
/// silent for their full length. The actuators used by `mode` are off when
/// this returns.
pub fn perform(
    melody: &Melody,
    mode: PlaybackMode,
    actuators: &dyn Actuators,
    cancel: &Receiver<()>,
) -> bool {
    let completed = melody
        .notes
        .iter()
        .all(|note| play_note(melody.note_ms(note), note.frequency(), mode, actuators, cancel));
    silence(mode, actuators);
    completed
}

fn play_note(
    ms: u32,
    frequency: Option<u32>,
    mode: PlaybackMode,
    actuators: &dyn Actuators,
    cancel: &Receiver<()>,
) -> bool {
    let ms = u64::from(ms);
    let Some(frequency) = frequency else {
        if mode.uses_vibration() {
            haptics::set_vibrator(actuators, false);
        }
        return pause(cancel, Duration::from_millis(ms));
    };

    if mode.uses_sound() {
        haptics::tone_on(actuators, frequency);
    }
    if mode.uses_vibration() {
        haptics::set_vibrator(actuators, true);
    }
    let held = pause(cancel, Duration::from_micros(ms * 900));
    silence(mode, actuators);
    held && pause(cancel, Duration::from_micros(ms * 100))
}

fn silence(mode: PlaybackMode, actuators: &dyn Actuators) {
    if mode.uses_sound() {
        haptics::tone_off(actuators);
    }
    if mode.uses_vibration() {
        haptics::set_vibrator(actuators, false);
    }
}

/// Sleeps for `duration`; `false` if cancelled first.
fn pause(cancel: &Receiver<()>, duration: Duration) -> bool {
    matches!(cancel.recv_timeout(duration), Err(RecvTimeoutError::Timeout))
}
