//! Blocking buzzer and vibration helpers.

use std::{thread, time::Duration};

use super::{Actuators, Endpoint, BUZZER_ON};

/// Starts the buzzer at `frequency` Hz.
pub fn tone_on(actuators: &dyn Actuators, frequency: u32) -> bool {
    let set = actuators.set_numeric(&Endpoint::BuzzerFrequency, i64::from(frequency));
    set & actuators.set_numeric(&Endpoint::BuzzerBrightness, BUZZER_ON)
}

pub fn tone_off(actuators: &dyn Actuators) -> bool {
    actuators.set_numeric(&Endpoint::BuzzerBrightness, 0)
}

pub fn set_vibrator(actuators: &dyn Actuators, on: bool) -> bool {
    actuators.set_numeric(&Endpoint::Vibrator, i64::from(on))
}

/// Sounds `frequency` for `ms` milliseconds.
pub fn beep(actuators: &dyn Actuators, frequency: u32, ms: u64) {
    tone_on(actuators, frequency);
    thread::sleep(Duration::from_millis(ms));
    tone_off(actuators);
}

/// Vibrates for `ms` milliseconds.
pub fn vibrate(actuators: &dyn Actuators, ms: u64) {
    set_vibrator(actuators, true);
    thread::sleep(Duration::from_millis(ms));
    set_vibrator(actuators, false);
}

/// Plays an on/off pattern such as `"100,50,100"` (milliseconds, starting
/// with on). Segments that are not positive are skipped but still flip the
/// phase. The vibrator is always off afterwards.
pub fn vibrate_pattern(actuators: &dyn Actuators, pattern: &str) {
    let mut on = true;
    for segment in pattern.split(',').filter(|segment| !segment.is_empty()) {
        let ms = leading_int(segment);
        if ms > 0 {
            set_vibrator(actuators, on);
            thread::sleep(Duration::from_millis(ms as u64));
        }
        on = !on;
    }
    set_vibrator(actuators, false);
}

/// Integer prefix of `text` after leading whitespace, 0 if there is none.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |value| sign * value)
}
