//! Ringtone notation: `name:d=4,o=5,b=120:8c6,d#.,p,...`.
//!
//! Parsing never fails. Unknown characters are skipped, a missing section
//! separator gives an empty melody and out-of-range defaults fall back to
//! `d=4`, `o=5`, `b=120`.

use std::time::Duration;

pub const DEFAULT_DURATION: u32 = 4;
pub const DEFAULT_OCTAVE: u8 = 5;
pub const DEFAULT_BPM: u32 = 120;

/// Octave-4 frequencies in Hz, C through B.
const BASE_FREQUENCIES: [u32; 12] = [262, 277, 294, 311, 330, 349, 370, 392, 415, 440, 466, 494];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Pitch {
    pub fn semitone(self) -> u8 {
        match self {
            Pitch::C => 0,
            Pitch::D => 2,
            Pitch::E => 4,
            Pitch::F => 5,
            Pitch::G => 7,
            Pitch::A => 9,
            Pitch::B => 11,
        }
    }
}

/// Pitch letter lookup. `Some(None)` is a rest.
fn pitch_letter(ch: char) -> Option<Option<Pitch>> {
    let pitch = match ch.to_ascii_lowercase() {
        'c' => Pitch::C,
        'd' => Pitch::D,
        'e' => Pitch::E,
        'f' => Pitch::F,
        'g' => Pitch::G,
        'a' => Pitch::A,
        'b' | 'h' => Pitch::B,
        'p' => return Some(None),
        _ => return None,
    };
    Some(Some(pitch))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// `None` for a rest.
    pub pitch: Option<Pitch>,
    pub sharp: bool,
    pub octave: u8,
    /// Fraction of a whole note, e.g. 8 for an eighth.
    pub duration: u32,
    pub dotted: bool,
}

impl Note {
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    /// Frequency in Hz; `None` for rests.
    pub fn frequency(&self) -> Option<u32> {
        let pitch = self.pitch?;
        let index = (pitch.semitone() + u8::from(self.sharp)) % 12;
        let base = BASE_FREQUENCIES[usize::from(index)];
        Some(match self.octave {
            octave if octave >= 4 => base << (octave - 4),
            octave => base >> (4 - octave),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Melody {
    pub name: String,
    pub bpm: u32,
    pub default_duration: u32,
    pub default_octave: u8,
    pub notes: Vec<Note>,
}

impl Default for Melody {
    fn default() -> Self {
        Self {
            name: String::new(),
            bpm: DEFAULT_BPM,
            default_duration: DEFAULT_DURATION,
            default_octave: DEFAULT_OCTAVE,
            notes: Vec::new(),
        }
    }
}

impl Melody {
    pub fn parse(text: &str) -> Self {
        parse(text)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Length of a whole note: four beats.
    pub fn whole_note_ms(&self) -> u32 {
        60_000 * 4 / self.bpm.max(1)
    }

    /// Nominal length of `note`, including its dot.
    pub fn note_ms(&self, note: &Note) -> u32 {
        let ms = self.whole_note_ms() / note.duration.max(1);
        if note.dotted {
            ms + ms / 2
        } else {
            ms
        }
    }

    pub fn note_duration(&self, note: &Note) -> Duration {
        Duration::from_millis(u64::from(self.note_ms(note)))
    }

    pub fn total_duration(&self) -> Duration {
        self.notes.iter().map(|note| self.note_duration(note)).sum()
    }
}

/// Parses ringtone notation into a [`Melody`].
pub fn parse(text: &str) -> Melody {
    let mut sections = text.splitn(3, ':');
    let name = sections.next().unwrap_or_default().trim();
    let Some(defaults) = sections.next() else {
        return Melody {
            name: name.to_owned(),
            ..Melody::default()
        };
    };
    let notes = sections.next().unwrap_or_default();

    let mut melody = Melody {
        name: name.to_owned(),
        ..Melody::default()
    };
    for setting in defaults.split(',') {
        let Some((key, value)) = setting.split_once('=') else {
            continue;
        };
        let value = leading_number(value.trim());
        match key.trim().to_ascii_lowercase().as_str() {
            "d" => melody.default_duration = value.filter(|d| *d > 0).unwrap_or(DEFAULT_DURATION),
            "o" => {
                melody.default_octave = value
                    .and_then(|o| u8::try_from(o).ok())
                    .filter(|o| (1..=9).contains(o))
                    .unwrap_or(DEFAULT_OCTAVE)
            }
            "b" => melody.bpm = value.filter(|b| *b > 0).unwrap_or(DEFAULT_BPM),
            _ => {}
        }
    }

    melody.notes = notes
        .split(',')
        .filter_map(|token| parse_note(token, &melody))
        .collect();
    melody
}

/// Digits at the start of `text`.
fn leading_number(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// `[duration] pitch [#] [.] [octave] [.]`, skipping anything unrecognised.
fn parse_note(token: &str, melody: &Melody) -> Option<Note> {
    let token = token.trim();
    let duration = leading_number(token)
        .filter(|d| *d > 0)
        .unwrap_or(melody.default_duration);

    let mut chars = token.trim_start_matches(|c: char| c.is_ascii_digit()).chars();
    let pitch = chars.by_ref().find_map(pitch_letter)?;

    let mut note = Note {
        pitch,
        sharp: false,
        octave: melody.default_octave,
        duration,
        dotted: false,
    };
    let mut octave_seen = false;
    for ch in chars {
        match ch {
            '#' => note.sharp = pitch.is_some(),
            '.' => note.dotted = true,
            '0'..='9' if !octave_seen => {
                note.octave = ch as u8 - b'0';
                octave_seen = true;
            }
            _ => {}
        }
    }
    Some(note)
}
