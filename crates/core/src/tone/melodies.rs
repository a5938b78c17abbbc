//! Ringtones bundled with the device.

pub const TETRIS: &str = concat!(
    "tetris:d=4,o=5,b=160:",
    "e6,8b,8c6,8d6,16e6,16d6,8c6,8b,a,8a,8c6,e6,8d6,8c6,",
    "b,8b,8c6,d6,e6,c6,a,2a,8p,",
    "d6,8f6,a6,8g6,8f6,e6,8e6,8c6,e6,8d6,8c6,",
    "b,8b,8c6,d6,e6,c6,a,a"
);

pub const TETRIS_B: &str = concat!(
    "tetrisb:d=4,o=5,b=160:",
    "2e6,2c6,2d6,2b,2c6,2a,2g#,2b,64p,",
    "2e6,2c6,2d6,2b,c6,e6,2a6,1g#6"
);

/// Theme A followed by theme B.
pub const TETRIS_FULL: &str = concat!(
    "tetrisfull:d=4,o=5,b=160:",
    "e6,8b,8c6,8d6,16e6,16d6,8c6,8b,a,8a,8c6,e6,8d6,8c6,",
    "b,8b,8c6,d6,e6,c6,a,2a,8p,",
    "d6,8f6,a6,8g6,8f6,e6,8e6,8c6,e6,8d6,8c6,",
    "b,8b,8c6,d6,e6,c6,a,2a,",
    "2e6,2c6,2d6,2b,2c6,2a,2g#,2b,64p,",
    "2e6,2c6,2d6,2b,c6,e6,2a6,1g#6"
);

pub const TETRIS_BASS: &str = concat!(
    "tetrisbass:d=4,o=4,b=160:",
    "e,e,e,e,a,a,a,a,g#,g#,g#,g#,a,b,c5,8p,",
    "d5,d5,d5,d5,c5,c5,c5,c5,b,b,b,b,a,2a"
);

pub const SMB_DEATH: &str = concat!(
    "smbdeath:d=4,o=5,b=90:",
    "8p,16b,16f6,16p,16f6,16f.6,16e.6,16d6,16c6,16p,16e,16p,16c,4p"
);

pub const GAME_OVER_ALT: &str = concat!(
    "gameover:d=4,o=4,b=170:",
    "8c5,4p,8g4,4p,4e4,32p,8a4,8b4,6a4,4g#4,6a#4,6g#4,8g4,8f4,1g4"
);

pub const GAME_OVER: &str = SMB_DEATH;

pub const LEVEL_UP: &str = "levelup:d=16,o=5,b=200:c,e,g,c6,8p,g,c6,e6,8g6";

pub const VICTORY: &str = concat!(
    "victory:d=4,o=5,b=180:",
    "g,g,g,2d#,f,f,f,2d,",
    "g,g,g,d#6,d6,c6,b,8a,2g"
);

pub const PACMAN: &str =
    "pacman:d=4,o=5,b=160:b,b6,f#6,d#6,8b6,8f#6,d#6,c6,c7,g6,f6,8c7,8g6,f6";

pub const INVADERS: &str = concat!(
    "invaders:d=8,o=4,b=120:",
    "e,4e,e,4e,c,4c,d,4d,e,4e,4p,",
    "f,4f,f,4f,d,4d,e,4e,d,4d"
);

/// Every bundled ringtone by name.
pub const ALL: &[(&str, &str)] = &[
    ("tetris", TETRIS),
    ("tetrisb", TETRIS_B),
    ("tetrisfull", TETRIS_FULL),
    ("tetrisbass", TETRIS_BASS),
    ("smbdeath", SMB_DEATH),
    ("gameover", GAME_OVER_ALT),
    ("levelup", LEVEL_UP),
    ("victory", VICTORY),
    ("pacman", PACMAN),
    ("invaders", INVADERS),
];

/// Looks a bundled ringtone up by name.
pub fn by_name(name: &str) -> Option<&'static str> {
    ALL.iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_the_notation_header() {
        for (name, text) in ALL {
            assert!(text.starts_with(&format!("{name}:")));
        }
        assert_eq!(by_name("PACMAN"), Some(PACMAN));
        assert_eq!(by_name("unknown"), None);
    }
}
