//! Ringtone playback on the buzzer and vibrator.
//!
//! [`TonePlayer`] owns the single playback session. Starting a new one,
//! async or sync, first cancels and reaps the previous session and leaves
//! both actuators off, so two sessions never drive the hardware at once.

pub mod melodies;
mod notation;
mod sequencer;

use std::{
    sync::{Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

pub use notation::{parse, Melody, Note, Pitch};
pub use sequencer::{perform, PlaybackMode};

use crate::{
    actuator::{haptics, Actuators},
    config::ToneConfig,
    PagerError, Result,
};

struct Session {
    cancel: Sender<()>,
    /// Disconnects when the session's playback returns.
    done: Receiver<()>,
    /// `None` for a synchronous session running on a caller's thread.
    handle: Option<JoinHandle<()>>,
}

impl Session {
    fn is_finished(&self) -> bool {
        !matches!(self.done.try_recv(), Err(TryRecvError::Empty))
    }
}

/// Owner of the one active playback session.
pub struct TonePlayer {
    actuators: Arc<dyn Actuators>,
    active: Mutex<Option<Session>>,
    grace: Duration,
}

impl TonePlayer {
    pub fn new(actuators: Arc<dyn Actuators>, config: &ToneConfig) -> Self {
        Self {
            actuators,
            active: Mutex::new(None),
            grace: Duration::from_millis(config.stop_grace_ms),
        }
    }

    /// Starts playing `notation` in the background, replacing any current
    /// session.
    pub fn play(&self, notation: &str, mode: PlaybackMode) -> Result<()> {
        let melody = Melody::parse(notation);
        let mut active = self.lock_active()?;
        self.end_session(active.take());
        if melody.is_empty() {
            tracing::debug!(name = %melody.name, "nothing to play");
            return Ok(());
        }

        let (cancel, cancelled) = crossbeam_channel::bounded(1);
        let (finished, done) = crossbeam_channel::bounded::<()>(0);
        let actuators = self.actuators.clone();
        tracing::debug!(name = %melody.name, ?mode, notes = melody.notes.len(), "tone session started");
        let handle = thread::Builder::new()
            .name("pager-tone".into())
            .spawn(move || {
                let _finished = finished;
                let completed = perform(&melody, mode, actuators.as_ref(), &cancelled);
                tracing::debug!(name = %melody.name, completed, "tone session ended");
            })?;

        *active = Some(Session {
            cancel,
            done,
            handle: Some(handle),
        });
        Ok(())
    }

    /// Plays `notation` on the calling thread and returns once it finishes
    /// or is stopped from another thread. Returns `true` if it played to
    /// the end.
    pub fn play_sync(&self, notation: &str, vibrate: bool) -> Result<bool> {
        let melody = Melody::parse(notation);
        let mode = if vibrate {
            PlaybackMode::SoundAndVibrate
        } else {
            PlaybackMode::SoundOnly
        };

        let (cancel, cancelled) = crossbeam_channel::bounded(1);
        let (finished, done) = crossbeam_channel::bounded::<()>(0);
        {
            let mut active = self.lock_active()?;
            self.end_session(active.take());
            *active = Some(Session {
                cancel,
                done,
                handle: None,
            });
        }

        let completed = perform(&melody, mode, self.actuators.as_ref(), &cancelled);
        drop(finished);
        Ok(completed)
    }

    /// Stops any session and turns both actuators off. Safe to call at any
    /// time.
    pub fn stop(&self) -> Result<()> {
        let mut active = self.lock_active()?;
        self.end_session(active.take());
        Ok(())
    }

    /// Whether a session is still running. A finished session is reaped.
    pub fn is_playing(&self) -> bool {
        let Ok(mut active) = self.lock_active() else {
            return false;
        };
        match active.as_ref() {
            Some(session) if !session.is_finished() => true,
            Some(_) => {
                if let Some(session) = active.take() {
                    reap(session);
                }
                false
            }
            None => false,
        }
    }

    /// Cancels `session`, waits up to the grace period for it to wind down
    /// and silences both actuators either way.
    fn end_session(&self, session: Option<Session>) {
        self.silence();
        let Some(session) = session else {
            return;
        };
        let _ = session.cancel.try_send(());
        match session.done.recv_timeout(self.grace) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(grace = ?self.grace, "tone session did not stop in time, detaching");
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => reap(session),
        }
        self.silence();
    }

    fn silence(&self) {
        haptics::tone_off(self.actuators.as_ref());
        haptics::set_vibrator(self.actuators.as_ref(), false);
    }

    fn lock_active(&self) -> Result<MutexGuard<'_, Option<Session>>> {
        self.active
            .lock()
            .map_err(|_| PagerError::Poisoned("tone session"))
    }
}

fn reap(session: Session) {
    if let Some(handle) = session.handle {
        if handle.join().is_err() {
            tracing::warn!("tone session panicked");
        }
    }
}

impl Drop for TonePlayer {
    fn drop(&mut self) {
        let session = match self.active.get_mut() {
            Ok(active) => active.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        self.end_session(session);
    }
}

impl std::fmt::Debug for TonePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TonePlayer")
            .field("grace", &self.grace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::actuator::{Endpoint, MemoryActuators, BUZZER_ON};

    /// Eight-second whole notes.
    const LONG: &str = "long:d=1,o=5,b=30:c,d,e";
    /// 10ms quarter notes.
    const SHORT: &str = "short:d=4,o=5,b=6000:c,e,g";

    fn player() -> (Arc<MemoryActuators>, TonePlayer) {
        let actuators = Arc::new(MemoryActuators::new());
        let player = TonePlayer::new(actuators.clone(), &ToneConfig::default());
        (actuators, player)
    }

    fn wait_until_idle(player: &TonePlayer) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while player.is_playing() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn plays_in_the_background() {
        let (actuators, player) = player();
        player.play(SHORT, PlaybackMode::SoundOnly).unwrap();
        wait_until_idle(&player);

        assert!(!player.is_playing());
        let tones: Vec<i64> = actuators
            .writes()
            .into_iter()
            .filter(|(endpoint, _)| *endpoint == Endpoint::BuzzerFrequency)
            .map(|(_, value)| value)
            .collect();
        assert_eq!(tones, vec![524, 660, 784]);
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(0));
    }

    #[test]
    fn stop_silences_mid_note() {
        let (actuators, player) = player();
        player.play(LONG, PlaybackMode::SoundAndVibrate).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert!(player.is_playing());
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(BUZZER_ON));

        let started = Instant::now();
        player.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!player.is_playing());
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(0));
        assert_eq!(actuators.value(&Endpoint::Vibrator), Some(0));

        // idempotent
        player.stop().unwrap();
        player.stop().unwrap();
    }

    #[test]
    fn new_session_replaces_the_old_one() {
        let (actuators, player) = player();
        player.play(LONG, PlaybackMode::SoundOnly).unwrap();
        thread::sleep(Duration::from_millis(30));

        player.play(LONG, PlaybackMode::VibrateOnly).unwrap();
        let handover = actuators.writes().len();
        thread::sleep(Duration::from_millis(30));

        assert!(player.is_playing());
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(0));
        assert_eq!(actuators.value(&Endpoint::Vibrator), Some(1));
        let after = &actuators.writes()[handover..];
        assert!(after.iter().all(|(endpoint, _)| *endpoint == Endpoint::Vibrator));
        player.stop().unwrap();
    }

    #[test]
    fn sync_playback_blocks_until_done() {
        let (actuators, player) = player();
        assert!(player.play_sync(SHORT, true).unwrap());
        assert!(!player.is_playing());
        assert_eq!(actuators.value(&Endpoint::Vibrator), Some(0));
        assert!(actuators
            .writes()
            .contains(&(Endpoint::BuzzerFrequency, 784)));
    }

    #[test]
    fn sync_playback_preempts_and_can_be_stopped() {
        let (actuators, player) = player();
        player.play(LONG, PlaybackMode::VibrateOnly).unwrap();
        let player = Arc::new(player);

        let stopper = {
            let player = player.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                player.stop().unwrap();
            })
        };
        let started = Instant::now();
        let completed = player.play_sync(LONG, false).unwrap();
        stopper.join().unwrap();

        assert!(!completed);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(0));
        assert_eq!(actuators.value(&Endpoint::Vibrator), Some(0));
    }

    #[test]
    fn empty_notation_is_silent() {
        let (actuators, player) = player();
        player.play("no separator", PlaybackMode::SoundOnly).unwrap();
        assert!(!player.is_playing());
        assert!(actuators
            .writes()
            .iter()
            .all(|(_, value)| *value == 0));
    }

    #[test]
    fn dropping_the_player_stops_playback() {
        let (actuators, player) = player();
        player.play(LONG, PlaybackMode::SoundOnly).unwrap();
        thread::sleep(Duration::from_millis(20));
        drop(player);
        assert_eq!(actuators.value(&Endpoint::BuzzerBrightness), Some(0));
    }
}
