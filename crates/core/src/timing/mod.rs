//! Clocks, frame pacing and the process-wide shutdown flag.

mod rng;

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

pub use rng::Xorshift32;

/// Monotonic millisecond clock started at device init.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Milliseconds since start, wrapping after ~49 days.
    pub fn ticks_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

/// Blocks the calling thread for `ms` milliseconds.
pub fn delay(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Holds a render loop to a fixed frame period.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    period: Duration,
    last: Instant,
}

impl FrameLimiter {
    /// A limiter for `fps` frames per second. Zero disables pacing.
    pub fn new(fps: u32) -> Self {
        let period = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        Self {
            period,
            last: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps out the rest of the current frame and returns how long the
    /// frame actually took.
    pub fn sync(&mut self) -> Duration {
        let elapsed = self.last.elapsed();
        if elapsed < self.period {
            thread::sleep(self.period - elapsed);
        }
        let now = Instant::now();
        let frame = now - self.last;
        self.last = now;
        frame
    }
}

/// Process-wide "keep running" flag that blocking helpers wait on.
///
/// Clones share the same flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for up to `timeout`, returning early with `true` if the
    /// signal fires.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}
