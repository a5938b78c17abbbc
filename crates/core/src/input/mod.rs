//! Concurrent button input.
//!
//! [`InputHub`] drains raw samples from a [`RawInput`], turns mask changes
//! into press/release edges and serves two views of them: a snapshot poll
//! diffed against one shared previous mask, and a queue where each edge is
//! consumed exactly once. Any number of threads may use both at once.

mod buttons;
mod queue;
mod source;

use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};

pub use buttons::{Buttons, EventKind, InputEvent, InputSnapshot};
pub use queue::EventQueue;
pub use source::{key_to_button, ChannelInput, EvdevInput, RawInput};

use crate::{
    config::InputConfig,
    timing::{Clock, ShutdownSignal},
    PagerError, Result,
};

struct InputState {
    source: Option<Box<dyn RawInput>>,
    /// Latest mask seen from the source.
    held: Buttons,
    /// Mask as of the last snapshot poll.
    previous: Buttons,
    queue: EventQueue,
}

impl InputState {
    /// Pulls every pending sample and enqueues one event per changed bit.
    fn drain(&mut self, clock: &Clock) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        while let Some(sample) = source.next_sample() {
            let sample = sample & Buttons::all();
            let pressed = sample.pressed_since(self.held);
            let released = sample.released_since(self.held);
            if pressed.is_empty() && released.is_empty() {
                continue;
            }
            let timestamp_ms = clock.ticks_ms();
            let edges = pressed
                .iter()
                .map(|button| (button, EventKind::Press))
                .chain(released.iter().map(|button| (button, EventKind::Release)));
            for (button, kind) in edges {
                let kept = self.queue.push(InputEvent {
                    button,
                    kind,
                    timestamp_ms,
                });
                if !kept {
                    tracing::debug!(dropped = self.queue.dropped(), "input queue overflow");
                }
            }
            self.held = sample;
        }
    }
}

/// Shared entry point for button input.
pub struct InputHub {
    state: Mutex<InputState>,
    /// Mirror of `held` for lock-free peeks.
    held: AtomicU8,
    clock: Clock,
}

impl InputHub {
    /// Creates a hub over `source`; `None` gives a hub that never reports
    /// any button.
    pub fn new(source: Option<Box<dyn RawInput>>, queue_capacity: usize, clock: Clock) -> Self {
        Self {
            state: Mutex::new(InputState {
                source,
                held: Buttons::empty(),
                previous: Buttons::empty(),
                queue: EventQueue::new(queue_capacity),
            }),
            held: AtomicU8::new(0),
            clock,
        }
    }

    /// Opens the first configured evdev node, degrading to no input.
    pub fn open(config: &InputConfig, clock: Clock) -> Self {
        let source = EvdevInput::open_first(&config.devices)
            .map(|input| Box::new(input) as Box<dyn RawInput>);
        Self::new(source, config.queue_capacity, clock)
    }

    pub fn has_device(&self) -> bool {
        self.lock_state()
            .map(|state| state.source.is_some())
            .unwrap_or(false)
    }

    /// Snapshot of held buttons and the edges since the previous poll by
    /// any caller.
    pub fn poll(&self) -> Result<InputSnapshot> {
        let (current, previous) = {
            let mut state = self.lock_state()?;
            state.drain(&self.clock);
            self.held.store(state.held.bits(), Ordering::Release);
            let previous = state.previous;
            state.previous = state.held;
            (state.held, previous)
        };
        Ok(InputSnapshot {
            current,
            pressed: current.pressed_since(previous),
            released: current.released_since(previous),
        })
    }

    /// Removes and returns the oldest pending edge.
    pub fn next_event(&self) -> Result<Option<InputEvent>> {
        let mut state = self.lock_state()?;
        state.drain(&self.clock);
        self.held.store(state.held.bits(), Ordering::Release);
        Ok(state.queue.pop())
    }

    /// Whether an edge is waiting, without consuming it.
    pub fn has_events(&self) -> Result<bool> {
        let mut state = self.lock_state()?;
        state.drain(&self.clock);
        self.held.store(state.held.bits(), Ordering::Release);
        Ok(!state.queue.is_empty())
    }

    /// Buttons held as of the last drain. Takes no lock.
    pub fn peek(&self) -> Buttons {
        Buttons::from_bits_truncate(self.held.load(Ordering::Acquire))
    }

    /// Discards pending edges.
    pub fn clear(&self) -> Result<()> {
        self.lock_state()?.queue.clear();
        Ok(())
    }

    /// Blocks until a button goes down, `timeout` passes or `shutdown`
    /// fires. Returns the pressed mask, empty if nothing was pressed.
    ///
    /// Buttons already held on entry do not count.
    pub fn wait_for_press(
        &self,
        shutdown: &ShutdownSignal,
        poll_interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<Buttons> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        self.poll()?;
        loop {
            let snapshot = self.poll()?;
            if !snapshot.pressed.is_empty() {
                return Ok(snapshot.pressed);
            }
            let wait = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Ok(Buttons::empty());
                    }
                    left.min(poll_interval)
                }
                None => poll_interval,
            };
            if shutdown.wait_timeout(wait) {
                return Ok(Buttons::empty());
            }
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, InputState>> {
        self.state
            .lock()
            .map_err(|_| PagerError::Poisoned("input state"))
    }
}

impl std::fmt::Debug for InputHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputHub")
            .field("held", &self.peek())
            .finish()
    }
}
