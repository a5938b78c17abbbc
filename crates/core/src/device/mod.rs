//! Process-wide device context.

use std::{sync::Arc, time::Duration};

use crate::{
    actuator::{haptics, leds, Actuators, Backlight, DpadLed, SysfsActuators},
    config::PagerConfig,
    display::Display,
    input::{Buttons, InputHub},
    timing::{Clock, FrameLimiter, ShutdownSignal, Xorshift32},
    tone::TonePlayer,
    Result,
};

/// Every hardware handle of the device, created together at init and torn
/// down together at shutdown.
///
/// The display belongs to the rendering loop and is borrowed mutably. The
/// input hub, tone player and actuators are shared and may be used from
/// other threads through the accessors.
pub struct Pager {
    display: Display,
    input: Arc<InputHub>,
    actuators: Arc<dyn Actuators>,
    tone: Arc<TonePlayer>,
    backlight: Backlight,
    clock: Clock,
    frames: FrameLimiter,
    rng: Xorshift32,
    shutdown: ShutdownSignal,
    wait_poll: Duration,
    closed: bool,
}

impl Pager {
    /// Opens the framebuffer, the first available input device and the sysfs
    /// actuators. Only a missing framebuffer is an error.
    pub fn init(config: PagerConfig) -> Result<Self> {
        let display = Display::open(&config.display)?;
        let clock = Clock::start();
        let input = InputHub::open(&config.input, clock);
        let actuators: Arc<dyn Actuators> = Arc::new(SysfsActuators::new(config.actuators.clone()));
        let pager = Self::assemble(display, input, actuators, clock, &config);
        tracing::info!(
            width = pager.display.width(),
            height = pager.display.height(),
            input = pager.input.has_device(),
            "pager initialised"
        );
        Ok(pager)
    }

    /// Builds a context from already-constructed parts, e.g. an in-memory
    /// display and scripted input.
    pub fn with_parts(
        display: Display,
        input: InputHub,
        actuators: Arc<dyn Actuators>,
        config: &PagerConfig,
    ) -> Self {
        Self::assemble(display, input, actuators, Clock::start(), config)
    }

    fn assemble(
        display: Display,
        input: InputHub,
        actuators: Arc<dyn Actuators>,
        clock: Clock,
        config: &PagerConfig,
    ) -> Self {
        Self {
            display,
            input: Arc::new(input),
            tone: Arc::new(TonePlayer::new(actuators.clone(), &config.tone)),
            backlight: Backlight::new(actuators.clone()),
            actuators,
            clock,
            frames: FrameLimiter::new(config.display.target_fps),
            rng: Xorshift32::from_time(),
            shutdown: ShutdownSignal::new(),
            wait_poll: Duration::from_millis(config.input.wait_poll_ms),
            closed: false,
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn input(&self) -> &Arc<InputHub> {
        &self.input
    }

    pub fn tone(&self) -> &Arc<TonePlayer> {
        &self.tone
    }

    pub fn actuators(&self) -> &Arc<dyn Actuators> {
        &self.actuators
    }

    pub fn backlight(&self) -> &Backlight {
        &self.backlight
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Signal that ends blocking waits; triggered by [`Pager::shutdown`] and
    /// clonable into signal handlers.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_triggered()
    }

    pub fn ticks_ms(&self) -> u32 {
        self.clock.ticks_ms()
    }

    /// Sleeps out the rest of the frame at the configured rate.
    pub fn frame_sync(&mut self) -> Duration {
        self.frames.sync()
    }

    /// Pseudo-random value in `0..max`.
    pub fn random(&mut self, max: u32) -> u32 {
        self.rng.below(max)
    }

    pub fn seed_random(&mut self, seed: u32) {
        self.rng.reseed(seed);
    }

    /// Blocks until a button is pressed or the device shuts down.
    pub fn wait_button(&self) -> Result<Buttons> {
        self.input.wait_for_press(&self.shutdown, self.wait_poll, None)
    }

    pub fn vibrate(&self, ms: u64) {
        haptics::vibrate(self.actuators.as_ref(), ms);
    }

    pub fn vibrate_pattern(&self, pattern: &str) {
        haptics::vibrate_pattern(self.actuators.as_ref(), pattern);
    }

    pub fn beep(&self, frequency: u32, ms: u64) {
        haptics::beep(self.actuators.as_ref(), frequency, ms);
    }

    pub fn set_led(&self, name: &str, brightness: u8) -> bool {
        leds::set_led(self.actuators.as_ref(), name, brightness)
    }

    pub fn set_dpad_color(&self, led: DpadLed, rgb: u32) -> bool {
        leds::dpad_color(self.actuators.as_ref(), led, rgb)
    }

    pub fn leds_off(&self) {
        leds::all_off(self.actuators.as_ref());
    }

    /// Stops playback, blanks the panel and releases the cached font.
    /// Later calls do nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.shutdown.trigger();
        let stopped = self.tone.stop();
        let blanked = self.display.shutdown();
        tracing::info!("pager shut down");
        stopped.and(blanked)
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "pager shutdown failed");
        }
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("display", &self.display)
            .field("input", &self.input)
            .field("closed", &self.closed)
            .finish()
    }
}
