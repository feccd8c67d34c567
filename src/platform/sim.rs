use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use super::Platform;
use crate::buffer::LedBuffer;
use crate::color::Rgb;

/// Shared handle to the simulator's clock. The render loop (or a test)
/// keeps one and advances it; the platform reads it for `millis`.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u32 {
        self.0.get()
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }
}

/// Platform for simulators and deterministic tests: time only moves when the
/// clock handle advances it, the RNG is seeded, and `show` snapshots the
/// committed frame (with brightness applied) for a renderer to pick up.
pub struct SimulatorPlatform {
    buffer: LedBuffer,
    frame: Vec<Rgb>,
    rng: SmallRng,
    clock: SimClock,
    last_update_ms: u32,
    delta: f32,
    brightness: u8,
    max_refresh_rate: u8,
    dither: u8,
    frames_shown: u64,
}

impl SimulatorPlatform {
    pub fn new(num_leds: usize, seed: u64) -> Self {
        Self::with_clock(num_leds, seed, SimClock::new())
    }

    pub fn with_clock(num_leds: usize, seed: u64, clock: SimClock) -> Self {
        Self {
            buffer: LedBuffer::new(num_leds),
            frame: vec![Rgb::BLACK; num_leds],
            rng: SmallRng::seed_from_u64(seed),
            clock,
            last_update_ms: 0,
            delta: 0.0,
            brightness: 255,
            max_refresh_rate: 0,
            dither: 0,
            frames_shown: 0,
        }
    }

    /// Handle to the clock this platform reads.
    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    /// Advance the simulated clock.
    pub fn advance(&mut self, ms: u32) {
        self.clock.advance(ms);
    }

    /// The most recently committed frame.
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl Platform for SimulatorPlatform {
    fn leds(&self) -> &LedBuffer {
        &self.buffer
    }

    fn leds_mut(&mut self) -> &mut LedBuffer {
        &mut self.buffer
    }

    fn show(&mut self) {
        for (out, pixel) in self.frame.iter_mut().zip(self.buffer.iter()) {
            *out = pixel.scaled(self.brightness);
        }
        self.frames_shown += 1;
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_max_refresh_rate(&mut self, fps: u8) {
        self.max_refresh_rate = fps;
    }

    fn set_dither(&mut self, dither: u8) {
        self.dither = dither;
    }

    fn millis(&self) -> u32 {
        self.clock.now()
    }

    fn delta_time(&self) -> f32 {
        self.delta
    }

    fn update_delta_time(&mut self) {
        let now = self.clock.now();
        let elapsed = now.wrapping_sub(self.last_update_ms);
        self.delta = elapsed as f32 / 1000.0;
        self.last_update_ms = now;
    }

    fn random8(&mut self) -> u8 {
        self.rng.gen()
    }

    fn random16(&mut self) -> u16 {
        self.rng.gen()
    }

    fn random(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }

    fn random_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    fn random_float(&mut self) -> f32 {
        // 24 significant bits keep the result strictly below 1.0.
        (self.rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    fn log_info(&self, message: &str) {
        log::info!("{message}");
    }

    fn log_warning(&self, message: &str) {
        log::warn!("{message}");
    }

    fn log_error(&self, message: &str) {
        log::error!("{message}");
    }
}
