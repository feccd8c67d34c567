use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use super::Platform;
use crate::buffer::LedBuffer;

/// In-process platform for tests, tools, and headless runs. `show` is a
/// frame counter, time is monotonic from construction, and the RNG is
/// seeded once from entropy (or from a caller seed for determinism).
pub struct NativePlatform {
    buffer: LedBuffer,
    rng: SmallRng,
    start: Instant,
    last_update: Instant,
    delta: f32,
    brightness: u8,
    max_refresh_rate: u8,
    dither: u8,
    frames_shown: u64,
}

impl NativePlatform {
    pub fn new(num_leds: usize) -> Self {
        Self::with_rng(num_leds, SmallRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn with_seed(num_leds: usize, seed: u64) -> Self {
        Self::with_rng(num_leds, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(num_leds: usize, rng: SmallRng) -> Self {
        let now = Instant::now();
        Self {
            buffer: LedBuffer::new(num_leds),
            rng,
            start: now,
            last_update: now,
            delta: 0.0,
            brightness: 255,
            max_refresh_rate: 0,
            dither: 0,
            frames_shown: 0,
        }
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl Platform for NativePlatform {
    fn leds(&self) -> &LedBuffer {
        &self.buffer
    }

    fn leds_mut(&mut self) -> &mut LedBuffer {
        &mut self.buffer
    }

    fn show(&mut self) {
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
        self.start.elapsed().as_millis() as u32
    }

    fn delta_time(&self) -> f32 {
        self.delta
    }

    fn update_delta_time(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn show_counts_frames_and_touches_nothing() {
        let mut platform = NativePlatform::with_seed(4, 1);
        platform.leds_mut().set(0, Rgb::RED);
        platform.show();
        platform.show();
        assert_eq!(platform.frames_shown(), 2);
        assert_eq!(platform.leds().get(0), Rgb::RED);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = NativePlatform::with_seed(1, 42);
        let mut b = NativePlatform::with_seed(1, 42);
        for _ in 0..16 {
            assert_eq!(a.random16(), b.random16());
        }
    }

    #[test]
    fn bounded_randoms_respect_their_ranges() {
        let mut platform = NativePlatform::with_seed(1, 7);
        assert_eq!(platform.random(0), 0);
        for _ in 0..100 {
            assert!(platform.random(10) < 10);
            let r = platform.random_range(5, 8);
            assert!(r >= 5 && r < 8);
            let f = platform.random_float();
            assert!(f >= 0.0 && f < 1.0);
            let f = platform.random_float_range(-2.0, 2.0);
            assert!(f >= -2.0 && f < 2.0);
        }
        assert_eq!(platform.random_range(9, 3), 9);
    }

    #[test]
    fn delta_time_updates_on_demand() {
        let mut platform = NativePlatform::with_seed(1, 1);
        assert_eq!(platform.delta_time(), 0.0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        platform.update_delta_time();
        assert!(platform.delta_time() > 0.0);
    }
}
