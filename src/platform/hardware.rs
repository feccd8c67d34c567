use std::time::Instant;

use anyhow::{bail, Result};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use super::Platform;
use crate::buffer::LedBuffer;
use crate::model::HardwareInfo;

/// Seam to the actual pixel pusher. Implementations wrap an SPI/bit-banged
/// chain, a network sink, or a capture buffer; `bytes` arrives already in
/// the chain's declared channel order with brightness applied.
pub trait LedDriver {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    fn supports_dither(&self) -> bool {
        false
    }
}

/// Driver-backed platform. Owns the buffer, reorders channels per the
/// model's declared color order at `show`, and keeps driver failures away
/// from scenes (logged, frame skipped).
pub struct HardwarePlatform<D: LedDriver> {
    driver: D,
    buffer: LedBuffer,
    /// Output byte position -> RGB channel index.
    channel_order: [usize; 3],
    scratch: Vec<u8>,
    rng: SmallRng,
    start: Instant,
    last_update: Instant,
    delta: f32,
    brightness: u8,
    max_refresh_rate: u8,
    dither: u8,
    frames_pushed: u64,
}

impl<D: LedDriver> HardwarePlatform<D> {
    pub fn new(driver: D, num_leds: usize, hardware: &HardwareInfo) -> Result<Self> {
        let channel_order = parse_color_order(&hardware.color_order)?;
        let now = Instant::now();
        Ok(Self {
            driver,
            buffer: LedBuffer::new(num_leds),
            channel_order,
            scratch: vec![0u8; num_leds * 3],
            rng: SmallRng::from_entropy(),
            start: now,
            last_update: now,
            delta: 0.0,
            brightness: 255,
            max_refresh_rate: 0,
            dither: 0,
            frames_pushed: 0,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }
}

/// Parse a channel-order string such as "GRB" into output positions.
pub fn parse_color_order(order: &str) -> Result<[usize; 3]> {
    let bytes = order.as_bytes();
    if bytes.len() != 3 {
        bail!("color order '{order}' must name exactly three channels");
    }
    let mut mapping = [usize::MAX; 3];
    for (position, byte) in bytes.iter().enumerate() {
        let channel = match byte {
            b'R' | b'r' => 0,
            b'G' | b'g' => 1,
            b'B' | b'b' => 2,
            other => bail!("color order '{order}' has unknown channel '{}'", *other as char),
        };
        mapping[position] = channel;
    }
    if mapping.iter().any(|&c| c == usize::MAX)
        || mapping[0] == mapping[1]
        || mapping[1] == mapping[2]
        || mapping[0] == mapping[2]
    {
        bail!("color order '{order}' repeats a channel");
    }
    Ok(mapping)
}

impl<D: LedDriver> Platform for HardwarePlatform<D> {
    fn leds(&self) -> &LedBuffer {
        &self.buffer
    }

    fn leds_mut(&mut self) -> &mut LedBuffer {
        &mut self.buffer
    }

    fn show(&mut self) {
        let brightness = self.brightness;
        for (pixel, chunk) in self.buffer.iter().zip(self.scratch.chunks_exact_mut(3)) {
            let scaled = pixel.scaled(brightness);
            let raw = [scaled.r, scaled.g, scaled.b];
            chunk[0] = raw[self.channel_order[0]];
            chunk[1] = raw[self.channel_order[1]];
            chunk[2] = raw[self.channel_order[2]];
        }
        match self.driver.write(&self.scratch) {
            Ok(()) => self.frames_pushed += 1,
            Err(error) => log::error!("LED driver write failed: {error:#}"),
        }
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
        if dither != 0 && !self.driver.supports_dither() {
            log::warn!("driver has no dither support, hint ignored");
            return;
        }
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
