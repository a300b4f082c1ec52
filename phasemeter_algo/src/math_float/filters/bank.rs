// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use super::biquad::{BiquadCoeffs, FilterBiquad};
use crate::config::CHANNELS;

/// One biquad per converter channel, fed in capture order.
pub struct FilterBank {
    coeffs: BiquadCoeffs,
    offsets: [f32; CHANNELS],
    scale: f32,
    filters: [FilterBiquad; CHANNELS],
}

impl FilterBank {
    /// Fresh bank for one acquisition: zeroed memory, offsets of that acquisition.
    pub fn new(coeffs: BiquadCoeffs, offsets: [f32; CHANNELS], scale: f32) -> Self {
        Self {
            coeffs,
            offsets,
            scale,
            filters: [FilterBiquad::new(); CHANNELS],
        }
    }

    /// Filters one sampling instant and returns the outputs in volts.
    #[inline(always)]
    pub fn tick(&mut self, raw: [u16; CHANNELS]) -> [f32; CHANNELS] {
        let mut out = [0.0f32; CHANNELS];
        for ch in 0..CHANNELS {
            let x = (raw[ch] as f32 - self.offsets[ch]) * self.scale;
            out[ch] = self.filters[ch].tick(&self.coeffs, x);
        }
        out
    }

    /// Last outputs of every channel.
    pub fn outputs(&self) -> [f32; CHANNELS] {
        [
            self.filters[0].get_output(),
            self.filters[1].get_output(),
            self.filters[2].get_output(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_independent() {
        let k = BiquadCoeffs::lowpass(106.0, 15360.0);
        let mut bank = FilterBank::new(k, [2048.0, 2048.0, 2048.0], 1.0);
        let mut single = FilterBiquad::new();

        for n in 0..300 {
            let drive = if n % 50 < 25 { 3000u16 } else { 1000u16 };
            let out = bank.tick([drive, 2048, 2048]);
            let expected = single.tick(&k, drive as f32 - 2048.0);
            assert_eq!(out[0], expected);
            assert_eq!(out[1], 0.0);
            assert_eq!(out[2], 0.0);
        }
        assert_eq!(bank.outputs()[0], single.get_output());
    }

    #[test]
    fn constant_input_at_offset_outputs_zero() {
        let k = BiquadCoeffs::lowpass(106.0, 15360.0);
        let mut bank = FilterBank::new(k, [1234.0, 10.0, 4000.0], 0.906);
        for _ in 0..768 {
            assert_eq!(bank.tick([1234, 10, 4000]), [0.0; 3]);
        }
    }

    #[test]
    fn scale_is_applied_before_filtering() {
        let k = BiquadCoeffs::lowpass(106.0, 15360.0);
        let mut unit = FilterBank::new(k, [0.0; 3], 1.0);
        let mut half = FilterBank::new(k, [0.0; 3], 0.5);
        for _ in 0..2000 {
            unit.tick([200, 200, 200]);
            half.tick([200, 200, 200]);
        }
        let (u, h) = (unit.outputs()[0], half.outputs()[0]);
        assert!((u - 200.0).abs() < 0.1);
        assert!((h - 100.0).abs() < 0.1);
    }
}
