// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::CHANNELS;

/// Sum of squared filtered samples over the analyzed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyAccumulator {
    sums: [f32; CHANNELS],
    count: usize,
}

impl EnergyAccumulator {
    pub const fn new() -> Self {
        Self {
            sums: [0.0; CHANNELS],
            count: 0,
        }
    }

    /// Adds one eligible sampling instant. Every instant counts, no decimation.
    #[inline(always)]
    pub fn tick(&mut self, y: &[f32; CHANNELS]) {
        for (sum, &value) in self.sums.iter_mut().zip(y.iter()) {
            *sum += value * value;
        }
        self.count += 1;
    }

    /// Samples accumulated per channel.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Root mean square of each channel; zero before the first sample.
    pub fn rms(&self) -> [f32; CHANNELS] {
        if self.count == 0 {
            return [0.0; CHANNELS];
        }
        let n = self.count as f32;
        let mut out = [0.0f32; CHANNELS];
        for (rms, &sum) in out.iter_mut().zip(self.sums.iter()) {
            *rms = libm::sqrtf(sum / n);
        }
        out
    }
}
