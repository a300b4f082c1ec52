// Estimates the DC bias of every channel in an interleaved capture.

// Detailed Operation:
// The divider front end biases each phase voltage to mid-scale of the converter.
// The bias drifts with temperature and supply, so it is re-estimated from every
// acquisition: all samples of a channel are summed and divided by the number of
// sampling instants. The capture spans whole line cycles, so the AC component
// averages out and only the bias remains.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::CHANNELS;

/// Per-channel mean of raw converter samples.
pub struct OffsetEstimator;

impl OffsetEstimator {
    /// Returns the mean raw value of each channel over the whole buffer.
    ///
    /// The buffer length must be a multiple of `CHANNELS`; a trailing partial
    /// instant is ignored. An empty buffer yields zero offsets.
    pub fn estimate(buffer: &[u16]) -> [f32; CHANNELS] {
        // u64 holds u16::MAX * any buffer that fits in memory
        let mut sums = [0u64; CHANNELS];
        let mut instants: u64 = 0;

        for instant in buffer.chunks_exact(CHANNELS) {
            for (sum, &sample) in sums.iter_mut().zip(instant.iter()) {
                *sum += sample as u64;
            }
            instants += 1;
        }

        if instants == 0 {
            return [0.0; CHANNELS];
        }

        let mut offsets = [0.0f32; CHANNELS];
        for (offset, &sum) in offsets.iter_mut().zip(sums.iter()) {
            *offset = (sum as f64 / instants as f64) as f32;
        }
        offsets
    }
}
