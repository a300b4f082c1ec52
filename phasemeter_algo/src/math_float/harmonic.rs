// Implements the single-bin quadrature correlation that yields the phase and
// magnitude of the fundamental of each channel.

// Key Features:
// - Reference window of WINDOW_LEN cosine and sine weights, computed once and shared
// - Decimated accumulation over the analyzed cycle, weights consumed in reverse order
// - Phase by atan2 and peak magnitude by the Euclidean norm of the two sums

// Detailed Operation:
// Weight k (k = 1..W) is (4 / 2W) * cos(2*pi*k / 2W) and (4 / 2W) * sin(2*pi*k / 2W).
// The weights step by pi / W, half a line period over the whole window, so the
// analyzed cycle is decimated to 2W points per period. Every `stride`-th eligible
// sample contributes y * hc[W-1-n] and y * hs[W-1-n] for the n-th term, until W terms
// are in. With the 4 / 2W gain a pure sinusoid of peak A yields a magnitude of A.
// The signal is DC-free after offset removal, which the half-period correlation needs.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::f32::consts::PI;

use crate::config::{CHANNELS, WINDOW_LEN};

/// Cosine and sine correlation weights. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceWindow {
    hc: [f32; WINDOW_LEN],
    hs: [f32; WINDOW_LEN],
}

impl ReferenceWindow {
    pub fn new() -> Self {
        let points = (2 * WINDOW_LEN) as f64;
        let gain = 4.0 / points;
        let mut hc = [0.0f32; WINDOW_LEN];
        let mut hs = [0.0f32; WINDOW_LEN];

        for (idx, (c, s)) in hc.iter_mut().zip(hs.iter_mut()).enumerate() {
            let arg = 2.0 * core::f64::consts::PI * (idx + 1) as f64 / points;
            *c = (gain * libm::cos(arg)) as f32;
            *s = (gain * libm::sin(arg)) as f32;
        }

        Self { hc, hs }
    }

    #[inline(always)]
    pub fn cos_weight(&self, idx: usize) -> f32 {
        self.hc[idx]
    }

    #[inline(always)]
    pub fn sin_weight(&self, idx: usize) -> f32 {
        self.hs[idx]
    }
}

impl Default for ReferenceWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine- and sine-weighted sums of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phasor {
    pub cos: f32,
    pub sin: f32,
}

impl Phasor {
    /// Phase angle in radians, within (-pi, pi].
    ///
    /// Both sums at zero (a dead channel) have no defined phase; 0.0 is
    /// returned so the report stays well-formed.
    pub fn angle(&self) -> f32 {
        if self.cos == 0.0 && self.sin == 0.0 {
            return 0.0;
        }
        let angle = libm::atan2f(self.sin, self.cos);
        if angle <= -PI {
            PI
        } else {
            angle
        }
    }

    /// Peak amplitude of the fundamental.
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.cos * self.cos + self.sin * self.sin)
    }
}

/// Per-acquisition correlation state for all channels.
pub struct HarmonicAccumulator<'a> {
    window: &'a ReferenceWindow,
    stride: usize, // Eligible samples per accumulated term
    skip: usize,   // Decimation counter, resets on every accumulated term
    terms: usize,  // Terms accumulated so far
    sums: [Phasor; CHANNELS],
}

impl<'a> HarmonicAccumulator<'a> {
    /// Zeroed accumulator. `stride` must be non-zero.
    pub fn new(window: &'a ReferenceWindow, stride: usize) -> Self {
        Self {
            window,
            stride,
            skip: 0,
            terms: 0,
            sums: [Phasor::default(); CHANNELS],
        }
    }

    /// Feeds the filtered outputs of one eligible sampling instant.
    #[inline(always)]
    pub fn tick(&mut self, y: &[f32; CHANNELS]) {
        if self.is_complete() {
            return;
        }
        self.skip += 1;
        if self.skip < self.stride {
            return;
        }
        self.skip = 0;

        let idx = WINDOW_LEN - 1 - self.terms;
        let (hc, hs) = (self.window.cos_weight(idx), self.window.sin_weight(idx));
        for (sum, &value) in self.sums.iter_mut().zip(y.iter()) {
            sum.cos += value * hc;
            sum.sin += value * hs;
        }
        self.terms += 1;
    }

    /// True once every reference weight has been consumed.
    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.terms >= WINDOW_LEN
    }

    /// Number of accumulated terms.
    pub fn terms(&self) -> usize {
        self.terms
    }

    pub fn phasors(&self) -> [Phasor; CHANNELS] {
        self.sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    const SPC: usize = 256;
    const STRIDE: usize = SPC / (2 * WINDOW_LEN);

    fn wrap(a: f32) -> f32 {
        let mut a = a % TAU;
        if a > PI {
            a -= TAU;
        } else if a <= -PI {
            a += TAU;
        }
        a
    }

    fn correlate(peaks: [f32; 3], phases: [f32; 3]) -> [Phasor; 3] {
        let window = ReferenceWindow::new();
        let mut acc = HarmonicAccumulator::new(&window, STRIDE);
        for n in 0..SPC {
            let t = TAU * n as f32 / SPC as f32;
            let y = [
                peaks[0] * libm::cosf(t + phases[0]),
                peaks[1] * libm::cosf(t + phases[1]),
                peaks[2] * libm::cosf(t + phases[2]),
            ];
            acc.tick(&y);
        }
        assert!(acc.is_complete());
        assert_eq!(acc.terms(), WINDOW_LEN);
        acc.phasors()
    }

    #[test]
    fn window_weights() {
        let w = ReferenceWindow::new();
        assert!((w.cos_weight(0) - 0.125 * libm::cosf(TAU / 32.0)).abs() < 1e-7);
        assert!((w.sin_weight(7) - 0.125).abs() < 1e-7); // k = 8 is a quarter period
        assert!((w.cos_weight(15) + 0.125).abs() < 1e-7); // k = 16 is half a period
        assert!(w.sin_weight(15).abs() < 1e-7);
    }

    #[test]
    fn recovers_peak_magnitude() {
        let p = correlate([170.0, 1.0, 0.0], [0.3, -1.2, 0.0]);
        assert!((p[0].magnitude() - 170.0).abs() < 0.05);
        assert!((p[1].magnitude() - 1.0).abs() < 1e-3);
        assert_eq!(p[2].magnitude(), 0.0);
    }

    #[test]
    fn angle_follows_input_phase() {
        // First term lands on the 8th eligible sample, reversed weights add pi
        let lead = 7.0 * PI / 128.0 + PI;
        for &phi in [0.0f32, 0.5, -2.0944, 2.0944, 3.0].iter() {
            let p = correlate([100.0, 100.0, 100.0], [phi, phi, phi]);
            let err = wrap(p[0].angle() - wrap(phi + lead));
            assert!(err.abs() < 1e-3, "phi {} angle {}", phi, p[0].angle());
        }
    }

    #[test]
    fn relative_phase_between_channels() {
        let p = correlate([120.0, 120.0, 120.0], [0.0, -TAU / 3.0, TAU / 3.0]);
        let ab = wrap(p[1].angle() - p[0].angle());
        let ac = wrap(p[2].angle() - p[0].angle());
        assert!((ab + 2.0944).abs() < 1e-3);
        assert!((ac - 2.0944).abs() < 1e-3);
    }

    #[test]
    fn dead_channel_angle_is_zero() {
        let zero = Phasor::default();
        assert_eq!(zero.angle(), 0.0);
        let neg_zero = Phasor { cos: -0.0, sin: -0.0 };
        assert_eq!(neg_zero.angle(), 0.0);
    }

    #[test]
    fn angle_range_excludes_minus_pi() {
        let p = Phasor { cos: -1.0, sin: -0.0 };
        assert_eq!(p.angle(), PI);
    }

    #[test]
    fn stops_after_window() {
        let window = ReferenceWindow::new();
        let mut acc = HarmonicAccumulator::new(&window, STRIDE);
        for _ in 0..SPC {
            acc.tick(&[1.0, 1.0, 1.0]);
        }
        let done = acc.phasors();
        for _ in 0..SPC {
            acc.tick(&[1000.0, 1000.0, 1000.0]);
        }
        assert_eq!(acc.phasors(), done);
    }
}
