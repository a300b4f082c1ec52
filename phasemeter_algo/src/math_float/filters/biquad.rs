// Implements a second-order low-pass IIR (biquad) filter in single precision.

// Key Features:
// - Coefficients from a continuous Butterworth prototype (damping sqrt(2)) via the
//   bilinear transform with A = 2 * fs
// - Direct form I recursion with two previous inputs and two previous outputs
// - Frequency response evaluation for diagnostics

// Detailed Operation:
// Continuous design: wc = 2*pi*fc, B = wc*sqrt(2), A = 2*fs, C = wc^2.
// Discrete coefficients with D = A^2 + A*B + C:
//   K1 = C / D,  K2 = 2*(C - A^2) / D,  K3 = (A^2 + C - A*B) / D
// Recursion: y = -K2*y1 - K3*y2 + K1*x + 2*K1*x1 + K1*x2
// DC gain is exactly one: 4*K1 == 1 + K2 + K3.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::f32::consts::{PI, SQRT_2};

/// Coefficients of the low-pass biquad. Derived once, shared by every channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiquadCoeffs {
    pub k1: f32,
    pub k2: f32,
    pub k3: f32,
}

impl BiquadCoeffs {
    /// Designs the low-pass for a corner frequency and sample rate, both in Hz.
    pub fn lowpass(corner_hz: f32, sample_rate_hz: f32) -> Self {
        let wc = 2.0 * PI * corner_hz;
        let a = 2.0 * sample_rate_hz;
        let b = wc * SQRT_2;
        let c = wc * wc;

        let aa = a * a;
        let den = aa + a * b + c;

        Self {
            k1: c / den,
            k2: 2.0 * (c - aa) / den,
            k3: (aa + c - a * b) / den,
        }
    }

    /// Magnitude of the discrete frequency response at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f32, sample_rate_hz: f32) -> f32 {
        let w = 2.0 * PI * freq_hz / sample_rate_hz;
        let (s1, c1) = (libm::sinf(w), libm::cosf(w));
        let (s2, c2) = (libm::sinf(2.0 * w), libm::cosf(2.0 * w));

        // H(z) = K1 (1 + 2 z^-1 + z^-2) / (1 + K2 z^-1 + K3 z^-2), z^-n = cos(nw) - j sin(nw)
        let num_re = self.k1 * (1.0 + 2.0 * c1 + c2);
        let num_im = -self.k1 * (2.0 * s1 + s2);
        let den_re = 1.0 + self.k2 * c1 + self.k3 * c2;
        let den_im = -(self.k2 * s1 + self.k3 * s2);

        libm::sqrtf((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

/// One channel of filter memory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterBiquad {
    x1: f32, // Previous input
    x2: f32, // Input before previous
    y1: f32, // Previous output
    y2: f32, // Output before previous
}

impl FilterBiquad {
    /// Filter with zeroed memory.
    pub const fn new() -> Self {
        Self {
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Advances the recursion with one input sample and returns the new output.
    #[inline(always)]
    pub fn tick(&mut self, k: &BiquadCoeffs, x: f32) -> f32 {
        let y = -k.k2 * self.y1 - k.k3 * self.y2 + k.k1 * x + 2.0 * k.k1 * self.x1 + k.k1 * self.x2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }

    /// Last computed output.
    #[inline(always)]
    pub fn get_output(&self) -> f32 {
        self.y1
    }

    /// Clears the memory, as at the start of an acquisition.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 15360.0;

    #[test]
    fn reference_coefficients() {
        let k = BiquadCoeffs::lowpass(106.0, FS);
        // Unity DC gain
        assert!((4.0 * k.k1 - (1.0 + k.k2 + k.k3)).abs() < 1e-6);
        // Poles close to z = 1 for a corner far below fs
        assert!(k.k2 < -1.9 && k.k2 > -2.0);
        assert!(k.k3 > 0.9 && k.k3 < 1.0);
        assert!(k.k1 > 4.0e-4 && k.k1 < 5.0e-4);
    }

    #[test]
    fn step_settles_to_input() {
        let k = BiquadCoeffs::lowpass(106.0, FS);
        let mut f = FilterBiquad::new();
        let mut y = 0.0;
        for _ in 0..2000 {
            y = f.tick(&k, 100.0);
        }
        assert!((y - 100.0).abs() < 0.05, "y = {}", y);
        assert_eq!(f.get_output(), y);
    }

    #[test]
    fn zero_input_stays_zero() {
        let k = BiquadCoeffs::lowpass(106.0, FS);
        let mut f = FilterBiquad::new();
        for _ in 0..768 {
            assert_eq!(f.tick(&k, 0.0), 0.0);
        }
    }

    #[test]
    fn response_matches_butterworth_shape() {
        let k = BiquadCoeffs::lowpass(106.0, FS);
        assert!((k.magnitude_at(0.0, FS) - 1.0).abs() < 1e-3);
        // -3 dB at the corner
        assert!((k.magnitude_at(106.0, FS) - core::f32::consts::FRAC_1_SQRT_2).abs() < 5e-3);
        // 1 / sqrt(1 + (60/106)^4) at the line frequency
        assert!((k.magnitude_at(60.0, FS) - 0.9523).abs() < 2e-3);
        assert!(k.magnitude_at(1000.0, FS) < 0.02);
    }

    #[test]
    fn reset_clears_memory() {
        let k = BiquadCoeffs::lowpass(106.0, FS);
        let mut f = FilterBiquad::new();
        f.tick(&k, 500.0);
        f.tick(&k, -500.0);
        f.reset();
        assert_eq!(f, FilterBiquad::new());
    }
}
