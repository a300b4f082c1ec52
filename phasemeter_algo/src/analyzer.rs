// Runs the analysis pass over one completed capture.

// Detailed Operation:
// 1. The offsets of the three channels are estimated from the whole buffer.
// 2. Every sampling instant, in capture order, goes through the filter bank after
//    offset removal and scaling to volts.
// 3. Instants of the last captured cycle feed the harmonic and the energy
//    accumulators in the same pass; earlier cycles only settle the filters.
// 4. Converter channels are mapped onto phases A, B and C.
// Filter memory and accumulators are created inside `analyze`, so nothing leaks
// from one acquisition into the next. Only the coefficients and the reference
// window live as long as the analyzer.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::f32::consts::SQRT_2;

use crate::analog::OffsetEstimator;
use crate::config::{ConfigError, MeterConfig, CHANNELS};
use crate::math_float::filters::{BiquadCoeffs, FilterBank};
use crate::math_float::{EnergyAccumulator, HarmonicAccumulator, ReferenceWindow};

/// Result of one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseReading {
    /// True RMS of the filtered signal, volts.
    pub rms: f32,
    /// Phase angle of the fundamental, radians in (-pi, pi].
    pub angle: f32,
    /// Peak amplitude of the fundamental, volts.
    pub magnitude: f32,
}

impl PhaseReading {
    /// RMS of the fundamental alone, from the correlation magnitude.
    pub fn fundamental_rms(&self) -> f32 {
        self.magnitude / SQRT_2
    }

    /// Phase angle in degrees, for the diagnostic stream.
    pub fn angle_deg(&self) -> f32 {
        self.angle * (180.0 / core::f32::consts::PI)
    }
}

/// Readings of phases A, B and C from one acquisition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementResult {
    pub phases: [PhaseReading; CHANNELS],
}

impl MeasurementResult {
    pub fn rms(&self) -> [f32; CHANNELS] {
        [self.phases[0].rms, self.phases[1].rms, self.phases[2].rms]
    }

    pub fn angles(&self) -> [f32; CHANNELS] {
        [self.phases[0].angle, self.phases[1].angle, self.phases[2].angle]
    }
}

/// Analysis stage of the phasemeter. Built once at startup.
pub struct Analyzer {
    config: MeterConfig,
    coeffs: BiquadCoeffs,
    window: ReferenceWindow,
}

impl Analyzer {
    /// Validates the configuration and derives the filter coefficients and the
    /// reference window.
    pub fn new(config: MeterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            coeffs: BiquadCoeffs::lowpass(config.corner_freq_hz, config.sample_rate_hz()),
            window: ReferenceWindow::new(),
            config,
        })
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Filter gain at the line frequency.
    pub fn line_gain(&self) -> f32 {
        self.coeffs
            .magnitude_at(self.config.line_freq_hz, self.config.sample_rate_hz())
    }

    /// Analyzes one interleaved capture.
    pub fn analyze(&self, buffer: &[u16]) -> Result<MeasurementResult, ConfigError> {
        let expected = self.config.buffer_len();
        if buffer.len() != expected {
            return Err(ConfigError::BufferMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        let offsets = OffsetEstimator::estimate(buffer);
        let mut bank = FilterBank::new(self.coeffs, offsets, self.config.scale);
        let mut harmonic = HarmonicAccumulator::new(&self.window, self.config.decimation());
        let mut energy = EnergyAccumulator::new();

        let window_start = self.config.window_start();
        for (idx, instant) in buffer.chunks_exact(CHANNELS).enumerate() {
            let y = bank.tick([instant[0], instant[1], instant[2]]);
            if idx >= window_start {
                harmonic.tick(&y);
                energy.tick(&y);
            }
        }

        let phasors = harmonic.phasors();
        let rms = energy.rms();

        let mut result = MeasurementResult::default();
        for (reading, &ch) in result.phases.iter_mut().zip(self.config.phase_channels.iter()) {
            *reading = PhaseReading {
                rms: rms[ch],
                angle: phasors[ch].angle(),
                magnitude: phasors[ch].magnitude(),
            };
        }
        Ok(result)
    }
}
