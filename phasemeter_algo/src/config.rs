// Holds the measurement geometry and the analysis parameters of the phasemeter.

// Key Features:
// - Compile-time buffer geometry (channels, samples per cycle, captured cycles)
// - Runtime analysis parameters with the reference design as `Default`
// - Validation of every precondition the analysis pass relies on

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::fmt;

/// Number of analog channels captured in round-robin order.
pub const CHANNELS: usize = 3;

/// Samples taken per line cycle on each channel.
pub const SAMPLES_PER_CYCLE: usize = 256;

/// Line cycles captured per acquisition. Only the last one is analyzed.
pub const CYCLES: usize = 3;

/// Samples per channel in one acquisition.
pub const TOTAL_SAMPLES: usize = SAMPLES_PER_CYCLE * CYCLES;

/// Length of the interleaved capture buffer.
pub const BUFFER_LEN: usize = TOTAL_SAMPLES * CHANNELS;

/// Number of terms in the quadrature reference window.
pub const WINDOW_LEN: usize = 16;

/// Errors reported when a configuration cannot drive the analysis pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Samples per cycle or cycle count is zero.
    EmptyGeometry,
    /// The configured geometry does not match the capture buffer length.
    BufferMismatch { expected: usize, actual: usize },
    /// Samples per cycle is not a multiple of twice the reference window length.
    StrideNotIntegral { samples_per_cycle: usize, window: usize },
    /// Line frequency, corner frequency or scale is not a positive finite number.
    InvalidRate,
    /// Corner frequency must stay below the Nyquist frequency of the channel rate.
    CornerAboveNyquist,
    /// `phase_channels` must be a permutation of the converter channels.
    InvalidPhaseMap,
    /// Watchdog timeout of zero would reset the device immediately.
    ZeroTimeout,
    /// One acquisition lasts longer than the watchdog timeout. The loop does
    /// not refresh the watchdog while a transfer is in flight.
    CaptureExceedsTimeout { capture_ms: u32, timeout_ms: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGeometry => write!(f, "samples per cycle and cycle count must be non-zero"),
            ConfigError::BufferMismatch { expected, actual } => {
                write!(f, "capture buffer holds {} samples, configuration needs {}", actual, expected)
            }
            ConfigError::StrideNotIntegral { samples_per_cycle, window } => write!(
                f,
                "{} samples per cycle is not a multiple of 2 x {} reference points",
                samples_per_cycle, window
            ),
            ConfigError::InvalidRate => write!(f, "rates and scale must be positive and finite"),
            ConfigError::CornerAboveNyquist => write!(f, "corner frequency is at or above Nyquist"),
            ConfigError::InvalidPhaseMap => write!(f, "phase map is not a channel permutation"),
            ConfigError::ZeroTimeout => write!(f, "watchdog timeout must be non-zero"),
            ConfigError::CaptureExceedsTimeout {
                capture_ms,
                timeout_ms,
            } => write!(
                f,
                "capture of {} ms does not fit the {} ms watchdog timeout",
                capture_ms, timeout_ms
            ),
        }
    }
}

/// Runtime parameters of one phasemeter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    /// Fundamental line frequency in Hz.
    pub line_freq_hz: f32,
    /// Samples taken per line cycle on each channel.
    pub samples_per_cycle: usize,
    /// Cycles captured per acquisition.
    pub cycles: usize,
    /// Low-pass corner frequency in Hz.
    pub corner_freq_hz: f32,
    /// Conversion from raw converter units to volts.
    pub scale: f32,
    /// Independent watchdog timeout in milliseconds.
    pub watchdog_timeout_ms: u32,
    /// Converter channel carrying phase A, B and C.
    pub phase_channels: [usize; CHANNELS],
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            line_freq_hz: 60.0,
            samples_per_cycle: SAMPLES_PER_CYCLE,
            cycles: CYCLES,
            corner_freq_hz: 106.0,
            scale: 0.906_145_3,
            watchdog_timeout_ms: 1000,
            // The divider board wires phase C to converter input 0
            phase_channels: [2, 1, 0],
        }
    }
}

impl MeterConfig {
    /// Per-channel sampling rate in Hz.
    #[inline(always)]
    pub fn sample_rate_hz(&self) -> f32 {
        self.line_freq_hz * self.samples_per_cycle as f32
    }

    /// Samples per channel in one acquisition.
    #[inline(always)]
    pub fn total_samples(&self) -> usize {
        self.samples_per_cycle * self.cycles
    }

    /// Interleaved buffer length needed by one acquisition.
    #[inline(always)]
    pub fn buffer_len(&self) -> usize {
        self.total_samples() * CHANNELS
    }

    /// First per-channel sample index of the analyzed (last) cycle.
    #[inline(always)]
    pub fn window_start(&self) -> usize {
        (self.cycles - 1) * self.samples_per_cycle
    }

    /// Duration of one acquisition in milliseconds, rounded up.
    #[inline(always)]
    pub fn capture_time_ms(&self) -> u32 {
        libm::ceilf(self.cycles as f32 * 1000.0 / self.line_freq_hz) as u32
    }

    /// Eligible samples between two reference window terms.
    ///
    /// The reference weights step by `pi / WINDOW_LEN`, so the signal must be
    /// decimated to `2 * WINDOW_LEN` points per cycle to stay on the same grid.
    #[inline(always)]
    pub fn decimation(&self) -> usize {
        self.samples_per_cycle / (2 * WINDOW_LEN)
    }

    /// Checks every precondition the analysis pass relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_cycle == 0 || self.cycles == 0 {
            return Err(ConfigError::EmptyGeometry);
        }
        if self.samples_per_cycle % (2 * WINDOW_LEN) != 0 {
            return Err(ConfigError::StrideNotIntegral {
                samples_per_cycle: self.samples_per_cycle,
                window: WINDOW_LEN,
            });
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.line_freq_hz) || !positive(self.corner_freq_hz) || !positive(self.scale) {
            return Err(ConfigError::InvalidRate);
        }
        if self.corner_freq_hz >= self.sample_rate_hz() / 2.0 {
            return Err(ConfigError::CornerAboveNyquist);
        }
        let mut seen = [false; CHANNELS];
        for &ch in self.phase_channels.iter() {
            if ch >= CHANNELS || seen[ch] {
                return Err(ConfigError::InvalidPhaseMap);
            }
            seen[ch] = true;
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let capture_ms = self.capture_time_ms();
        if capture_ms >= self.watchdog_timeout_ms {
            return Err(ConfigError::CaptureExceedsTimeout {
                capture_ms,
                timeout_ms: self.watchdog_timeout_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_design_is_valid() {
        let cfg = MeterConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.buffer_len(), BUFFER_LEN);
        assert_eq!(cfg.sample_rate_hz(), 15360.0);
        assert_eq!(cfg.window_start(), 512);
        assert_eq!(cfg.decimation(), 8);
        assert_eq!(cfg.capture_time_ms(), 50);
    }

    #[test]
    fn rejects_capture_longer_than_watchdog_timeout() {
        let cfg = MeterConfig {
            watchdog_timeout_ms: 40,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::CaptureExceedsTimeout {
                capture_ms: 50,
                timeout_ms: 40
            })
        );
    }

    #[test]
    fn rejects_stride_that_does_not_divide() {
        let cfg = MeterConfig {
            samples_per_cycle: 200,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::StrideNotIntegral {
                samples_per_cycle: 200,
                window: WINDOW_LEN
            })
        );
    }

    #[test]
    fn rejects_bad_rates_and_maps() {
        let base = MeterConfig::default();
        let no_cycles = MeterConfig { cycles: 0, ..base };
        assert_eq!(no_cycles.validate(), Err(ConfigError::EmptyGeometry));

        let nan_scale = MeterConfig { scale: f32::NAN, ..base };
        assert_eq!(nan_scale.validate(), Err(ConfigError::InvalidRate));

        let high_corner = MeterConfig { corner_freq_hz: 8000.0, ..base };
        assert_eq!(high_corner.validate(), Err(ConfigError::CornerAboveNyquist));

        let dup = MeterConfig { phase_channels: [0, 0, 1], ..base };
        assert_eq!(dup.validate(), Err(ConfigError::InvalidPhaseMap));

        let no_wdt = MeterConfig { watchdog_timeout_ms: 0, ..base };
        assert_eq!(no_wdt.validate(), Err(ConfigError::ZeroTimeout));
    }
}
