// Measurement core of the three-phase voltage phasemeter.
//
// Triggered capture of three interleaved channels, offset removal, biquad
// low-pass filtering, single-bin quadrature correlation for the phase of the
// fundamental, true RMS, and the serial report record, all driven by a
// watchdog-guarded loop. Hardware is reached through the traits in
// `supervisor::hw` only, so everything here also builds and runs on the host.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod log;

pub mod analog;
pub mod analyzer;
pub mod config;
pub mod math_float;
pub mod report;
pub mod signal;
pub mod supervisor;

pub use analog::{CaptureBuffer, OffsetEstimator};
pub use analyzer::{Analyzer, MeasurementResult, PhaseReading};
pub use config::{ConfigError, MeterConfig};
pub use report::{ReportError, ReportFormatter, ReportLine};
pub use signal::EdgeFlag;
pub use supervisor::hw::{FaultIndicator, FaultInput, ReportSink, ResetCause, SampleSource, Watchdog};
pub use supervisor::{signal_reset_cause, LoopState, WatchdogLoop};
