// Implements the watchdog-guarded measurement loop of the phasemeter.

// Key Features:
// - Idle -> Capturing -> Analyzing -> Reporting -> Idle, no terminal state
// - Trigger consumed from a coalescing interrupt flag
// - Watchdog refreshed while idle and between stages, never while a transfer is in flight
// - Refresh suppressed while the fault-injection input is high
// - Reset cause shown on the fault lamp at boot

// Detailed Operation:
// Every call to `tick()` performs one bounded unit of work. The wait for a
// trigger refreshes the watchdog on every step, so an idle meter stays alive
// indefinitely. Arming a capture refreshes it once more; from then on no refresh
// happens until the source reports completion. A healthy acquisition lasts
// `MeterConfig::capture_time_ms()`, which validation keeps below the watchdog
// timeout, while a transfer that never completes lets the watchdog reset the
// device. The fault-injection input is sampled before every refresh; while it
// is high no refresh happens at all, which exercises the reset path on the bench.
// There is no software recovery: the next boot lights the fault lamp.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub mod hw;

use hw::{FaultIndicator, FaultInput, ReportSink, ResetCause, SampleSource, Watchdog};

use crate::analog::CaptureBuffer;
use crate::analyzer::{Analyzer, MeasurementResult};
use crate::config::{ConfigError, BUFFER_LEN};
use crate::log;
use crate::report::ReportFormatter;
use crate::signal::EdgeFlag;

/// Stage of the measurement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Waiting for a trigger edge.
    Idle,
    /// Transfer in flight.
    Capturing,
    /// Buffer complete, filter and accumulate pass pending.
    Analyzing,
    /// Result ready to be formatted and sent.
    Reporting,
}

/// Drives the fault lamp from the reset cause. Returns true if a fault is shown.
pub fn signal_reset_cause<I: FaultIndicator>(cause: ResetCause, lamp: &mut I) -> bool {
    let fault = cause == ResetCause::Watchdog;
    match cause {
        ResetCause::Watchdog => log::info!("Reboot: watchdog"),
        ResetCause::PowerOn => log::info!("Reboot: power-on / reset pin"),
    }
    lamp.set_fault(fault);
    fault
}

/// The measurement loop. Owns the capture buffer and the board interfaces.
pub struct WatchdogLoop<'a, S, W, F, R> {
    analyzer: Analyzer,
    buffer: &'a mut CaptureBuffer,
    trigger: &'a EdgeFlag,

    source: S,
    watchdog: W,
    fault: F,
    sink: R,

    state: LoopState,
    pending: Option<MeasurementResult>, // Analyzed, not yet reported
    last: Option<MeasurementResult>,    // Last reported result
    cycles: u32,                        // Completed acquisitions
    suppressed: bool,                   // Previous refresh was skipped
}

impl<'a, S, W, F, R> WatchdogLoop<'a, S, W, F, R>
where
    S: SampleSource,
    W: Watchdog,
    F: FaultInput,
    R: ReportSink,
{
    /// Builds the loop around an analyzer whose geometry matches the capture buffer.
    /// Drops any trigger raised before the loop existed.
    pub fn new(
        analyzer: Analyzer,
        buffer: &'a mut CaptureBuffer,
        trigger: &'a EdgeFlag,
        source: S,
        watchdog: W,
        fault: F,
        sink: R,
    ) -> Result<Self, ConfigError> {
        let expected = analyzer.config().buffer_len();
        if expected != BUFFER_LEN {
            return Err(ConfigError::BufferMismatch {
                expected,
                actual: BUFFER_LEN,
            });
        }
        trigger.clear();

        Ok(Self {
            analyzer,
            buffer,
            trigger,
            source,
            watchdog,
            fault,
            sink,
            state: LoopState::Idle,
            pending: None,
            last: None,
            cycles: 0,
            suppressed: false,
        })
    }

    /// Refreshes the watchdog unless the fault-injection input is high.
    /// Returns true if the watchdog was refreshed.
    pub fn feed_if_ok(&mut self) -> bool {
        if self.fault.is_fault_simulated() {
            if !self.suppressed {
                log::warning!("Fault input high: watchdog refresh suppressed");
                self.suppressed = true;
            }
            return false;
        }
        self.suppressed = false;
        self.watchdog.feed();
        true
    }

    /// Performs one step of the loop and returns the new state.
    pub fn tick(&mut self) -> LoopState {
        let next = match self.state {
            LoopState::Idle => {
                if self.trigger.take() {
                    self.source.start_capture(self.buffer.as_mut_slice());
                    LoopState::Capturing
                } else {
                    core::hint::spin_loop();
                    LoopState::Idle
                }
            }
            LoopState::Capturing => {
                if self.source.poll_complete() {
                    self.source.finish();
                    LoopState::Analyzing
                } else {
                    core::hint::spin_loop();
                    LoopState::Capturing
                }
            }
            LoopState::Analyzing => match self.analyzer.analyze(self.buffer.as_slice()) {
                Ok(result) => {
                    self.pending = Some(result);
                    LoopState::Reporting
                }
                Err(_err) => {
                    log::warning!("Analysis skipped: {}", _err);
                    LoopState::Idle
                }
            },
            LoopState::Reporting => {
                if let Some(result) = self.pending.take() {
                    self.report(&result);
                    self.last = Some(result);
                    self.cycles = self.cycles.wrapping_add(1);
                }
                LoopState::Idle
            }
        };

        // A transfer still in flight must complete within the watchdog timeout
        let in_flight = self.state == LoopState::Capturing && next == LoopState::Capturing;
        if next != self.state {
            log::debug!("Loop: {} -> {}", self.state, next);
        }
        self.state = next;
        if !in_flight {
            self.feed_if_ok();
        }
        self.state
    }

    /// Runs the loop forever. A stall is resolved by the watchdog, not here.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    fn report(&mut self, result: &MeasurementResult) {
        match ReportFormatter::format(result) {
            Ok(line) => self.sink.send(line.as_str()),
            Err(_err) => log::warning!("Report dropped: {}", _err),
        }

        let [a, b, c] = result.phases;
        log::info!(
            "Phase shift: {} {} {} deg",
            a.angle_deg(),
            b.angle_deg(),
            c.angle_deg()
        );
        log::info!("RMS voltage: {} V, {} V, {} V", a.rms, b.rms, c.rms);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Last result sent to the report sink.
    pub fn last_result(&self) -> Option<&MeasurementResult> {
        self.last.as_ref()
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn fault_input_mut(&mut self) -> &mut F {
        &mut self.fault
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }
}
