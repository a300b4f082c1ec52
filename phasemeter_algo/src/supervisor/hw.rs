// Interfaces between the control loop and the board.
// The firmware implements them on top of the HAL, tests implement them with mocks.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Continuous, interleaved multi-channel capture.
pub trait SampleSource {
    /// Arms the transfer for `buffer.len()` interleaved samples and starts the
    /// conversions. Called once per acquisition; re-arming must not require a
    /// full peripheral re-initialization.
    ///
    /// The transfer may keep writing into `buffer` after this call returns. The
    /// caller must neither read nor move the buffer until `poll_complete()`
    /// returned `true`.
    fn start_capture(&mut self, buffer: &mut [u16]);

    /// True once every requested sample has been written.
    fn poll_complete(&mut self) -> bool;

    /// Stops the conversions and discards samples left in the converter.
    fn finish(&mut self);
}

/// Hardware watchdog refresh.
pub trait Watchdog {
    fn feed(&mut self);
}

/// Fault-injection input. A high level asks the loop to stop refreshing the watchdog.
pub trait FaultInput {
    fn is_fault_simulated(&mut self) -> bool;
}

/// Operator-visible fault lamp.
pub trait FaultIndicator {
    fn set_fault(&mut self, on: bool);
}

/// Transport of the report record.
pub trait ReportSink {
    fn send(&mut self, record: &str);
}

/// Why the device last came out of reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// The independent watchdog expired.
    Watchdog,
    /// Power-on, brown-out or reset pin.
    PowerOn,
}
