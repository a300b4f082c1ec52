// Renders a measurement into the serial report record:
//   Va<V> Vb<V> Vc<V> pA<P> pB<P> pC<P>;
// RMS volts and phase radians with four decimals, no trailing newline.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::fmt::{self, Write};

use heapless::String;

use crate::analyzer::MeasurementResult;

/// Capacity of the report line, same as the transmit buffer of the UART path.
pub const REPORT_CAPACITY: usize = 80;

/// A rendered report record.
pub type ReportLine = String<REPORT_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// The record does not fit in `REPORT_CAPACITY` bytes.
    Overflow,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Overflow => write!(f, "report exceeds {} bytes", REPORT_CAPACITY),
        }
    }
}

pub struct ReportFormatter;

impl ReportFormatter {
    /// Formats the record for `result`.
    pub fn format(result: &MeasurementResult) -> Result<ReportLine, ReportError> {
        let [va, vb, vc] = result.rms();
        let [pa, pb, pc] = result.angles();

        let mut line = ReportLine::new();
        write!(
            line,
            "Va{:.4} Vb{:.4} Vc{:.4} pA{:.4} pB{:.4} pC{:.4};",
            va, vb, vc, pa, pb, pc
        )
        .map_err(|_| ReportError::Overflow)?;
        Ok(line)
    }
}
