// Independent watchdog (IWDG) and reset-cause readout.
// The IWDG runs from the LSI oscillator and cannot be stopped once started;
// a missed refresh resets the whole device.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{iwdg, pac::RCC};

use phasemeter_algo::{ResetCause, Watchdog};

pub struct IndependentWatchdog;

impl IndependentWatchdog {
    /// Starts the IWDG with the given timeout.
    pub fn start(timeout_ms: u32) -> Self {
        iwdg::setup(timeout_ms as f32 / 1000.0);
        defmt::info!("WATCHDOG: armed, timeout {} ms", timeout_ms);
        IndependentWatchdog
    }
}

impl Watchdog for IndependentWatchdog {
    #[inline(always)]
    fn feed(&mut self) {
        iwdg::pet();
    }
}

/// Reads why the device came out of reset and clears the reset flags,
/// so a later power-on reset is not reported as a watchdog reset.
pub fn take_reset_cause(rcc: &RCC) -> ResetCause {
    let cause = if rcc.csr.read().iwdgrstf().bit_is_set() {
        ResetCause::Watchdog
    } else {
        ResetCause::PowerOn
    };
    rcc.csr.modify(|_, w| w.rmvf().set_bit());
    cause
}
