// Digital inputs and outputs of the phasemeter: trigger edge, fault injection, fault lamp.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::gpio::{self, Edge, Pin, Pull};

use phasemeter_algo::{FaultIndicator, FaultInput};

use super::pinout;

/// Trigger input with the rising-edge interrupt enabled.
pub struct TriggerPin {
    _pin: Pin,
}

impl TriggerPin {
    pub fn new() -> Self {
        let mut pin = pinout::meter::TRIGGER.init_pulled(Pull::Dn);
        pin.enable_interrupt(Edge::Rising);
        TriggerPin { _pin: pin }
    }

    /// Acknowledges the EXTI line, called from the edge handler.
    #[inline(always)]
    pub fn clear_interrupt() {
        gpio::clear_exti_interrupt(pinout::meter::TRIGGER.line());
    }
}

/// Fault-injection input, pulled low when unconnected.
pub struct FaultPin {
    pin: Pin,
}

impl FaultPin {
    pub fn new() -> Self {
        FaultPin {
            pin: pinout::meter::FAULT_SIM.init_pulled(Pull::Dn),
        }
    }
}

impl FaultInput for FaultPin {
    #[inline(always)]
    fn is_fault_simulated(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Red fault lamp.
pub struct FaultLamp {
    pin: Pin,
}

impl FaultLamp {
    pub fn new() -> Self {
        FaultLamp {
            pin: pinout::led::RED.init(),
        }
    }
}

impl FaultIndicator for FaultLamp {
    fn set_fault(&mut self, on: bool) {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
