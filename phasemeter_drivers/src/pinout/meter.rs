use super::PinDef;
use super::{PinMode, Port};

/// Measurement trigger, rising edge, EXTI line 5.
pub const TRIGGER: PinDef = PinDef {
    port: Port::B,
    pin: 5,
    mode: PinMode::Input,
};

/// Fault injection: held high, the loop stops refreshing the watchdog.
pub const FAULT_SIM: PinDef = PinDef {
    port: Port::B,
    pin: 6,
    mode: PinMode::Input,
};
