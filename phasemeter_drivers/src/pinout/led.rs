use super::PinDef;
use super::{PinMode, Port};

/// Fault lamp, lit at boot after a watchdog reset.
pub const RED: PinDef = PinDef {
    port: Port::B,
    pin: 15,
    mode: PinMode::Output,
};
