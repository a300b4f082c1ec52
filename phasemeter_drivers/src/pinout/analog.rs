//! Voltage divider inputs, one per phase. Converter channel order is the capture order.
use super::PinDef;
use super::{PinMode, Port};

/// ADC1_IN1, converter channel 0 (phase C on the divider board)
pub const VSENS_0: PinDef = PinDef {
    port: Port::A,
    pin: 0,
    mode: PinMode::Analog,
};

/// ADC1_IN2, converter channel 1 (phase B)
pub const VSENS_1: PinDef = PinDef {
    port: Port::A,
    pin: 1,
    mode: PinMode::Analog,
};

/// ADC1_IN12, converter channel 2 (phase A)
pub const VSENS_2: PinDef = PinDef {
    port: Port::B,
    pin: 1,
    mode: PinMode::Analog,
};

/// ADC1 input numbers in capture order.
pub const ADC1_SEQUENCE: [u8; 3] = [1, 2, 12];
