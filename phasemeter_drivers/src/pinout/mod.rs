//! This module defines the pin configurations for the hardware abstraction layer (HAL) GPIO pins used in the project.
use hal::gpio::{Pin, PinMode, Port, Pull};

pub mod analog;
pub mod led;
pub mod meter;
pub mod uart;

/// Represents the definition of a GPIO pin.
pub struct PinDef {
    /// The port to which the pin belongs (e.g., Port::A, Port::B).
    port: Port,
    /// The pin number within the port.
    pin: u8,
    /// The mode of the pin (e.g., Output, Input, Alternate function).
    mode: PinMode,
}

impl PinDef {
    pub const fn new(port: Port, pin: u8, mode: PinMode) -> PinDef {
        PinDef { port, pin, mode }
    }

    /// Pin number within the port, which is also its EXTI line.
    pub const fn line(&self) -> u8 {
        self.pin
    }

    /// Converts the PinDef struct to a Pin struct. Useful for predefined pin configurations.
    /// # Example
    /// ```ignore
    /// let mut lamp = led::RED.init();
    /// lamp.set_high();
    /// ```
    pub fn init(&self) -> Pin {
        Pin::new(self.port, self.pin, self.mode)
    }

    /// Same as `init`, with the internal pull resistor enabled.
    pub fn init_pulled(&self, pull: Pull) -> Pin {
        let mut pin = self.init();
        pin.pull(pull);
        pin
    }
}
