use super::PinDef;
use super::{PinMode, Port};

/// USART2 TX, routed to the debugger's virtual COM port.
pub const USART2_TX: PinDef = PinDef {
    port: Port::A,
    pin: 2,
    mode: PinMode::Alt(7),
};

/// USART2 RX
pub const USART2_RX: PinDef = PinDef {
    port: Port::A,
    pin: 3,
    mode: PinMode::Alt(7),
};
