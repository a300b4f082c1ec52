// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::USART2,
    usart::{Usart, UsartConfig},
};

use phasemeter_algo::ReportSink;

use super::pinout;

/// Blocking report transport on USART2.
pub struct ReportUart {
    usart: Usart<USART2>,
}

impl ReportUart {
    pub fn new(usart_reg: USART2, baud: u32, clock_cfg: &Clocks) -> Self {
        pinout::uart::USART2_TX.init();
        pinout::uart::USART2_RX.init();

        let usart = Usart::new(usart_reg, baud, UsartConfig::default(), clock_cfg);

        ReportUart { usart }
    }
}

impl ReportSink for ReportUart {
    fn send(&mut self, record: &str) {
        // One record takes ~6 ms at 115200 baud, well inside the watchdog timeout
        if self.usart.write(record.as_bytes()).is_err() {
            defmt::warn!("UART: report not sent");
        }
    }
}
