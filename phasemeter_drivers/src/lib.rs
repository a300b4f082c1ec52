//! Board support for the phasemeter on STM32G431: pin map, ADC capture over DMA,
//! independent watchdog, report UART and the fault/trigger GPIOs.
//! Every driver implements one of the `phasemeter_algo` hardware traits.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![no_std]

pub mod adc_capture;
pub mod io;
pub mod pinout;
pub mod report_uart;
pub mod watchdog;
