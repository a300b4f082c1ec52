// Implements the sample source on ADC1 + DMA1 channel 1, paced by TIM3.

// Detailed Operation:
// TIM3 overflows once per sampling instant (line frequency x samples per cycle) and
// its TRGO starts one conversion sequence of the three divider inputs. DMA1 channel 1
// moves every result into the capture buffer, so the buffer fills in round-robin
// order ch0, ch1, ch2, ch0, ... without CPU involvement. The DMA transfer-complete
// interrupt stops the channel and raises the completion flag read by `poll_complete`.
// Re-arming for the next acquisition only reprograms the transfer; the ADC stays
// calibrated and enabled.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    self,
    adc::{Adc, AdcDevice, Align, InputType, SampleTime, Trigger, TriggerEdge},
    clocks::Clocks,
    dma::{self, DmaChannel, DmaInput, DmaPeriph},
    pac::{ADC1, TIM3},
    timer::{MasterModeSelection, Timer, TimerConfig},
};

use phasemeter_algo::{EdgeFlag, SampleSource};

use super::pinout;

pub struct AdcCapture {
    adc: Adc<ADC1>,
    pacer: Timer<TIM3>,
    done: &'static EdgeFlag,
}

impl AdcCapture {
    /// Configures the divider inputs, the conversion sequence and the pacing timer.
    /// `done` is raised by the DMA1_CH1 transfer-complete handler.
    pub fn new(
        adc_reg: ADC1,
        tim_reg: TIM3,
        clock_cfg: &Clocks,
        instant_rate_hz: f32,
        done: &'static EdgeFlag,
    ) -> Self {
        pinout::analog::VSENS_0.init();
        pinout::analog::VSENS_1.init();
        pinout::analog::VSENS_2.init();

        let mut adc = Adc::new_adc1(adc_reg, AdcDevice::One, Default::default(), clock_cfg.systick());

        let seq = pinout::analog::ADC1_SEQUENCE;
        for i in 0..seq.len() {
            adc.set_sequence(seq[i], i as u8 + 1);
            adc.set_input_type(seq[i], InputType::SingleEnded);
            // Source impedance of the dividers needs a long sample time (92.5 cycles); still far
            // below the 1 / (3 x instant rate) budget of one conversion slot
            adc.set_sample_time(seq[i], SampleTime::T61);
        }
        adc.set_sequence_len(seq.len() as u8);
        adc.set_align(Align::Right);
        adc.set_trigger(Trigger::Tim3Trgo, TriggerEdge::HardwareRising);

        dma::enable_mux1();
        dma::mux(DmaPeriph::Dma1, DmaChannel::C1, DmaInput::Adc1);

        let pacer = Timer::new_tim3(tim_reg, instant_rate_hz, TimerConfig::default(), clock_cfg);
        pacer.set_mastermode(MasterModeSelection::Update);

        defmt::debug!("ADC: {} Hz per channel, sequence {}", instant_rate_hz, seq);

        AdcCapture {
            adc,
            pacer,
            done,
        }
    }
}

impl SampleSource for AdcCapture {
    fn start_capture(&mut self, buffer: &mut [u16]) {
        self.done.clear();
        // The loop keeps the buffer untouched and in place until `poll_complete`
        // reports the transfer finished, which is what the DMA needs here
        unsafe {
            self.adc.read_dma(
                buffer,
                &pinout::analog::ADC1_SEQUENCE,
                DmaChannel::C1,
                Default::default(),
                DmaPeriph::Dma1,
            )
        };
        self.pacer.reset_count();
        self.pacer.enable();
    }

    fn poll_complete(&mut self) -> bool {
        self.done.take()
    }

    fn finish(&mut self) {
        self.pacer.disable();
        self.adc.stop_conversions();
        // Drop a conversion that may have landed after the last transfer
        let _ = self.adc.read_result();
    }
}
