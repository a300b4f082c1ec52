#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    clocks::Clocks,
    dma,
    dma::{Dma, DmaChannel, DmaInterrupt, DmaPeriph},
    pac,
    pac::DMA1,
};

use phasemeter_algo::{
    signal_reset_cause, Analyzer, CaptureBuffer, EdgeFlag, MeterConfig, WatchdogLoop,
};

use cortex_m;

const REPORT_BAUD: u32 = 115_200;

// Raised by the trigger edge handler, consumed by the measurement loop
static TRIGGER: EdgeFlag = EdgeFlag::new();
// Raised by the DMA transfer-complete handler
static CAPTURE_DONE: EdgeFlag = EdgeFlag::new();

#[rtic::app(device = pac, peripherals = true)]
mod app {
    use super::*;

    use phasemeter_drivers::*;

    type Meter = WatchdogLoop<
        'static,
        adc_capture::AdcCapture,
        watchdog::IndependentWatchdog,
        io::FaultPin,
        report_uart::ReportUart,
    >;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        meter: Meter,
        trigger_pin: io::TriggerPin,
        dma1: Dma<DMA1>,
    }

    #[init(local = [buffer: CaptureBuffer = CaptureBuffer::new()])]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        clock_cfg.setup().unwrap();

        let sysclk_freq = clock_cfg.sysclk();
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

        let cause = watchdog::take_reset_cause(&dp.RCC);
        let mut lamp = io::FaultLamp::new();
        signal_reset_cause(cause, &mut lamp);

        // Halted core must not trip the watchdog while a probe is attached
        #[cfg(debug_assertions)]
        dp.DBGMCU.apb1fzr1.modify(|_, w| w.dbg_iwdg_stop().set_bit());

        let cfg = MeterConfig::default();
        let analyzer = match Analyzer::new(cfg) {
            Ok(analyzer) => analyzer,
            Err(e) => defmt::panic!("CONFIG: {}", e),
        };
        defmt::info!(
            "FILTER: corner {} Hz, gain {} at {} Hz",
            cfg.corner_freq_hz,
            analyzer.line_gain(),
            cfg.line_freq_hz
        );

        let wdg = watchdog::IndependentWatchdog::start(cfg.watchdog_timeout_ms);

        let dma1 = Dma::new(dp.DMA1);
        let source = adc_capture::AdcCapture::new(
            dp.ADC1,
            dp.TIM3,
            &clock_cfg,
            cfg.sample_rate_hz(),
            &CAPTURE_DONE,
        );
        let uart = report_uart::ReportUart::new(dp.USART2, REPORT_BAUD, &clock_cfg);
        let fault = io::FaultPin::new();
        let trigger_pin = io::TriggerPin::new();

        let meter = match WatchdogLoop::new(
            analyzer,
            ctx.local.buffer,
            &TRIGGER,
            source,
            wdg,
            fault,
            uart,
        ) {
            Ok(meter) => meter,
            Err(e) => defmt::panic!("CONFIG: {}", e),
        };

        defmt::info!("SYSTEM: ready, waiting for trigger");

        (
            Shared {},
            Local {
                meter,
                trigger_pin,
                dma1,
            },
        )
    }

    #[idle(local = [meter])]
    fn idle(cx: idle::Context) -> ! {
        cx.local.meter.run()
    }

    #[task(binds = EXTI9_5, local = [trigger_pin], priority = 2)]
    fn trigger_edge(_cx: trigger_edge::Context) {
        io::TriggerPin::clear_interrupt();
        TRIGGER.raise();
    }

    #[task(binds = DMA1_CH1, local = [dma1], priority = 1)]
    fn adc_end_read(cx: adc_end_read::Context) {
        dma::clear_interrupt(
            DmaPeriph::Dma1,
            DmaChannel::C1,
            DmaInterrupt::TransferComplete,
        );
        cx.local.dma1.stop(DmaChannel::C1);
        CAPTURE_DONE.raise();
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
