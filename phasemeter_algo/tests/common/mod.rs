// Mock board and synthetic waveforms shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use phasemeter_algo::config::{BUFFER_LEN, CHANNELS, SAMPLES_PER_CYCLE};
use phasemeter_algo::{
    FaultIndicator, FaultInput, ReportSink, ResetCause, SampleSource, Watchdog,
};

pub const MID_SCALE: f32 = 2048.0;

/// One converter channel of a synthetic capture.
#[derive(Clone, Copy)]
pub struct Tone {
    pub peak_raw: f32,
    pub phase: f32,
}

impl Tone {
    pub const fn new(peak_raw: f32, phase: f32) -> Self {
        Self { peak_raw, phase }
    }

    pub const fn dc() -> Self {
        Self {
            peak_raw: 0.0,
            phase: 0.0,
        }
    }
}

/// Interleaved 12-bit capture of three tones at the line frequency.
pub fn capture(tones: [Tone; CHANNELS]) -> Vec<u16> {
    let mut buf = vec![0u16; BUFFER_LEN];
    for (n, instant) in buf.chunks_exact_mut(CHANNELS).enumerate() {
        let t = std::f32::consts::TAU * n as f32 / SAMPLES_PER_CYCLE as f32;
        for (sample, tone) in instant.iter_mut().zip(tones.iter()) {
            let v = MID_SCALE + tone.peak_raw * (t + tone.phase).cos();
            *sample = v.round().clamp(0.0, 4095.0) as u16;
        }
    }
    buf
}

pub fn wrap(a: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    let mut a = a % tau;
    if a > std::f32::consts::PI {
        a -= tau;
    } else if a <= -std::f32::consts::PI {
        a += tau;
    }
    a
}

/// Copies prepared captures into the buffer and completes after `latency` polls.
pub struct ScriptedSource {
    captures: Vec<Vec<u16>>,
    next: usize,
    latency: usize,
    polls_left: usize,
    pub started: usize,
    pub finished: usize,
}

impl ScriptedSource {
    pub fn new(captures: Vec<Vec<u16>>, latency: usize) -> Self {
        Self {
            captures,
            next: 0,
            latency,
            polls_left: 0,
            started: 0,
            finished: 0,
        }
    }
}

impl SampleSource for ScriptedSource {
    fn start_capture(&mut self, buffer: &mut [u16]) {
        let src = &self.captures[self.next % self.captures.len()];
        buffer.copy_from_slice(src);
        self.next += 1;
        self.polls_left = self.latency;
        self.started += 1;
    }

    fn poll_complete(&mut self) -> bool {
        if self.polls_left == 0 {
            return true;
        }
        self.polls_left -= 1;
        false
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}

/// Watchdog that expires when the simulated clock runs past the timeout
/// without a refresh. Expiry latches `reset_flag`, which survives the
/// simulated reset the way the RCC reset flags do.
pub struct SimWatchdog {
    clock: Rc<Cell<u32>>,
    reset_flag: Rc<Cell<bool>>,
    timeout_ms: u32,
    last_feed: u32,
    pub feeds: u32,
}

impl SimWatchdog {
    pub fn new(clock: Rc<Cell<u32>>, reset_flag: Rc<Cell<bool>>, timeout_ms: u32) -> Self {
        Self {
            last_feed: clock.get(),
            clock,
            reset_flag,
            timeout_ms,
            feeds: 0,
        }
    }

    pub fn expired(&self) -> bool {
        self.clock.get() - self.last_feed > self.timeout_ms
    }

    /// Latches the reset flag once the timeout has passed. Called as the clock advances.
    pub fn observe(&self) {
        if self.expired() {
            self.reset_flag.set(true);
        }
    }
}

impl Watchdog for SimWatchdog {
    fn feed(&mut self) {
        // A refresh after expiry is too late, the device has already reset
        self.observe();
        self.last_feed = self.clock.get();
        self.feeds += 1;
    }
}

/// Reads and clears the latched reset flag, as the firmware does at boot.
pub fn take_reset_cause(reset_flag: &Cell<bool>) -> ResetCause {
    if reset_flag.replace(false) {
        ResetCause::Watchdog
    } else {
        ResetCause::PowerOn
    }
}

/// Fault-injection switch.
pub struct FaultSwitch(pub bool);

impl FaultInput for FaultSwitch {
    fn is_fault_simulated(&mut self) -> bool {
        self.0
    }
}

#[derive(Default)]
pub struct Lamp(pub Option<bool>);

impl FaultIndicator for Lamp {
    fn set_fault(&mut self, on: bool) {
        self.0 = Some(on);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub records: Vec<String>,
}

impl ReportSink for RecordingSink {
    fn send(&mut self, record: &str) {
        self.records.push(record.to_string());
    }
}
