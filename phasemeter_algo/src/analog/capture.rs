// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::{BUFFER_LEN, CHANNELS};

/// Interleaved capture storage: ch0, ch1, ch2, ch0, ch1, ch2, ...
///
/// Sized at compile time so the hot path never allocates. The DMA target of
/// the firmware points at `samples`, the loop reads it only after the source
/// reported completion.
pub struct CaptureBuffer {
    samples: [u16; BUFFER_LEN],
}

impl CaptureBuffer {
    pub const fn new() -> Self {
        Self {
            samples: [0; BUFFER_LEN],
        }
    }

    /// Number of sampling instants stored (samples per channel).
    #[inline(always)]
    pub fn instants(&self) -> usize {
        BUFFER_LEN / CHANNELS
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u16] {
        &self.samples
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.samples
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}
