// Single-slot signal between an interrupt handler and the control loop.

// Detailed Operation:
// The interrupt handler only calls `raise()`. The loop calls `take()`, which
// reads and clears the flag in one atomic swap. Edges arriving before the loop
// consumes the flag collapse into one pending event; nothing is queued.
// One writer context and one reader context are assumed.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::sync::atomic::{AtomicBool, Ordering};

pub struct EdgeFlag {
    pending: AtomicBool,
}

impl EdgeFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Marks an event as pending. Safe to call from interrupt context.
    #[inline(always)]
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consumes the pending event, if any.
    #[inline(always)]
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Drops a pending event without acting on it.
    #[inline(always)]
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }

    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for EdgeFlag {
    fn default() -> Self {
        Self::new()
    }
}
