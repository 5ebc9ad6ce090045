//! Cycle counting and cache-line eviction.
//!
//! The measurement loops only see the [`CycleCounter`] trait, so a backend
//! with less precision can stand in where the hardware instructions are
//! missing.

use std::sync::atomic::{compiler_fence, Ordering};
use std::time::Instant;

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_mm_clflush;

/// Source of timestamps plus a way to evict one cache line.
pub trait CycleCounter {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Reads the counter. Values are non-decreasing on one logical core, and
    /// no memory operation issued before the call is reordered past the read.
    fn read_cycle_counter(&self) -> u64;

    /// Evicts the cache line holding `addr` from every cache level.
    ///
    /// # Safety
    ///
    /// `addr` must point into a live allocation.
    unsafe fn flush_line(&self, addr: *const u8);

    /// Whether `flush_line` really evicts.
    fn can_flush(&self) -> bool {
        true
    }
}

/// `lfence; rdtsc`, with compiler fences on both sides.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn now() -> u64 {
    compiler_fence(Ordering::SeqCst);

    let lo: u32;
    let hi: u32;
    unsafe {
        core::arch::asm!(
            "lfence",
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nostack, preserves_flags),
        );
    }

    compiler_fence(Ordering::SeqCst);
    ((hi as u64) << 32) | lo as u64
}

/// Time stamp counter plus `clflush`.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Tsc;

#[cfg(target_arch = "x86_64")]
impl CycleCounter for Tsc {
    fn name(&self) -> &'static str {
        "rdtsc"
    }

    #[inline(always)]
    fn read_cycle_counter(&self) -> u64 {
        now()
    }

    #[inline(always)]
    unsafe fn flush_line(&self, addr: *const u8) {
        _mm_clflush(addr);
        compiler_fence(Ordering::SeqCst);
    }
}

/// Portable fallback: nanoseconds since construction.
///
/// There is no portable flush, so `flush_line` only fences and the DRAM
/// population ends up measuring cache hits.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for MonotonicClock {
    fn name(&self) -> &'static str {
        "monotonic-clock"
    }

    #[inline]
    fn read_cycle_counter(&self) -> u64 {
        compiler_fence(Ordering::SeqCst);
        let ns = self.start.elapsed().as_nanos() as u64;
        compiler_fence(Ordering::SeqCst);
        ns
    }

    #[inline]
    unsafe fn flush_line(&self, _addr: *const u8) {
        compiler_fence(Ordering::SeqCst);
    }

    fn can_flush(&self) -> bool {
        false
    }
}

/// Best backend for the build target.
#[cfg(target_arch = "x86_64")]
pub fn native() -> Tsc {
    Tsc
}

#[cfg(not(target_arch = "x86_64"))]
pub fn native() -> MonotonicClock {
    log::warn!("no cycle counter on this target, falling back to a monotonic clock");
    MonotonicClock::new()
}
