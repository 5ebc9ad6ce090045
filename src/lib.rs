//! Cache-hit versus DRAM access latency, measured in cycles.
//!
//! One run allocates a cache-line aligned arena, times a read of its midpoint
//! element with the line resident and again right after flushing it, prints
//! the two means and saves the first few raw deltas of each loop.

use std::io::Write;

pub mod arch;
pub mod arena;
pub mod config;
pub mod error;
pub mod measure;
pub mod report;


pub use crate::arch::{native, CycleCounter, MonotonicClock};
#[cfg(target_arch = "x86_64")]
pub use crate::arch::{now, Tsc};
pub use crate::arena::{Arena, Target};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::measure::Population;
pub use crate::report::Summary;

/// Runs the whole measurement: arena setup, cache loop, DRAM loop, summary
/// on `out`, samples to `config.output`. The arena is freed on every return.
pub fn run<C, W>(config: &Config, counter: &C, out: &mut W) -> Result<Summary>
where
    C: CycleCounter,
    W: Write,
{
    let mut arena = Arena::allocate(config.arena_len, config.align)?;
    arena.warm();

    log::info!(
        "arena: {} elements, {}-byte aligned, target index {}",
        arena.len(),
        arena.align(),
        arena.target_index()
    );
    log::info!(
        "{} trials per population, {} retained, {:?} DRAM delay, counter {}",
        config.trials,
        config.retained,
        config.dram_delay,
        counter.name()
    );
    if !counter.can_flush() {
        log::warn!(
            "{} cannot evict cache lines, DRAM numbers will be cache hits",
            counter.name()
        );
    }

    let target = arena.target();

    log::info!("measuring cache latency");
    let cache = measure::cache_latency(counter, target, config.trials, config.retained);
    log::debug!("cache: sum {} mean {:.2}", cache.sum(), cache.mean());

    log::info!("measuring DRAM latency");
    let dram = measure::dram_latency(
        counter,
        target,
        config.trials,
        config.retained,
        config.dram_delay,
    );
    log::debug!("dram: sum {} mean {:.2}", dram.sum(), dram.mean());

    let summary = Summary { cache, dram };
    let (cache_mean, dram_mean) = summary.means();
    if config.trials > 0 && dram_mean <= cache_mean {
        log::warn!(
            "DRAM mean {:.2} is not above cache mean {:.2}, run was likely disturbed",
            dram_mean,
            cache_mean
        );
    }

    report::print_summary(out, &summary).map_err(Error::Stdout)?;
    report::write_samples(&config.output, &summary)?;
    log::info!("wrote {} samples to {}", config.retained, config.output.display());

    Ok(summary)
}
