use std::path::PathBuf;
use std::time::Duration;

pub const NUM_TRIALS: usize = 100_000;
pub const ARRAY_SIZE: usize = 1024 * 1024;
pub const SAMPLE_SAVE_COUNT: usize = 5;
pub const CACHE_LINE_SIZE: usize = 64;
pub const OUTPUT_FILE: &str = "latencies.txt";

/// Pause between the flush and the timed reload, as actually slept.
pub const DRAM_DELAY: Duration = Duration::from_micros(1);

/// The pause the DRAM loop was described as taking. Three orders of
/// magnitude longer than [`DRAM_DELAY`]; set `dram_delay` to this to get it.
pub const STATED_DRAM_DELAY: Duration = Duration::from_millis(1);

/// Parameters of one run. The binary only ever uses `Config::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Trials per population.
    pub trials: usize,
    /// Arena length in `i32` elements; the target is the midpoint.
    pub arena_len: usize,
    /// Arena alignment in bytes.
    pub align: usize,
    /// Raw deltas kept per population, also the number of rows in the artifact.
    pub retained: usize,
    pub dram_delay: Duration,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: NUM_TRIALS,
            arena_len: ARRAY_SIZE,
            align: CACHE_LINE_SIZE,
            retained: SAMPLE_SAVE_COUNT,
            dram_delay: DRAM_DELAY,
            output: PathBuf::from(OUTPUT_FILE),
        }
    }
}
