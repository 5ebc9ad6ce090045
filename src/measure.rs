//! The two timing loops.

use std::thread::sleep;
use std::time::Duration;

use crate::arch::CycleCounter;
use crate::arena::Target;

/// Deltas from one loop: a running sum plus the first few raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    sum: u64,
    trials: usize,
    retained: Vec<u64>,
}

impl Population {
    /// `retained` slots start at zero and stay zero if fewer trials run.
    pub fn new(retained: usize) -> Self {
        Self {
            sum: 0,
            trials: 0,
            retained: vec![0; retained],
        }
    }

    pub fn record(&mut self, delta: u64) {
        if let Some(slot) = self.retained.get_mut(self.trials) {
            *slot = delta;
        }
        self.sum = self.sum.wrapping_add(delta);
        self.trials += 1;
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn retained(&self) -> &[u64] {
        &self.retained
    }

    /// Arithmetic mean, 0.0 for an empty population.
    pub fn mean(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.sum as f64 / self.trials as f64
    }
}

#[inline(always)]
fn timed_read<C: CycleCounter>(counter: &C, target: Target<'_>) -> u64 {
    let start = counter.read_cycle_counter();
    target.read();
    let end = counter.read_cycle_counter();
    end.wrapping_sub(start)
}

/// Hit latency: an untimed read puts the line in cache, the next read is timed.
pub fn cache_latency<C: CycleCounter>(
    counter: &C,
    target: Target<'_>,
    trials: usize,
    retained: usize,
) -> Population {
    let mut population = Population::new(retained);
    for _ in 0..trials {
        target.read();
        population.record(timed_read(counter, target));
    }
    population
}

/// Miss latency: flush the line, wait `delay`, then time one read.
///
/// The delay only makes it less likely that a prefetcher brings the line
/// back before the read; it does not guarantee a miss.
pub fn dram_latency<C: CycleCounter>(
    counter: &C,
    target: Target<'_>,
    trials: usize,
    retained: usize,
    delay: Duration,
) -> Population {
    let mut population = Population::new(retained);
    for _ in 0..trials {
        unsafe { counter.flush_line(target.addr()) };
        if !delay.is_zero() {
            sleep(delay);
        }
        population.record(timed_read(counter, target));
    }
    population
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use std::cell::Cell;

    /// Each read advances the clock by the next step in `steps`, cycling.
    struct Stepper {
        now: Cell<u64>,
        steps: Vec<u64>,
        reads: Cell<usize>,
        flushes: Cell<usize>,
    }

    impl Stepper {
        fn new(steps: &[u64]) -> Self {
            Self {
                now: Cell::new(1_000),
                steps: steps.to_vec(),
                reads: Cell::new(0),
                flushes: Cell::new(0),
            }
        }
    }

    impl CycleCounter for Stepper {
        fn name(&self) -> &'static str {
            "stepper"
        }

        fn read_cycle_counter(&self) -> u64 {
            let n = self.reads.get();
            self.reads.set(n + 1);
            let now = self.now.get() + self.steps[n % self.steps.len()];
            self.now.set(now);
            now
        }

        unsafe fn flush_line(&self, _addr: *const u8) {
            self.flushes.set(self.flushes.get() + 1);
        }
    }

    #[test]
    fn test_population_retains_prefix() {
        let mut population = Population::new(3);
        for delta in [4, 8, 15, 16, 23] {
            population.record(delta);
        }
        assert_eq!(population.retained(), &[4, 8, 15]);
        assert_eq!(population.sum(), 66);
        assert_eq!(population.trials(), 5);
        assert!((population.mean() - 13.2).abs() < 1e-9);
    }

    #[test]
    fn test_population_fewer_trials_than_slots() {
        let mut population = Population::new(5);
        population.record(9);
        population.record(11);
        assert_eq!(population.retained(), &[9, 11, 0, 0, 0]);
        assert_eq!(population.mean(), 10.0);
    }

    #[test]
    fn test_empty_population() {
        let population = Population::new(5);
        assert_eq!(population.mean(), 0.0);
        assert_eq!(population.retained().len(), 5);
        assert!(Population::new(0).retained().is_empty());
    }

    #[test]
    fn test_cache_loop_times_every_trial() {
        let mut arena = Arena::allocate(16, 64).unwrap();
        arena.warm();
        // start read lands +1, end read +6: delta 6 every trial.
        let counter = Stepper::new(&[1, 6]);
        let population = cache_latency(&counter, arena.target(), 10, 5);
        assert_eq!(counter.reads.get(), 20);
        assert_eq!(counter.flushes.get(), 0);
        assert_eq!(population.retained(), &[6; 5]);
        assert_eq!(population.sum(), 60);
    }

    #[test]
    fn test_dram_loop_flushes_every_trial() {
        let mut arena = Arena::allocate(16, 64).unwrap();
        arena.warm();
        let counter = Stepper::new(&[3, 200]);
        let population = dram_latency(&counter, arena.target(), 4, 2, Duration::ZERO);
        assert_eq!(counter.flushes.get(), 4);
        assert_eq!(counter.reads.get(), 8);
        assert_eq!(population.retained(), &[200, 200]);
        assert_eq!(population.mean(), 200.0);
    }

    #[test]
    fn test_dram_loop_sleeps() {
        let mut arena = Arena::allocate(16, 64).unwrap();
        arena.warm();
        let counter = Stepper::new(&[1]);
        let start = std::time::Instant::now();
        dram_latency(&counter, arena.target(), 3, 5, Duration::from_millis(2));
        assert!(start.elapsed() >= Duration::from_millis(6));
    }
}
