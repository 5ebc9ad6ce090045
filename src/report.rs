use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::measure::Population;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub cache: Population,
    pub dram: Population,
}

impl Summary {
    /// `(cache, dram)` means in cycles.
    pub fn means(&self) -> (f64, f64) {
        (self.cache.mean(), self.dram.mean())
    }
}

/// Two-row, tab separated table of the means.
pub fn print_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    let (cache, dram) = summary.means();
    writeln!(out, "Memory Type\tMeasured Latency (cycles)")?;
    writeln!(out, "Cache\t{:.2}", cache)?;
    writeln!(out, "DRAM\t{:.2}", dram)?;
    out.flush()
}

/// Truncates `path` and writes a header plus one row per retained slot.
pub fn write_samples(path: &Path, summary: &Summary) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::OpenOutput {
        path: path.to_path_buf(),
        source,
    })?;

    write_rows(BufWriter::new(file), summary).map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

fn write_rows<W: Write>(mut out: W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "Sample#\tCache\tDRAM")?;
    let rows = summary.cache.retained().iter().zip(summary.dram.retained());
    for (i, (cache, dram)) in rows.enumerate() {
        writeln!(out, "{}\t{}\t{}", i + 1, cache, dram)?;
    }
    out.flush()
}
