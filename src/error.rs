use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Memory allocation failed ({len} elements, {align}-byte alignment): {source}")]
    Allocation {
        len: usize,
        align: usize,
        #[source]
        source: io::Error,
    },

    #[error("Could not open {} for writing: {source}", path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write the summary: {0}")]
    Stdout(#[source] io::Error),
}
