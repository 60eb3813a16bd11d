//! Table Writer Module
//! Persists tables as headered CSV without an index column.

use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
#[error("Failed to write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: PolarsError,
}

/// A file written by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
}

pub struct TableWriter;

impl TableWriter {
    /// Write `df` to `path`, replacing any existing file.
    ///
    /// Each call stands alone: nothing written earlier is undone on failure.
    pub fn write_csv(df: &DataFrame, path: &Path) -> Result<WrittenFile, WriteError> {
        let to_error = |source| WriteError {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::create(path).map_err(|e| to_error(PolarsError::from(e)))?;
        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)
            .map_err(to_error)?;

        info!(path = %path.display(), rows = df.height(), "wrote csv");
        Ok(WrittenFile {
            path: path.to_path_buf(),
            rows: df.height(),
        })
    }
}
