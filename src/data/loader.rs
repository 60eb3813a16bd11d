//! CSV Data Loader Module
//! Loads headered, comma-delimited tables with Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Reads CSV files into fully materialized DataFrames.
///
/// Every column is read as text so join keys compare the same way across
/// files and a written table reads back with the cells it was written with.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with a header row. Empty fields become null.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let to_error = |source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .map_err(to_error)?
            .collect()
            .map_err(to_error)?;

        debug!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded csv");
        Ok(df)
    }

    /// Column names of a DataFrame, in order.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Whether the DataFrame has a column with this name.
    pub fn has_column(df: &DataFrame, name: &str) -> bool {
        df.get_column_names().iter().any(|c| c.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_all_columns_as_text_with_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acidentes.csv");
        fs::write(&path, "Id. Acidente,Mês,Vazio\n1,Janeiro,\n2,,\n").unwrap();

        let df = DataLoader::load_csv(&path).unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("Id. Acidente").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Mês").unwrap().null_count(), 1);
        assert_eq!(df.column("Vazio").unwrap().null_count(), 2);
        assert_eq!(
            DataLoader::column_names(&df),
            vec!["Id. Acidente", "Mês", "Vazio"]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("condutores.csv");

        let err = DataLoader::load_csv(&path).unwrap_err();

        assert!(matches!(err, LoaderError::NotFound(p) if p == path));
    }

    #[test]
    fn empty_file_fails_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("peoes.csv");
        fs::write(&path, "").unwrap();

        let err = DataLoader::load_csv(&path).unwrap_err();

        assert!(matches!(err, LoaderError::Csv { .. }));
    }
}
