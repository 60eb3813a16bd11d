//! Data Processor Module
//! Cleaning pass: missing-value summary, empty column removal, duplicate
//! removal and best-effort timestamp conversion.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
}

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Missing values of one column before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValues {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

/// A timestamp column that could not be converted. Non-fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercionWarning {
    pub column: String,
    pub rejected_value: String,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not convert {} to datetime (unrecognised value '{}')",
            self.column, self.rejected_value
        )
    }
}

/// What happened to the timestamp column during a cleaning pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TimestampOutcome {
    Absent,
    AlreadyTemporal,
    Converted { format: String },
    Failed(CoercionWarning),
}

/// Everything a cleaning pass observed and changed.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub input_shape: (usize, usize),
    pub output_shape: (usize, usize),
    /// Columns with at least one missing value, highest percentage first.
    pub missing: Vec<MissingValues>,
    pub dropped_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub timestamp: TimestampOutcome,
}

pub struct CleanedTable {
    pub df: DataFrame,
    pub report: CleaningReport,
}

/// Handles data cleaning operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Run the full cleaning pass on a table.
    ///
    /// Re-applying it to its own output changes nothing.
    pub fn clean(df: &DataFrame, timestamp_col: &str) -> Result<CleanedTable, ProcessorError> {
        let input_shape = df.shape();
        let missing = Self::missing_values(df);

        let (without_empty, dropped_columns) = Self::drop_empty_columns(df)?;
        let deduplicated = Self::drop_duplicates(&without_empty)?;
        let mut duplicates_removed = without_empty.height() - deduplicated.height();

        let timestamp_dtype = deduplicated
            .column(timestamp_col)
            .ok()
            .map(|c| c.dtype().clone());
        let (df, timestamp) = match timestamp_dtype {
            None => (deduplicated, TimestampOutcome::Absent),
            Some(DataType::String) => {
                let original = deduplicated.clone();
                match Self::coerce_timestamp(deduplicated, timestamp_col) {
                    Ok((converted, format)) => {
                        // Distinct texts can parse to the same instant.
                        let unique = Self::drop_duplicates(&converted)?;
                        duplicates_removed += converted.height() - unique.height();
                        (
                            unique,
                            TimestampOutcome::Converted {
                                format: format.to_string(),
                            },
                        )
                    }
                    Err(warning) => {
                        warn!(
                            column = timestamp_col,
                            value = %warning.rejected_value,
                            "timestamp left as text"
                        );
                        (original, TimestampOutcome::Failed(warning))
                    }
                }
            }
            Some(_) => (deduplicated, TimestampOutcome::AlreadyTemporal),
        };

        debug!(
            rows_in = input_shape.0,
            rows_out = df.height(),
            dropped = dropped_columns.len(),
            duplicates_removed,
            "cleaned table"
        );

        let report = CleaningReport {
            input_shape,
            output_shape: df.shape(),
            missing,
            dropped_columns,
            duplicates_removed,
            timestamp,
        };

        Ok(CleanedTable { df, report })
    }

    /// Missing count and percentage of each column that has any nulls.
    pub fn missing_values(df: &DataFrame) -> Vec<MissingValues> {
        let height = df.height();
        if height == 0 {
            return Vec::new();
        }

        let mut missing: Vec<MissingValues> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| MissingValues {
                column: col.name().to_string(),
                count: col.null_count(),
                percent: col.null_count() as f64 / height as f64 * 100.0,
            })
            .collect();

        missing.sort_by(|a, b| {
            b.percent
                .partial_cmp(&a.percent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.column.cmp(&b.column))
        });
        missing
    }

    /// Remove columns holding no value at all. Zero-row tables keep their schema.
    pub fn drop_empty_columns(df: &DataFrame) -> Result<(DataFrame, Vec<String>), ProcessorError> {
        let height = df.height();
        if height == 0 {
            return Ok((df.clone(), Vec::new()));
        }

        let (kept, dropped): (Vec<&Column>, Vec<&Column>) = df
            .get_columns()
            .iter()
            .partition(|col| col.null_count() < height);

        if dropped.is_empty() {
            return Ok((df.clone(), Vec::new()));
        }

        let dropped = dropped.iter().map(|c| c.name().to_string()).collect();
        let df = DataFrame::new(kept.into_iter().cloned().collect())?;
        Ok((df, dropped))
    }

    /// Remove exact duplicate rows, keeping first occurrences in order.
    pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        if df.width() == 0 || df.height() < 2 {
            return Ok(df.clone());
        }

        let unique = df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        Ok(unique)
    }

    /// Convert a text column to `Datetime` if one format parses every value.
    ///
    /// Returns the converted table and the format used, or a warning naming
    /// the first value no format accepted.
    pub fn coerce_timestamp(
        df: DataFrame,
        column: &str,
    ) -> Result<(DataFrame, &'static str), CoercionWarning> {
        let warning = |value: &str| CoercionWarning {
            column: column.to_string(),
            rejected_value: value.to_string(),
        };

        let text = df
            .column(column)
            .and_then(|c| c.str().cloned())
            .map_err(|_| warning(""))?;
        let values: Vec<Option<&str>> = (&text).into_iter().collect();

        let first = values.iter().flatten().next().copied().unwrap_or_default();
        let (format, parsed) = DATETIME_FORMATS
            .iter()
            .chain(DATE_FORMATS.iter())
            .find_map(|fmt| Self::parse_all(&values, fmt).map(|parsed| (*fmt, parsed)))
            .ok_or_else(|| warning(Self::first_rejected(&values).unwrap_or(first)))?;

        let series = Series::new(column.into(), parsed)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .map_err(|_| warning(first))?;

        let mut df = df;
        df.with_column(series).map_err(|_| warning(first))?;
        Ok((df, format))
    }

    /// Parse every non-null value with one format, as epoch microseconds.
    fn parse_all(values: &[Option<&str>], fmt: &str) -> Option<Vec<Option<i64>>> {
        values
            .iter()
            .map(|value| match value {
                None => Some(None),
                Some(text) => Self::parse_one(text.trim(), fmt).map(Some),
            })
            .collect()
    }

    fn parse_one(text: &str, fmt: &str) -> Option<i64> {
        if DATE_FORMATS.contains(&fmt) {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_micros())
        } else {
            NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .map(|dt| dt.and_utc().timestamp_micros())
        }
    }

    /// First value that no known format accepts.
    fn first_rejected<'a>(values: &[Option<&'a str>]) -> Option<&'a str> {
        values.iter().flatten().copied().find(|text| {
            DATETIME_FORMATS
                .iter()
                .chain(DATE_FORMATS.iter())
                .all(|fmt| Self::parse_one(text.trim(), fmt).is_none())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Id. Acidente" => ["1", "2", "2", "3"],
            "Mês" => [Some("Janeiro"), Some("Março"), Some("Março"), None],
            "Vazio" => [None::<&str>, None, None, None],
            "Datahora" => ["2023-01-05 14:30:00", "2023-03-10 08:00:00", "2023-03-10 08:00:00", "2023-07-21 22:15:00"]
        )
        .unwrap()
    }

    #[test]
    fn drops_fully_empty_columns() {
        let cleaned = DataProcessor::clean(&sample(), "Datahora").unwrap();

        assert!(cleaned.df.column("Vazio").is_err());
        assert_eq!(cleaned.report.dropped_columns, vec!["Vazio".to_string()]);
    }

    #[test]
    fn removes_exact_duplicates_keeping_order() {
        let cleaned = DataProcessor::clean(&sample(), "Datahora").unwrap();

        assert_eq!(cleaned.df.height(), 3);
        assert_eq!(cleaned.report.duplicates_removed, 1);
        let ids: Vec<Option<&str>> = cleaned
            .df
            .column("Id. Acidente")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some("1"), Some("2"), Some("3")]);
    }

    #[test]
    fn missing_summary_is_sorted_by_percentage() {
        let missing = DataProcessor::missing_values(&sample());

        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].column, "Vazio");
        assert_eq!(missing[0].count, 4);
        assert!((missing[0].percent - 100.0).abs() < 1e-9);
        assert_eq!(missing[1].column, "Mês");
        assert!((missing[1].percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn converts_uniform_timestamps() {
        let cleaned = DataProcessor::clean(&sample(), "Datahora").unwrap();

        assert!(matches!(
            cleaned.df.column("Datahora").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Microseconds, None)
        ));
        assert_eq!(
            cleaned.report.timestamp,
            TimestampOutcome::Converted {
                format: "%Y-%m-%d %H:%M:%S".to_string()
            }
        );
    }

    #[test]
    fn unparseable_timestamps_are_left_as_text() {
        let df = df!(
            "Id. Acidente" => ["1", "2"],
            "Datahora" => ["2023-01-05 14:30:00", "amanhã à noite"]
        )
        .unwrap();

        let cleaned = DataProcessor::clean(&df, "Datahora").unwrap();

        assert_eq!(cleaned.df.column("Datahora").unwrap().dtype(), &DataType::String);
        assert_eq!(
            cleaned.report.timestamp,
            TimestampOutcome::Failed(CoercionWarning {
                column: "Datahora".to_string(),
                rejected_value: "amanhã à noite".to_string(),
            })
        );
    }

    #[test]
    fn date_only_values_are_accepted() {
        let df = df!("Datahora" => ["05/01/2023", "31/12/2023"]).unwrap();

        let (converted, format) = DataProcessor::coerce_timestamp(df, "Datahora").unwrap();

        assert_eq!(format, "%d/%m/%Y");
        assert!(matches!(
            converted.column("Datahora").unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
    }

    #[test]
    fn absent_timestamp_column_is_not_an_error() {
        let df = df!("Id. Acidente" => ["1"]).unwrap();

        let cleaned = DataProcessor::clean(&df, "Datahora").unwrap();

        assert_eq!(cleaned.report.timestamp, TimestampOutcome::Absent);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = DataProcessor::clean(&sample(), "Datahora").unwrap();
        let twice = DataProcessor::clean(&once.df, "Datahora").unwrap();

        assert!(once.df.equals_missing(&twice.df));
        assert!(twice.report.dropped_columns.is_empty());
        assert_eq!(twice.report.duplicates_removed, 0);
        assert_eq!(twice.report.timestamp, TimestampOutcome::AlreadyTemporal);
    }

    #[test]
    fn timestamps_equal_after_conversion_are_deduplicated_once() {
        let df = df!(
            "Id. Acidente" => ["1", "1", "2"],
            "Datahora" => ["05/01/2023 14:30", "5/1/2023 14:30", " 05/01/2023 14:30 "]
        )
        .unwrap();

        let once = DataProcessor::clean(&df, "Datahora").unwrap();
        let twice = DataProcessor::clean(&once.df, "Datahora").unwrap();

        assert_eq!(once.df.shape(), (2, 2));
        assert_eq!(once.report.duplicates_removed, 1);
        assert!(once.df.equals_missing(&twice.df));
        assert_eq!(twice.report.duplicates_removed, 0);
    }

    #[test]
    fn empty_table_keeps_its_schema() {
        let df = df!("Id. Acidente" => Vec::<&str>::new(), "Sexo" => Vec::<&str>::new()).unwrap();

        let cleaned = DataProcessor::clean(&df, "Datahora").unwrap();

        assert_eq!(cleaned.df.shape(), (0, 2));
        assert!(cleaned.report.missing.is_empty());
    }
}
