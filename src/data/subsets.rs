//! Motorcycle Subset Module
//! Splits the merged table by displacement marker in the vehicle category.

use super::loader::DataLoader;
use super::processor::ProcessorError;
use crate::stats::{FrequencyTable, StatsCalculator};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

pub struct MotorcycleSubsets {
    pub small: DataFrame,
    pub large: DataFrame,
}

impl MotorcycleSubsets {
    pub fn summary(&self) -> SplitSummary {
        SplitSummary {
            small_rows: self.small.height(),
            large_rows: self.large.height(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub small_rows: usize,
    pub large_rows: usize,
}

/// Case-sensitive substring split on the vehicle category column.
pub struct MotorcycleSplitter<'a> {
    category_col: &'a str,
    small_marker: &'a str,
    large_marker: &'a str,
}

impl<'a> MotorcycleSplitter<'a> {
    pub fn new(category_col: &'a str, small_marker: &'a str, large_marker: &'a str) -> Self {
        Self {
            category_col,
            small_marker,
            large_marker,
        }
    }

    /// Category value distribution, for inspection before splitting.
    pub fn inspect_categories(
        &self,
        df: &DataFrame,
        table: &str,
    ) -> Result<FrequencyTable, ProcessorError> {
        self.require_category(df, table)?;
        Ok(StatsCalculator::frequency(df, self.category_col)?)
    }

    /// Rows whose category contains each marker. Null categories match neither.
    pub fn split(&self, df: &DataFrame, table: &str) -> Result<MotorcycleSubsets, ProcessorError> {
        self.require_category(df, table)?;

        let subsets = MotorcycleSubsets {
            small: self.filter_containing(df, self.small_marker)?,
            large: self.filter_containing(df, self.large_marker)?,
        };
        info!(
            small = subsets.small.height(),
            large = subsets.large.height(),
            "split motorcycle subsets"
        );
        Ok(subsets)
    }

    fn filter_containing(&self, df: &DataFrame, marker: &str) -> Result<DataFrame, ProcessorError> {
        let categories = df.column(self.category_col)?.cast(&DataType::String)?;
        let mask: BooleanChunked = categories
            .str()?
            .into_iter()
            .map(|value| value.is_some_and(|text| text.contains(marker)))
            .collect();
        Ok(df.filter(&mask)?)
    }

    fn require_category(&self, df: &DataFrame, table: &str) -> Result<(), ProcessorError> {
        if DataLoader::has_column(df, self.category_col) {
            Ok(())
        } else {
            Err(ProcessorError::MissingColumn {
                table: table.to_string(),
                column: self.category_col.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "Motociclo cilindrada <= 125cc";
    const LARGE: &str = "Motociclo cilindrada > 125cc";

    fn merged() -> DataFrame {
        df!(
            "Id. Acidente" => ["1", "2", "3", "4", "5"],
            "Categoria Veículos" => [
                Some(SMALL),
                Some(LARGE),
                Some("Automóvel"),
                None,
                Some("motociclo cilindrada <= 125cc"),
            ]
        )
        .unwrap()
    }

    fn splitter() -> MotorcycleSplitter<'static> {
        MotorcycleSplitter::new("Categoria Veículos", SMALL, LARGE)
    }

    #[test]
    fn splits_by_marker_and_skips_nulls() {
        let subsets = splitter().split(&merged(), "merged").unwrap();

        assert_eq!(subsets.summary(), SplitSummary { small_rows: 1, large_rows: 1 });
        let small_id = subsets.small.column("Id. Acidente").unwrap().str().unwrap().get(0);
        let large_id = subsets.large.column("Id. Acidente").unwrap().str().unwrap().get(0);
        assert_eq!(small_id, Some("1"));
        assert_eq!(large_id, Some("2"));
    }

    #[test]
    fn every_row_carries_its_marker_and_subsets_are_disjoint() {
        let df = df!(
            "Id. Acidente" => ["1", "2", "3", "4"],
            "Categoria Veículos" => [
                "Condutor: Motociclo cilindrada <= 125cc",
                "Motociclo cilindrada > 125cc (matrícula)",
                "Motociclo cilindrada <= 125cc",
                "Ciclomotor",
            ]
        )
        .unwrap();

        let subsets = splitter().split(&df, "merged").unwrap();

        let categories = |frame: &DataFrame| -> Vec<String> {
            frame
                .column("Categoria Veículos")
                .unwrap()
                .str()
                .unwrap()
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect()
        };
        let small = categories(&subsets.small);
        let large = categories(&subsets.large);
        assert_eq!(small.len(), 2);
        assert!(small.iter().all(|c| c.contains(SMALL)));
        assert!(large.iter().all(|c| c.contains(LARGE)));
        assert!(small.iter().all(|c| !large.contains(c)));
    }

    #[test]
    fn inspection_counts_categories() {
        let table = splitter().inspect_categories(&merged(), "merged").unwrap();

        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn missing_category_column_is_an_error() {
        let df = df!("Id. Acidente" => ["1"]).unwrap();

        let err = splitter().split(&df, "drivers").err().unwrap();

        assert!(matches!(
            err,
            ProcessorError::MissingColumn { ref table, ref column }
                if table == "drivers" && column == "Categoria Veículos"
        ));
    }
}
