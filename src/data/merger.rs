//! Merger Module
//! Left-joins drivers, passengers and pedestrians onto the accident table.

use super::loader::DataLoader;
use super::processor::ProcessorError;
use crate::config::{ColumnNames, Dataset};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

/// The four cleaned source tables.
pub struct SourceTables {
    pub accidents: DataFrame,
    pub drivers: DataFrame,
    pub passengers: DataFrame,
    pub pedestrians: DataFrame,
}

/// Shape of the merged table after one join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinStep {
    pub source: Dataset,
    pub rows: usize,
    pub columns: usize,
}

pub struct MergeOutcome {
    pub df: DataFrame,
    pub steps: Vec<JoinStep>,
}

/// Builds the denormalized accident table.
pub struct Merger<'a> {
    columns: &'a ColumnNames,
}

impl<'a> Merger<'a> {
    pub fn new(columns: &'a ColumnNames) -> Self {
        Self { columns }
    }

    /// Join Driver, Passenger then Pedestrian onto the accident base.
    ///
    /// Every accident row survives; several matches fan out into several rows.
    pub fn merge(&self, tables: &SourceTables) -> Result<MergeOutcome, ProcessorError> {
        let accident_key = [self.columns.accident_id.as_str()];
        let vehicle_key = [
            self.columns.accident_id.as_str(),
            self.columns.vehicle_id.as_str(),
        ];

        let plan: [(Dataset, &DataFrame, &[&str]); 3] = [
            (Dataset::Drivers, &tables.drivers, &accident_key),
            (Dataset::Passengers, &tables.passengers, &vehicle_key),
            (Dataset::Pedestrians, &tables.pedestrians, &accident_key),
        ];

        let mut merged = tables.accidents.clone();
        let mut left_name = Dataset::Accidents.label().to_string();
        let mut steps = Vec::with_capacity(plan.len());

        for (source, right, keys) in plan {
            merged = Self::left_join(&merged, &left_name, right, source, keys)?;
            info!(source = source.label(), rows = merged.height(), columns = merged.width(), "joined");
            steps.push(JoinStep {
                source,
                rows: merged.height(),
                columns: merged.width(),
            });
            left_name = format!("{left_name}+{}", source.label());
        }

        Ok(MergeOutcome { df: merged, steps })
    }

    /// Left join on `keys`; colliding right columns get `_<source>` appended.
    ///
    /// Null keys never match, so a row without a vehicle id gains no passengers.
    pub fn left_join(
        left: &DataFrame,
        left_name: &str,
        right: &DataFrame,
        source: Dataset,
        keys: &[&str],
    ) -> Result<DataFrame, ProcessorError> {
        for key in keys {
            Self::require_column(left, left_name, key)?;
            Self::require_column(right, source.label(), key)?;
        }

        let on: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
        let args = JoinArgs::new(JoinType::Left)
            .with_suffix(Some(source.collision_suffix().as_str().into()));

        let joined = left
            .clone()
            .lazy()
            .join(right.clone().lazy(), on.clone(), on, args)
            .collect()?;
        Ok(joined)
    }

    fn require_column(df: &DataFrame, table: &str, column: &str) -> Result<(), ProcessorError> {
        if DataLoader::has_column(df, column) {
            Ok(())
        } else {
            Err(ProcessorError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
        }
    }
}
