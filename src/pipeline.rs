//! Merge-and-clean pipeline: load, clean, join, split, write.

use crate::config::{Dataset, PipelineConfig};
use crate::data::{
    DataLoader, DataProcessor, LoaderError, Merger, MotorcycleSplitter, ProcessorError,
    SourceTables, SplitSummary, TableWriter, WriteError, WrittenFile,
};
use crate::report::{PipelineReporter, Stage, LARGE_LABEL, SMALL_LABEL};
use crate::stats::{StatsCalculator, SubsetProfile};
use polars::prelude::*;
use serde::Serialize;
use std::io;
use thiserror::Error;
use tracing::info;

const MERGED_TABLE: &str = "merged";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("Failed to write report: {0}")]
    Report(#[from] io::Error),
}

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::Process(ProcessorError::from(err))
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub merged_rows: usize,
    pub merged_columns: usize,
    pub split: SplitSummary,
    pub files: Vec<WrittenFile>,
    /// Profiles of the non-empty motorcycle subsets.
    pub profiles: Vec<SubsetProfile>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage to completion, handing each result to `reporter`.
    ///
    /// Files already written stay on disk if a later stage fails.
    pub fn run(&self, reporter: &mut dyn PipelineReporter) -> Result<RunSummary, PipelineError> {
        let columns = &self.config.columns;
        reporter.started()?;

        reporter.stage(Stage::Loading)?;
        let accidents = self.load(Dataset::Accidents, reporter)?;
        let drivers = self.load(Dataset::Drivers, reporter)?;
        let passengers = self.load(Dataset::Passengers, reporter)?;
        let pedestrians = self.load(Dataset::Pedestrians, reporter)?;

        reporter.stage(Stage::CleaningInputs)?;
        let sources = SourceTables {
            accidents: self.clean(Dataset::Accidents.label(), &accidents, reporter)?,
            drivers: self.clean(Dataset::Drivers.label(), &drivers, reporter)?,
            passengers: self.clean(Dataset::Passengers.label(), &passengers, reporter)?,
            pedestrians: self.clean(Dataset::Pedestrians.label(), &pedestrians, reporter)?,
        };

        reporter.stage(Stage::Merging)?;
        let merged = Merger::new(columns).merge(&sources)?;
        for step in &merged.steps {
            reporter.joined(step)?;
        }
        let merged = self.clean(MERGED_TABLE, &merged.df, reporter)?;

        reporter.stage(Stage::Splitting)?;
        let splitter = MotorcycleSplitter::new(
            &columns.vehicle_category,
            &self.config.small_marker,
            &self.config.large_marker,
        );
        if self.config.inspect_categories {
            let categories = splitter.inspect_categories(&merged, MERGED_TABLE)?;
            reporter.categories_inspected(&categories)?;
        }
        let mut subsets = splitter.split(&merged, MERGED_TABLE)?;
        reporter.subsets_split(&subsets.summary())?;

        for (label, df) in [
            ("motorcycles <= 125cc", &mut subsets.small),
            ("motorcycles > 125cc", &mut subsets.large),
        ] {
            if df.height() == 0 {
                continue;
            }
            *df = self.clean(label, df, reporter)?;
        }

        reporter.stage(Stage::Saving)?;
        let outputs = [
            (&merged, self.config.merged_path()),
            (&subsets.small, self.config.small_motorcycles_path()),
            (&subsets.large, self.config.large_motorcycles_path()),
        ];
        let mut files = Vec::with_capacity(outputs.len());
        for (df, path) in outputs {
            let file = TableWriter::write_csv(df, &path)?;
            reporter.file_written(&file)?;
            files.push(file);
        }

        let mut profiles = Vec::new();
        for (label, df) in [(SMALL_LABEL, &subsets.small), (LARGE_LABEL, &subsets.large)] {
            if df.height() > 0 {
                profiles.push(StatsCalculator::profile_subset(
                    label,
                    df,
                    &columns.gender,
                    &columns.injury,
                    &columns.month,
                )?);
            }
        }

        let summary = RunSummary {
            merged_rows: merged.height(),
            merged_columns: merged.width(),
            split: subsets.summary(),
            files,
            profiles,
        };
        info!(
            summary = %serde_json::to_string(&summary).unwrap_or_default(),
            "pipeline finished"
        );
        reporter.finished(&summary)?;
        Ok(summary)
    }

    fn load(
        &self,
        dataset: Dataset,
        reporter: &mut dyn PipelineReporter,
    ) -> Result<DataFrame, PipelineError> {
        let df = DataLoader::load_csv(&self.config.input_path(dataset))?;
        reporter.table_loaded(dataset, df.shape())?;
        Ok(df)
    }

    fn clean(
        &self,
        label: &str,
        df: &DataFrame,
        reporter: &mut dyn PipelineReporter,
    ) -> Result<DataFrame, PipelineError> {
        let table = DataProcessor::clean(df, &self.config.columns.timestamp)?;
        reporter.table_cleaned(label, &table.report)?;
        Ok(table.df)
    }
}
