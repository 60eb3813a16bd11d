//! Pipeline Reporter
//! Receives stage results from the pipeline and renders them for humans.

use super::format::{format_count, write_banner, write_distribution};
use crate::config::Dataset;
use crate::data::{CleaningReport, JoinStep, SplitSummary, TimestampOutcome, WrittenFile};
use crate::pipeline::RunSummary;
use crate::stats::FrequencyTable;
use std::io::{self, Write};

/// Rows shown in the missing-value table.
const MISSING_ROWS_SHOWN: usize = 10;

/// Pipeline stages, announced before their first result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    CleaningInputs,
    Merging,
    Splitting,
    Saving,
}

/// Observer of pipeline progress. The pipeline itself never prints.
pub trait PipelineReporter {
    fn started(&mut self) -> io::Result<()>;
    fn stage(&mut self, stage: Stage) -> io::Result<()>;
    fn table_loaded(&mut self, dataset: Dataset, shape: (usize, usize)) -> io::Result<()>;
    fn table_cleaned(&mut self, table: &str, report: &CleaningReport) -> io::Result<()>;
    fn joined(&mut self, step: &JoinStep) -> io::Result<()>;
    fn categories_inspected(&mut self, categories: &FrequencyTable) -> io::Result<()>;
    fn subsets_split(&mut self, summary: &SplitSummary) -> io::Result<()>;
    fn file_written(&mut self, file: &WrittenFile) -> io::Result<()>;
    fn finished(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Plain-text report, written to stdout by the binary.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn dataset_title(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Accidents => "Accidents",
        Dataset::Drivers => "Drivers",
        Dataset::Passengers => "Passengers",
        Dataset::Pedestrians => "Pedestrians",
    }
}

impl<W: Write> PipelineReporter for ConsoleReporter<W> {
    fn started(&mut self) -> io::Result<()> {
        write_banner(&mut self.out, "TRAFFIC ACCIDENTS DATA PROCESSING 2023")
    }

    fn stage(&mut self, stage: Stage) -> io::Result<()> {
        let text = match stage {
            Stage::Loading => "Loading CSV files...",
            Stage::CleaningInputs => "Cleaning individual datasets...",
            Stage::Merging => "Cleaning and merging data...",
            Stage::Splitting => "Creating motorcycle subsets...",
            Stage::Saving => "Saving datasets...",
        };
        if stage == Stage::Loading {
            writeln!(self.out, "{text}")
        } else {
            writeln!(self.out, "\n{text}")
        }
    }

    fn table_loaded(&mut self, dataset: Dataset, shape: (usize, usize)) -> io::Result<()> {
        writeln!(
            self.out,
            "{}: {} rows, {} columns",
            dataset_title(dataset),
            format_count(shape.0),
            shape.1
        )
    }

    fn table_cleaned(&mut self, table: &str, report: &CleaningReport) -> io::Result<()> {
        let (rows, cols) = report.input_shape;
        writeln!(
            self.out,
            "\nCleaning {table} with {} rows and {cols} columns...",
            format_count(rows)
        )?;

        if !report.missing.is_empty() {
            writeln!(self.out, "Columns with missing values (top {MISSING_ROWS_SHOWN}):")?;
            writeln!(self.out, "  {:<40} {:>12} {:>10}", "Column", "Missing", "Percent")?;
            for entry in report.missing.iter().take(MISSING_ROWS_SHOWN) {
                writeln!(
                    self.out,
                    "  {:<40} {:>12} {:>9.1}%",
                    entry.column,
                    format_count(entry.count),
                    entry.percent
                )?;
            }
        }

        if !report.dropped_columns.is_empty() {
            writeln!(
                self.out,
                "Dropped empty columns: {}",
                report.dropped_columns.join(", ")
            )?;
        }
        if report.duplicates_removed > 0 {
            writeln!(
                self.out,
                "Removed {} duplicate rows",
                format_count(report.duplicates_removed)
            )?;
        }
        match &report.timestamp {
            TimestampOutcome::Converted { format } => {
                writeln!(self.out, "Converted timestamp to datetime ({format})")?
            }
            TimestampOutcome::Failed(warning) => writeln!(self.out, "Warning: {warning}")?,
            TimestampOutcome::Absent | TimestampOutcome::AlreadyTemporal => {}
        }

        let (rows, cols) = report.output_shape;
        writeln!(
            self.out,
            "Cleaned dataset: {} rows, {cols} columns",
            format_count(rows)
        )
    }

    fn joined(&mut self, step: &JoinStep) -> io::Result<()> {
        writeln!(
            self.out,
            "After merging with {}: ({}, {})",
            dataset_title(step.source).to_lowercase(),
            step.rows,
            step.columns
        )
    }

    fn categories_inspected(&mut self, categories: &FrequencyTable) -> io::Result<()> {
        write_distribution(&mut self.out, "Available vehicle categories:", categories, None)
    }

    fn subsets_split(&mut self, summary: &SplitSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "Motorcycles <= 125cc: {} records",
            format_count(summary.small_rows)
        )?;
        writeln!(
            self.out,
            "Motorcycles > 125cc: {} records",
            format_count(summary.large_rows)
        )
    }

    fn file_written(&mut self, file: &WrittenFile) -> io::Result<()> {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.path.display().to_string());
        writeln!(self.out, "Saved {name} ({} rows)", format_count(file.rows))
    }

    fn finished(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out)?;
        write_banner(&mut self.out, "DATA PROCESSING COMPLETED SUCCESSFULLY!")?;

        writeln!(self.out, "\nFINAL SUMMARY:")?;
        writeln!(
            self.out,
            "- Total merged records: {}",
            format_count(summary.merged_rows)
        )?;
        writeln!(
            self.out,
            "- Motorcycles <= 125cc: {}",
            format_count(summary.split.small_rows)
        )?;
        writeln!(
            self.out,
            "- Motorcycles > 125cc: {}",
            format_count(summary.split.large_rows)
        )?;

        if summary.profiles.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "\nMOTORCYCLE ACCIDENT ANALYSIS:")?;
        for profile in &summary.profiles {
            writeln!(self.out, "\n{}:", profile.label)?;
            if let Some(gender) = &profile.gender {
                write_distribution(&mut self.out, "Gender distribution:", gender, None)?;
            }
            if let Some(injury) = &profile.injury {
                write_distribution(&mut self.out, "Injury severity:", injury, None)?;
            }
        }
        Ok(())
    }
}
