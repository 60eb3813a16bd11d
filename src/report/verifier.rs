//! Output Verifier
//! Re-reads the pipeline outputs and summarizes the motorcycle subsets.

use super::format::{format_count, format_share, write_banner, write_distribution};
use crate::config::PipelineConfig;
use crate::data::{DataLoader, LoaderError};
use crate::stats::{percent_of, StatsCalculator, SubsetProfile, TOP_MONTHS};
use polars::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const SMALL_LABEL: &str = "Motorcycles ≤ 125cc";
pub const LARGE_LABEL: &str = "Motorcycles > 125cc";

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Cannot verify outputs: {0}")]
    Unreadable(#[from] LoaderError),
    #[error("Failed to summarize outputs: {0}")]
    Stats(#[from] PolarsError),
}

/// The three pipeline outputs, as read back from disk.
pub struct VerificationInputs {
    pub merged: DataFrame,
    pub small: DataFrame,
    pub large: DataFrame,
    pub files: Vec<PathBuf>,
}

/// Combined motorcycle count and each subset's share of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub total: usize,
    pub small_share: Option<f64>,
    pub large_share: Option<f64>,
}

impl Comparison {
    pub fn new(small_rows: usize, large_rows: usize) -> Self {
        let total = small_rows + large_rows;
        Self {
            total,
            small_share: percent_of(small_rows, total),
            large_share: percent_of(large_rows, total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub merged_shape: (usize, usize),
    pub small_rows: usize,
    pub large_rows: usize,
    /// Profiles of the non-empty subsets only.
    pub profiles: Vec<SubsetProfile>,
    pub comparison: Comparison,
    pub files: Vec<PathBuf>,
}

pub struct Verifier<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Verifier<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Read all three outputs, stopping at the first unreadable one.
    pub fn load(&self) -> Result<VerificationInputs, VerificationError> {
        let files = vec![
            self.config.merged_path(),
            self.config.small_motorcycles_path(),
            self.config.large_motorcycles_path(),
        ];

        let merged = DataLoader::load_csv(&files[0])?;
        let small = DataLoader::load_csv(&files[1])?;
        let large = DataLoader::load_csv(&files[2])?;

        Ok(VerificationInputs {
            merged,
            small,
            large,
            files,
        })
    }

    pub fn summarize(
        &self,
        inputs: &VerificationInputs,
    ) -> Result<VerificationReport, VerificationError> {
        let columns = &self.config.columns;
        let mut profiles = Vec::new();
        for (label, df) in [(SMALL_LABEL, &inputs.small), (LARGE_LABEL, &inputs.large)] {
            if df.height() == 0 {
                continue;
            }
            profiles.push(StatsCalculator::profile_subset(
                label,
                df,
                &columns.gender,
                &columns.injury,
                &columns.month,
            )?);
        }

        let report = VerificationReport {
            merged_shape: inputs.merged.shape(),
            small_rows: inputs.small.height(),
            large_rows: inputs.large.height(),
            profiles,
            comparison: Comparison::new(inputs.small.height(), inputs.large.height()),
            files: inputs.files.clone(),
        };
        info!(
            merged_rows = report.merged_shape.0,
            small = report.small_rows,
            large = report.large_rows,
            "verified outputs"
        );
        Ok(report)
    }

    /// Load and summarize in one step.
    pub fn verify(&self) -> Result<VerificationReport, VerificationError> {
        let inputs = self.load()?;
        self.summarize(&inputs)
    }
}

pub fn render_verification<W: Write>(w: &mut W, report: &VerificationReport) -> io::Result<()> {
    write_banner(w, "VERIFICATION OF PROCESSED DATA")?;

    writeln!(w, "\nDATASET SUMMARY:")?;
    writeln!(
        w,
        "- Merged dataset: {} rows, {} columns",
        format_count(report.merged_shape.0),
        report.merged_shape.1
    )?;
    writeln!(w, "- {SMALL_LABEL}: {} rows", format_count(report.small_rows))?;
    writeln!(w, "- {LARGE_LABEL}: {} rows", format_count(report.large_rows))?;

    writeln!(w, "\nMOTORCYCLE ACCIDENT ANALYSIS:")?;
    for profile in &report.profiles {
        writeln!(w, "\n--- {} ---", profile.label)?;
        writeln!(w, "Total accidents: {}", format_count(profile.rows))?;
        if let Some(gender) = &profile.gender {
            writeln!(w)?;
            write_distribution(w, "Gender distribution:", gender, Some(profile.rows))?;
        }
        if let Some(injury) = &profile.injury {
            writeln!(w)?;
            write_distribution(w, "Injury severity:", injury, Some(profile.rows))?;
        }
        if let Some(months) = &profile.months {
            writeln!(w)?;
            write_distribution(
                w,
                &format!("Top {TOP_MONTHS} months with most accidents:"),
                months,
                None,
            )?;
        }
    }

    let comparison = &report.comparison;
    writeln!(w, "\nCOMPARISON:")?;
    writeln!(
        w,
        "Total motorcycle accidents: {}",
        format_count(comparison.total)
    )?;
    writeln!(
        w,
        "≤ 125cc represents {} of motorcycle accidents",
        format_share(comparison.small_share)
    )?;
    writeln!(
        w,
        "> 125cc represents {} of motorcycle accidents",
        format_share(comparison.large_share)
    )?;

    writeln!(w, "\nFILES VERIFIED:")?;
    for file in &report.files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        writeln!(w, "- {name}")?;
    }
    Ok(())
}
