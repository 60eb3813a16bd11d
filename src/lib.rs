//! Accident Merge - Traffic accident CSV merge & motorcycle subset extraction
//!
//! Joins the yearly accident, driver, passenger and pedestrian tables into one
//! denormalized table, cleans it, splits out motorcycles by displacement and
//! writes the results as CSV. A separate verification pass re-reads them.

pub mod config;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::PipelineConfig;
pub use pipeline::{Pipeline, PipelineError, RunSummary};
