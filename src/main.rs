//! merge-accidents - load, clean, merge and split the 2023 accident tables.

use accident_merge::logging::init_logging;
use accident_merge::report::ConsoleReporter;
use accident_merge::{Pipeline, PipelineConfig};
use anyhow::{Context, Result};
use tracing::error;

fn run() -> Result<()> {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let stdout = std::io::stdout();
    let mut reporter = ConsoleReporter::new(stdout.lock());

    pipeline
        .run(&mut reporter)
        .context("accident data processing failed")?;
    Ok(())
}

fn main() {
    init_logging();

    // Failures are reported, not turned into an exit code; outputs already
    // written are left in place.
    if let Err(err) = run() {
        error!(error = ?err, "pipeline aborted");
        println!("Error occurred: {err:#}");
        eprintln!("{err:?}");
    }
}
