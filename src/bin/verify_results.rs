//! verify-results - re-read the pipeline outputs and print their statistics.

use accident_merge::logging::init_logging;
use accident_merge::report::{render_verification, Verifier};
use accident_merge::PipelineConfig;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::error;

fn run() -> Result<()> {
    let config = PipelineConfig::default();
    let report = Verifier::new(&config)
        .verify()
        .context("verification of processed data failed")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render_verification(&mut out, &report)?;
    out.flush()?;
    Ok(())
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        error!(error = ?err, "verification aborted");
        println!("Error: {err:#}");
        eprintln!("{err:?}");
    }
}
