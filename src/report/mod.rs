//! Report module - Pipeline progress and output verification

mod console;
mod format;
mod verifier;

pub use console::{ConsoleReporter, PipelineReporter, Stage};
pub use verifier::{
    render_verification, Comparison, VerificationError, VerificationInputs, VerificationReport,
    Verifier, LARGE_LABEL, SMALL_LABEL,
};
