use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Diagnostics go to stderr so stdout carries only the report.
pub fn init_logging() {
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::new("accident_merge=info"))
        .with(console_layer)
        .init();
}
