use std::process::ExitCode;

use s3_uploader::{app, render, S3Store, SystemClock};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout is reserved for usage, progress and the result line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let code = app::run(
        std::env::args_os(),
        |config| async move { S3Store::connect(&config).await },
        &SystemClock,
        render::stdout(),
    )
    .await;

    ExitCode::from(code)
}
