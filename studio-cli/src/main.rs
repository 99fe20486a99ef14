//! # Creative Studio Export
//!
//! Command-line bundle exporter.

use clap::Parser;
use studio_cli::{CliArgs, LogFormat, Output};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset: export progress only.
const DEFAULT_FILTER: &str = "warn,studio_cli=info,studio_export=info";

/// Log to stderr so stdout stays free for scripting.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_format);
    tracing::info!("Exporting {}", args.project.display());

    let summary = studio_cli::run(args).await?;
    let target = match &summary.output {
        Output::Archive(path) | Output::Directory(path) => path.display().to_string(),
    };
    tracing::info!(
        "Wrote {target}: {} elements, {} packaged assets, {} bytes",
        summary.elements,
        summary.assets,
        summary.bytes
    );
    Ok(())
}
