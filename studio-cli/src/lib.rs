//! # Creative Studio CLI
//!
//! Exports a saved creative document as a standalone HTML5 bundle.
//!
//! ## Usage
//!
//! ```bash
//! studio-export --project banner.json --out banner.zip
//! ```
//!
//! ## With local media and a trafficking sheet:
//!
//! ```bash
//! studio-export --project banner.json --asset-root ./media --out-dir ./dist --tag-sheet tag.csv
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use studio_core::CreativeDocument;
use studio_export::{write_file_atomic, BlobStore, BundleExporter, ExportConfig};

/// Default archive written when no output is given.
pub const DEFAULT_ARCHIVE: &str = "bundle.zip";

/// Command-line arguments for studio-export.
#[derive(Debug, Clone, Parser)]
#[command(name = "studio-export")]
#[command(about = "Export a Creative Studio project as an HTML5 bundle")]
#[command(version = studio_core::VERSION)]
pub struct CliArgs {
    /// Project document (JSON)
    #[arg(long, env = "STUDIO_PROJECT")]
    pub project: PathBuf,

    /// Zip archive to write (default: bundle.zip)
    #[arg(long, env = "STUDIO_OUT", conflicts_with = "out_dir")]
    pub out: Option<PathBuf>,

    /// Write the bundle as a directory instead of an archive
    #[arg(long, env = "STUDIO_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory relative media paths resolve against (default: project directory)
    #[arg(long, env = "STUDIO_ASSET_ROOT")]
    pub asset_root: Option<PathBuf>,

    /// Click destination when the first button has no link
    #[arg(long, env = "STUDIO_FALLBACK_DESTINATION", default_value = studio_export::DEFAULT_DESTINATION)]
    pub fallback_destination: String,

    /// Package network media into the bundle too
    #[arg(long, env = "STUDIO_PACKAGE_REMOTE_ASSETS")]
    pub package_remote_assets: bool,

    /// Replace the project's custom CSS with this file
    #[arg(long, env = "STUDIO_CSS")]
    pub css: Option<PathBuf>,

    /// Replace the project's custom JS with this file
    #[arg(long, env = "STUDIO_JS")]
    pub js: Option<PathBuf>,

    /// Also write a third-party tag sheet (CSV)
    #[arg(long, env = "STUDIO_TAG_SHEET")]
    pub tag_sheet: Option<PathBuf>,

    /// Creative name used in the tag sheet
    #[arg(long, env = "STUDIO_CREATIVE_NAME", default_value = "RichMedia_Banner")]
    pub creative_name: String,

    /// Timeout for each remote media request, in seconds
    #[arg(long, env = "STUDIO_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "STUDIO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Where the bundle goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A zip archive.
    Archive(PathBuf),
    /// A directory tree.
    Directory(PathBuf),
}

impl CliArgs {
    /// Output destination, defaulting to [`DEFAULT_ARCHIVE`].
    #[must_use]
    pub fn output(&self) -> Output {
        match (&self.out, &self.out_dir) {
            (_, Some(dir)) => Output::Directory(dir.clone()),
            (Some(file), None) => Output::Archive(file.clone()),
            (None, None) => Output::Archive(PathBuf::from(DEFAULT_ARCHIVE)),
        }
    }

    /// Directory relative media paths resolve against.
    #[must_use]
    pub fn asset_root(&self) -> PathBuf {
        self.asset_root.clone().unwrap_or_else(|| {
            self.project
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }
}

impl From<CliArgs> for ExportConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            fallback_destination: args.fallback_destination,
            package_remote_assets: args.package_remote_assets,
            request_timeout: Duration::from_secs(args.timeout_secs),
            creative_name: args.creative_name,
            ..Self::default()
        }
    }
}

/// What an export run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Where the bundle was written.
    pub output: Output,
    /// Number of elements exported.
    pub elements: usize,
    /// Number of packaged media files.
    pub assets: usize,
    /// Bytes written (archive size, or total file size for directories).
    pub bytes: usize,
}

/// Load the project, apply overrides, export, and write every output.
///
/// # Errors
///
/// Returns an error if any input cannot be read, the export fails, or an
/// output cannot be written.
pub async fn run(args: CliArgs) -> anyhow::Result<ExportSummary> {
    let json = tokio::fs::read_to_string(&args.project)
        .await
        .with_context(|| format!("failed to read project {}", args.project.display()))?;
    let mut document = CreativeDocument::from_json(&json)
        .with_context(|| format!("invalid project {}", args.project.display()))?;

    if let Some(css) = &args.css {
        document.custom_css = tokio::fs::read_to_string(css)
            .await
            .with_context(|| format!("failed to read {}", css.display()))?;
    }
    if let Some(js) = &args.js {
        document.custom_js = tokio::fs::read_to_string(js)
            .await
            .with_context(|| format!("failed to read {}", js.display()))?;
    }

    let output = args.output();
    let asset_root = args.asset_root();
    let tag_sheet = args.tag_sheet.clone();
    let exporter = BundleExporter::for_editor(ExportConfig::from(args), BlobStore::new(), asset_root)?;

    let bundle = exporter.export(&document).await?;
    let sheet = tag_sheet
        .map(|path| exporter.tag_sheet(&document).map(|sheet| (path, sheet)))
        .transpose()?;

    let bytes = match &output {
        Output::Archive(path) => bundle
            .write_zip(path)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        Output::Directory(dir) => {
            bundle
                .write_to_dir(dir)
                .await
                .with_context(|| format!("failed to write {}", dir.display()))?;
            bundle.size()
        }
    };

    if let Some((path, sheet)) = sheet {
        write_file_atomic(&path, sheet.csv.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote tag sheet to {}", path.display());
    }

    Ok(ExportSummary {
        output,
        elements: document.scene.element_count(),
        assets: bundle.assets.len(),
        bytes,
    })
}
