//! The exported bundle and its packaging.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{ExportError, ExportResult};

/// Name of the root page.
pub const INDEX_FILE: &str = "index.html";

/// A complete, self-contained creative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Root page.
    pub index_html: String,
    /// Path of the stylesheet, relative to the bundle root.
    pub stylesheet_path: String,
    /// Stylesheet contents.
    pub stylesheet: String,
    /// Path of the script, relative to the bundle root.
    pub script_path: String,
    /// Script contents.
    pub script: String,
    /// Packaged media by path relative to the bundle root.
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl Bundle {
    /// Every file of the bundle, sorted by path.
    #[must_use]
    pub fn files(&self) -> BTreeMap<&str, &[u8]> {
        let mut files: BTreeMap<&str, &[u8]> = self
            .assets
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
            .collect();
        files.insert(INDEX_FILE, self.index_html.as_bytes());
        files.insert(self.stylesheet_path.as_str(), self.stylesheet.as_bytes());
        files.insert(self.script_path.as_str(), self.script.as_bytes());
        files
    }

    /// Total size of all files in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.files().values().map(|bytes| bytes.len()).sum()
    }

    /// Package the bundle as a zip archive.
    ///
    /// Entries are sorted and carry a fixed timestamp, so the same bundle
    /// always produces the same bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    pub fn to_zip(&self) -> ExportResult<Vec<u8>> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, bytes) in self.files() {
            writer.start_file(path, options)?;
            writer.write_all(bytes)?;
        }
        let archive = writer.finish()?.into_inner();

        tracing::debug!(
            "Packaged {} files into {} byte archive",
            self.files().len(),
            archive.len()
        );
        Ok(archive)
    }

    /// Write the bundle as a directory tree at `dir`.
    ///
    /// Files go to a staging directory beside `dir` that is renamed into
    /// place once every file is written, so a failure leaves nothing at
    /// `dir`. An existing `dir` must be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not empty or any file cannot be written.
    pub async fn write_to_dir(&self, dir: &Path) -> ExportResult<()> {
        if let Ok(mut entries) = tokio::fs::read_dir(dir).await {
            if entries.next_entry().await?.is_some() {
                return Err(ExportError::InvalidConfig(format!(
                    "output directory {} is not empty",
                    dir.display()
                )));
            }
        }

        let staging = tempfile::Builder::new()
            .prefix(".bundle-")
            .tempdir_in(staging_parent(dir).await?)?;
        for (path, bytes) in self.files() {
            let target = staging.path().join(path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, bytes).await?;
        }

        if tokio::fs::metadata(dir).await.is_ok() {
            tokio::fs::remove_dir(dir).await?;
        }
        tokio::fs::rename(staging.path(), dir).await?;
        tracing::debug!("Wrote bundle to {}", dir.display());
        Ok(())
    }

    /// Write the zip archive to `path`, returning its size.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be built or written.
    pub async fn write_zip(&self, path: &Path) -> ExportResult<usize> {
        let archive = self.to_zip()?;
        write_file_atomic(path, &archive).await?;
        Ok(archive.len())
    }
}

/// Write `bytes` to `path` through a temporary sibling file, so readers see
/// either the old file or the complete new one.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or moved into place.
pub async fn write_file_atomic(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    let temp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(staging_parent(path).await?)?;
    tokio::fs::write(temp.path(), bytes).await?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Directory that will hold `path`, created if missing.
async fn staging_parent(path: &Path) -> ExportResult<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;
    Ok(parent)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn sample() -> Bundle {
        let mut assets = BTreeMap::new();
        assets.insert("assets/el_2.png".to_string(), vec![0x89, b'P', b'N', b'G']);
        assets.insert("assets/el_1_slide_0.gif".to_string(), b"GIF89a".to_vec());
        Bundle {
            index_html: "<!DOCTYPE html>".to_string(),
            stylesheet_path: "css/style.css".to_string(),
            stylesheet: "body {}".to_string(),
            script_path: "js/script.js".to_string(),
            script: "(function() {})();".to_string(),
            assets,
        }
    }

    #[test]
    fn test_files_are_sorted() {
        let bundle = sample();
        let paths: Vec<&str> = bundle.files().keys().copied().collect();
        assert_eq!(
            paths,
            vec![
                "assets/el_1_slide_0.gif",
                "assets/el_2.png",
                "css/style.css",
                "index.html",
                "js/script.js",
            ]
        );
        assert_eq!(bundle.size(), 4 + 6 + 7 + 15 + 18);
    }

    #[test]
    fn test_zip_is_deterministic_and_readable() {
        let bundle = sample();
        let first = bundle.to_zip().expect("zip");
        let second = bundle.to_zip().expect("zip");
        assert_eq!(first, second);

        let mut archive = zip::ZipArchive::new(Cursor::new(first)).expect("archive");
        assert_eq!(archive.len(), 5);

        let mut index = String::new();
        archive
            .by_name("index.html")
            .expect("index")
            .read_to_string(&mut index)
            .expect("read");
        assert_eq!(index, "<!DOCTYPE html>");
    }

    #[tokio::test]
    async fn test_write_to_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        sample().write_to_dir(dir.path()).await.expect("write");

        let css = tokio::fs::read_to_string(dir.path().join("css/style.css"))
            .await
            .expect("css");
        assert_eq!(css, "body {}");
        assert!(dir.path().join("assets/el_2.png").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let out = root.path().join("dist");
        let mut bundle = sample();
        // A file named "css" blocks the stylesheet directory.
        bundle.assets.insert("css".to_string(), b"not a dir".to_vec());

        assert!(bundle.write_to_dir(&out).await.is_err());
        assert!(!out.exists());
        let mut leftovers = tokio::fs::read_dir(root.path()).await.expect("read_dir");
        assert!(leftovers.next_entry().await.expect("entry").is_none());
    }

    #[tokio::test]
    async fn test_non_empty_directory_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("keep.txt"), "mine").await.expect("write");

        let result = sample().write_to_dir(dir.path()).await;
        assert!(matches!(result, Err(ExportError::InvalidConfig(_))));
        assert!(dir.path().join("keep.txt").exists());
        assert!(!dir.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_write_zip_replaces_whole_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("banner.zip");
        let bundle = sample();

        let size = bundle.write_zip(&path).await.expect("first");
        tokio::fs::write(&path, b"stale").await.expect("overwrite");
        assert_eq!(bundle.write_zip(&path).await.expect("second"), size);

        let written = tokio::fs::read(&path).await.expect("read");
        assert_eq!(written, bundle.to_zip().expect("zip"));
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("out"))
            .expect("read_dir")
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
