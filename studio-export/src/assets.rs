//! Asset reference classification and resolution.
//!
//! Media references in a scene are either durable (network URLs, files
//! already packaged under the asset directory) or transient editor-local
//! references that only make sense inside the running editor: `blob:` handles,
//! `data:` URIs, and local file paths. Transient references are fetched through
//! an [`AssetResolver`] and packaged into the bundle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use url::Url;

use crate::error::AssetError;

/// Fallback extension when neither the content type nor the bytes identify the media.
pub const DEFAULT_EXTENSION: &str = "png";

/// Upper bound on connecting to a media host, below the whole-request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirects followed when fetching remote media.
const MAX_REDIRECTS: usize = 5;

/// How a media reference must be treated during export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRef<'a> {
    /// No media.
    Empty,
    /// Absolute network URL (`http(s)://` or protocol-relative `//`).
    Network(&'a str),
    /// Already points into the bundle's asset directory.
    Packaged(&'a str),
    /// Editor-local reference that must be fetched and packaged.
    Transient(&'a str),
}

impl<'a> AssetRef<'a> {
    /// Classify `reference` for a bundle whose assets live under `asset_dir`.
    #[must_use]
    pub fn classify(reference: &'a str, asset_dir: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || trimmed.starts_with("//") {
            return Self::Network(trimmed);
        }

        let packaged_prefix = format!("{}/", asset_dir.trim_end_matches('/'));
        if trimmed.starts_with(&packaged_prefix) && !trimmed.contains("..") {
            return Self::Packaged(trimmed);
        }

        Self::Transient(trimmed)
    }

    /// Whether the export must fetch this reference.
    #[must_use]
    pub const fn needs_fetch(&self, package_remote: bool) -> bool {
        match self {
            Self::Transient(_) => true,
            Self::Network(_) => package_remote,
            Self::Empty | Self::Packaged(_) => false,
        }
    }
}

/// Raw bytes of a resolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// Asset contents.
    pub bytes: Vec<u8>,
    /// MIME type hint, if the source provided one.
    pub content_type: Option<String>,
}

impl FetchedAsset {
    /// Create an asset from bytes and an optional content type.
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    /// File extension for this asset.
    ///
    /// Taken from the content type, then from the leading bytes, then
    /// [`DEFAULT_EXTENSION`].
    #[must_use]
    pub fn extension(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(extension_from_mime)
            .or_else(|| sniff_extension(&self.bytes).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }
}

fn extension_from_mime(mime: &str) -> Option<String> {
    let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
    let (_, subtype) = essence.split_once('/')?;
    match subtype {
        "svg+xml" => Some("svg".to_string()),
        "octet-stream" | "" => None,
        other => {
            let sanitized: String = other
                .trim_start_matches("x-")
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect();
            (!sanitized.is_empty()).then_some(sanitized)
        }
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }
    if bytes.starts_with(b"GIF8") {
        return Some("gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("webp");
    }
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return Some("mp4");
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("webm");
    }

    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start();
    if (text.starts_with("<svg") || text.starts_with("<?xml")) && text.contains("<svg") {
        return Some("svg");
    }
    None
}

/// Source of asset bytes for transient references.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Fetch the bytes behind `reference`.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] when the reference cannot be read; the
    /// exporter then keeps the original reference.
    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError>;
}

/// In-memory registry of `blob:` references created by the editor.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    blobs: Arc<RwLock<HashMap<String, FetchedAsset>>>,
}

impl BlobStore {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and return the `blob:` reference that resolves to them.
    pub fn register(&self, bytes: Vec<u8>, content_type: Option<String>) -> String {
        let reference = format!("blob:studio/{}", uuid::Uuid::new_v4());
        let mut blobs = self
            .blobs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.insert(reference.clone(), FetchedAsset::new(bytes, content_type));
        tracing::debug!("Registered {reference}");
        reference
    }

    /// Look up a registered blob.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<FetchedAsset> {
        let blobs = self
            .blobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.get(reference).cloned()
    }

    /// Drop a blob. Returns whether it was registered.
    pub fn revoke(&self, reference: &str) -> bool {
        let mut blobs = self
            .blobs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.remove(reference).is_some()
    }

    /// Number of registered blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether no blobs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a base64 `data:` URI.
///
/// # Errors
///
/// Returns [`AssetError::InvalidDataUri`] if the URI has no payload separator,
/// is not base64 encoded, or the payload does not decode.
pub fn decode_data_uri(uri: &str) -> Result<FetchedAsset, AssetError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::InvalidDataUri("missing data: prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUri("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(AssetError::InvalidDataUri(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AssetError::InvalidDataUri(e.to_string()))?;

    let content_type = (!mime.is_empty()).then(|| mime.to_string());
    Ok(FetchedAsset::new(bytes, content_type))
}

/// Resolver for references produced by the editor.
///
/// Handles `blob:` references from a [`BlobStore`], base64 `data:` URIs,
/// `file:` URLs and plain paths (relative paths resolve against the asset
/// root), and network URLs.
#[derive(Debug, Clone)]
pub struct EditorAssetResolver {
    blobs: BlobStore,
    asset_root: PathBuf,
    http: Client,
}

impl EditorAssetResolver {
    /// Create a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Http`] if the HTTP client fails to build.
    pub fn new(
        blobs: BlobStore,
        asset_root: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, AssetError> {
        let http = Client::builder()
            .user_agent(concat!("studio-export/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            blobs,
            asset_root: asset_root.into(),
            http,
        })
    }

    /// The blob registry this resolver reads from.
    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Directory relative paths are resolved against.
    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    async fn fetch_remote(&self, url: &str) -> Result<FetchedAsset, AssetError> {
        let url = Url::parse(url)?;
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedAsset::new(bytes, content_type))
    }

    async fn read_file(path: &Path) -> Result<FetchedAsset, AssetError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(FetchedAsset::new(bytes, None))
    }
}

#[async_trait]
impl AssetResolver for EditorAssetResolver {
    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError> {
        let reference = reference.trim();
        let lower = reference.to_ascii_lowercase();

        if lower.starts_with("blob:") {
            return self
                .blobs
                .get(reference)
                .ok_or_else(|| AssetError::UnknownBlob(reference.to_string()));
        }
        if lower.starts_with("data:") {
            return decode_data_uri(reference);
        }
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return self.fetch_remote(reference).await;
        }
        if reference.starts_with("//") {
            return self.fetch_remote(&format!("https:{reference}")).await;
        }
        if lower.starts_with("file:") {
            let url = Url::parse(reference)?;
            let path = url
                .to_file_path()
                .map_err(|()| AssetError::Unsupported(reference.to_string()))?;
            return Self::read_file(&path).await;
        }
        if reference.contains("://") {
            return Err(AssetError::Unsupported(reference.to_string()));
        }

        let path = Path::new(reference);
        if path.is_absolute() {
            Self::read_file(path).await
        } else {
            Self::read_file(&self.asset_root.join(path)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn resolver(blobs: BlobStore, root: &Path) -> EditorAssetResolver {
        EditorAssetResolver::new(blobs, root, Duration::from_secs(5)).expect("resolver")
    }

    #[test]
    fn test_classify() {
        assert_eq!(AssetRef::classify("", "assets"), AssetRef::Empty);
        assert_eq!(AssetRef::classify("   ", "assets"), AssetRef::Empty);
        assert_eq!(
            AssetRef::classify("https://cdn.example.com/a.png", "assets"),
            AssetRef::Network("https://cdn.example.com/a.png")
        );
        assert_eq!(
            AssetRef::classify("//cdn.example.com/a.png", "assets"),
            AssetRef::Network("//cdn.example.com/a.png")
        );
        assert_eq!(
            AssetRef::classify("assets/el_1.png", "assets"),
            AssetRef::Packaged("assets/el_1.png")
        );
        assert_eq!(
            AssetRef::classify("assets/../secret.png", "assets"),
            AssetRef::Transient("assets/../secret.png")
        );
        assert_eq!(
            AssetRef::classify("blob:studio/1234", "assets"),
            AssetRef::Transient("blob:studio/1234")
        );
        assert_eq!(
            AssetRef::classify("media/photo.jpg", "assets"),
            AssetRef::Transient("media/photo.jpg")
        );
    }

    #[test]
    fn test_needs_fetch() {
        assert!(AssetRef::Transient("blob:x").needs_fetch(false));
        assert!(!AssetRef::Network("https://x").needs_fetch(false));
        assert!(AssetRef::Network("https://x").needs_fetch(true));
        assert!(!AssetRef::Packaged("assets/a.png").needs_fetch(true));
        assert!(!AssetRef::Empty.needs_fetch(true));
    }

    #[test]
    fn test_extension_from_content_type() {
        let asset = FetchedAsset::new(Vec::new(), Some("image/svg+xml".to_string()));
        assert_eq!(asset.extension(), "svg");

        let asset = FetchedAsset::new(Vec::new(), Some("video/mp4; codecs=avc1".to_string()));
        assert_eq!(asset.extension(), "mp4");

        let asset = FetchedAsset::new(Vec::new(), Some("image/../../etc".to_string()));
        assert_eq!(asset.extension(), "etc");
    }

    #[test]
    fn test_extension_sniffing() {
        let png = FetchedAsset::new(PNG_HEADER.to_vec(), Some("application/octet-stream".to_string()));
        assert_eq!(png.extension(), "png");

        let gif = FetchedAsset::new(b"GIF89a....".to_vec(), None);
        assert_eq!(gif.extension(), "gif");

        let webp = FetchedAsset::new(b"RIFF\0\0\0\0WEBPVP8 ".to_vec(), None);
        assert_eq!(webp.extension(), "webp");

        let mp4 = FetchedAsset::new(b"\0\0\0\x18ftypmp42".to_vec(), None);
        assert_eq!(mp4.extension(), "mp4");

        let svg = FetchedAsset::new(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec(), None);
        assert_eq!(svg.extension(), "svg");

        let unknown = FetchedAsset::new(b"hello".to_vec(), None);
        assert_eq!(unknown.extension(), DEFAULT_EXTENSION);
    }

    #[test]
    fn test_decode_data_uri() {
        let asset = decode_data_uri("data:image/png;base64,iVBORw0KGgo=").expect("decode");
        assert_eq!(asset.bytes, b"\x89PNG\r\n\x1a\n");
        assert_eq!(asset.content_type.as_deref(), Some("image/png"));

        let asset = decode_data_uri("data:;base64,aGk=").expect("decode");
        assert_eq!(asset.bytes, b"hi");
        assert_eq!(asset.content_type, None);
    }

    #[test]
    fn test_decode_data_uri_rejects_plain_text() {
        let result = decode_data_uri("data:text/plain,hello");
        assert!(matches!(result, Err(AssetError::InvalidDataUri(_))));

        let result = decode_data_uri("data:image/png;base64");
        assert!(matches!(result, Err(AssetError::InvalidDataUri(_))));

        let result = decode_data_uri("data:image/png;base64,***");
        assert!(matches!(result, Err(AssetError::InvalidDataUri(_))));
    }

    #[test]
    fn test_blob_store_register_and_revoke() {
        let store = BlobStore::new();
        assert!(store.is_empty());

        let reference = store.register(vec![1, 2, 3], Some("image/png".to_string()));
        assert!(reference.starts_with("blob:"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&reference).expect("blob").bytes, vec![1, 2, 3]);

        assert!(store.revoke(&reference));
        assert!(!store.revoke(&reference));
        assert!(store.get(&reference).is_none());
    }

    #[tokio::test]
    async fn test_resolver_reads_blobs_and_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("logo.png"), PNG_HEADER)
            .await
            .expect("write");

        let blobs = BlobStore::new();
        let blob = blobs.register(b"GIF89a".to_vec(), Some("image/gif".to_string()));
        let resolver = resolver(blobs, dir.path());

        let fetched = resolver.fetch(&blob).await.expect("blob");
        assert_eq!(fetched.extension(), "gif");

        let fetched = resolver.fetch("logo.png").await.expect("relative file");
        assert_eq!(fetched.bytes, PNG_HEADER);

        let absolute = dir.path().join("logo.png");
        let fetched = resolver
            .fetch(&absolute.to_string_lossy())
            .await
            .expect("absolute file");
        assert_eq!(fetched.extension(), "png");
    }

    #[tokio::test]
    async fn test_resolver_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver(BlobStore::new(), dir.path());

        let result = resolver.fetch("blob:studio/missing").await;
        assert!(matches!(result, Err(AssetError::UnknownBlob(_))));

        let result = resolver.fetch("missing.png").await;
        assert!(matches!(result, Err(AssetError::Io(_))));

        let result = resolver.fetch("ftp://example.com/a.png").await;
        assert!(matches!(result, Err(AssetError::Unsupported(_))));
    }
}
