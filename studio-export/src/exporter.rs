//! The export pipeline.
//!
//! ```text
//! CreativeDocument
//!       │ deep clone
//!       ▼
//! resolve transient assets (concurrent, failures keep the reference)
//!       │
//!       ├─► element markup ─┐
//!       ├─► font link ──────┼─► index.html
//!       ├─► stylesheet ─────┼─► css/style.css
//!       └─► script ─────────┴─► js/script.js
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use studio_core::element::{Element, ElementKind, ElementType, DEFAULT_FONT_FAMILY};
use studio_core::{CanvasConfig, CreativeDocument};

use crate::assets::{AssetRef, AssetResolver, BlobStore, EditorAssetResolver};
use crate::bundle::Bundle;
use crate::error::{ExportError, ExportResult};
use crate::fonts;
use crate::markup::{self, Page, Resource};
use crate::script;
use crate::stylesheet;
use crate::tag::{self, TagSheet};

/// Click destination used when no button carries a link.
pub const DEFAULT_DESTINATION: &str = "https://www.google.com";

/// Font weights requested for every family.
pub const DEFAULT_FONT_WEIGHTS: &str = "400;700";

/// Default per-request timeout for remote assets.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for bundle export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Click destination when the first button has no link.
    pub fallback_destination: String,
    /// Font weights requested, e.g. `400;700`.
    pub font_weights: String,
    /// Family requested when no element sets one.
    pub default_font: String,
    /// Also package network assets instead of linking them.
    pub package_remote_assets: bool,
    /// Directory packaged assets are stored under.
    pub asset_dir: String,
    /// Stylesheet path in the bundle.
    pub stylesheet_path: String,
    /// Script path in the bundle.
    pub script_path: String,
    /// Per-request timeout for remote assets.
    pub request_timeout: Duration,
    /// Creative name written to the tag sheet.
    pub creative_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fallback_destination: DEFAULT_DESTINATION.to_string(),
            font_weights: DEFAULT_FONT_WEIGHTS.to_string(),
            default_font: DEFAULT_FONT_FAMILY.to_string(),
            package_remote_assets: false,
            asset_dir: "assets".to_string(),
            stylesheet_path: "css/style.css".to_string(),
            script_path: "js/script.js".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            creative_name: "RichMedia_Banner".to_string(),
        }
    }
}

impl ExportConfig {
    /// Check that every bundle path is relative and stays inside the bundle.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> ExportResult<()> {
        for (name, path) in [
            ("asset directory", &self.asset_dir),
            ("stylesheet path", &self.stylesheet_path),
            ("script path", &self.script_path),
        ] {
            let trimmed = path.trim_matches('/');
            if trimmed.is_empty() || path.starts_with('/') || trimmed.split('/').any(|part| part == "..") {
                return Err(ExportError::InvalidConfig(format!(
                    "{name} must be a relative path inside the bundle, got {path:?}"
                )));
            }
        }
        if self.stylesheet_path == self.script_path {
            return Err(ExportError::InvalidConfig(
                "stylesheet and script paths must differ".to_string(),
            ));
        }
        Ok(())
    }

    fn asset_dir(&self) -> &str {
        self.asset_dir.trim_matches('/')
    }
}

/// Click destination: the link of the first button in scene order, else the
/// fallback, else [`DEFAULT_DESTINATION`].
#[must_use]
pub fn click_destination(elements: &[Element], fallback: &str) -> String {
    elements
        .iter()
        .find(|element| element.element_type() == ElementType::Button)
        .and_then(Element::link_url)
        .map(str::trim)
        .or_else(|| Some(fallback.trim()).filter(|f| !f.is_empty()))
        .unwrap_or(DEFAULT_DESTINATION)
        .to_string()
}

/// Where a resolved asset gets written back.
#[derive(Debug, Clone)]
struct AssetSlot {
    element: usize,
    slide: Option<usize>,
    reference: String,
    stem: String,
}

fn validate_canvas(canvas: &CanvasConfig) -> ExportResult<()> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if valid(canvas.width) && valid(canvas.height) {
        Ok(())
    } else {
        Err(ExportError::InvalidDocument(format!(
            "canvas size {}x{} is not positive",
            canvas.width, canvas.height
        )))
    }
}

/// Builds self-contained bundles from creative documents.
#[derive(Clone)]
pub struct BundleExporter {
    config: ExportConfig,
    resolver: Arc<dyn AssetResolver>,
}

impl std::fmt::Debug for BundleExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleExporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BundleExporter {
    /// Create an exporter with the given configuration and asset resolver.
    #[must_use]
    pub fn new(config: ExportConfig, resolver: Arc<dyn AssetResolver>) -> Self {
        Self { config, resolver }
    }

    /// Create an exporter resolving editor references from `blobs` and files
    /// under `asset_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Resolver`] if the HTTP client cannot be built.
    pub fn for_editor(
        config: ExportConfig,
        blobs: BlobStore,
        asset_root: impl Into<PathBuf>,
    ) -> ExportResult<Self> {
        let resolver = EditorAssetResolver::new(blobs, asset_root, config.request_timeout)?;
        Ok(Self::new(config, Arc::new(resolver)))
    }

    /// Create an exporter with default configuration, reading files relative
    /// to the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Resolver`] if the HTTP client cannot be built.
    pub fn with_defaults() -> ExportResult<Self> {
        Self::for_editor(ExportConfig::default(), BlobStore::new(), ".")
    }

    /// The export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a document as a bundle.
    ///
    /// The document is never modified. Assets that fail to resolve keep their
    /// original reference; any other failure aborts the export.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or canvas is invalid or the
    /// script configuration cannot be serialized.
    pub async fn export(&self, document: &CreativeDocument) -> ExportResult<Bundle> {
        self.config.validate()?;
        validate_canvas(&document.scene.config)?;

        let mut elements = document.scene.elements().to_vec();
        tracing::info!("Exporting creative with {} elements", elements.len());

        let assets = self.resolve_assets(&mut elements).await;
        let bundle = self.assemble(document, &elements, assets)?;

        tracing::info!(
            "Export complete: {} assets, {} bytes",
            bundle.assets.len(),
            bundle.size()
        );
        Ok(bundle)
    }

    /// Export a document and package it as a zip archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the export or the archive assembly fails.
    pub async fn export_zip(&self, document: &CreativeDocument) -> ExportResult<Vec<u8>> {
        self.export(document).await?.to_zip()
    }

    /// Single-file third-party tag with a trafficking sheet row.
    ///
    /// Media references are used as they are; nothing is fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is invalid or the script configuration
    /// cannot be serialized.
    pub fn tag_sheet(&self, document: &CreativeDocument) -> ExportResult<TagSheet> {
        validate_canvas(&document.scene.config)?;
        let elements = document.scene.elements();
        let canvas = &document.scene.config;

        let destination = click_destination(elements, &self.config.fallback_destination);
        let families = fonts::collect_families(elements, &self.config.default_font);
        let font_link = fonts::font_link(&families, &self.config.font_weights);
        let body = markup::elements_markup(elements, self.config.asset_dir());
        let css = stylesheet::stylesheet(canvas, &document.custom_css);
        let js = script::bundle_script(elements, &document.custom_js)?;

        let html = markup::page_html(&Page {
            canvas,
            click_tag: &destination,
            font_link: &font_link,
            elements: &body,
            stylesheet: Resource::Inline(&css),
            script: Resource::Inline(&js),
        });

        Ok(tag::tag_sheet(&self.config.creative_name, canvas, &html))
    }

    fn asset_slots(&self, elements: &[Element]) -> Vec<AssetSlot> {
        let asset_dir = self.config.asset_dir();
        let package_remote = self.config.package_remote_assets;
        let wanted = |reference: &str| AssetRef::classify(reference, asset_dir).needs_fetch(package_remote);

        let mut slots = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match &element.kind {
                ElementKind::Image | ElementKind::Video | ElementKind::Box => {
                    if wanted(&element.content) {
                        slots.push(AssetSlot {
                            element: index,
                            slide: None,
                            reference: element.content.trim().to_string(),
                            stem: format!("el_{}", element.id),
                        });
                    }
                }
                ElementKind::Carousel(carousel) => {
                    for (slide, image) in carousel.images.iter().enumerate() {
                        if wanted(&image.url) {
                            slots.push(AssetSlot {
                                element: index,
                                slide: Some(slide),
                                reference: image.url.trim().to_string(),
                                stem: format!("el_{}_slide_{slide}", element.id),
                            });
                        }
                    }
                }
                ElementKind::Text | ElementKind::Button { .. } => {}
            }
        }
        slots
    }

    /// Fetch every asset slot concurrently and rewrite the references that
    /// resolved. Returns the packaged files by bundle path.
    async fn resolve_assets(&self, elements: &mut [Element]) -> BTreeMap<String, Vec<u8>> {
        let slots = self.asset_slots(elements);
        if slots.is_empty() {
            return BTreeMap::new();
        }
        tracing::debug!("Resolving {} assets", slots.len());

        let results = join_all(slots.iter().map(|slot| self.resolver.fetch(&slot.reference))).await;

        let mut files = BTreeMap::new();
        for (slot, result) in slots.into_iter().zip(results) {
            let asset = match result {
                Ok(asset) => asset,
                Err(e) => {
                    tracing::warn!(
                        "Failed to package asset {}: {e}; keeping original reference",
                        slot.reference
                    );
                    continue;
                }
            };

            let path = format!("{}/{}.{}", self.config.asset_dir(), slot.stem, asset.extension());
            let element = &mut elements[slot.element];
            if let Some(slide) = slot.slide {
                if let Some(image) = element
                    .carousel_mut()
                    .and_then(|carousel| carousel.images.get_mut(slide))
                {
                    image.url.clone_from(&path);
                }
            } else {
                element.content.clone_from(&path);
            }
            tracing::debug!("Packaged {} as {path}", slot.reference);
            files.insert(path, asset.bytes);
        }
        files
    }

    fn assemble(
        &self,
        document: &CreativeDocument,
        elements: &[Element],
        assets: BTreeMap<String, Vec<u8>>,
    ) -> ExportResult<Bundle> {
        let canvas = &document.scene.config;
        let destination = click_destination(elements, &self.config.fallback_destination);
        let families = fonts::collect_families(elements, &self.config.default_font);
        tracing::debug!("Click destination {destination}, fonts {families:?}");

        let font_link = fonts::font_link(&families, &self.config.font_weights);
        let body = markup::elements_markup(elements, self.config.asset_dir());
        let stylesheet = stylesheet::stylesheet(canvas, &document.custom_css);
        let script = script::bundle_script(elements, &document.custom_js)?;

        let index_html = markup::page_html(&Page {
            canvas,
            click_tag: &destination,
            font_link: &font_link,
            elements: &body,
            stylesheet: Resource::Linked(&self.config.stylesheet_path),
            script: Resource::Linked(&self.config.script_path),
        });

        Ok(Bundle {
            index_html,
            stylesheet_path: self.config.stylesheet_path.clone(),
            stylesheet,
            script_path: self.config.script_path.clone(),
            script,
            assets,
        })
    }
}
