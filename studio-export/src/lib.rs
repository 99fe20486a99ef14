//! # Creative Studio Export
//!
//! Turns a creative document into a self-contained HTML5 bundle.
//!
//! ## Bundle Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ index.html     markup, clickTag, font link  │
//! ├─────────────────────────────────────────────┤
//! │ css/style.css  animations, reset, user CSS  │
//! ├─────────────────────────────────────────────┤
//! │ js/script.js   clicks, carousels, actions,  │
//! │                user JS                      │
//! ├─────────────────────────────────────────────┤
//! │ assets/*       packaged media               │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod bundle;
pub mod error;
pub mod exporter;
pub mod fonts;
pub mod markup;
pub mod script;
pub mod stylesheet;
pub mod tag;

pub use assets::{AssetRef, AssetResolver, BlobStore, EditorAssetResolver, FetchedAsset};
pub use bundle::{write_file_atomic, Bundle, INDEX_FILE};
pub use error::{AssetError, ExportError, ExportResult};
pub use exporter::{click_destination, BundleExporter, ExportConfig, DEFAULT_DESTINATION};
pub use script::RuntimeConfig;
pub use tag::TagSheet;
