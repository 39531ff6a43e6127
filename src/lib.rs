//! NoCodeBridge core library
//!
//! Detects which no-code builder produced a URL or an export file,
//! normalizes it into a [`ProjectStructure`], and serializes that record for
//! AI assistants or for re-import into a builder:
//! - `analysis`: input classifier, platform matcher, normalizer, pipeline
//! - `export`: JSON, Markdown (and its reverse parser), UAP envelope, ZIP bundles
//! - `api`: HTTP fetch for URL imports
//! - `registry`: process-wide import/rebuild state
//! - `storage`, `config`, `error`

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod registry;
pub mod storage;
pub mod types;

pub use analysis::{classify, match_json, match_url, normalize, Analysis, BridgeAnalyzer};
pub use error::{BridgeError, Result};
pub use export::{parse_markdown, to_json, to_markdown, to_uap_envelope, ExportFormat};
pub use types::{Detection, Platform, ProjectStructure, SourceType};
