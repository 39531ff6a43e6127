pub mod classifier;
pub mod normalizer;
pub mod pipeline;
pub mod platform;

pub use classifier::classify;
pub use normalizer::{normalize, normalize_as};
pub use pipeline::{Analysis, BridgeAnalyzer};
pub use platform::{match_json, match_url, recommendation};
