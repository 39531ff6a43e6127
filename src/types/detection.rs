use serde::Serialize;
use serde_json::Value;

use super::{Platform, SourceType};

/// Result of matching an input against the platform signatures.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Detection {
    pub platform: Platform,
    /// 0.0 to 1.0. Heuristic constant, only meaningful relative to other detections.
    pub confidence: f64,
    pub reason: String,
    /// Name suggested by the matcher (URL slug, filename stem).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Detection {
    pub fn new(platform: Platform, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            platform,
            confidence,
            reason: reason.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn unknown() -> Self {
        Self::new(Platform::Unknown, 0.0, "No recognizable structure")
    }

    /// Confidence as a whole percentage, for display.
    pub fn percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Output of the input classifier: what the input is, which platform it
/// probably came from, and the value to feed the normalizer.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Classification {
    pub kind: SourceType,
    pub detection: Detection,
    /// Parsed JSON, or a small object wrapping the raw text for non-JSON input.
    pub payload: Value,
}
