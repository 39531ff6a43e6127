use crate::error::Result;
use crate::types::ProjectStructure;

/// Pretty-printed canonical JSON. Feeding it back through the normalizer
/// reproduces the record.
pub fn to_json(project: &ProjectStructure) -> Result<String> {
    Ok(serde_json::to_string_pretty(project)?)
}
