use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{json::to_json, markdown::to_markdown, uap::to_uap_envelope_at, ExportArtifact};
use crate::error::Result;
use crate::types::ProjectStructure;

pub const BUNDLE_JSON: &str = "project.json";
pub const BUNDLE_MARKDOWN: &str = "project.md";
pub const BUNDLE_UAP: &str = "project.uap.json";
pub const BUNDLE_README: &str = "README.md";

/// Every export format of a project, packed into one ZIP archive.
pub fn to_zip(project: &ProjectStructure, uap_version: &str) -> Result<Vec<u8>> {
    let envelope = to_uap_envelope_at(project, uap_version, chrono::Utc::now());
    let files = [
        (BUNDLE_JSON, to_json(project)?),
        (BUNDLE_MARKDOWN, to_markdown(project)),
        (BUNDLE_UAP, serde_json::to_string_pretty(&envelope)?),
        (BUNDLE_README, readme(project)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in files {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        debug!(file = name, bytes = content.len(), "added to bundle");
    }

    Ok(zip.finish()?.into_inner())
}

fn readme(project: &ProjectStructure) -> String {
    format!(
        "# {name} export\n\n\
        Exported from {platform} ({confidence}% confidence) by NoCodeBridge.\n\n\
        ## Files\n\
        - `{markdown}`: **Start here** - paste it into your AI assistant to discuss or rebuild the app\n\
        - `{json}`: canonical project record, re-importable without loss\n\
        - `{uap}`: Universal App Profile envelope for moving the project between builders\n\n\
        ## Contents\n\
        - {pages} pages\n\
        - {components} components\n\
        - {models} data models\n\
        - {workflows} workflows\n",
        name = project.name,
        platform = project.platform,
        confidence = (project.confidence.clamp(0.0, 1.0) * 100.0).round(),
        markdown = BUNDLE_MARKDOWN,
        json = BUNDLE_JSON,
        uap = BUNDLE_UAP,
        pages = project.pages.len(),
        components = project.components.len(),
        models = project.data_models.len(),
        workflows = project.workflows.len(),
    )
}

/// Writes export artifacts into `<output_dir>/<project-slug>/`.
pub struct ProjectExporter {
    project_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ProjectExporter {
    pub fn new(output_dir: &Path, project: &ProjectStructure) -> std::io::Result<Self> {
        let project_dir = output_dir.join(project.slug());
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            project_dir,
            written: Vec::new(),
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn write_artifact(&mut self, artifact: &ExportArtifact) -> std::io::Result<PathBuf> {
        let path = self.project_dir.join(&artifact.filename);
        fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), mime = artifact.mime_type, "export written");
        self.written.push(path.clone());
        Ok(path)
    }

    /// Writes the README next to the artifacts and returns every written path.
    pub fn finish(mut self, project: &ProjectStructure) -> std::io::Result<Vec<PathBuf>> {
        let readme_path = self.project_dir.join(BUNDLE_README);
        fs::write(&readme_path, readme(project))?;
        self.written.push(readme_path);
        Ok(self.written)
    }
}
