//! NoCodeBridge CLI - detect, normalize and export no-code builder projects

use anyhow::Context;
use clap::{Parser, Subcommand};
use nocode_bridge::config::Config;
use nocode_bridge::export::{parse_markdown, ExportFormat, ProjectExporter};
use nocode_bridge::registry;
use nocode_bridge::storage::KeyValueStore;
use nocode_bridge::Analysis;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(name = "nocode-bridge")]
#[command(author, version, about = "Detect and normalize no-code builder projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Match URLs by domain only, never fetch them
    #[arg(long, global = true)]
    offline: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the builder behind a URL, file or stdin (`-`)
    Detect {
        input: String,
        /// Filename hint used when reading stdin
        #[arg(long)]
        filename: Option<String>,
    },

    /// Import an input and write it in another format
    Export {
        input: String,
        /// json, markdown, uap, zip, lovable, bubble, base44 or bolt
        #[arg(long)]
        to: Option<ExportFormat>,
        /// Output directory (defaults to export.output_dir)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Filename hint used when reading stdin
        #[arg(long)]
        filename: Option<String>,
        /// Rename the project before exporting
        #[arg(long)]
        name: Option<String>,
    },

    /// Recover pages and components from an exported Markdown document
    ParseMd { file: PathBuf },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the whole configuration
    Show,
    /// Print one value
    Get { key: String },
    /// Set one value and save
    Set { key: String, value: String },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nocode_bridge=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { input, filename } => {
            init_registry(cli.offline)?;
            let analysis = import(&input, filename.as_deref()).await?;
            print_analysis(&analysis, cli.format)?;
        }
        Commands::Export {
            input,
            to,
            out,
            filename,
            name,
        } => {
            let config = init_registry(cli.offline)?;
            let analysis = import(&input, filename.as_deref()).await?;
            let project = match name {
                Some(name) => registry::rename(&name)?,
                None => analysis.project,
            };

            let format = to.unwrap_or(config.export.default_format);
            let artifact = registry::rebuild(format)?;
            let out_dir = out.unwrap_or(config.export.output_dir);

            let mut exporter = ProjectExporter::new(&out_dir, &project)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let path = exporter.write_artifact(&artifact)?;
            exporter.finish(&project)?;

            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "format": format,
                        "mimeType": artifact.mime_type,
                        "bytes": artifact.bytes.len(),
                    })
                ),
                OutputFormat::Text if !cli.quiet => {
                    println!("✓ {} export written to {}", format, path.display());
                }
                OutputFormat::Text => println!("{}", path.display()),
            }
        }
        Commands::ParseMd { file } => {
            let text = read_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&parse_markdown(&text))?);
        }
        Commands::Config { action } => handle_config(action, cli.format, cli.quiet)?,
    }

    Ok(())
}

/// Loads configuration and the key/value store, then initializes the registry.
fn init_registry(offline: bool) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if offline {
        config.fetch.enabled = false;
    }

    let store = match config.storage_path().and_then(KeyValueStore::open) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "key/value store unavailable, imports will not be persisted");
            None
        }
    };

    registry::init(config.clone(), store)?;
    Ok(config)
}

async fn import(input: &str, filename: Option<&str>) -> anyhow::Result<Analysis> {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(registry::import_url(trimmed).await?);
    }

    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        return Ok(registry::import(&String::from_utf8_lossy(&bytes), filename)?);
    }

    let path = Path::new(input);
    let text = read_file(path)?;
    let name = filename.or_else(|| path.file_name().and_then(|n| n.to_str()));
    Ok(registry::import(&text, name)?)
}

/// Invalid UTF-8 is replaced rather than rejected so every file still imports.
fn read_file(path: &Path) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn print_analysis(analysis: &Analysis, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    let detection = &analysis.detection;
    let project = &analysis.project;
    println!(
        "Platform: {} ({}% confidence)",
        detection.platform,
        detection.percent()
    );
    println!("Reason: {}", detection.reason);
    println!("Recommendation: {}", analysis.recommendation);
    println!("Project: {} [{}]", project.name, project.source_type);
    println!("Quick stats:");
    println!("  - Pages: {}", project.pages.len());
    println!("  - Components: {}", project.components.len());
    println!("  - Data models: {}", project.data_models.len());
    println!("  - Workflows: {}", project.workflows.len());
    Ok(())
}

fn handle_config(action: ConfigAction, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => {
                    for key in Config::KEYS {
                        println!("{} = {}", key, config.get(key)?);
                    }
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}
