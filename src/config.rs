use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::records::StatusCategory;

/// Configuration file structure for `CycleLens`.
///
/// Lets users keep their data source and output preferences in one place.
/// Command-line flags override anything set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Where dashboard records are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,

    /// Status categories, in resolution order
    #[serde(default = "StatusCategory::all")]
    pub categories: Vec<StatusCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Snapshot file path (snapshot sources)
    pub path: Option<PathBuf>,

    /// Dashboard backend base URL (REST sources)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the dashboard backend
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Snapshot,
    Rest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            categories: StatusCategory::all(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Snapshot,
            path: None,
            base_url: default_base_url(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cyclelens.toml
    /// 3. ./cyclelens.json
    /// 4. ./cyclelens.yaml
    /// 5. ./cyclelens.yml
    /// 6. `<user config dir>/cyclelens/cyclelens.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["cyclelens.toml", "cyclelens.json", "cyclelens.yaml", "cyclelens.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(user_config) =
            dirs::config_dir().map(|dir| dir.join("cyclelens").join("cyclelens.toml"))
        {
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
