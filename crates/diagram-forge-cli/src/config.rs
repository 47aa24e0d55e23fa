use std::path::{Path, PathBuf};

use diagram_forge_dsl::{LowerOptions, ParseOptions, DEFAULT_MAX_INPUT_BYTES};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// CLI configuration loaded from diagram-forge.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub dsl: DslConfig,
    #[serde(default)]
    pub cli: CliSettings,
}

/// Parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DslConfig {
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Database type for documents without a Project block.
    #[serde(default)]
    pub default_database_type: Option<String>,
}

impl Default for DslConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            default_database_type: None,
        }
    }
}

/// CLI-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "default_diagram_dir")]
    pub default_diagram_dir: String,
    /// File extension searched for inside directories, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_diagram_dir: default_diagram_dir(),
            extension: default_extension(),
        }
    }
}

fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

fn default_diagram_dir() -> String {
    "diagrams/".to_string()
}

fn default_extension() -> String {
    "dbml".to_string()
}

impl CliConfig {
    /// Parser options derived from the `[dsl]` section.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            lower: LowerOptions {
                default_database_type: self.dsl.default_database_type.clone(),
                ..LowerOptions::default()
            },
            max_input_bytes: self.dsl.max_input_bytes,
        }
    }

    /// The given paths, or the configured diagram directory when none are given.
    pub fn input_paths(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if paths.is_empty() {
            vec![PathBuf::from(&self.cli.default_diagram_dir)]
        } else {
            paths.to_vec()
        }
    }
}

/// Discovery order for config file:
/// 1. `--config <path>` (explicit, also fed by `DIAGRAM_FORGE_CONFIG`)
/// 2. `./diagram-forge.toml` (project-local)
/// 3. `$XDG_CONFIG_HOME/diagram-forge/config.toml`
/// 4. `~/.config/diagram-forge/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    let local = PathBuf::from("diagram-forge.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("diagram-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/diagram-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
