// src/core/config_manager.rs
//! Configuration: built-in defaults, then an optional TOML file, then environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const CONFIG_FILE: &str = "resume-builder.toml";
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";
pub const DEFAULT_SCORING_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_TOOLCHAIN: &str = "xelatex";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    pub scoring: ScoringConfig,
    pub toolchain: ToolchainConfig,
    pub server: ServerConfig,
    pub paths: PathsConfig,
}

#[derive(Clone)]
pub struct ScoringConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub url: String,
    /// `None` means the call may take as long as the remote side needs
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub binary: String,
    /// `None` means each compilation may run indefinitely
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    pub templates_dir: Option<PathBuf>,
    /// Defaults to `order.yaml` next to the resume source
    pub order_path: Option<PathBuf>,
}

// Never print the credential
impl fmt::Debug for ScoringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            url: DEFAULT_SCORING_URL.to_string(),
            timeout: None,
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TOOLCHAIN.to_string(),
            timeout: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

// ===== TOML file shape =====

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub scoring: FileScoring,
    pub toolchain: FileToolchain,
    pub server: FileServer,
    pub paths: FilePaths,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileScoring {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileToolchain {
    pub binary: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileServer {
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilePaths {
    pub templates_dir: Option<PathBuf>,
    pub order_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl ConfigManager {
    /// Load configuration from `RESUME_BUILDER_CONFIG` (or `resume-builder.toml`
    /// when present) and the process environment
    pub fn load() -> Result<Self> {
        let file = match std::env::var("RESUME_BUILDER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Some(FileConfig::load(Path::new(&path))?),
            _ if Path::new(CONFIG_FILE).is_file() => Some(FileConfig::load(Path::new(CONFIG_FILE))?),
            _ => None,
        };

        if file.is_some() {
            info!("Loaded configuration file");
        }

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Layer `file` and then `env` over the defaults. Empty env values count as unset.
    pub fn from_sources<F>(file: Option<FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let scoring = ScoringConfig {
            api_key: var("OPENROUTER_API_KEY").or(file.scoring.api_key),
            model: var("OPENROUTER_MODEL")
                .or(file.scoring.model)
                .unwrap_or(defaults.scoring.model),
            url: var("OPENROUTER_URL")
                .or(file.scoring.url)
                .unwrap_or(defaults.scoring.url),
            timeout: match var("RESUME_SCORING_TIMEOUT_SECS") {
                Some(raw) => parse_secs("RESUME_SCORING_TIMEOUT_SECS", &raw)?,
                None => file.scoring.timeout_secs.and_then(secs_to_deadline),
            },
        };

        let toolchain = ToolchainConfig {
            binary: var("RESUME_TOOLCHAIN")
                .or(file.toolchain.binary)
                .unwrap_or(defaults.toolchain.binary),
            timeout: match var("RESUME_TOOLCHAIN_TIMEOUT_SECS") {
                Some(raw) => parse_secs("RESUME_TOOLCHAIN_TIMEOUT_SECS", &raw)?,
                None => file.toolchain.timeout_secs.and_then(secs_to_deadline),
            },
        };

        let port = match var("RESUME_SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid value for RESUME_SERVER_PORT: {}", raw))?,
            None => file.server.port.unwrap_or(defaults.server.port),
        };

        let paths = PathsConfig {
            templates_dir: var("RESUME_TEMPLATES_DIR")
                .map(PathBuf::from)
                .or(file.paths.templates_dir),
            order_path: var("RESUME_ORDER_PATH")
                .map(PathBuf::from)
                .or(file.paths.order_path),
        };

        Ok(Self {
            scoring,
            toolchain,
            server: ServerConfig { port },
            paths,
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Option<Duration>> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
    Ok(secs_to_deadline(secs))
}

/// Zero disables the deadline
fn secs_to_deadline(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Load `.env` into the process environment. A missing file is fine.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }
}
