use qadesk_core::DatasetFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for qadesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum cosine similarity for a stored answer to be returned
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: DatasetFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_audit_file")]
    pub audit_file: String,

    #[serde(default = "default_error_file")]
    pub error_file: String,

    #[serde(default = "default_feedback_file")]
    pub feedback_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_exit_word")]
    pub exit_word: String,

    #[serde(default = "default_true")]
    pub ask_feedback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            dataset: DatasetConfig::default(),
            logs: LogsConfig::default(),
            server: ServerConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            format: DatasetFormat::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
            error_file: default_error_file(),
            feedback_file: default_feedback_file(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            exit_word: default_exit_word(),
            ask_feedback: true,
        }
    }
}

fn default_threshold() -> f64 {
    0.3
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("qa_dataset.txt")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_audit_file() -> String {
    "audit.log".to_string()
}

fn default_error_file() -> String {
    "errors.log".to_string()
}

fn default_feedback_file() -> String {
    "feedback.log".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    17480
}

fn default_exit_word() -> String {
    "exit".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there if it is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            debug!(path = %path.display(), "wrote default config");
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "qadesk", "qadesk") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.qadesk/config.toml")
        }
    }
}
