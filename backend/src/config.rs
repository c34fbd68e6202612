use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/biskut.yaml";
pub const DEFAULT_API_URL: &str = "https://serverless.roboflow.com";

/// Upper bound on an upload request, in bytes.
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub pages: PagesConfig,
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub biscuits_dir: PathBuf,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            biscuits_dir: PathBuf::from("templates/biscuits"),
        }
    }
}

/// Credentials stay optional here; the inference gateway decides whether
/// it can run without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub workflow_id: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            workspace_id: None,
            workflow_id: None,
        }
    }
}

impl AppConfig {
    /// Reads `$BISKUT_CONFIG` (or the default path if it exists), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("BISKUT_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigError> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(config_str)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(dir) = var("UPLOAD_FOLDER") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("BISCUITS_DIR") {
            self.pages.biscuits_dir = PathBuf::from(dir);
        }
        if let Some(api_url) = var("ROBOFLOW_API_URL") {
            self.inference.api_url = api_url;
        }
        if let Some(api_key) = var("ROBOFLOW_API_KEY") {
            self.inference.api_key = Some(api_key);
        }
        if let Some(workspace_id) = var("ROBOFLOW_WORKSPACE_ID") {
            self.inference.workspace_id = Some(workspace_id);
        }
        if let Some(workflow_id) = var("ROBOFLOW_WORKFLOW_ID") {
            self.inference.workflow_id = Some(workflow_id);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
