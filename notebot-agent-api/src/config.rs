use config::{Config, ConfigError, Environment, File};
use notebot_auth::JwtSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: JwtSettings,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    notebot_llm_sdk::openai::client::DEFAULT_MODEL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl NotesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8000

[auth]
# Must match the notes service
# secret_key = "change-me"
algorithm = "HS256"
access_token_expire_minutes = 30

[llm]
# base_url = "https://api.openai.com"
# api_key = "your-openai-key"   # or set OPENAI_API_KEY
model = "gpt-4o-mini-2024-07-18"

[notes]
base_url = "http://127.0.0.1:8080"
timeout_secs = 30

[session]
idle_timeout_secs = 60

[cors]
allowed_origins = ["http://localhost:3000"]
"#;

impl AgentApiConfig {
    /// Load the configuration from `path`, or from the default location when
    /// none is given, with `NOTEBOT__SECTION__KEY` variables layered on top.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = match path {
            Some(path) => path,
            None => {
                let path = get_config_path();
                write_default_config(&path)?;
                path
            }
        };

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix("NOTEBOT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AgentApiConfig = builder.try_deserialize()?;

        if config.llm.api_key.as_deref().map_or(true, str::is_empty) {
            config.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        config.validate()?;
        Ok((config, config_path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.auth.is_configured() {
            return Err(ConfigError::Message(
                "auth.secret_key must be set".to_string(),
            ));
        }
        Ok(())
    }
}

fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::Message(format!("Failed to create config directory: {e}"))
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| ConfigError::Message(format!("Failed to write default config: {e}")))
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("notebot/agent.toml")
    } else {
        PathBuf::from("agent.toml")
    }
}
