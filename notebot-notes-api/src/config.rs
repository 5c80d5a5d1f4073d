use config::{Config, ConfigError, Environment, File};
use notebot_auth::JwtSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotesApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: JwtSettings,
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
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: get_default_db_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl NotesApiConfig {
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

        let mut config: NotesApiConfig = builder.try_deserialize()?;
        config.database.path = expand_tilde(&config.database.path);

        if !config.auth.is_configured() {
            return Err(ConfigError::Message(
                "auth.secret_key must be set".to_string(),
            ));
        }

        Ok((config, config_path))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
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

    let default_config = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
path = "{}"

[auth]
# Must match the agent gateway
# secret_key = "change-me"
algorithm = "HS256"
access_token_expire_minutes = 30

[cors]
allowed_origins = ["*"]
"#,
        get_default_db_path().display()
    );
    std::fs::write(path, default_config)
        .map_err(|e| ConfigError::Message(format!("Failed to write default config: {e}")))
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("notebot/notes.toml")
    } else {
        PathBuf::from("notes.toml")
    }
}

fn get_default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join("notebot/notes.db")
    } else {
        PathBuf::from("notes.db")
    }
}
