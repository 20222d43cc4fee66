//! Application settings, read from `settings.toml` in the working directory
//! and overridden by `SPLITLEDGER__*` environment variables, e.g.
//! `SPLITLEDGER__SERVER__PORT=8080`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Engine {
    #[serde(default = "strict_by_default")]
    pub strict_authorization: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            strict_authorization: strict_by_default(),
        }
    }
}

fn strict_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub engine: Engine,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPLITLEDGER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
