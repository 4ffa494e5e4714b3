use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "RECORDBOOK";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub listen_addr: String,
    pub data_dir: PathBuf,
    pub log: String,
}

impl Settings {
    /// Defaults overlaid with `RECORDBOOK_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_env(env: Environment) -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("listen_addr", "127.0.0.1:8080")?
            .set_default("data_dir", "./data")?
            .set_default("log", "info")?
            .add_source(env)
            .build()?;
        conf.try_deserialize()
    }
}
