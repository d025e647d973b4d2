use crate::currency::Currency;
use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "invest_smart.toml";
pub const ENV_PREFIX: &str = "INVEST_SMART";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Where the local store keeps its JSON files.
    pub data_dir: PathBuf,
    /// JSON instrument catalog; the built-in demo pool when unset.
    pub catalog_path: Option<PathBuf>,
    pub analysis_delay_ms: u64,
    pub default_currency: Currency,
    pub log_level: String,
}

impl Settings {
    /// Defaults, then the TOML file (optional), then `INVEST_SMART__*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("data_dir", ".invest_smart")?
            .set_default("analysis_delay_ms", 2000_i64)?
            .set_default("default_currency", "BRL")?
            .set_default("log_level", "info")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}
