pub mod file;

use crate::database::MySqlConfig;
use crate::logger::LogConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

pub use file::{parse_config_str, read_config_from_file, read_validated_config, ConfigFormat};

#[cfg(feature = "cli")]
use clap::Parser;

/// 應用程式設定檔：`[logger]` 與 `[mysql]` 兩個區段，都可省略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logger: LogConfig,
    pub mysql: MySqlConfig,
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.logger.validate()?;
        self.mysql.validate()
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "infra-kit")]
#[command(about = "Load infrastructure config, start the logger and check the database")]
pub struct CliConfig {
    /// Path to the configuration file (TOML, JSON or YAML)
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Open a connection and ping the database
    #[arg(long)]
    pub connect: bool,

    #[arg(short, long, help = "Force debug level logging")]
    pub verbose: bool,
}
