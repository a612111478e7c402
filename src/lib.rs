pub mod config;
pub mod database;
pub mod logger;
pub mod utils;

#[doc(hidden)]
pub use tracing as __tracing;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{read_config_from_file, AppConfig};
pub use database::{connect, ModelConverter, MySqlConfig};
pub use logger::LogConfig;
pub use utils::copy::{copy, copy_slice, copy_to, must_copy, must_copy_slice, must_copy_to};
pub use utils::error::{InfraError, Result};
