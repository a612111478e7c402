pub mod convert;
pub mod mysql;

pub use convert::ModelConverter;
pub use mysql::{connect, DbLogLevel, MySqlConfig};
