use crate::utils::error::{InfraError, Result};
use crate::utils::validation::{validate_at_least, validate_required, Validate};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// 慢查詢門檻
const SLOW_THRESHOLD: Duration = Duration::from_secs(1);

/// SQL 日誌等級：silent, error, warn, info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbLogLevel {
    Silent,
    Error,
    Warn,
    Info,
}

impl DbLogLevel {
    /// 不分大小寫，無法辨識時回傳 `Silent`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => DbLogLevel::Error,
            "warn" => DbLogLevel::Warn,
            "info" => DbLogLevel::Info,
            _ => DbLogLevel::Silent,
        }
    }

    /// 每一句 SQL 的日誌等級，`None` 表示不記錄
    pub fn statement_level(&self) -> Option<log::LevelFilter> {
        match self {
            DbLogLevel::Info => Some(log::LevelFilter::Info),
            _ => None,
        }
    }

    /// 超過 [`SLOW_THRESHOLD`] 的 SQL 日誌等級
    pub fn slow_statement_level(&self) -> Option<log::LevelFilter> {
        match self {
            DbLogLevel::Warn | DbLogLevel::Info => Some(log::LevelFilter::Warn),
            DbLogLevel::Silent | DbLogLevel::Error => None,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: String,
    /// silent, error, warn, info
    pub log_level: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            db_name: String::new(),
            log_level: "silent".to_string(),
            max_connections: 10,
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for MySqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("log_level", &self.log_level)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl MySqlConfig {
    /// `user:password@tcp(host:port)/dbname?charset=utf8mb4&parseTime=True&loc=Local`
    pub fn dsn(&self) -> String {
        format_dsn(&self.user, &self.password, &self.host, self.port, &self.db_name)
    }

    /// 與 [`dsn`](Self::dsn) 相同但隱藏密碼，用於日誌
    pub fn redacted_dsn(&self) -> String {
        format_dsn(&self.user, "<redacted>", &self.host, self.port, &self.db_name)
    }

    /// sqlx 連線使用的 `mysql://` URL，帳號密碼會做百分比編碼
    pub fn url(&self) -> Result<String> {
        let invalid = |field: &str, value: &str, reason: &str| InfraError::InvalidConfigValueError {
            field: format!("mysql.{field}"),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse("mysql://localhost")
            .map_err(|e| invalid("host", &self.host, &e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| invalid("host", &self.host, &e.to_string()))?;
        url.set_port(Some(self.port))
            .map_err(|_| invalid("port", &self.port.to_string(), "cannot set port"))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("user", &self.user, "cannot set user"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("password", "<redacted>", "cannot set password"))?;
        }
        url.set_path(&self.db_name);
        url.query_pairs_mut().append_pair("charset", "utf8mb4");

        Ok(url.to_string())
    }

    pub fn log_level(&self) -> DbLogLevel {
        DbLogLevel::parse(&self.log_level)
    }

    pub fn connect_options(&self) -> Result<ConnectOptions> {
        let mut options = ConnectOptions::new(self.url()?);
        options
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs));

        let level = self.log_level();
        match (level.statement_level(), level.slow_statement_level()) {
            (None, None) => {
                options.sqlx_logging(false);
            }
            (statements, slow) => {
                options
                    .sqlx_logging(true)
                    .sqlx_logging_level(statements.unwrap_or(log::LevelFilter::Off));
                if let Some(slow) = slow {
                    options.sqlx_slow_statements_logging_settings(slow, SLOW_THRESHOLD);
                }
            }
        }

        Ok(options)
    }
}

impl Validate for MySqlConfig {
    fn validate(&self) -> Result<()> {
        validate_required("mysql.host", &self.host)?;
        validate_at_least("mysql.port", u64::from(self.port), 1)?;
        validate_required("mysql.user", &self.user)?;
        validate_at_least("mysql.max_connections", u64::from(self.max_connections), 1)?;
        validate_at_least("mysql.connect_timeout_secs", self.connect_timeout_secs, 1)
    }
}

fn format_dsn(user: &str, password: &str, host: &str, port: u16, db_name: &str) -> String {
    format!(
        "{}:{}@tcp({}:{})/{}?charset=utf8mb4&parseTime=True&loc=Local",
        user, password, host, port, db_name
    )
}

/// 依設定建立資料庫連線池
pub async fn connect(config: &MySqlConfig) -> Result<DatabaseConnection> {
    let options = config.connect_options()?;
    tracing::debug!("Connecting to mysql: {}", config.redacted_dsn());

    match Database::connect(options).await {
        Ok(db) => {
            tracing::info!(
                host = %config.host,
                port = config.port,
                db_name = %config.db_name,
                "Connected to mysql"
            );
            Ok(db)
        }
        Err(e) => {
            tracing::error!("Failed to connect to mysql {}: {}", config.redacted_dsn(), e);
            Err(InfraError::ConnectionError(e))
        }
    }
}
