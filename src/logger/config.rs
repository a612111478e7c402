use crate::utils::error::Result;
use crate::utils::validation::{validate_log_file, Validate};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// 日誌等級。`Panic` 與 `Fatal` 在 tracing 中以 ERROR 送出，
/// 由 `severity` 欄位區分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Panic = 4,
    Fatal = 5,
}

impl Level {
    /// 不分大小寫，無法辨識時回傳 `Info`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            "panic" => Level::Panic,
            "fatal" => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Level::Debug => LevelFilter::DEBUG,
            Level::Info => LevelFilter::INFO,
            Level::Warn => LevelFilter::WARN,
            Level::Error | Level::Panic | Level::Fatal => LevelFilter::ERROR,
        }
    }

    pub(crate) fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            4 => Level::Panic,
            _ => Level::Fatal,
        }
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Level::parse(s))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Console,
}

impl Encoding {
    /// 不分大小寫，只有 `console` 會選到 console，其餘一律 JSON
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("console") {
            Encoding::Console
        } else {
            Encoding::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// debug, info, warn, error, panic, fatal
    pub level: String,
    /// json, console
    pub encoding: String,
    /// 開發模式：warn 以上就附上 stacktrace，並記錄執行緒名稱
    pub development: bool,
    pub file_name: PathBuf,
    /// 單一日誌檔上限，單位 MB
    pub max_size: u64,
    /// 保留的備份數量，0 表示不限
    pub max_backups: usize,
    /// 備份保留天數，0 表示不限
    pub max_age: u64,
    /// 輪替後的檔案是否以 gzip 壓縮
    pub compress: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            encoding: "json".to_string(),
            development: false,
            file_name: PathBuf::from("logs/infrastructure.log"),
            max_size: 128,
            max_backups: 30,
            max_age: 7,
            compress: false,
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> Level {
        Level::parse(&self.level)
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::parse(&self.encoding)
    }

    /// 達到此等級的紀錄會附上 stacktrace
    pub fn stacktrace_level(&self) -> Level {
        if self.development {
            Level::Warn
        } else {
            Level::Error
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> Result<()> {
        validate_log_file("logger.file_name", &self.file_name)
    }
}
