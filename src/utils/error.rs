use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("copy error: {0}")]
    CopyError(#[source] serde_json::Error),

    #[error("invalid input: {message}")]
    InvalidInputError { message: String },

    #[error("failed to connect to mysql: {0}")]
    ConnectionError(#[source] sea_orm::DbErr),

    #[error("read config from file {path} failed: {source}")]
    ConfigLoadError {
        path: String,
        #[source]
        source: BoxedSource,
    },

    #[error(transparent)]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("logger initialization failed: {message}")]
    LoggerError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端傳入的資料或型別不相容
    Input,
    /// 設定檔或設定值有誤
    Configuration,
    /// 資料庫或檔案系統等外部資源
    External,
}

impl InfraError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            InfraError::CopyError(_) | InfraError::InvalidInputError { .. } => ErrorCategory::Input,
            InfraError::ConfigLoadError { .. }
            | InfraError::InvalidConfigValueError { .. }
            | InfraError::LoggerError { .. } => ErrorCategory::Configuration,
            InfraError::ConnectionError(_)
            | InfraError::DatabaseError(_)
            | InfraError::IoError(_) => ErrorCategory::External,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that both types share field names and compatible field types",
            ErrorCategory::Configuration => "Check the configuration file syntax and values",
            ErrorCategory::External => "Check that the database or file system is reachable and retry",
        }
    }

    pub(crate) fn config_load(
        path: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        InfraError::ConfigLoadError {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InfraError>;
