use crate::utils::error::{InfraError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> InfraError {
    InfraError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 日誌檔路徑：不可為空、不可含 NUL，也不能指向既有的目錄
pub fn validate_log_file(field: &str, path: &Path) -> Result<()> {
    let shown = path.display();
    if path.as_os_str().is_empty() {
        return Err(invalid(field, shown, "log file path is empty"));
    }
    if path.to_string_lossy().contains('\0') {
        return Err(invalid(field, shown, "log file path contains a NUL byte"));
    }
    if path.is_dir() {
        return Err(invalid(field, shown, "log file path points to a directory"));
    }
    Ok(())
}

pub fn validate_at_least(field: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be at least {min}")));
    }
    Ok(())
}

/// 連線參數（host、user）不可為空白
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "is required for the connection"));
    }
    Ok(())
}
