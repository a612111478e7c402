use crate::utils::error::{InfraError, Result};
use crate::utils::validation::Validate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;

static ENV_PLACEHOLDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// 依副檔名判斷格式，未知副檔名一律當作 TOML
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => ConfigFormat::Json,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }
}

/// 從檔案讀取設定。
///
/// 檔案不存在或檔案中缺少的欄位，會使用欄位上 `#[serde(default)]` 宣告的預設值。
/// 檔案存在但無法解析時回傳 `ConfigLoadError`。
pub fn read_config_from_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let shown = path.display().to_string();

    // 只有檔案不存在才使用預設值，權限不足等錯誤要回報
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Config file {} not found, using declared defaults", shown);
            return toml::from_str("").map_err(|e| InfraError::config_load(shown, e));
        }
        Err(e) => return Err(InfraError::config_load(shown, e)),
    };

    parse_config_str(&content, ConfigFormat::from_path(path))
        .map_err(|e| InfraError::config_load(shown, e))
}

/// 讀取設定後執行 [`Validate`]
pub fn read_validated_config<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned + Validate,
    P: AsRef<Path>,
{
    let config: T = read_config_from_file(path)?;
    config.validate()?;
    Ok(config)
}

/// 從字串解析設定，會先替換 `${VAR}` 環境變數
pub fn parse_config_str<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
) -> std::result::Result<T, Box<dyn std::error::Error + Send + Sync>> {
    let processed = substitute_env_vars(content);

    let config = match format {
        ConfigFormat::Toml => toml::from_str(&processed)?,
        ConfigFormat::Json => serde_json::from_str(&processed)?,
        ConfigFormat::Yaml if processed.trim().is_empty() => serde_yaml::from_str("{}")?,
        ConfigFormat::Yaml => serde_yaml::from_str(&processed)?,
    };
    Ok(config)
}

/// 替換環境變數 (例如 ${DB_PASSWORD})，找不到的變數保留原文
fn substitute_env_vars(content: &str) -> String {
    let Some(re) = ENV_PLACEHOLDER.as_ref() else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
