//! 以欄位名稱對應的結構複製工具。
//!
//! 來源先序列化成 `serde_json::Value`，再反序列化成目標型別，
//! 所以欄位對應依照 serde 的欄位名稱（包含 `#[serde(rename)]`）。
//! 目標缺少的欄位會被忽略；目標必填但來源沒有的欄位會回傳 `CopyError`，
//! 除非目標宣告了 `#[serde(default)]`。

use crate::utils::error::{InfraError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// `copy_to_with` 的選項
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// 來源的空值（null、""、0、false、空陣列、空物件）不覆蓋目標欄位
    pub ignore_empty: bool,
}

impl CopyOptions {
    pub fn ignore_empty() -> Self {
        Self { ignore_empty: true }
    }
}

/// 從 `source` 建立新的 `R`
pub fn copy<T, R>(source: &T) -> Result<R>
where
    T: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let value = serde_json::to_value(source).map_err(InfraError::CopyError)?;
    serde_json::from_value(value).map_err(InfraError::CopyError)
}

/// 逐筆複製，任何一筆失敗就整批失敗
pub fn copy_slice<T, R>(sources: &[T]) -> Result<Vec<R>>
where
    T: Serialize,
    R: DeserializeOwned,
{
    sources.iter().map(copy).collect()
}

/// 複製到呼叫端已持有的 `destination`，來源沒有的欄位保留原值
pub fn copy_to<T, R>(source: &T, destination: &mut R) -> Result<()>
where
    T: Serialize + ?Sized,
    R: Serialize + DeserializeOwned,
{
    copy_to_with(source, destination, CopyOptions::default())
}

pub fn copy_to_with<T, R>(source: &T, destination: &mut R, options: CopyOptions) -> Result<()>
where
    T: Serialize + ?Sized,
    R: Serialize + DeserializeOwned,
{
    let incoming = serde_json::to_value(source).map_err(InfraError::CopyError)?;
    let current = serde_json::to_value(&*destination).map_err(InfraError::CopyError)?;

    let merged = match (current, incoming) {
        (Value::Object(mut target), Value::Object(fields)) => {
            for (name, value) in fields {
                if options.ignore_empty && is_empty(&value) {
                    continue;
                }
                // 目標沒有的欄位在反序列化時會被忽略
                target.insert(name, value);
            }
            Value::Object(target)
        }
        (_, incoming) => {
            if options.ignore_empty && is_empty(&incoming) {
                return Ok(());
            }
            incoming
        }
    };

    *destination = serde_json::from_value(merged).map_err(InfraError::CopyError)?;
    Ok(())
}

#[track_caller]
pub fn must_copy<T, R>(source: &T) -> R
where
    T: Serialize + ?Sized,
    R: DeserializeOwned,
{
    match copy(source) {
        Ok(value) => value,
        Err(e) => panic!("{e}"),
    }
}

#[track_caller]
pub fn must_copy_slice<T, R>(sources: &[T]) -> Vec<R>
where
    T: Serialize,
    R: DeserializeOwned,
{
    match copy_slice(sources) {
        Ok(values) => values,
        Err(e) => panic!("{e}"),
    }
}

#[track_caller]
pub fn must_copy_to<T, R>(source: &T, destination: &mut R)
where
    T: Serialize + ?Sized,
    R: Serialize + DeserializeOwned,
{
    if let Err(e) = copy_to(source, destination) {
        panic!("{e}");
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
