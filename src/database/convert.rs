use crate::utils::copy::{copy, copy_slice, copy_to, copy_to_with, CopyOptions};
use crate::utils::error::{InfraError, Result};
use sea_orm::DbErr;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// 資料層 MODEL 與應用層 DOMAIN 之間的轉換器。
///
/// 兩個型別依 serde 欄位名稱對應，轉換器本身沒有狀態，
/// 通常宣告成 `const`：
///
/// ```ignore
/// const USERS: ModelConverter<user::Model, User> = ModelConverter::new();
/// ```
pub struct ModelConverter<MODEL, DOMAIN> {
    _marker: PhantomData<fn() -> (MODEL, DOMAIN)>,
}

impl<MODEL, DOMAIN> ModelConverter<MODEL, DOMAIN> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<MODEL, DOMAIN> Default for ModelConverter<MODEL, DOMAIN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<MODEL, DOMAIN> Clone for ModelConverter<MODEL, DOMAIN> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<MODEL, DOMAIN> Copy for ModelConverter<MODEL, DOMAIN> {}

impl<MODEL, DOMAIN> ModelConverter<MODEL, DOMAIN>
where
    MODEL: Serialize + DeserializeOwned,
    DOMAIN: Serialize + DeserializeOwned,
{
    pub fn to_domain(&self, model: &MODEL) -> Result<DOMAIN> {
        copy(model)
    }

    /// 查詢結果為 `DbErr::RecordNotFound` 時回傳 `Ok(None)`；
    /// 其他錯誤原樣回傳，不做轉換。
    pub fn to_domain_with_error(
        &self,
        lookup: std::result::Result<MODEL, DbErr>,
    ) -> Result<Option<DOMAIN>> {
        match lookup {
            Ok(model) => self.to_domain(&model).map(Some),
            Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(InfraError::DatabaseError(e)),
        }
    }

    /// `find_by_id(..).one(..)` 這類以 `None` 表示找不到的查詢結果
    pub fn to_domain_opt(&self, model: Option<MODEL>) -> Result<Option<DOMAIN>> {
        model.map(|m| self.to_domain(&m)).transpose()
    }

    pub fn to_domains(&self, models: &[MODEL]) -> Result<Vec<DOMAIN>> {
        copy_slice(models)
    }

    pub fn to_model(&self, domain: &DOMAIN) -> Result<MODEL> {
        copy(domain)
    }

    pub fn to_models(&self, domains: &[DOMAIN]) -> Result<Vec<MODEL>> {
        copy_slice(domains)
    }

    pub fn to_model_from(&self, domain: &DOMAIN, model: &mut MODEL) -> Result<()> {
        copy_to(domain, model)
    }

    pub fn to_domain_from(&self, model: &MODEL, domain: &mut DOMAIN) -> Result<()> {
        copy_to(model, domain)
    }

    /// 部分更新：DOMAIN 中的空值不覆蓋既有的 MODEL 欄位
    pub fn patch_model_from(&self, domain: &DOMAIN, model: &mut MODEL) -> Result<()> {
        copy_to_with(domain, model, CopyOptions::ignore_empty())
    }

    pub fn model_to_map(&self, model: &MODEL) -> Result<Map<String, Value>> {
        to_map(model, "model")
    }

    pub fn domain_to_map(&self, domain: &DOMAIN) -> Result<Map<String, Value>> {
        to_map(domain, "domain")
    }
}

/// 依序列化後的欄位名稱（`#[serde(rename)]`）攤平成 map
fn to_map<T: Serialize>(value: &T, kind: &str) -> Result<Map<String, Value>> {
    match serde_json::to_value(value).map_err(InfraError::CopyError)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(InfraError::InvalidInputError {
            message: format!("{kind} is not a struct"),
        }),
    }
}
