use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::models::{extract_city_id, ShopRecord};
use crate::config;
use crate::store::{ShopCache, Store};
use crate::utils::now_ts;

/// Errors from the remote shop directory. Callers mostly degrade to cached
/// data instead of surfacing these, so the variants stay coarse.
#[derive(Debug)]
pub enum ApiError {
    /// Network, timeout or HTTP-status failure from reqwest.
    Network(reqwest::Error),
    /// The response body was not the JSON shape we expected.
    Decode(String),
    /// The API answered with an `{"error": ...}` body.
    Remote(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "无法连接机厅服务器: {e}"),
            ApiError::Decode(msg) => write!(f, "机厅服务器返回了无法解析的数据: {msg}"),
            ApiError::Remote(msg) => write!(f, "机厅服务器返回错误: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Remote shop directory client with a read-through / write-through cache
/// over the shared `ShopCache`. Headcount data is low stakes and high
/// churn, so lookups favor availability: stale data beats no data.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache_ttl: f64,
    store: Arc<Store>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str, cache_ttl: f64, store: Arc<Store>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::API_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache_ttl,
            store,
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(ApiError::Network)?
            .error_for_status()
            .map_err(ApiError::Network)?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Look up a single shop. Within the TTL the cached record is returned
    /// without touching the network; on remote failure the last cached
    /// record is served regardless of age.
    pub async fn get_shop(&self, shop_id: u64) -> Option<ShopRecord> {
        let now = now_ts();
        {
            let cache = self.store.shop_cache.read().await;
            if let Some(record) = cache.fresh_shop(shop_id, now, self.cache_ttl) {
                return Some(record.clone());
            }
        }

        let fetched = self
            .get_json(
                "/maihere/query/getData_solo.php",
                &[("id", shop_id.to_string())],
            )
            .await;

        match fetched {
            Ok(value) => {
                if let Some(record) = ShopRecord::from_value(&value) {
                    {
                        let mut cache = self.store.shop_cache.write().await;
                        cache.put_shop(record.clone(), now);
                    }
                    self.store.save_shop_cache().await;
                    return Some(record);
                }
            }
            Err(e) => tracing::warn!("查询机厅 {shop_id} 失败: {e}"),
        }

        // 过期缓存兜底
        let cache = self.store.shop_cache.read().await;
        let stale = cache.shop_data.get(&shop_id).cloned();
        if stale.is_some() {
            tracing::debug!("使用过期缓存: shop_{shop_id}");
        }
        stale
    }

    /// Two-phase city lookup: resolve the city name to an id, then fetch
    /// its shop list. A success also warms every individual shop's cache
    /// entry.
    pub async fn get_city_shops(&self, city_name: &str) -> Option<Vec<ShopRecord>> {
        let now = now_ts();
        {
            let cache = self.store.shop_cache.read().await;
            if let Some(shops) = cache.fresh_city(city_name, now, self.cache_ttl) {
                return Some(shops.to_vec());
            }
        }

        let city_data = self
            .get_json(
                "/maihere/query/queryCity.php",
                &[("name", city_name.to_string())],
            )
            .await;

        let city_list = match city_data {
            Ok(Value::Array(list)) if !list.is_empty() => list,
            other => {
                if let Err(e) = other {
                    tracing::warn!("查询城市 {city_name} 失败: {e}");
                }
                // 城市查询失败时尝试过期缓存
                let cache = self.store.shop_cache.read().await;
                return cache.city_shops.get(city_name).cloned();
            }
        };

        let city_id = extract_city_id(&city_list)?;

        let shop_data = self
            .get_json(
                "/maihere/query/getData_city.php",
                &[("cityid", city_id.to_string())],
            )
            .await;

        let entries = match shop_data {
            Ok(Value::Array(entries)) => entries,
            Ok(other) => {
                if let Some(msg) = other.get("error").and_then(Value::as_str) {
                    tracing::warn!("城市 {city_name} 机厅列表返回错误: {msg}");
                }
                return None;
            }
            Err(e) => {
                tracing::warn!("获取城市 {city_name} 机厅列表失败: {e}");
                return None;
            }
        };

        let shops: Vec<ShopRecord> = entries.iter().filter_map(ShopRecord::from_entry).collect();

        {
            let mut cache = self.store.shop_cache.write().await;
            cache.put_city(city_name, shops.clone(), now);
        }
        self.store.save_shop_cache().await;
        Some(shops)
    }

    /// Report a new headcount. The local cache is updated first so readers
    /// see the number immediately; a remote failure is logged but never
    /// rolled back. Short-lived divergence is acceptable for this data.
    pub async fn update_shop_number(&self, shop_id: u64, number: u32, source: &str) -> bool {
        let now = now_ts();
        let cached = {
            let mut cache = self.store.shop_cache.write().await;
            if let Some(record) = cache.shop_data.get_mut(&shop_id) {
                record.shop_number = number;
                record.shop_source = source.to_string();
                cache
                    .last_update
                    .insert(ShopCache::shop_key(shop_id), now);
                true
            } else {
                false
            }
        };
        if cached {
            self.store.save_shop_cache().await;
        }

        let result = self
            .http
            .get(format!("{}/maihere/upload/uploadData.php", self.base_url))
            .query(&[
                ("id", shop_id.to_string()),
                ("number", number.to_string()),
                ("source", source.to_string()),
                ("key", self.api_key.clone()),
                ("uptime", (now as i64).to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("上报机厅 {shop_id} 人数失败: {e}");
                false
            }
        }
    }

    /// Pending shop applications from the remote review queue. The body is
    /// either `{"data": [...]}` or a bare list.
    pub async fn list_pending(&self) -> Result<Vec<ShopRecord>, ApiError> {
        let value = self.get_json("/maihere/location/pass.php", &[]).await?;
        let list = match &value {
            Value::Array(list) => list.clone(),
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(list)) => list.clone(),
                _ => return Err(ApiError::Decode("缺少 data 字段".to_string())),
            },
            _ => return Err(ApiError::Decode("待审核列表格式错误".to_string())),
        };
        Ok(list.iter().filter_map(ShopRecord::from_entry).collect())
    }

    /// Approve one pending shop by id.
    pub async fn pass_shop(&self, shop_id: u64) -> Result<(), ApiError> {
        let value = self
            .get_json(
                "/maihere/location/pass.php",
                &[("pass", shop_id.to_string()), ("key", self.api_key.clone())],
            )
            .await?;
        match value.as_object() {
            Some(map) if map.contains_key("success") => Ok(()),
            Some(map) => Err(ApiError::Remote(
                map.get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("未知返回")
                    .to_string(),
            )),
            None => Err(ApiError::Decode("审核接口返回格式错误".to_string())),
        }
    }

    /// Clear the remote review queue. The endpoint answers in plain text.
    pub async fn clear_review(&self) -> Result<(), ApiError> {
        let text = self
            .http
            .get(format!("{}/maihere/location/clear_review.php", self.base_url))
            .send()
            .await
            .map_err(ApiError::Network)?
            .text()
            .await
            .map_err(ApiError::Network)?;
        if text.contains("成功修改了") || text.to_lowercase().contains("success") {
            Ok(())
        } else {
            Err(ApiError::Remote(text))
        }
    }
}
