mod persist;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::api::ShopRecord;

/// Locally tracked headcount for a shop a guild has subscribed to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopInfo {
    pub id: u64,
    #[serde(default)]
    pub last_number: u32,
}

impl ShopInfo {
    pub fn new(id: u64) -> Self {
        Self { id, last_number: 0 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupSubscriptions {
    #[serde(default)]
    pub shops: HashMap<u64, ShopInfo>,
}

/// Process-wide cache of raw shop records. Keys in `last_update` are
/// `shop_{id}` / `city_{name}`; a missing entry means infinitely stale.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShopCache {
    #[serde(default)]
    pub shop_data: HashMap<u64, ShopRecord>,
    #[serde(default)]
    pub city_shops: HashMap<String, Vec<ShopRecord>>,
    #[serde(default)]
    pub last_update: HashMap<String, f64>,
}

impl ShopCache {
    pub fn shop_key(id: u64) -> String {
        format!("shop_{id}")
    }

    pub fn city_key(name: &str) -> String {
        format!("city_{name}")
    }

    pub fn fresh_shop(&self, id: u64, now: f64, ttl: f64) -> Option<&ShopRecord> {
        let record = self.shop_data.get(&id)?;
        let updated = self.last_update.get(&Self::shop_key(id)).copied()?;
        (now - updated < ttl).then_some(record)
    }

    pub fn fresh_city(&self, name: &str, now: f64, ttl: f64) -> Option<&[ShopRecord]> {
        let shops = self.city_shops.get(name)?;
        let updated = self.last_update.get(&Self::city_key(name)).copied()?;
        (now - updated < ttl).then_some(shops.as_slice())
    }

    pub fn put_shop(&mut self, record: ShopRecord, now: f64) {
        self.last_update.insert(Self::shop_key(record.id), now);
        self.shop_data.insert(record.id, record);
    }

    pub fn put_city(&mut self, name: &str, shops: Vec<ShopRecord>, now: f64) {
        // 同时更新单个机厅缓存, 摊薄后续单店查询
        for shop in &shops {
            self.put_shop(shop.clone(), now);
        }
        self.last_update.insert(Self::city_key(name), now);
        self.city_shops.insert(name.to_string(), shops);
    }
}

/// Alias -> shop id list, global across guilds. Empty lists are pruned on
/// removal so the map never holds dangling alias keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GlobalAliases {
    #[serde(default)]
    pub alias_to_ids: HashMap<String, Vec<u64>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RateLimitEntry {
    #[serde(default)]
    pub timestamps: Vec<f64>,
    #[serde(default)]
    pub banned_until: f64,
}

pub type RateLimitLedger = HashMap<u64, HashMap<u64, RateLimitEntry>>;

/// A shop application waiting for super-user review, kept locally so the
/// review flow still works when the remote review API is down.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingShop {
    pub id: u64,
    pub shop_name: String,
    pub city: String,
    pub applicant: String,
    pub add_time: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReviewCache {
    #[serde(default)]
    pub pending_shops: Vec<PendingShop>,
    #[serde(default)]
    pub last_update: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SilentModeConfig {
    #[serde(default)]
    pub silent_groups: HashSet<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserStat {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub nickname: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportStats {
    /// 日期 -> 群 -> 用户 -> 当日上报次数
    #[serde(default)]
    pub daily_stats: HashMap<String, HashMap<u64, HashMap<u64, u32>>>,
    #[serde(default)]
    pub user_stats: HashMap<u64, UserStat>,
    #[serde(default)]
    pub last_update: f64,
}

/// All mutable bot state, loaded from disk at startup and flushed after each
/// mutation. Single-process only: saves are synchronous whole-file rewrites.
pub struct Store {
    data_dir: PathBuf,
    pub subscriptions: RwLock<HashMap<u64, GroupSubscriptions>>,
    pub shop_cache: RwLock<ShopCache>,
    pub aliases: RwLock<GlobalAliases>,
    pub rate_limits: RwLock<RateLimitLedger>,
    pub review_cache: RwLock<ReviewCache>,
    pub silent_mode: RwLock<SilentModeConfig>,
    pub report_stats: RwLock<ReportStats>,
}

impl Store {
    pub fn load(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            tracing::warn!("创建数据目录失败 {}: {e}", data_dir.display());
        }
        Self {
            subscriptions: RwLock::new(persist::load_json(&data_dir.join("subscriptions.json"))),
            shop_cache: RwLock::new(persist::load_json(&data_dir.join("shop_cache.json"))),
            aliases: RwLock::new(persist::load_json(&data_dir.join("aliases.json"))),
            rate_limits: RwLock::new(persist::load_json(&data_dir.join("rate_limit.json"))),
            review_cache: RwLock::new(persist::load_json(&data_dir.join("review_cache.json"))),
            silent_mode: RwLock::new(persist::load_json(&data_dir.join("silent_mode.json"))),
            report_stats: RwLock::new(persist::load_json(&data_dir.join("report_stats.json"))),
            data_dir,
        }
    }

    pub async fn save_subscriptions(&self) {
        let guard = self.subscriptions.read().await;
        persist::save_json(&self.data_dir.join("subscriptions.json"), &*guard);
    }

    pub async fn save_shop_cache(&self) {
        let guard = self.shop_cache.read().await;
        persist::save_json(&self.data_dir.join("shop_cache.json"), &*guard);
    }

    pub async fn save_aliases(&self) {
        let guard = self.aliases.read().await;
        persist::save_json(&self.data_dir.join("aliases.json"), &*guard);
    }

    pub async fn save_rate_limits(&self) {
        let guard = self.rate_limits.read().await;
        persist::save_json(&self.data_dir.join("rate_limit.json"), &*guard);
    }

    pub async fn save_review_cache(&self) {
        let guard = self.review_cache.read().await;
        persist::save_json(&self.data_dir.join("review_cache.json"), &*guard);
    }

    pub async fn save_silent_mode(&self) {
        let guard = self.silent_mode.read().await;
        persist::save_json(&self.data_dir.join("silent_mode.json"), &*guard);
    }

    pub async fn save_report_stats(&self) {
        let guard = self.report_stats.read().await;
        persist::save_json(&self.data_dir.join("report_stats.json"), &*guard);
    }

    /// Idempotent subscribe. Returns true when the shop was newly added.
    pub async fn subscribe(&self, guild_id: u64, shop_id: u64) -> bool {
        let added = {
            let mut subs = self.subscriptions.write().await;
            let entry = subs.entry(guild_id).or_default();
            if entry.shops.contains_key(&shop_id) {
                false
            } else {
                entry.shops.insert(shop_id, ShopInfo::new(shop_id));
                true
            }
        };
        if added {
            self.save_subscriptions().await;
        }
        added
    }

    /// Returns true when the shop was actually removed.
    pub async fn unsubscribe(&self, guild_id: u64, shop_id: u64) -> bool {
        let removed = {
            let mut subs = self.subscriptions.write().await;
            subs.get_mut(&guild_id)
                .map(|entry| entry.shops.remove(&shop_id).is_some())
                .unwrap_or(false)
        };
        if removed {
            self.save_subscriptions().await;
        }
        removed
    }

    pub async fn is_subscribed(&self, guild_id: u64, shop_id: u64) -> bool {
        let subs = self.subscriptions.read().await;
        subs.get(&guild_id)
            .map(|entry| entry.shops.contains_key(&shop_id))
            .unwrap_or(false)
    }

    pub async fn subscribed_ids(&self, guild_id: u64) -> Vec<u64> {
        let subs = self.subscriptions.read().await;
        subs.get(&guild_id)
            .map(|entry| entry.shops.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Sync the locally tracked headcount after a query or update.
    pub async fn set_last_number(&self, guild_id: u64, shop_id: u64, number: u32) {
        {
            let mut subs = self.subscriptions.write().await;
            if let Some(info) = subs
                .get_mut(&guild_id)
                .and_then(|entry| entry.shops.get_mut(&shop_id))
            {
                info.last_number = number;
            }
        }
        self.save_subscriptions().await;
    }

    pub async fn last_number(&self, guild_id: u64, shop_id: u64) -> Option<u32> {
        let subs = self.subscriptions.read().await;
        subs.get(&guild_id)
            .and_then(|entry| entry.shops.get(&shop_id))
            .map(|info| info.last_number)
    }

    /// Returns false when the binding already existed.
    pub async fn add_alias(&self, alias: &str, shop_id: u64) -> bool {
        let added = {
            let mut aliases = self.aliases.write().await;
            let ids = aliases.alias_to_ids.entry(alias.to_string()).or_default();
            if ids.contains(&shop_id) {
                false
            } else {
                ids.push(shop_id);
                true
            }
        };
        if added {
            self.save_aliases().await;
        }
        added
    }

    /// Removes one binding; prunes the alias key once its list is empty.
    pub async fn remove_alias(&self, alias: &str, shop_id: u64) -> bool {
        let removed = {
            let mut aliases = self.aliases.write().await;
            match aliases.alias_to_ids.get_mut(alias) {
                Some(ids) => {
                    let before = ids.len();
                    ids.retain(|&id| id != shop_id);
                    let removed = ids.len() != before;
                    if ids.is_empty() {
                        aliases.alias_to_ids.remove(alias);
                    }
                    removed
                }
                None => false,
            }
        };
        if removed {
            self.save_aliases().await;
        }
        removed
    }

    pub async fn alias_targets(&self, alias: &str) -> Vec<u64> {
        let aliases = self.aliases.read().await;
        aliases.alias_to_ids.get(alias).cloned().unwrap_or_default()
    }

    pub async fn is_silent(&self, guild_id: u64) -> bool {
        self.silent_mode.read().await.silent_groups.contains(&guild_id)
    }

    /// Returns false when the flag already had the requested value.
    pub async fn set_silent(&self, guild_id: u64, silent: bool) -> bool {
        let changed = {
            let mut config = self.silent_mode.write().await;
            if silent {
                config.silent_groups.insert(guild_id)
            } else {
                config.silent_groups.remove(&guild_id)
            }
        };
        if changed {
            self.save_silent_mode().await;
        }
        changed
    }

    /// Bump today's contribution counters for the acting user.
    pub async fn record_report(&self, guild_id: u64, user_id: u64, nickname: &str, now: f64) {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        {
            let mut stats = self.report_stats.write().await;
            *stats
                .daily_stats
                .entry(today)
                .or_default()
                .entry(guild_id)
                .or_default()
                .entry(user_id)
                .or_default() += 1;
            let user = stats.user_stats.entry(user_id).or_default();
            user.total += 1;
            user.nickname = nickname.to_string();
            stats.last_update = now;
        }
        self.save_report_stats().await;
    }
}
