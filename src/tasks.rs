use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::store::Store;

/// Periodically re-warm the cache for every subscribed shop. `get_shop`
/// persists cache updates itself, so a pass through all ids is enough.
/// The loop never exits; per-shop failures are logged inside the client
/// and the next tick retries.
pub async fn refresh_loop(store: Arc<Store>, api: ApiClient, interval: Duration) {
    loop {
        let shop_ids: BTreeSet<u64> = {
            let subs = store.subscriptions.read().await;
            subs.values()
                .flat_map(|entry| entry.shops.keys().copied())
                .collect()
        };

        if !shop_ids.is_empty() {
            let total = shop_ids.len();
            let mut refreshed = 0;
            for shop_id in shop_ids {
                if api.get_shop(shop_id).await.is_some() {
                    refreshed += 1;
                }
            }
            tracing::info!("机厅缓存刷新完成: {refreshed}/{total}");
        }

        tokio::time::sleep(interval).await;
    }
}
