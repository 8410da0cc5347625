use maihere_bot::ratelimit;
use maihere_bot::store::Store;
use maihere_bot::utils::now_ts;

#[tokio::test]
async fn subscribe_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());

    assert!(store.subscribe(100, 42).await);
    assert!(!store.subscribe(100, 42).await);
    assert_eq!(store.subscribed_ids(100).await, vec![42]);

    // Other guilds are unaffected
    assert!(store.subscribed_ids(200).await.is_empty());
}

#[tokio::test]
async fn unsubscribe_removes_only_existing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());

    store.subscribe(100, 42).await;
    assert!(store.unsubscribe(100, 42).await);
    assert!(!store.unsubscribe(100, 42).await);
    assert!(!store.is_subscribed(100, 42).await);
}

#[tokio::test]
async fn alias_removal_prunes_empty_lists() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());

    assert!(store.add_alias("万达", 1).await);
    assert!(store.add_alias("万达", 2).await);
    assert!(!store.add_alias("万达", 1).await);

    assert!(store.remove_alias("万达", 1).await);
    assert_eq!(store.alias_targets("万达").await, vec![2]);

    // Removing the last binding drops the alias key entirely
    assert!(store.remove_alias("万达", 2).await);
    let aliases = store.aliases.read().await;
    assert!(!aliases.alias_to_ids.contains_key("万达"));
}

#[tokio::test]
async fn state_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Store::load(dir.path());
        store.subscribe(100, 42).await;
        store.set_last_number(100, 42, 8).await;
        store.add_alias("abc", 42).await;
        store.set_silent(100, true).await;
    }

    let reloaded = Store::load(dir.path());
    assert!(reloaded.is_subscribed(100, 42).await);
    assert_eq!(reloaded.last_number(100, 42).await, Some(8));
    assert_eq!(reloaded.alias_targets("abc").await, vec![42]);
    assert!(reloaded.is_silent(100).await);
}

#[tokio::test]
async fn silent_mode_toggle_reports_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());

    assert!(!store.is_silent(100).await);
    assert!(store.set_silent(100, true).await);
    assert!(!store.set_silent(100, true).await);
    assert!(store.is_silent(100).await);
    assert!(store.set_silent(100, false).await);
    assert!(!store.is_silent(100).await);
}

#[tokio::test]
async fn report_stats_accumulate_per_day_and_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());
    let now = now_ts();

    store.record_report(100, 7, "玩家A", now).await;
    store.record_report(100, 7, "玩家A", now).await;
    store.record_report(100, 8, "玩家B", now).await;

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let stats = store.report_stats.read().await;
    let group = &stats.daily_stats[&today][&100];
    assert_eq!(group[&7], 2);
    assert_eq!(group[&8], 1);
    assert_eq!(stats.user_stats[&7].total, 2);
    assert_eq!(stats.user_stats[&7].nickname, "玩家A");
}

#[tokio::test]
async fn ledger_records_allowed_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::load(dir.path());
    let now = now_ts();

    let verdict = ratelimit::check_and_record(&store, 100, 7, now).await;
    assert_eq!(verdict, ratelimit::Verdict::Allowed);

    let ledger = store.rate_limits.read().await;
    assert_eq!(ledger[&100][&7].timestamps, vec![now]);
}
