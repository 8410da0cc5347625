use maihere_bot::api::ShopRecord;
use maihere_bot::utils::format::{
    extract_time_from_source, make_source, number_color, shop_block, status_symbol_at,
};

#[test]
fn source_time_stamp_round_trips() {
    let source = make_source("测试", 42);
    assert!(source.starts_with("测试(42)"));
    assert!(extract_time_from_source(&source).is_some());

    assert_eq!(extract_time_from_source("时间：08:30:00"), Some(8 * 3600 + 30 * 60));
    assert_eq!(extract_time_from_source("没有时间戳"), None);
}

#[test]
fn freshness_buckets() {
    let source = "玩家(1) \n时间：12:00:00";
    let noon = 12 * 3600;

    assert_eq!(status_symbol_at(source, noon + 1800), "🟩 1小时内");
    assert_eq!(status_symbol_at(source, noon + 3600), "🟩 1小时内");
    assert_eq!(status_symbol_at(source, noon + 5400), "🟨 1-2小时");
    assert_eq!(status_symbol_at(source, noon + 7201), "🟥 2小时前");
    assert_eq!(status_symbol_at("无法解析", noon), "");
}

#[test]
fn freshness_wraps_past_midnight() {
    // 23:30 上报, 00:30 查询: 实际只过了1小时
    let source = "玩家(1) \n时间：23:30:00";
    assert_eq!(status_symbol_at(source, 1800), "🟩 1小时内");
}

#[test]
fn crowd_color_thresholds() {
    assert_eq!(number_color(0), "🟩");
    assert_eq!(number_color(6), "🟨");
    assert_eq!(number_color(7), "🟥");
    assert_eq!(number_color(12), "🟥");
    assert_eq!(number_color(13), "");
}

#[test]
fn shop_block_falls_back_for_missing_fields() {
    let record = ShopRecord {
        id: 42,
        ..Default::default()
    };
    let block = shop_block(&record);
    assert!(block.starts_with("机厅42(42)"));
    assert!(block.contains("当前：0 人"));
    assert!(block.contains("来源：未知来源"));
}
