use std::sync::LazyLock;

use chrono::Timelike;
use regex::Regex;

use crate::api::ShopRecord;

static SOURCE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"时间：(\d{2}):(\d{2}):(\d{2})").expect("source time regex"));

/// Seconds-of-day embedded in a shop's `shop_source` stamp, if any.
pub fn extract_time_from_source(shop_source: &str) -> Option<u32> {
    let caps = SOURCE_TIME.captures(shop_source)?;
    let h: u32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let s: u32 = caps[3].parse().ok()?;
    Some(h * 3600 + m * 60 + s)
}

/// Freshness symbol for a report stamp, given the current seconds-of-day.
/// Reports without a parsable stamp get no symbol.
pub fn status_symbol_at(shop_source: &str, now_sec: u32) -> &'static str {
    let Some(reported) = extract_time_from_source(shop_source) else {
        return "";
    };
    let mut diff = now_sec as i64 - reported as i64;
    if diff < 0 {
        diff += 24 * 3600; // 跨天
    }
    let hours = diff as f64 / 3600.0;
    if hours <= 1.0 {
        "🟩 1小时内"
    } else if hours <= 2.0 {
        "🟨 1-2小时"
    } else {
        "🟥 2小时前"
    }
}

pub fn status_symbol(shop_source: &str) -> &'static str {
    let now = chrono::Local::now();
    status_symbol_at(shop_source, now.num_seconds_from_midnight())
}

pub fn number_color(number: u32) -> &'static str {
    if number == 0 {
        "🟩"
    } else if number <= 6 {
        "🟨"
    } else if number <= 12 {
        "🟥"
    } else {
        ""
    }
}

/// Full three-line rendering of one shop for query replies.
pub fn shop_block(record: &ShopRecord) -> String {
    let name = shop_display_name(record);
    let source = if record.shop_source.is_empty() {
        "未知来源"
    } else {
        record.shop_source.as_str()
    };
    format!(
        "{name}({})\n当前：{} 人{} {}\n来源：{source}",
        record.id,
        record.shop_number,
        number_color(record.shop_number),
        status_symbol(&record.shop_source)
    )
}

/// Short two-line rendering for city listings.
pub fn shop_line(record: &ShopRecord) -> String {
    format!(
        "{}({})\n{} 人{} {}",
        shop_display_name(record),
        record.id,
        record.shop_number,
        number_color(record.shop_number),
        status_symbol(&record.shop_source)
    )
}

pub fn shop_display_name(record: &ShopRecord) -> String {
    if record.shop_name.is_empty() {
        format!("机厅{}", record.id)
    } else {
        record.shop_name.clone()
    }
}

/// Source stamp attached to uploads; `status_symbol` parses it back out.
pub fn make_source(nickname: &str, user_id: u64) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    format!("{nickname}({user_id}) \n时间：{timestamp}")
}
