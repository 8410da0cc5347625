/// 刷榜检测: 窗口内允许的最大上报次数
pub const RATE_LIMIT_COUNT: usize = 3;
/// 刷榜检测: 滑动窗口长度(秒)
pub const RATE_LIMIT_WINDOW: f64 = 60.0;
/// 刷榜检测: 封禁时长(秒)
pub const BAN_DURATION: f64 = 300.0;

/// 机厅缓存有效期(秒)
pub const CACHE_TTL: f64 = 60.0;
/// 单次上报人数上限, 超过直接拒绝
pub const MAX_REPORT_NUMBER: u32 = 50;
/// 后台缓存刷新间隔(秒)
pub const REFRESH_INTERVAL_SECS: u64 = 60;
/// API 单次请求超时(秒)
pub const API_TIMEOUT_SECS: u64 = 10;

pub struct Config {
    pub discord_token: String,
    pub api_url: String,
    pub api_key: String,
    pub data_dir: String,
    pub super_users: Vec<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            discord_token: std::env::var("DISCORD_TOKEN").expect("需要 DISCORD_TOKEN 环境变量"),
            api_url: std::env::var("MAIHERE_API_URL").expect("需要 MAIHERE_API_URL 环境变量"),
            api_key: std::env::var("MAIHERE_API_KEY").unwrap_or_default(),
            data_dir: std::env::var("MAIHERE_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            super_users: std::env::var("MAIHERE_SUPER_USERS")
                .map(|v| v.split(',').filter_map(|s| s.trim().parse().ok()).collect())
                .unwrap_or_default(),
        }
    }
}
