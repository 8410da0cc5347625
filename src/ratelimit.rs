use crate::config;
use crate::store::{RateLimitEntry, Store};

#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_count: usize,
    pub window_secs: f64,
    pub ban_secs: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_count: config::RATE_LIMIT_COUNT,
            window_secs: config::RATE_LIMIT_WINDOW,
            ban_secs: config::BAN_DURATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    /// Rejected; seconds until the ban lifts.
    Banned { remaining_secs: u64 },
}

impl Verdict {
    pub fn rejection_message(self) -> Option<String> {
        match self {
            Verdict::Allowed => None,
            Verdict::Banned { remaining_secs } => {
                Some(format!("操作过于频繁，请等待{remaining_secs}秒后再试"))
            }
        }
    }
}

/// Sliding-window check for one (group, user) ledger entry.
///
/// While banned, nothing is recorded and the remaining cooldown is
/// reported. Otherwise timestamps outside the window are pruned; hitting
/// the threshold sets `banned_until` without recording the attempt, and an
/// allowed attempt records its own timestamp. Ban expiry is implicit: once
/// `now` passes `banned_until` the next check falls through to the prune
/// path again.
pub fn check(entry: &mut RateLimitEntry, now: f64, limits: &Limits) -> Verdict {
    if now < entry.banned_until {
        return Verdict::Banned {
            remaining_secs: (entry.banned_until - now).ceil() as u64,
        };
    }

    entry.timestamps.retain(|&ts| now - ts <= limits.window_secs);

    if entry.timestamps.len() >= limits.max_count {
        entry.banned_until = now + limits.ban_secs;
        return Verdict::Banned {
            remaining_secs: limits.ban_secs as u64,
        };
    }

    entry.timestamps.push(now);
    Verdict::Allowed
}

/// Ledger-backed check; persists whenever the entry changed.
pub async fn check_and_record(store: &Store, guild_id: u64, user_id: u64, now: f64) -> Verdict {
    let (verdict, changed) = {
        let mut ledger = store.rate_limits.write().await;
        let entry = ledger
            .entry(guild_id)
            .or_default()
            .entry(user_id)
            .or_default();
        // 仍在封禁期内的拒绝不改动任何状态, 无需落盘
        let untouched = now < entry.banned_until;
        (check(entry, now, &Limits::default()), !untouched)
    };
    if changed {
        store.save_rate_limits().await;
    }
    verdict
}
