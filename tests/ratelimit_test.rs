use maihere_bot::ratelimit::{check, Limits, Verdict};
use maihere_bot::store::RateLimitEntry;

fn limits() -> Limits {
    Limits {
        max_count: 3,
        window_secs: 60.0,
        ban_secs: 300.0,
    }
}

#[test]
fn threshold_bans_the_fourth_attempt() {
    let mut entry = RateLimitEntry::default();
    let limits = limits();

    assert_eq!(check(&mut entry, 1000.0, &limits), Verdict::Allowed);
    assert_eq!(check(&mut entry, 1010.0, &limits), Verdict::Allowed);
    assert_eq!(check(&mut entry, 1020.0, &limits), Verdict::Allowed);

    // Fourth within the window: banned for 300s, attempt not recorded
    let verdict = check(&mut entry, 1030.0, &limits);
    assert_eq!(
        verdict,
        Verdict::Banned {
            remaining_secs: 300
        }
    );
    assert_eq!(entry.banned_until, 1330.0);
    assert_eq!(entry.timestamps.len(), 3);
}

#[test]
fn ban_boundary_is_exact() {
    let mut entry = RateLimitEntry::default();
    let limits = limits();

    for t in [1000.0, 1001.0, 1002.0] {
        assert_eq!(check(&mut entry, t, &limits), Verdict::Allowed);
    }
    check(&mut entry, 1003.0, &limits);
    assert_eq!(entry.banned_until, 1303.0);

    // One second before expiry: still rejected, no state change
    assert_eq!(
        check(&mut entry, 1302.0, &limits),
        Verdict::Banned { remaining_secs: 1 }
    );
    assert_eq!(entry.banned_until, 1303.0);

    // After expiry the check is evaluated fresh; the old timestamps have
    // slid out of the window, so the attempt is allowed
    assert_eq!(check(&mut entry, 1304.0, &limits), Verdict::Allowed);
    assert_eq!(entry.timestamps, vec![1304.0]);
}

#[test]
fn old_timestamps_slide_out_of_the_window() {
    let mut entry = RateLimitEntry::default();
    let limits = limits();

    assert_eq!(check(&mut entry, 1000.0, &limits), Verdict::Allowed);
    assert_eq!(check(&mut entry, 1001.0, &limits), Verdict::Allowed);
    assert_eq!(check(&mut entry, 1002.0, &limits), Verdict::Allowed);

    // 61s later the first three are outside the window
    assert_eq!(check(&mut entry, 1063.0, &limits), Verdict::Allowed);
    assert_eq!(entry.timestamps, vec![1063.0]);
    assert_eq!(entry.banned_until, 0.0);
}

#[test]
fn rejection_message_mentions_remaining_seconds() {
    assert_eq!(Verdict::Allowed.rejection_message(), None);
    let msg = Verdict::Banned { remaining_secs: 42 }
        .rejection_message()
        .unwrap();
    assert!(msg.contains("42秒"));
}
