//! Utility functions and helpers.

pub mod browser;
pub mod report;
#[cfg(test)]
pub(crate) mod testing;
pub mod url;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

/// Case-folded ordering with a byte-order tiebreak, so "alice" and "Alice"
/// sort next to each other and the result is total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Remove exact duplicates and sort with [`locale_cmp`]. Idempotent.
pub fn sort_dedup(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
    items.sort_by(|a, b| locale_cmp(a, b));
}

/// Remove duplicates while keeping first-seen order.
pub fn dedup_preserve_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// A base delay plus a uniformly random extra in `0..=jitter_ms`.
pub fn jittered(base_ms: u64, jitter_ms: u64) -> Duration {
    let extra = if jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=jitter_ms)
    };
    Duration::from_millis(base_ms.saturating_add(extra))
}

/// Sleep for `duration`, skipping the timer entirely for zero.
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_dedup_idempotent() {
        let mut items = vec![
            "b".to_string(),
            "A".to_string(),
            "a".to_string(),
            "b".to_string(),
        ];
        sort_dedup(&mut items);
        assert_eq!(items, vec!["A", "a", "b"]);

        let mut again = items.clone();
        sort_dedup(&mut again);
        assert_eq!(again, items);
    }

    #[test]
    fn test_sort_is_order_independent() {
        let mut forward = vec!["zeta".to_string(), "Alpha".to_string(), "beta".to_string()];
        let mut backward: Vec<String> = forward.iter().rev().cloned().collect();
        sort_dedup(&mut forward);
        sort_dedup(&mut backward);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_dedup_preserve_order() {
        let out = dedup_preserve_order(["c", "a", "c", "b"].map(String::from));
        assert_eq!(out, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_jittered_bounds() {
        for _ in 0..50 {
            let d = jittered(1000, 1500);
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(2500));
        }
        assert_eq!(jittered(250, 0), Duration::from_millis(250));
    }
}
