//! Torrent list ordering.

use std::cmp::Ordering;

use qbdash_api_models::Torrent;

/// Order by queue priority: queued torrents ascend, unqueued (`0`) sink to the
/// end. Ties keep their incoming order.
pub fn sort_torrents(torrents: &mut [Torrent]) {
    torrents.sort_by(|left, right| compare_priority(left.priority, right.priority));
}

/// Queue-priority comparison with `0` ordered after every other value.
#[must_use]
pub fn compare_priority(left: u32, right: u32) -> Ordering {
    (left == 0, left).cmp(&(right == 0, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent(hash: &str, priority: u32) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            priority,
            ..Torrent::default()
        }
    }

    #[test]
    fn zero_priority_sorts_last() {
        let mut torrents = vec![torrent("a", 0), torrent("b", 3), torrent("c", 1)];
        sort_torrents(&mut torrents);
        let priorities: Vec<_> = torrents.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 3, 0]);
    }

    #[test]
    fn sort_is_stable_for_unqueued_torrents() {
        let mut torrents = vec![torrent("x", 0), torrent("y", 2), torrent("z", 0)];
        sort_torrents(&mut torrents);
        let hashes: Vec<_> = torrents.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["y", "x", "z"]);
    }
}
