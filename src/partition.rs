//! Splitting a post ID range into page-sized batches
//!
//! The API returns at most [`PAGE_LIMIT`] posts per request, so a run over
//! `[start, stop)` is cut into contiguous half-open sub-ranges no wider than
//! that limit. Each sub-range is one unit of work for a worker.

use crate::error::{Error, Result};
use crate::types::PostId;
use std::fmt;

/// Hard page limit imposed by the server
pub const PAGE_LIMIT: i64 = 20;

/// Half-open interval of post IDs: `start <= id < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
    /// First post ID included in the range
    pub start: PostId,
    /// First post ID after the range
    pub end: PostId,
}

impl IdRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: PostId, end: PostId) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, stop: end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one post
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] for `PostId::MAX`, whose range end is
    /// not representable.
    pub fn single(id: PostId) -> Result<Self> {
        let end = id
            .checked_add(1)
            .ok_or(Error::InvalidRange { start: id, stop: id })?;
        Ok(Self { start: id, end })
    }

    /// Number of post IDs covered
    pub fn len(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// True if the range covers no IDs
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if `id` falls inside the range
    pub fn contains(&self, id: PostId) -> bool {
        self.start <= id && id < self.end
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Lazy sequence of consecutive batches, produced by [`partition`]
#[derive(Debug, Clone)]
pub struct Batches {
    next: PostId,
    stop: PostId,
    limit: i64,
}

impl Batches {
    /// Number of batches not yet yielded
    pub fn remaining(&self) -> u64 {
        if self.next >= self.stop {
            return 0;
        }
        let width = (i128::from(self.stop) - i128::from(self.next)) as u128;
        let limit = self.limit as u128;
        width.div_ceil(limit) as u64
    }
}

impl Iterator for Batches {
    type Item = IdRange;

    fn next(&mut self) -> Option<IdRange> {
        if self.next >= self.stop {
            return None;
        }
        let end = self.next.saturating_add(self.limit).min(self.stop);
        let range = IdRange {
            start: self.next,
            end,
        };
        self.next = end;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Split `[start, stop)` into consecutive batches of at most `limit` IDs
///
/// `start == stop` denotes a single post and yields `[start, start + 1)`.
/// Batches are computed on demand, so the widest ID space costs no memory up
/// front.
///
/// # Errors
/// Returns [`Error::InvalidRange`] if `start > stop` or for a single post at
/// `PostId::MAX`, and [`Error::Config`] if `limit` is not positive.
pub fn partition(start: PostId, stop: PostId, limit: i64) -> Result<Batches> {
    if limit <= 0 {
        return Err(Error::Config {
            message: format!("page limit must be positive, got {}", limit),
            key: Some("page_limit".to_string()),
        });
    }
    if start > stop {
        return Err(Error::InvalidRange { start, stop });
    }
    let stop = if start == stop {
        IdRange::single(start)?.end
    } else {
        stop
    };

    Ok(Batches {
        next: start,
        stop,
        limit,
    })
}

/// Invariant check run before a batch is requested
///
/// A batch wider than the page limit means the partitioner is broken; the
/// resulting error is fatal.
pub fn check_batch_width(range: IdRange, limit: i64) -> Result<()> {
    if range.len() > limit {
        return Err(Error::BatchTooWide {
            requested: range.len(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(start: i64, stop: i64, limit: i64) {
        let ranges: Vec<IdRange> = partition(start, stop, limit).unwrap().collect();

        assert_eq!(ranges.first().map(|r| r.start), Some(start));
        assert_eq!(ranges.last().map(|r| r.end), Some(stop));
        for r in &ranges {
            assert!(!r.is_empty(), "empty batch {r} for [{start}, {stop})");
            assert!(r.len() <= limit, "batch {r} wider than {limit}");
        }
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap at {}", pair[0]);
        }
    }

    #[test]
    fn test_partition_covers_range_exactly() {
        for (start, stop) in [(1, 2), (1, 20), (1, 21), (1, 41), (0, 100), (7, 1000), (5, 26)] {
            assert_exact_cover(start, stop, PAGE_LIMIT);
        }
        assert_exact_cover(3, 17, 1);
        assert_exact_cover(3, 17, 5);
    }

    #[test]
    fn test_partition_full_page() {
        let ranges: Vec<IdRange> = partition(20, 40, PAGE_LIMIT).unwrap().collect();
        assert_eq!(ranges, vec![IdRange { start: 20, end: 40 }]);
    }

    #[test]
    fn test_partition_two_pages() {
        let ranges: Vec<IdRange> = partition(1, 41, PAGE_LIMIT).unwrap().collect();
        assert_eq!(
            ranges,
            vec![IdRange { start: 1, end: 21 }, IdRange { start: 21, end: 41 }]
        );
    }

    #[test]
    fn test_partition_clips_last_batch() {
        let ranges: Vec<IdRange> = partition(1, 45, PAGE_LIMIT).unwrap().collect();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], IdRange { start: 41, end: 45 });
    }

    #[test]
    fn test_partition_single_post() {
        let ranges: Vec<IdRange> = partition(1234, 1234, PAGE_LIMIT).unwrap().collect();
        assert_eq!(ranges, vec![IdRange::single(1234).unwrap()]);
        assert_eq!(ranges[0].len(), 1);
        assert!(ranges[0].contains(1234));
    }

    #[test]
    fn test_partition_rejects_reversed_range() {
        let err = partition(10, 5, PAGE_LIMIT).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { start: 10, stop: 5 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_partition_rejects_zero_limit() {
        assert!(matches!(
            partition(1, 10, 0),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_partition_extreme_bounds() {
        let mut batches = partition(0, i64::MAX, PAGE_LIMIT).unwrap();
        assert_eq!(batches.remaining(), (i64::MAX as u64).div_ceil(20));
        assert_eq!(batches.next(), Some(IdRange { start: 0, end: 20 }));

        let tail: Vec<IdRange> = partition(i64::MAX - 25, i64::MAX, PAGE_LIMIT)
            .unwrap()
            .collect();
        assert_eq!(
            tail,
            vec![
                IdRange { start: i64::MAX - 25, end: i64::MAX - 5 },
                IdRange { start: i64::MAX - 5, end: i64::MAX },
            ]
        );

        let wide: Vec<IdRange> = partition(i64::MIN, i64::MIN + 30, PAGE_LIMIT)
            .unwrap()
            .collect();
        assert_eq!(wide.len(), 2);
        assert_eq!(
            partition(i64::MIN, i64::MAX, PAGE_LIMIT).unwrap().remaining(),
            u64::MAX / 20 + 1
        );
    }

    #[test]
    fn test_single_post_at_max_id_is_rejected() {
        assert!(matches!(
            IdRange::single(i64::MAX),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            partition(i64::MAX, i64::MAX, PAGE_LIMIT),
            Err(Error::InvalidRange { .. })
        ));
        let last: Vec<IdRange> = partition(i64::MAX - 1, i64::MAX - 1, PAGE_LIMIT)
            .unwrap()
            .collect();
        assert_eq!(last, vec![IdRange { start: i64::MAX - 1, end: i64::MAX }]);
    }

    #[test]
    fn test_check_batch_width() {
        assert!(check_batch_width(IdRange { start: 1, end: 21 }, PAGE_LIMIT).is_ok());
        let err = check_batch_width(IdRange { start: 1, end: 22 }, PAGE_LIMIT).unwrap_err();
        assert!(matches!(
            err,
            Error::BatchTooWide {
                requested: 21,
                limit: 20
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_id_range_new_validates_order() {
        assert!(IdRange::new(5, 5).unwrap().is_empty());
        assert!(IdRange::new(6, 5).is_err());
        assert_eq!(IdRange::new(53, 56).unwrap().to_string(), "[53, 56)");
    }
}
