//! Static split of the particle index range across workers.

use std::ops::Range;

/// Half-open index range `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Split `0..n` into `k` contiguous ranges of `n / k` elements each; the last
/// range also takes the `n % k` remainder.
///
/// When `n < k` every range but the last is empty. `k` must be at least 1.
pub fn partition(n: usize, k: usize) -> Vec<Partition> {
    debug_assert!(k >= 1, "partition needs at least one worker");
    let k = k.max(1);
    let chunk = n / k;
    (0..k)
        .map(|i| {
            let start = i * chunk;
            let end = if i == k - 1 { n } else { start + chunk };
            Partition { start, end }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(parts: &[Partition], n: usize) {
        let mut next = 0;
        for p in parts {
            assert_eq!(p.start, next, "gap or overlap at {:?}", p);
            assert!(p.start <= p.end);
            next = p.end;
        }
        assert_eq!(next, n);
        assert_eq!(parts.iter().map(Partition::len).sum::<usize>(), n);
    }

    #[test]
    fn test_even_split() {
        let parts = partition(1000, 4);
        let ranges: Vec<_> = parts.iter().map(Partition::range).collect();
        assert_eq!(ranges, vec![0..250, 250..500, 500..750, 750..1000]);
    }

    #[test]
    fn test_remainder_goes_to_last() {
        let parts = partition(10, 3);
        let ranges: Vec<_> = parts.iter().map(Partition::range).collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_fewer_particles_than_workers() {
        let parts = partition(2, 4);
        assert_eq!(parts.len(), 4);
        assert!(parts[..3].iter().all(Partition::is_empty));
        assert_eq!(parts[3].range(), 0..2);
        assert_covers(&parts, 2);
    }

    #[test]
    fn test_no_particles() {
        let parts = partition(0, 3);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(Partition::is_empty));
    }

    #[test]
    fn test_single_worker_takes_everything() {
        assert_eq!(partition(17, 1), vec![Partition { start: 0, end: 17 }]);
    }

    #[test]
    fn test_coverage_and_sizes_over_grid() {
        for n in 0..200 {
            for k in 1..12 {
                let parts = partition(n, k);
                assert_eq!(parts.len(), k);
                assert_covers(&parts, n);
                for p in &parts[..k - 1] {
                    assert_eq!(p.len(), n / k);
                }
                assert_eq!(parts[k - 1].len(), n / k + n % k);
            }
        }
    }

    #[test]
    fn test_disjoint() {
        let parts = partition(103, 7);
        for i in 0..103 {
            assert_eq!(parts.iter().filter(|p| p.contains(i)).count(), 1);
        }
    }
}
