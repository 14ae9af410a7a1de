//! Fairness grouping: bucket entities by their current win count so the
//! neediest are served first. No randomness; ties inside a bucket are left
//! to the winner selector.

use std::collections::BTreeMap;

use lt_core::Applicant;

/// Anything exposing a current win count.
pub trait WinCount {
    fn win_count(&self) -> usize;
}

impl WinCount for Applicant {
    #[inline]
    fn win_count(&self) -> usize {
        self.wins().len()
    }
}

/// Buckets keyed by win count, ascending. Input order is kept inside each bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairnessGroups<K> {
    buckets: BTreeMap<usize, Vec<K>>,
}

impl<K> FairnessGroups<K> {
    /// Group `(key, entity)` pairs by the entity's win count.
    pub fn build<'a, T, I>(entities: I) -> Self
    where
        T: WinCount + 'a,
        I: IntoIterator<Item = (K, &'a T)>,
    {
        let mut buckets: BTreeMap<usize, Vec<K>> = BTreeMap::new();
        for (key, entity) in entities {
            buckets.entry(entity.win_count()).or_default().push(key);
        }
        Self { buckets }
    }

    /// Distinct win counts, ascending.
    pub fn counts(&self) -> Vec<usize> {
        self.buckets.keys().copied().collect()
    }

    /// Members with exactly `count` wins (empty if none).
    pub fn bucket(&self, count: usize) -> &[K] {
        self.buckets.get(&count).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(count, members)` ascending by count.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[K])> + '_ {
        self.buckets.iter().map(|(c, ks)| (*c, ks.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total members across buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct E(usize);
    impl WinCount for E {
        fn win_count(&self) -> usize { self.0 }
    }

    #[test]
    fn buckets_ascend_and_keep_input_order() {
        let es = [E(2), E(0), E(1), E(0), E(2)];
        let g = FairnessGroups::build(es.iter().enumerate());
        assert_eq!(g.counts(), vec![0, 1, 2]);
        assert_eq!(g.bucket(0), &[1, 3]);
        assert_eq!(g.bucket(1), &[2]);
        assert_eq!(g.bucket(2), &[0, 4]);
        assert_eq!(g.bucket(5), &[] as &[usize]);
        assert_eq!(g.len(), 5);
        let order: Vec<usize> = g.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn empty_input_gives_empty_groups() {
        let es: Vec<E> = Vec::new();
        let g = FairnessGroups::build(es.iter().enumerate());
        assert!(g.is_empty());
        assert!(g.counts().is_empty());
    }
}
