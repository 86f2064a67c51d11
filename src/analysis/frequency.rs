//! Term frequency accumulation.
//!
//! Producers either call [`FrequencyAggregator::add`] per term or build a
//! [`PageTally`] for one page and hand it over with
//! [`FrequencyAggregator::merge`]. A merge happens under a single lock with
//! no suspension point, so a page is either fully counted or not at all.

use crate::analysis::filter::TermSet;
use crate::models::FrequencyTable;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Term counts for a single page, built without synchronisation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageTally {
    counts: HashMap<String, u64>,
}

impl PageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: impl Into<String>) {
        *self.counts.entry(term.into()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total occurrences recorded.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Shared accumulator safe for concurrent producers.
#[derive(Debug, Default)]
pub struct FrequencyAggregator {
    counts: Mutex<HashMap<String, u64>>,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid counts.
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one occurrence of `term`.
    #[cfg(test)]
    pub fn add(&self, term: &str) {
        *self.lock().entry(term.to_string()).or_insert(0) += 1;
    }

    /// Count every term in `terms`, one occurrence each.
    #[cfg(test)]
    pub fn add_batch<I, T>(&self, terms: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut tally = PageTally::new();
        for term in terms {
            tally.add(term.as_ref());
        }
        self.merge(tally);
    }

    /// Fold a page's local counts into the shared table.
    pub fn merge(&self, tally: PageTally) {
        if tally.is_empty() {
            return;
        }
        let mut counts = self.lock();
        for (term, n) in tally.counts {
            *counts.entry(term).or_insert(0) += n;
        }
    }

    /// Declare aggregation complete and take the final table.
    pub fn finish(self) -> FrequencyTable {
        let counts = self
            .counts
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        FrequencyTable::from_counts(counts.into_iter().collect())
    }
}

impl FrequencyTable {
    /// Drop the `n` most frequent terms, sparing `protected` ones.
    ///
    /// Returns the pruned table and the removed terms in rank order.
    pub fn prune_most_common(&self, n: usize, protected: &TermSet) -> (FrequencyTable, Vec<String>) {
        let removed: Vec<String> = self
            .most_common(n)
            .into_iter()
            .map(|(term, _)| term)
            .filter(|term| !protected.contains(term))
            .map(str::to_string)
            .collect();

        let kept: BTreeMap<String, u64> = self
            .iter()
            .filter(|(term, _)| !removed.iter().any(|r| r == term))
            .map(|(term, count)| (term.to_string(), count))
            .collect();

        debug!(removed = ?removed, kept = kept.len(), "Pruned most common terms");
        (FrequencyTable::from_counts(kept), removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_two_headline_scenario() {
        let agg = FrequencyAggregator::new();
        agg.add_batch(["한국", "경제", "성장률", "상승"]);
        agg.add_batch(["경제", "성장률", "둔화", "우려"]);
        let table = agg.finish();

        assert_eq!(table.get("경제"), Some(2));
        assert_eq!(table.get("성장률"), Some(2));
        for term in ["한국", "상승", "둔화", "우려"] {
            assert_eq!(table.get(term), Some(1), "{term}");
        }
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_order_does_not_change_result() {
        let terms = ["환율", "금리", "환율", "수출", "금리", "환율"];

        let forward = FrequencyAggregator::new();
        terms.iter().for_each(|t| forward.add(t));

        let backward = FrequencyAggregator::new();
        terms.iter().rev().for_each(|t| backward.add(t));

        let batched = FrequencyAggregator::new();
        batched.add_batch(&terms[3..]);
        batched.add_batch(&terms[..3]);

        let expected = forward.finish();
        assert_eq!(expected, backward.finish());
        assert_eq!(expected, batched.finish());
        assert_eq!(expected.get("환율"), Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_merges_lose_no_updates() {
        let agg = Arc::new(FrequencyAggregator::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let agg = Arc::clone(&agg);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    let mut tally = PageTally::new();
                    tally.add("반도체");
                    tally.add("수출");
                    agg.merge(tally);
                    agg.add("반도체");
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let table = Arc::try_unwrap(agg).unwrap().finish();
        assert_eq!(table.get("반도체"), Some(3200));
        assert_eq!(table.get("수출"), Some(1600));
    }

    #[test]
    fn test_prune_spares_protected_terms() {
        let agg = FrequencyAggregator::new();
        agg.add_batch(["트럼프"; 9]);
        agg.add_batch(["증시"; 7]);
        agg.add_batch(["환율"; 5]);
        agg.add_batch(["반도체"; 2]);
        let table = agg.finish();

        let protected: TermSet = ["트럼프"].into_iter().collect();
        let (pruned, removed) = table.prune_most_common(2, &protected);

        assert_eq!(removed, vec!["증시".to_string()]);
        assert_eq!(pruned.get("트럼프"), Some(9));
        assert!(!pruned.contains("증시"));
        assert_eq!(pruned.get("환율"), Some(5));
        assert_eq!(pruned.len(), 3);
    }

    #[test]
    fn test_prune_zero_keeps_table() {
        let agg = FrequencyAggregator::new();
        agg.add_batch(["금리", "금리", "대출"]);
        let table = agg.finish();
        let (pruned, removed) = table.prune_most_common(0, &TermSet::new());
        assert!(removed.is_empty());
        assert_eq!(pruned, table);
    }
}
