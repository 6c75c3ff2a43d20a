//! Order-preserving batching of dataset records

use vecset_core::error::{Result, VecsetError};
use vecset_core::models::DocumentRecord;

/// A contiguous slice of records, consumed by one upsert
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Position in emission order
    pub index: usize,
    pub records: &'a [DocumentRecord],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record identifiers, in order
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// Splits a record slice into batches of at most `batch_size`
///
/// The batcher borrows the records and does no work until iterated, so it can
/// be iterated any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Batcher<'a> {
    records: &'a [DocumentRecord],
    batch_size: usize,
}

impl<'a> Batcher<'a> {
    pub fn new(records: &'a [DocumentRecord], batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(VecsetError::invalid_configuration("batch_size must be greater than 0"));
        }
        Ok(Self {
            records,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self) -> usize {
        self.records.len().div_ceil(self.batch_size)
    }

    pub fn iter(&self) -> impl Iterator<Item = Batch<'a>> + Clone + 'a {
        self.records
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, records)| Batch { index, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn records(n: usize) -> Vec<DocumentRecord> {
        (0..n).map(|i| DocumentRecord::new(i.to_string(), vec![i as f32])).collect()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let data = records(3);
        let err = Batcher::new(&data, 0).unwrap_err();
        assert!(matches!(err, VecsetError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let batcher = Batcher::new(&[], 10).unwrap();
        assert_eq!(batcher.iter().count(), 0);
        assert_eq!(batcher.batch_count(), 0);
    }

    #[test]
    fn test_last_batch_is_short() {
        let data = records(7);
        let sizes: Vec<usize> = Batcher::new(&data, 3).unwrap().iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_batch_indices_follow_order() {
        let data = records(5);
        let batcher = Batcher::new(&data, 2).unwrap();
        let indices: Vec<usize> = batcher.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_restartable() {
        let data = records(10);
        let batcher = Batcher::new(&data, 4).unwrap();
        let first: Vec<Vec<String>> = batcher.iter().map(|b| b.ids()).collect();
        let second: Vec<Vec<String>> = batcher.iter().map(|b| b.ids()).collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_concatenation_reproduces_input(n in 0usize..500, batch_size in 1usize..64) {
            let data = records(n);
            let batcher = Batcher::new(&data, batch_size).unwrap();

            let ids: Vec<String> = batcher.iter().flat_map(|b| b.ids()).collect();
            let expected: Vec<String> = data.iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(ids, expected);
        }

        #[test]
        fn prop_batch_counts_match(n in 0usize..500, batch_size in 1usize..64) {
            let data = records(n);
            let batcher = Batcher::new(&data, batch_size).unwrap();
            let batches: Vec<Batch> = batcher.iter().collect();

            prop_assert_eq!(batches.len(), n.div_ceil(batch_size));
            prop_assert_eq!(batches.len(), batcher.batch_count());
            prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
            if let Some((last, full)) = batches.split_last() {
                prop_assert!(full.iter().all(|b| b.len() == batch_size));
                prop_assert_eq!(last.len(), n - full.len() * batch_size);
            }
        }
    }
}
