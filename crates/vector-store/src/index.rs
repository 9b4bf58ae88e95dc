use crate::embeddings::cosine_similarity;
use crate::error::{Result, VectorStoreError};

/// Flat vector index: exhaustive cosine scan over positional slots.
///
/// The dimension is fixed by the first vector added.
#[derive(Debug, Default)]
pub struct FlatIndex {
    dimension: Option<usize>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vector; its slot is the current length
    pub fn push(&mut self, vector: Vec<f32>) -> Result<usize> {
        self.check_dimension(&vector)?;
        if self.dimension.is_none() {
            self.dimension = Some(vector.len());
        }
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// k nearest slots among those accepted by `filter`.
    /// Returns (slot, distance) sorted by distance ascending, ties by slot.
    pub fn search_filtered<F>(
        &self,
        query: &[f32],
        k: usize,
        filter: F,
    ) -> Result<Vec<(usize, f32)>>
    where
        F: Fn(usize) -> bool,
    {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(slot, _)| filter(*slot))
            .map(|(slot, vector)| (slot, 1.0 - cosine_similarity(query, vector)))
            .collect();

        // Stable sort keeps slot order among equal distances.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.search_filtered(query, k, |_| true)
    }

    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != vector.len() => Err(VectorStoreError::InvalidDimension {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_search() {
        let mut index = FlatIndex::new();

        index.push(vec![1.0, 0.0, 0.0]).unwrap();
        index.push(vec![0.9, 0.1, 0.0]).unwrap();
        index.push(vec![0.0, 1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);

        // Exact match first, with zero distance
        assert_eq!(results[0].0, 0);
        assert!(results[0].1.abs() < 1e-6);

        assert_eq!(results[1].0, 1);
        assert!(results[1].1 < 0.1);
    }

    #[test]
    fn test_filter_skips_slots() {
        let mut index = FlatIndex::new();
        index.push(vec![1.0, 0.0]).unwrap();
        index.push(vec![0.0, 1.0]).unwrap();

        let results = index.search_filtered(&[1.0, 0.0], 5, |slot| slot == 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new();
        index.push(vec![1.0, 0.0, 0.0]).unwrap();
        assert!(index.push(vec![1.0, 0.0]).is_err());
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = FlatIndex::new();
        assert!(index.search(&[1.0], 3).unwrap().is_empty());
        assert!(index.is_empty());
    }
}
