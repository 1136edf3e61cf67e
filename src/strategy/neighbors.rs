//! Brute-force k-nearest-neighbor index over labelled feature rows.
#![forbid(unsafe_code)]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Feature rows and the label recorded for each one.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NeighborIndex {
    dimension: usize,
    rows: Vec<Vec<f64>>,
    labels: Vec<String>,
}

#[derive(PartialEq)]
struct ScoredIndex {
    distance: f64,
    index: usize,
}

impl Eq for ScoredIndex {}

impl PartialOrd for ScoredIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredIndex {
    // Max-heap on (distance, index): the root is the worst of the current k and gets evicted
    // first. Equal distances rank the later row as worse.
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

impl NeighborIndex {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, rows: Vec::new(), labels: Vec::new() }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add(&mut self, row: Vec<f64>, label: String) -> Result<()> {
        if row.len() != self.dimension {
            anyhow::bail!(
                "Feature row dimension mismatch: expected {}, got {}",
                self.dimension,
                row.len()
            );
        }
        self.rows.push(row);
        self.labels.push(label);
        Ok(())
    }

    /// Indices of the `k` rows closest to `query`, nearest first.
    pub fn nearest(&self, query: &[f64], k: usize) -> Result<Vec<usize>> {
        if query.len() != self.dimension {
            anyhow::bail!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            );
        }
        if query.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("Query contains NaN or infinite values: {:?}", query);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (index, row) in self.rows.iter().enumerate() {
            heap.push(ScoredIndex { distance: euclidean(query, row), index });
            if heap.len() > k {
                heap.pop();
            }
        }
        Ok(heap.into_sorted_vec().into_iter().map(|s| s.index).collect())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}
