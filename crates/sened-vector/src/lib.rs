//! sened-vector
//!
//! In-process flat nearest-neighbor index over document embeddings.
//! Exhaustive L2 scan; at registry scale (thousands of documents) this
//! beats approximate structures on both simplicity and recall. Distances
//! convert to scores with 1/(1+d) so downstream fusion sees [0,1].

use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::debug;

use sened_core::traits::VectorIndexer;
use sened_core::types::{DocumentId, SearchHit};

pub struct FlatVectorIndex {
    dim: usize,
    /// Dense row storage; `positions` maps id to row for O(1) upsert.
    rows: Vec<(DocumentId, Vec<f32>)>,
    positions: HashMap<DocumentId, usize>,
}

impl FlatVectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.rows.iter().map(|(id, _)| *id)
    }

    fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum::<f32>()
            .sqrt()
    }
}

impl VectorIndexer for FlatVectorIndex {
    /// Replaces any existing row for `id`. Zero vectors carry no signal
    /// and are rejected; dimension mismatches are a caller bug surfaced
    /// as an error rather than silently truncated.
    fn upsert(&mut self, id: DocumentId, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dim {
            bail!(
                "embedding for document {id} has dimension {}, index expects {}",
                embedding.len(),
                self.dim
            );
        }
        if embedding.iter().all(|x| *x == 0.0) {
            debug!(id, "skipping zero-vector embedding");
            self.remove(id);
            return Ok(());
        }
        match self.positions.get(&id) {
            Some(&pos) => self.rows[pos].1 = embedding,
            None => {
                self.positions.insert(id, self.rows.len());
                self.rows.push((id, embedding));
            }
        }
        Ok(())
    }

    fn remove(&mut self, id: DocumentId) {
        if let Some(pos) = self.positions.remove(&id) {
            // swap_remove moves the last row into the hole; fix its slot.
            self.rows.swap_remove(pos);
            if pos < self.rows.len() {
                let moved_id = self.rows[pos].0;
                self.positions.insert(moved_id, pos);
            }
        }
    }

    fn contains(&self, id: DocumentId) -> bool {
        self.positions.contains_key(&id)
    }

    fn search_vec(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 || query.len() != self.dim || query.iter().all(|x| *x == 0.0) {
            return Vec::new();
        }
        let mut scored: Vec<SearchHit> = self
            .rows
            .iter()
            .map(|(id, row)| SearchHit {
                id: *id,
                score: 1.0 / (1.0 + Self::l2_distance(query, row)),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        scored.truncate(k);
        scored
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.positions.clear();
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
