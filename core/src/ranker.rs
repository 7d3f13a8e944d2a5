use crate::catalog::{Catalog, Entry};
use crate::error::{EngineError, Result};
use crate::vectorizer::{CatalogMatrix, VectorSpace};

/// Number of recommendations returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry<'a> {
    pub row: usize,
    pub entry: &'a Entry,
    pub score: f32,
}

/// Rank every other catalog entry by cosine similarity to `entry`'s genres and keep the top `n`.
///
/// The query vector is recomputed from the entry's genres. The entry itself is excluded by id,
/// so a different entry with an identical genre set still appears. Equal scores keep catalog order.
pub fn rank<'a>(
    entry: &Entry,
    space: &VectorSpace,
    catalog: &'a Catalog,
    matrix: &CatalogMatrix,
    n: usize,
) -> Result<Vec<ScoredEntry<'a>>> {
    if matrix.len() != catalog.len() {
        return Err(EngineError::InconsistentState(format!(
            "catalog has {} rows but matrix has {}",
            catalog.len(),
            matrix.len()
        )));
    }
    if space.num_docs() != catalog.len() {
        return Err(EngineError::InconsistentState(format!(
            "vector space was fit on {} entries, catalog has {}",
            space.num_docs(),
            catalog.len()
        )));
    }

    let query = space.transform(&entry.genres);
    let mut scored: Vec<ScoredEntry<'a>> = catalog
        .iter()
        .zip(matrix.rows())
        .enumerate()
        .filter(|(_, (candidate, _))| candidate.id != entry.id)
        .map(|(row, (candidate, vector))| ScoredEntry { row, entry: candidate, score: query.dot(vector) })
        .collect();
    // sort_by is stable: ties stay in catalog order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(n);
    Ok(scored)
}
