use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use std::collections::{BTreeSet, HashMap, HashSet};

pub type TermId = u32;

/// Sparse vector over the genre vocabulary, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: Vec<(TermId, f32)>,
}

impl SparseVector {
    pub fn weights(&self) -> &[(TermId, f32)] { &self.weights }
    pub fn is_zero(&self) -> bool { self.weights.is_empty() }

    pub fn norm(&self) -> f32 { self.weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt() }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut acc) = (0, 0, 0.0f32);
        while i < self.weights.len() && j < other.weights.len() {
            let (ta, wa) = self.weights[i];
            let (tb, wb) = other.weights[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }
}

/// One L2-normalized vector per catalog row, indexed exactly like the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogMatrix {
    rows: Vec<SparseVector>,
}

impl CatalogMatrix {
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn rows(&self) -> &[SparseVector] { &self.rows }
}

/// Fitted TF-IDF model over genre tokens.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>, // sorted; terms[id] is the token for TermId id
    idf: Vec<f32>,
    num_docs: usize,
}

impl VectorSpace {
    /// Fit the vocabulary on every entry's genres and vectorize the catalog.
    pub fn fit(catalog: &Catalog) -> Result<(Self, CatalogMatrix)> {
        Self::fit_documents(catalog.iter().map(|e| e.genres.as_slice()))
    }

    /// Fit on raw token sequences, one per document.
    pub fn fit_documents<'a, I>(docs: I) -> Result<(Self, CatalogMatrix)>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let docs: Vec<&[String]> = docs.into_iter().collect();
        let vocabulary: BTreeSet<&str> = docs.iter().flat_map(|d| d.iter().map(String::as_str)).collect();
        if vocabulary.is_empty() {
            return Err(EngineError::EmptyVocabulary);
        }

        let terms: Vec<String> = vocabulary.into_iter().map(str::to_string).collect();
        let dictionary: HashMap<String, TermId> =
            terms.iter().enumerate().map(|(id, t)| (t.clone(), id as TermId)).collect();

        let mut df = vec![0u32; terms.len()];
        for doc in &docs {
            let seen: HashSet<TermId> = doc.iter().filter_map(|t| dictionary.get(t).copied()).collect();
            for tid in seen {
                df[tid as usize] += 1;
            }
        }

        // Smoothed idf: ln((1 + N) / (1 + df)) + 1
        let n = docs.len() as f32;
        let idf = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();

        let space = Self { dictionary, terms, idf, num_docs: docs.len() };
        let rows = docs.iter().map(|d| space.transform(d)).collect();
        tracing::info!(entries = docs.len(), vocabulary = space.terms.len(), "fitted genre vector space");
        Ok((space, CatalogMatrix { rows }))
    }

    /// Map a token sequence into the fitted space. Out-of-vocabulary tokens are dropped;
    /// repeated tokens add term frequency.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        let mut tf: HashMap<TermId, u32> = HashMap::new();
        for token in tokens {
            if let Some(&tid) = self.dictionary.get(token.as_ref()) {
                *tf.entry(tid).or_insert(0) += 1;
            }
        }
        let mut weights: Vec<(TermId, f32)> =
            tf.into_iter().map(|(tid, count)| (tid, count as f32 * self.idf[tid as usize])).collect();
        weights.sort_by_key(|(tid, _)| *tid);

        let mut vector = SparseVector { weights };
        let norm = vector.norm();
        if norm > 0.0 {
            for (_, w) in vector.weights.iter_mut() { *w /= norm; }
        }
        vector
    }

    /// Number of documents the space was fit on.
    pub fn num_docs(&self) -> usize { self.num_docs }

    /// Distinct genre tokens, sorted.
    pub fn vocabulary(&self) -> &[String] { &self.terms }

    pub fn term_id(&self, token: &str) -> Option<TermId> { self.dictionary.get(token).copied() }

    pub fn idf(&self, token: &str) -> Option<f32> { self.term_id(token).map(|tid| self.idf[tid as usize]) }
}
