use crate::catalog::Catalog;
use crate::fuzzy::close_matches;
use crate::tokenizer::fold_title;
use std::collections::HashMap;

/// Minimum ratio for a title to be offered as a suggestion.
pub const FUZZY_CUTOFF: f64 = 0.6;
/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub row: usize,
    pub title: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Row of the first catalog entry whose title matches case-insensitively.
    Exact(usize),
    /// No exact match; close titles, best first. May be empty.
    Suggestions(Vec<Suggestion>),
}

/// Case-folded titles of a catalog, built once and reused across queries.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    first_row: HashMap<String, usize>,
    // folded[row] is the case-folded title of that catalog row
    folded: Vec<String>,
}

impl TitleIndex {
    pub fn new(catalog: &Catalog) -> Self {
        let folded: Vec<String> = catalog.iter().map(|e| fold_title(&e.title)).collect();
        let mut first_row = HashMap::with_capacity(folded.len());
        for (row, title) in folded.iter().enumerate() {
            first_row.entry(title.clone()).or_insert(row);
        }
        Self { first_row, folded }
    }

    pub fn resolve(&self, query: &str, catalog: &Catalog) -> Resolution {
        let folded = fold_title(query);
        if let Some(&row) = self.first_row.get(&folded) {
            tracing::debug!(query, row, "exact title match");
            return Resolution::Exact(row);
        }
        // every row is a candidate, including rows that share a title
        let candidates = self.folded.iter().map(String::as_str);
        let suggestions: Vec<Suggestion> = close_matches(&folded, candidates, MAX_SUGGESTIONS, FUZZY_CUTOFF)
            .into_iter()
            .map(|m| Suggestion { row: m.index, title: catalog.entries()[m.index].title.clone(), ratio: m.ratio })
            .collect();
        tracing::debug!(query, suggestions = suggestions.len(), "no exact title match");
        Resolution::Suggestions(suggestions)
    }
}

/// Resolve a free-text query against a catalog without a prebuilt [`TitleIndex`].
pub fn resolve(query: &str, catalog: &Catalog) -> Resolution {
    TitleIndex::new(catalog).resolve(query, catalog)
}
