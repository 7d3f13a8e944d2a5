use crate::catalog::{Catalog, Entry};
use crate::error::{EngineError, Result};
use crate::filter::ResultFilter;
use crate::ranker::{rank, ScoredEntry, DEFAULT_TOP_N};
use crate::resolver::{Resolution, Suggestion, TitleIndex};
use crate::vectorizer::{CatalogMatrix, VectorSpace};

/// A catalog together with the model fit on it. Never mutated after construction;
/// a reload builds a fresh value and swaps it in whole.
#[derive(Debug, Clone)]
pub struct EngineState {
    catalog: Catalog,
    space: VectorSpace,
    matrix: CatalogMatrix,
    titles: TitleIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendRequest {
    pub title: String,
    pub n: usize,
    pub filter: ResultFilter,
}

impl RecommendRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), n: DEFAULT_TOP_N, filter: ResultFilter::default() }
    }
    pub fn with_n(mut self, n: usize) -> Self { self.n = n; self }
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self { self.filter.genre = Some(genre.into()); self }
    pub fn with_min_rating(mut self, min_rating: f32) -> Self { self.filter.min_rating = Some(min_rating); self }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    /// The title resolved; `results` may be empty when the filters removed everything.
    Recommended { resolved: &'a Entry, results: Vec<ScoredEntry<'a>> },
    /// The title did not resolve, but close titles exist.
    DidYouMean(Vec<Suggestion>),
    /// The title did not resolve and nothing was close.
    NotFound,
}

impl EngineState {
    pub fn build(catalog: Catalog) -> Result<Self> {
        let (space, matrix) = VectorSpace::fit(&catalog)?;
        let titles = TitleIndex::new(&catalog);
        Ok(Self { catalog, space, matrix, titles })
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    /// Distinct genre tokens known to the model, sorted.
    pub fn genres(&self) -> &[String] { self.space.vocabulary() }

    pub fn resolve(&self, query: &str) -> Resolution { self.titles.resolve(query, &self.catalog) }

    pub fn rank(&self, entry: &Entry, n: usize) -> Result<Vec<ScoredEntry<'_>>> {
        rank(entry, &self.space, &self.catalog, &self.matrix, n)
    }

    /// Resolve the title, rank the top `n`, then filter that list.
    pub fn recommend(&self, req: &RecommendRequest) -> Result<Outcome<'_>> {
        let row = match self.resolve(&req.title) {
            Resolution::Exact(row) => row,
            Resolution::Suggestions(s) if s.is_empty() => return Ok(Outcome::NotFound),
            Resolution::Suggestions(s) => return Ok(Outcome::DidYouMean(s)),
        };
        self.recommend_row(row, req)
    }

    /// Rank and filter for a known catalog row, e.g. a suggestion the user picked.
    /// `req.title` is ignored.
    pub fn recommend_row(&self, row: usize, req: &RecommendRequest) -> Result<Outcome<'_>> {
        let resolved = self
            .catalog
            .get(row)
            .ok_or_else(|| EngineError::InconsistentState(format!("row {row} outside a catalog of {}", self.catalog.len())))?;
        let ranked = self.rank(resolved, req.n)?;
        let ranked_len = ranked.len();
        let results = req.filter.apply(ranked);
        tracing::debug!(title = %resolved.title, ranked = ranked_len, kept = results.len(), "recommendations ready");
        Ok(Outcome::Recommended { resolved, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EngineState {
        EngineState::build(
            Catalog::new(vec![
                Entry::new("tt1", "Heat", ["Crime", "Drama", "Thriller"], 8.3),
                Entry::new("tt2", "Ronin", ["Action", "Crime", "Thriller"], 7.2),
                Entry::new("tt3", "Casino", ["Crime", "Drama"], 8.2),
                Entry::new("tt4", "Airplane!", ["Comedy"], 7.7),
            ])
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn empty_catalog_cannot_build() {
        assert_eq!(EngineState::build(Catalog::default()).unwrap_err(), EngineError::EmptyVocabulary);
    }

    #[test]
    fn recommends_for_a_known_title() {
        let s = state();
        let Outcome::Recommended { resolved, results } = s.recommend(&RecommendRequest::new("heat").with_n(2)).unwrap() else {
            panic!("expected recommendations")
        };
        assert_eq!(resolved.id, "tt1");
        let titles: Vec<&str> = results.iter().map(|r| r.entry.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles.contains(&"Heat"));
        assert!(!titles.contains(&"Airplane!"));
    }

    #[test]
    fn filters_can_empty_the_list() {
        let s = state();
        let req = RecommendRequest::new("Heat").with_genre("western");
        let Outcome::Recommended { results, .. } = s.recommend(&req).unwrap() else { panic!("expected recommendations") };
        assert!(results.is_empty());
    }

    #[test]
    fn distinguishes_suggestions_from_not_found() {
        let s = state();
        assert!(matches!(s.recommend(&RecommendRequest::new("Casino!")).unwrap(), Outcome::DidYouMean(_)));
        assert_eq!(s.recommend(&RecommendRequest::new("zzzqqq")).unwrap(), Outcome::NotFound);
    }

    #[test]
    fn recommends_for_a_picked_duplicate_row() {
        let s = EngineState::build(
            Catalog::new(vec![
                Entry::new("a", "Crash", ["Drama"], 7.7),
                Entry::new("b", "Crash", ["Thriller"], 6.4),
                Entry::new("c", "Babel", ["Drama"], 7.4),
                Entry::new("d", "Duel", ["Thriller"], 7.6),
            ])
            .unwrap(),
        )
        .unwrap();
        let req = RecommendRequest::new("ignored").with_n(1);
        let Outcome::Recommended { resolved, results } = s.recommend_row(1, &req).unwrap() else {
            panic!("expected recommendations")
        };
        assert_eq!(resolved.id, "b");
        assert_eq!(results[0].entry.id, "d");
        assert!(matches!(s.recommend_row(9, &req), Err(EngineError::InconsistentState(_))));
    }

    #[test]
    fn lists_genres_sorted() {
        assert_eq!(state().genres(), &["Action", "Comedy", "Crime", "Drama", "Thriller"]);
    }
}
