use crate::catalog::Entry;
use crate::ranker::ScoredEntry;
use serde::{Deserialize, Serialize};

/// Post-ranking predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultFilter {
    /// Case-insensitive substring of the comma-joined genre text. The value is trimmed before
    /// matching; blank means no filter.
    pub genre: Option<String>,
    /// Inclusive lower bound on rating. Absent means 0.0.
    pub min_rating: Option<f32>,
}

impl ResultFilter {
    pub fn new(genre: Option<String>, min_rating: Option<f32>) -> Self { Self { genre, min_rating } }

    fn genre_needle(&self) -> Option<String> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_lowercase)
    }

    fn rating_floor(&self) -> f32 {
        match self.min_rating {
            Some(r) if !r.is_nan() => r,
            _ => 0.0,
        }
    }

    /// Whether any predicate can reject an entry.
    pub fn is_active(&self) -> bool { self.genre_needle().is_some() || self.rating_floor() > 0.0 }

    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(needle) = self.genre_needle() {
            if !entry.genre_text().to_lowercase().contains(&needle) {
                return false;
            }
        }
        entry.rating >= self.rating_floor()
    }

    /// Keep the results that pass every predicate, preserving their order.
    pub fn apply<'a>(&self, mut results: Vec<ScoredEntry<'a>>) -> Vec<ScoredEntry<'a>> {
        results.retain(|r| self.matches(r.entry));
        results
    }
}

/// Apply a genre substring and minimum rating to a ranked list.
pub fn filter<'a>(results: Vec<ScoredEntry<'a>>, genre: Option<&str>, min_rating: Option<f32>) -> Vec<ScoredEntry<'a>> {
    ResultFilter::new(genre.map(str::to_string), min_rating).apply(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_genre_is_no_filter() {
        let e = Entry::new("a", "A", ["Comedy"], 0.0);
        assert!(ResultFilter::new(Some("   ".into()), None).matches(&e));
        assert!(ResultFilter::new(Some(String::new()), None).matches(&e));
    }

    #[test]
    fn genre_matches_across_the_joined_text() {
        let e = Entry::new("a", "A", ["Sci", "Fi"], 5.0);
        assert!(ResultFilter::new(Some("i,f".into()), None).matches(&e));
        assert!(ResultFilter::new(Some(" SCI ".into()), None).matches(&e));
        assert!(!ResultFilter::new(Some("drama".into()), None).matches(&e));
    }

    #[test]
    fn reports_whether_it_can_reject() {
        assert!(!ResultFilter::default().is_active());
        assert!(!ResultFilter::new(Some("  ".into()), Some(-1.0)).is_active());
        assert!(ResultFilter::new(Some("drama".into()), None).is_active());
        assert!(ResultFilter::new(None, Some(7.0)).is_active());
    }

    #[test]
    fn negative_or_nan_floor_matches_everything() {
        let e = Entry::new("a", "A", ["Drama"], 0.0);
        assert!(ResultFilter::new(None, Some(-3.0)).matches(&e));
        assert!(ResultFilter::new(None, Some(f32::NAN)).matches(&e));
        assert!(ResultFilter::new(None, Some(0.0)).matches(&e));
        assert!(!ResultFilter::new(None, Some(0.1)).matches(&e));
    }
}
