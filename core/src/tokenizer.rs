/// Separator between genre tokens in a raw genre field.
pub const GENRE_DELIMITER: char = ',';

/// Split a raw genre field into tokens. Tokens are kept verbatim (no trimming, no case folding)
/// so they only receive weight when they match the fitted vocabulary exactly. Empty pieces are dropped.
pub fn tokenize_genres(text: &str) -> Vec<String> {
    text.split(GENRE_DELIMITER)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-fold a title for whole-string comparison.
pub fn fold_title(title: &str) -> String { title.to_lowercase() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_only() {
        assert_eq!(tokenize_genres("Action,Sci-Fi"), vec!["Action", "Sci-Fi"]);
        // no trimming, no case folding
        assert_eq!(tokenize_genres("Action, drama"), vec!["Action", " drama"]);
        assert_eq!(tokenize_genres("Drama,,Drama"), vec!["Drama", "Drama"]);
        assert!(tokenize_genres("").is_empty());
    }

    #[test]
    fn folds_title_case() {
        assert_eq!(fold_title("InCePtIoN"), "inception");
        assert_eq!(fold_title("Amélie"), "amélie");
    }
}
