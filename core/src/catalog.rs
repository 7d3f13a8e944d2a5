use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque identifier, e.g. an IMDb `tconst`.
    pub id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub rating: f32,
}

impl Entry {
    pub fn new<I, S>(id: impl Into<String>, title: impl Into<String>, genres: I, rating: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { id: id.into(), title: title.into(), genres: genres.into_iter().map(Into::into).collect(), rating }
    }

    /// Genres rendered back to their comma-joined source text.
    pub fn genre_text(&self) -> String { self.genres.join(",") }
}

/// Immutable, validated table of entries. Row order is the order entries were supplied in
/// and is the index every vector-space structure aligns to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Entry>", into = "Vec<Entry>")]
pub struct Catalog {
    entries: Vec<Entry>,
    rows_by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<Entry>) -> Result<Self> {
        let mut rows_by_id = HashMap::with_capacity(entries.len());
        for (row, entry) in entries.iter().enumerate() {
            if entry.title.is_empty() {
                return Err(EngineError::EmptyTitle { id: entry.id.clone() });
            }
            if entry.genres.is_empty() || entry.genres.iter().any(|g| g.is_empty()) {
                return Err(EngineError::EmptyGenres { id: entry.id.clone() });
            }
            if rows_by_id.insert(entry.id.clone(), row).is_some() {
                return Err(EngineError::DuplicateId { id: entry.id.clone() });
            }
        }
        Ok(Self { entries, rows_by_id })
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn entries(&self) -> &[Entry] { &self.entries }
    pub fn get(&self, row: usize) -> Option<&Entry> { self.entries.get(row) }
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> { self.entries.iter() }

    /// Row index of the entry with the given id.
    pub fn row_of(&self, id: &str) -> Option<usize> { self.rows_by_id.get(id).copied() }

    pub fn by_id(&self, id: &str) -> Option<&Entry> { self.row_of(id).map(|row| &self.entries[row]) }
}

impl TryFrom<Vec<Entry>> for Catalog {
    type Error = EngineError;
    fn try_from(entries: Vec<Entry>) -> Result<Self> { Self::new(entries) }
}

impl From<Catalog> for Vec<Entry> {
    fn from(catalog: Catalog) -> Self { catalog.entries }
}
