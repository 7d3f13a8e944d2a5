//! Genre-based movie similarity engine.
//!
//! A [`Catalog`] is fit once into a TF-IDF [`VectorSpace`]; queries are then
//! resolved to a catalog entry, ranked by cosine similarity over genre
//! vectors, and narrowed by post-hoc filters.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod filter;
pub mod fuzzy;
pub mod ingest;
pub mod persist;
pub mod ranker;
pub mod resolver;
pub mod tokenizer;
pub mod vectorizer;

pub use catalog::{Catalog, Entry};
pub use engine::{EngineState, Outcome, RecommendRequest};
pub use error::{EngineError, Result};
pub use filter::ResultFilter;
pub use ranker::{rank, ScoredEntry, DEFAULT_TOP_N};
pub use resolver::{resolve, Resolution, Suggestion, TitleIndex};
pub use vectorizer::{CatalogMatrix, SparseVector, TermId, VectorSpace};
