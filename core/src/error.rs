use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("catalog yields no genre tokens; nothing to rank against")]
    EmptyVocabulary,

    #[error("inconsistent engine state: {0}")]
    InconsistentState(String),

    #[error("entry {id} has an empty title")]
    EmptyTitle { id: String },

    #[error("entry {id} has no usable genres")]
    EmptyGenres { id: String },

    #[error("duplicate entry id: {id}")]
    DuplicateId { id: String },
}
