//! Error taxonomy for the catalog store. The UI layer wraps these in `anyhow`
//! but keeps the variants intact so it can tell rejected input apart from
//! storage failures.

use thiserror::Error;

/// Convenience alias used by every persistence function.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A book pointed at an author that does not exist.
    #[error("author {author_id} does not exist")]
    Reference { author_id: i64 },

    /// A field could not be coerced into the stored type.
    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether the error was caused by user input rather than the environment.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. }
                | CatalogError::Reference { .. }
                | CatalogError::Validation(_)
        )
    }
}
