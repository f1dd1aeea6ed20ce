use thiserror::Error;

/// Errors that can occur when interacting with the purchase repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or refused the write.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failure_converts() {
        let err: RepositoryError = sqlx::migrate::MigrateError::VersionMissing(1).into();
        assert!(matches!(err, RepositoryError::Migration(_)));
        assert!(err.to_string().starts_with("Migration error:"));
    }
}
