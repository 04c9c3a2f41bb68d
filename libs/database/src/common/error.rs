/// Error type for connector-level operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver error from MongoDB
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The deployment did not answer the connection check
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl DatabaseError {
    /// Whether another attempt could succeed. A bad URL or option stays bad.
    pub fn is_transient(&self) -> bool {
        matches!(self, DatabaseError::ConnectionFailed(_))
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
