use std::fmt;

/// Failures the store can surface. A miss is never an error — callers get
/// a default value back — so this enum is reserved for backend failures
/// that a caller can reasonably log and degrade from.
#[derive(Debug)]
pub enum StoreError {
    /// The external cache backend could not be reached or returned a
    /// protocol-level error.
    Backend(String),
    /// A value retrieved from a backend could not be decoded; the store
    /// treats this the same as a miss but callers may want to know it
    /// happened.
    Corrupt { namespace: String, key: String },
    /// A configuration value needed to build the store was missing or
    /// invalid.
    ConfigInvalid(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(why) => write!(f, "store backend error: {why}"),
            Self::Corrupt { namespace, key } => {
                write!(f, "corrupt entry at {namespace}/{key}")
            }
            Self::ConfigInvalid(why) => write!(f, "invalid store configuration: {why}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<redis::RedisError> for StoreError {
    fn from(why: redis::RedisError) -> Self {
        Self::Backend(why.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
