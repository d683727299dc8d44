//! Errors the resolver can surface. There is deliberately no "not found"
//! variant here — a missing trip/route/agency during a lookup is a `None`,
//! not an error; see [`crate::get_trip_info`].

use std::fmt;

#[derive(Debug)]
pub enum ResolverError {
    /// Static data has not finished loading yet.
    NotReady,
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ResolverError {
    pub fn other<E: std::error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "static data has not finished loading"),
            Self::Other(why) => write!(f, "{why}"),
        }
    }
}

impl std::error::Error for ResolverError {}

pub type ResolverResult<T> = Result<T, ResolverError>;
