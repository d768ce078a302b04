//! The data source a cache refreshes from

use crate::error::BoxError;

/// Produces the authoritative fresh value for a cache
///
/// Implemented for any `FnMut() -> Result<T, E>` closure, so most callers never
/// name this trait. Implement it on a type when the producer carries state
/// worth naming (a client, a command line).
pub trait Producer {
    /// The cached payload
    type Value;
    /// Failure reported when no fresh value is available
    type Error: Into<BoxError>;

    fn produce(&mut self) -> Result<Self::Value, Self::Error>;
}

impl<F, T, E> Producer for F
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    type Value = T;
    type Error = E;

    fn produce(&mut self) -> Result<T, E> {
        self()
    }
}
