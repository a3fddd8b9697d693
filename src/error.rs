//! Crate-wide error type.

use thiserror::Error;

/// Errors produced by this crate.
///
/// The core never panics on caller-supplied data; every fallible
/// constructor and every checked arithmetic operation returns one of
/// these variants instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A data invariant from the problem model was violated (e.g. a
    /// malformed time window, a non-square distance matrix, a vehicle
    /// whose initial load exceeds its capacity).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operator or route method was asked to perform something that
    /// is structurally impossible, such as removing a route's depot or
    /// exceeding a vehicle type's reload cap.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A 64-bit integer computation would have wrapped.
    #[error("numeric overflow while computing {0}")]
    Overflow(&'static str),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Adds `a + b`, reporting overflow instead of wrapping.
pub(crate) fn checked_add(a: i64, b: i64, what: &'static str) -> Result<i64> {
    a.checked_add(b).ok_or(Error::Overflow(what))
}

/// Subtracts `a - b`, reporting overflow instead of wrapping.
pub(crate) fn checked_sub(a: i64, b: i64, what: &'static str) -> Result<i64> {
    a.checked_sub(b).ok_or(Error::Overflow(what))
}

/// Multiplies `a * b`, reporting overflow instead of wrapping.
pub(crate) fn checked_mul(a: i64, b: i64, what: &'static str) -> Result<i64> {
    a.checked_mul(b).ok_or(Error::Overflow(what))
}
