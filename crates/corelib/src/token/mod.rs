//! Token abstraction module for consistent hashing.
//!
//! Tokens represent positions on the hash ring and must be comparable,
//! hashable, and thread-safe.

pub mod long;
pub mod traits;

pub use long::LongToken;
pub use traits::Token;
