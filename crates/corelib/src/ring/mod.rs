//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding the member responsible for a key.

pub mod builder;
pub mod config;
pub mod ring;

pub use builder::RingBuilder;
pub use config::RingConfig;
pub use ring::HashRing;

/// Alias for the main ring type (used by lib.rs).
pub type Ring<M> = HashRing<M>;
