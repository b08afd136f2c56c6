//! Core partitioner trait definitions.

use crate::token::LongToken;
use std::fmt::Debug;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead. Hashing is total:
/// every byte string, including the empty one, maps to some token.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Converts a key into a token.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to partition
    ///
    /// # Returns
    ///
    /// A token representing the position on the ring
    fn partition(&self, key: &[u8]) -> LongToken;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
