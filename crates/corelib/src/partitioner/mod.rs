//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys into tokens
//! that can be placed on the hash ring.

pub mod siphash;
pub mod traits;
pub mod xxhash;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use siphash::SipHashPartitioner;
pub use traits::Partitioner;
pub use xxhash::XxHashPartitioner;

/// Hash function used to place vnodes and keys on the ring.
///
/// Must stay the same for the life of a ring: switching it moves every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashFunction {
    #[default]
    Xxh3,
    Siphash13,
}

impl HashFunction {
    /// Instantiate the partitioner backing this hash function.
    pub fn partitioner(self) -> Arc<dyn Partitioner> {
        match self {
            HashFunction::Xxh3 => Arc::new(XxHashPartitioner),
            HashFunction::Siphash13 => Arc::new(SipHashPartitioner),
        }
    }
}
