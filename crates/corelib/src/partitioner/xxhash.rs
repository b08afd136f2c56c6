//! xxh3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::LongToken;
use xxhash_rust::xxh3::xxh3_64;

/// Partitioner backed by the 64-bit xxh3 hash. Default for new rings.
#[derive(Clone, Copy, Debug, Default)]
pub struct XxHashPartitioner;

impl Partitioner for XxHashPartitioner {
    fn partition(&self, key: &[u8]) -> LongToken {
        LongToken(xxh3_64(key))
    }

    fn name(&self) -> &'static str {
        "XxHashPartitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_is_deterministic() {
        let p = XxHashPartitioner;
        assert_eq!(p.partition(b"chain:100"), p.partition(b"chain:100"));
        assert_ne!(p.partition(b"chain:100"), p.partition(b"chain:101"));
    }

    #[test]
    fn test_empty_key_hashes() {
        // Any input, including nothing at all, lands somewhere.
        let _ = XxHashPartitioner.partition(b"");
    }
}
