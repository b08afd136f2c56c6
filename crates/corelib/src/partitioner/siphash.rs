//! SipHash-1-3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::LongToken;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Partitioner backed by SipHash-1-3 with a zero key.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipHashPartitioner;

impl Partitioner for SipHashPartitioner {
    fn partition(&self, key: &[u8]) -> LongToken {
        let mut hasher = SipHasher13::new();
        hasher.write(key);
        LongToken(hasher.finish())
    }

    fn name(&self) -> &'static str {
        "SipHashPartitioner"
    }
}
