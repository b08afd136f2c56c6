//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each backend owning a single token on the ring, each member owns
//! several tokens (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: more tokens smooth out the share of keys each member gets
//! 2. **Gradual Rebalancing**: when a member joins or leaves, only ~1/N of the keys move
//! 3. **Spread of Failure**: the keys of a suspended member scatter over all survivors
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) per member where v = vnodes per member
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Rebalancing**: O(k/N) keys move when one of N members joins or leaves
//!
//! # Typical Configuration
//!
//! A router usually fronts a handful of full nodes, so 128-512 vnodes per
//! member keeps the spread within a few percent while the ring stays tiny.

use crate::partitioner::Partitioner;
use crate::token::LongToken;
use std::fmt;

/// A virtual node on the hash ring.
///
/// Represents a single token position owned by a ring member. The owner is
/// tracked by the ring itself; a `VirtualNode` only remembers where it sits
/// and which replica of its owner it is.
///
/// # Invariants
///
/// - The token of replica `i` of member `m` is always `partition("m:i")`, so
///   re-adding a member puts it back on exactly the same positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: LongToken,

    /// Replica index within the owning member (0, 1, 2, ...).
    pub index: u32,
}

impl VirtualNode {
    /// Create a new virtual node.
    #[inline]
    pub fn new(token: LongToken, index: u32) -> Self {
        Self { token, index }
    }

    /// Create replica `index` of `member` by hashing `"member:index"`.
    ///
    /// # Performance
    /// - **Time**: O(k) where k = length of the formatted key
    /// - **Space**: O(k) temporary for the formatted key
    pub fn for_member(partitioner: &dyn Partitioner, member: &str, index: u32) -> Self {
        let vnode_key = format!("{}:{}", member, index);
        Self::new(partitioner.partition(vnode_key.as_bytes()), index)
    }

    /// All `count` replicas of `member`, in index order.
    pub fn replicas(partitioner: &dyn Partitioner, member: &str, count: u32) -> Vec<Self> {
        (0..count)
            .map(|i| Self::for_member(partitioner, member, i))
            .collect()
    }

    #[inline]
    pub fn token(&self) -> LongToken {
        self.token
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, index={})", self.token, self.index)
    }
}
