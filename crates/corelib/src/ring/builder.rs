//! Builder for hash rings with an initial member set.

use crate::error::Result;
use crate::member::Member;
use crate::partitioner::HashFunction;
use crate::ring::config::RingConfig;
use crate::ring::ring::HashRing;

/// Collects configuration and initial members, then builds a [`HashRing`].
///
/// ```rust
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(64)
///     .add_member("node1".to_string())
///     .add_member("node2".to_string())
///     .build()
///     .unwrap();
/// assert_eq!(ring.member_count(), 2);
/// ```
#[derive(Debug)]
pub struct RingBuilder<M> {
    config: RingConfig,
    members: Vec<M>,
}

impl<M: Member> RingBuilder<M> {
    pub fn new() -> Self {
        Self {
            config: RingConfig::default(),
            members: Vec::new(),
        }
    }

    /// Number of vnodes every member gets.
    pub fn with_vnodes(mut self, vnodes: u32) -> Self {
        self.config.vnodes = vnodes;
        self
    }

    pub fn with_hash_function(mut self, hash: HashFunction) -> Self {
        self.config.hash = hash;
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_member(mut self, member: M) -> Self {
        self.members.push(member);
        self
    }

    pub fn add_members(mut self, members: impl IntoIterator<Item = M>) -> Self {
        self.members.extend(members);
        self
    }

    /// Validate the configuration and place every member on the ring.
    ///
    /// Members sharing a name collapse into the first one added.
    pub fn build(self) -> Result<HashRing<M>> {
        let mut ring = HashRing::with_config(&self.config)?;
        for member in self.members {
            ring.add(member);
        }
        Ok(ring)
    }
}

impl<M: Member> Default for RingBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
