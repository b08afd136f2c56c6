//! Hash ring data structure.
//!
//! Tokens live in a `BTreeMap<LongToken, String>` mapping each vnode position
//! to the name of the member that owns it. A key is served by the first vnode
//! at or after the key's own token, wrapping around to the smallest token.
//!
//! When vnodes of several members hash to the same token, the member with the
//! smallest name holds it and the others wait in line. Removing the holder
//! hands the token to the next in line, so placement depends only on the
//! current members and never on the order they were added or removed.
//!
//! The ring has no interior locking; callers that share it across threads
//! wrap it in their own lock.

use crate::error::Result;
use crate::member::Member;
use crate::partitioner::Partitioner;
use crate::ring::config::RingConfig;
use crate::token::LongToken;
use crate::vnode::VirtualNode;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct RingMember<M> {
    member: M,
    /// Every vnode the member claims, including those held by another member.
    vnodes: Vec<VirtualNode>,
}

/// Consistent hash ring over members identified by name.
pub struct HashRing<M> {
    tokens: BTreeMap<LongToken, String>,
    /// Members waiting for a token that another member holds.
    shadowed: BTreeMap<LongToken, BTreeSet<String>>,
    members: HashMap<String, RingMember<M>>,
    vnodes: u32,
    partitioner: Arc<dyn Partitioner>,
}

impl<M: Member> HashRing<M> {
    /// Empty ring with the default configuration.
    pub fn new() -> Self {
        let config = RingConfig::default();
        Self::from_parts(config.vnodes, config.hash.partitioner())
    }

    /// Empty ring with a validated configuration.
    pub fn with_config(config: &RingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config.vnodes, config.hash.partitioner()))
    }

    fn from_parts(vnodes: u32, partitioner: Arc<dyn Partitioner>) -> Self {
        Self {
            tokens: BTreeMap::new(),
            shadowed: BTreeMap::new(),
            members: HashMap::new(),
            vnodes,
            partitioner,
        }
    }

    /// Place `member` on the ring.
    ///
    /// Returns `false` and leaves the ring untouched when a member with the
    /// same name is already present.
    pub fn add(&mut self, member: M) -> bool {
        let name = member.name().to_owned();
        if self.members.contains_key(&name) {
            return false;
        }

        let vnodes = VirtualNode::replicas(self.partitioner.as_ref(), &name, self.vnodes);
        for vnode in &vnodes {
            match self.tokens.entry(vnode.token) {
                Entry::Vacant(slot) => {
                    slot.insert(name.clone());
                }
                Entry::Occupied(mut slot) => {
                    let waiting = if name < *slot.get() {
                        std::mem::replace(slot.get_mut(), name.clone())
                    } else {
                        name.clone()
                    };
                    debug!(
                        member = %name,
                        token = %vnode.token,
                        holder = %slot.get(),
                        "vnode token collision"
                    );
                    self.shadowed
                        .entry(vnode.token)
                        .or_default()
                        .insert(waiting);
                }
            }
        }

        debug!(member = %name, vnodes = vnodes.len(), "added member to ring");
        self.members.insert(name, RingMember { member, vnodes });
        true
    }

    /// Take the member called `name` off the ring, returning it if it was present.
    ///
    /// Tokens it held pass to the next member in line for them.
    pub fn remove(&mut self, name: &str) -> Option<M> {
        let entry = self.members.remove(name)?;
        for vnode in &entry.vnodes {
            if self.withdraw_waiting(vnode.token, name) {
                continue;
            }
            if self.tokens.get(&vnode.token).map(String::as_str) != Some(name) {
                continue;
            }
            match self.next_in_line(vnode.token) {
                Some(next) => {
                    self.tokens.insert(vnode.token, next);
                }
                None => {
                    self.tokens.remove(&vnode.token);
                }
            }
        }
        debug!(member = %name, "removed member from ring");
        Some(entry.member)
    }

    /// Drop `name` from the line for `token`; false if it was not waiting.
    fn withdraw_waiting(&mut self, token: LongToken, name: &str) -> bool {
        let Some(waiting) = self.shadowed.get_mut(&token) else {
            return false;
        };
        let withdrawn = waiting.remove(name);
        if waiting.is_empty() {
            self.shadowed.remove(&token);
        }
        withdrawn
    }

    fn next_in_line(&mut self, token: LongToken) -> Option<String> {
        let waiting = self.shadowed.get_mut(&token)?;
        let next = waiting.pop_first();
        if waiting.is_empty() {
            self.shadowed.remove(&token);
        }
        next
    }

    /// Member responsible for `key`, or `None` on an empty ring.
    pub fn locate_key(&self, key: &[u8]) -> Option<&M> {
        self.locate_token(self.partitioner.partition(key))
    }

    /// Member owning the first vnode clockwise from `token` (inclusive).
    pub fn locate_token(&self, token: LongToken) -> Option<&M> {
        let (_, name) = self
            .tokens
            .range(token..)
            .next()
            .or_else(|| self.tokens.iter().next())?;
        self.members.get(name).map(|entry| &entry.member)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.members.get(name).map(|entry| &entry.member)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Total vnode positions currently on the ring.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &M> {
        self.members.values().map(|entry| &entry.member)
    }

    /// Every vnode position with its owner, sorted by token.
    pub fn tokens(&self) -> Vec<(LongToken, &str)> {
        self.tokens
            .iter()
            .map(|(token, name)| (*token, name.as_str()))
            .collect()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    pub fn vnodes_per_member(&self) -> u32 {
        self.vnodes
    }
}

impl<M: Member> Default for HashRing<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Member> fmt::Debug for HashRing<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("tokens", &self.tokens.len())
            .field("vnodes", &self.vnodes)
            .field("partitioner", &self.partitioner.name())
            .finish()
    }
}
