//! Core library for the consistent hash ring used by the node router.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Token type for positions on a 2^64 ring
//! - Partitioner algorithms (pluggable hash functions)
//! - Virtual node abstractions
//! - Ring membership, lookup and configuration
//! - Ownership statistics over the ring topology

pub mod error;
pub mod member;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod topology;
pub mod vnode;

pub use error::{Error, Result};
pub use member::Member;
pub use partitioner::{HashFunction, Partitioner};
pub use ring::{HashRing, Ring, RingBuilder, RingConfig};
pub use token::{LongToken, Token};
pub use topology::{imbalance, ownership, MemberShare};
pub use vnode::VirtualNode;
