//! Consistent-hashing router over a cluster of backend full nodes.
//!
//! This crate provides:
//! - The [`Manager`]: node set, hash ring and key-based routing for one group
//! - Repartition resolvers that keep keys pinned to a node across churn
//! - The [`Node`] / [`NodeFactory`] contract for backends
//! - The [`HealthMonitor`] contract and epoch policies for suspending nodes
//! - JSON configuration and routing metrics

pub mod config;
mod epoch;
pub mod error;
pub mod group;
pub mod health;
pub mod manager;
pub mod metrics;
pub mod node;
pub mod resolver;

pub use corelib::{HashFunction, MemberShare, RingConfig};
pub use config::{HealthConfig, RepartitionConfig, RouterConfig};
pub use error::{Result, RouterError};
pub use group::Group;
pub use health::{AcceptAll, EpochPolicy, HealthMonitor, MaxEpochGap, DEFAULT_MAX_EPOCH_JUMP};
pub use manager::{Manager, ManagerBuilder, Router};
pub use node::{url_to_node_name, Member, Node, NodeFactory};
pub use resolver::{NoopRepartitionResolver, RepartitionResolver, SimpleRepartitionResolver};
