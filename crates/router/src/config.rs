//! Router configuration.
//!
//! Loaded from JSON; every section is optional and falls back to defaults:
//!
//! ```json
//! {
//!   "ring": { "vnodes": 256, "hash": "xxh3" },
//!   "repartition": { "kind": "simple", "capacity": 100000, "ttl_secs": 600 },
//!   "health": { "max_epoch_gap": 100, "max_epoch_jump": 1000000 }
//! }
//! ```

use crate::error::{Result, RouterError};
use crate::health::{AcceptAll, EpochPolicy, MaxEpochGap, DEFAULT_MAX_EPOCH_JUMP};
use crate::resolver::{NoopRepartitionResolver, RepartitionResolver, SimpleRepartitionResolver};
use corelib::RingConfig;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

fn default_capacity() -> usize {
    100_000
}

/// Top-level configuration of one manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub ring: RingConfig,
    pub repartition: RepartitionConfig,
    pub health: HealthConfig,
}

/// Which repartition resolver pins routing keys to nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepartitionConfig {
    /// Pure consistent hashing.
    #[default]
    Noop,
    /// LRU-bounded in-memory pins with an optional expiry.
    Simple {
        #[serde(default = "default_capacity")]
        capacity: usize,
        #[serde(default)]
        ttl_secs: Option<u64>,
    },
}

/// Epoch tolerance before a node is suspended from the ring.
///
/// With no `max_epoch_gap` nodes are only suspended for being down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Largest distance from the middle epoch tolerated.
    pub max_epoch_gap: Option<u64>,
    /// Separate bound for nodes ahead of the middle epoch; defaults to `max_epoch_gap`.
    pub max_epoch_lead: Option<u64>,
    /// Reports jumping further ahead than this are discarded; defaults to
    /// [`DEFAULT_MAX_EPOCH_JUMP`].
    pub max_epoch_jump: Option<u64>,
}

impl RouterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.ring.validate()?;
        if let RepartitionConfig::Simple { capacity, ttl_secs } = &self.repartition {
            if *capacity == 0 {
                return Err(RouterError::Config("repartition capacity must be at least 1".into()));
            }
            if *ttl_secs == Some(0) {
                return Err(RouterError::Config(
                    "repartition ttl_secs must be positive when set".into(),
                ));
            }
        }
        if self.health.max_epoch_lead.is_some() && self.health.max_epoch_gap.is_none() {
            return Err(RouterError::Config("max_epoch_lead requires max_epoch_gap".into()));
        }
        if self.health.max_epoch_jump == Some(0) {
            return Err(RouterError::Config("max_epoch_jump must be at least 1".into()));
        }
        Ok(())
    }

    pub fn resolver(&self) -> Result<Box<dyn RepartitionResolver>> {
        match &self.repartition {
            RepartitionConfig::Noop => Ok(Box::new(NoopRepartitionResolver)),
            RepartitionConfig::Simple { capacity, ttl_secs } => {
                let capacity = NonZeroUsize::new(*capacity).ok_or_else(|| {
                    RouterError::Config("repartition capacity must be at least 1".into())
                })?;
                Ok(match ttl_secs {
                    Some(secs) => Box::new(SimpleRepartitionResolver::with_ttl(
                        capacity,
                        Duration::from_secs(*secs),
                    )),
                    None => Box::new(SimpleRepartitionResolver::new(capacity)),
                })
            }
        }
    }

    pub fn max_epoch_jump(&self) -> u64 {
        self.health.max_epoch_jump.unwrap_or(DEFAULT_MAX_EPOCH_JUMP)
    }

    pub fn epoch_policy(&self) -> Box<dyn EpochPolicy> {
        match self.health.max_epoch_gap {
            Some(gap) => Box::new(MaxEpochGap::new(
                gap,
                self.health.max_epoch_lead.unwrap_or(gap),
            )),
            None => Box::new(AcceptAll),
        }
    }
}
