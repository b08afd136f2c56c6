//! Ring tuning knobs.

use crate::error::{Error, Result};
use crate::partitioner::HashFunction;
use serde::{Deserialize, Serialize};

/// Default number of vnodes per member.
pub const DEFAULT_VNODES: u32 = 256;

/// Upper bound on vnodes per member; beyond this the ring only burns memory.
pub const MAX_VNODES: u32 = 1 << 16;

/// Ring configuration, fixed when the ring is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Virtual nodes (replicas) placed on the ring for every member.
    pub vnodes: u32,
    /// Hash function for both vnode placement and key lookup.
    pub hash: HashFunction,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            vnodes: DEFAULT_VNODES,
            hash: HashFunction::default(),
        }
    }
}

impl RingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vnodes == 0 {
            return Err(Error::InvalidConfig("vnodes must be at least 1".into()));
        }
        if self.vnodes > MAX_VNODES {
            return Err(Error::InvalidConfig(format!(
                "vnodes must not exceed {}, got {}",
                MAX_VNODES, self.vnodes
            )));
        }
        Ok(())
    }
}
