//! Health reporting contract and epoch policies.
//!
//! Nodes push liveness transitions and epoch progress into a
//! [`HealthMonitor`]. The manager implements it: a node that goes down, or
//! whose epoch strays too far from the cluster's middle epoch, is suspended
//! from the hash ring and restored once it recovers.
//! Epoch reports that leap implausibly far ahead are dropped before they
//! can move the middle epoch.

use std::error::Error;

/// Largest step past the higher of a node's last epoch and the middle epoch
/// that an epoch report may take before it is discarded as implausible.
pub const DEFAULT_MAX_EPOCH_JUMP: u64 = 1_000_000;

/// Receiver of asynchronous health signals from nodes.
///
/// Reports may arrive from any thread, out of order or duplicated; every
/// method is idempotent. Reports for names the receiver does not know are
/// ignored.
pub trait HealthMonitor: Send + Sync {
    /// Middle epoch of the cluster, the reference point for "in sync".
    /// Zero until some node reported.
    fn healthy_epoch(&self) -> u64;

    /// Latest epoch observed on `node_name`.
    fn report_epoch(&self, node_name: &str, epoch: u64);

    /// `node_name` failed its health check. `remind` marks a repeated report
    /// for a node that was already unhealthy.
    fn report_unhealthy(&self, node_name: &str, remind: bool, reason: &dyn Error);

    /// `node_name` passed its health check again.
    fn report_healthy(&self, node_name: &str);
}

/// Decides whether a node at `epoch` is in sync with the cluster at `mid_epoch`.
pub trait EpochPolicy: Send + Sync {
    fn is_healthy(&self, epoch: u64, mid_epoch: u64) -> bool;
}

impl<F> EpochPolicy for F
where
    F: Fn(u64, u64) -> bool + Send + Sync,
{
    fn is_healthy(&self, epoch: u64, mid_epoch: u64) -> bool {
        self(epoch, mid_epoch)
    }
}

/// Never suspends a node for its epoch; only liveness matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EpochPolicy for AcceptAll {
    fn is_healthy(&self, _epoch: u64, _mid_epoch: u64) -> bool {
        true
    }
}

/// Tolerates a node trailing the middle epoch by at most `behind` and
/// leading it by at most `ahead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxEpochGap {
    pub behind: u64,
    pub ahead: u64,
}

impl MaxEpochGap {
    pub fn new(behind: u64, ahead: u64) -> Self {
        Self { behind, ahead }
    }

    /// Same tolerance in both directions.
    pub fn symmetric(gap: u64) -> Self {
        Self::new(gap, gap)
    }
}

impl EpochPolicy for MaxEpochGap {
    fn is_healthy(&self, epoch: u64, mid_epoch: u64) -> bool {
        if epoch >= mid_epoch {
            epoch - mid_epoch <= self.ahead
        } else {
            mid_epoch - epoch <= self.behind
        }
    }
}
