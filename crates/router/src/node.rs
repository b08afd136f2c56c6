//! Backend node contract.
//!
//! The router never talks to a node itself. It only needs to know how to
//! name it, where requests for it should go, and how to shut it down once it
//! leaves the cluster. Everything else (transport, health polling) lives
//! behind the [`NodeFactory`] supplied by the caller.

use crate::group::Group;
use crate::health::HealthMonitor;
use std::fmt;
use std::sync::Arc;

pub use corelib::Member;

/// Handle to one backend full node.
///
/// `Member::name` must equal the name the factory was asked to build.
pub trait Node: Member + Send + Sync + fmt::Debug {
    /// Routable address handed back to callers of `route`.
    fn url(&self) -> &str;

    /// Release the node's resources. Called once, after the node left the
    /// node set; it is never routed to again.
    fn close(&self);
}

/// Builds nodes for a manager.
///
/// The factory wires the new node to `monitor` so it can push liveness and
/// epoch updates back into the manager. It is called without the manager
/// lock held, so reporting from inside `create` does not deadlock, but the
/// node is not registered yet and those reports are dropped.
///
/// A new node joins the ring alive and in sync. Nodes must send their first
/// liveness and epoch reports after `create` has returned, for example from
/// their own health-check loop.
pub trait NodeFactory: Send + Sync {
    fn create(
        &self,
        group: &Group,
        name: &str,
        url: &str,
        monitor: Arc<dyn HealthMonitor>,
    ) -> anyhow::Result<Arc<dyn Node>>;
}

const URL_SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

/// Deterministic node name for `url`: lowercase, no scheme, no trailing `/`.
///
/// `Http://Node1:8545/` and `ws://node1:8545` name the same node.
pub fn url_to_node_name(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let without_scheme = URL_SCHEMES
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme))
        .unwrap_or(&lower);
    without_scheme.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_to_node_name_strips_scheme_and_case() {
        assert_eq!(url_to_node_name("http://127.0.0.1:8545"), "127.0.0.1:8545");
        assert_eq!(url_to_node_name("HTTPS://Node.Example.com/"), "node.example.com");
        assert_eq!(url_to_node_name("wss://node1:8546/rpc/"), "node1:8546/rpc");
        assert_eq!(url_to_node_name("node1:8545"), "node1:8545");
    }

    #[test]
    fn test_url_to_node_name_same_node_across_transports() {
        assert_eq!(
            url_to_node_name("http://node1:8545"),
            url_to_node_name("ws://node1:8545")
        );
    }
}
