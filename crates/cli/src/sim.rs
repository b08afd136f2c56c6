//! Simulated full nodes: addressable, closeable, and otherwise inert.

use router::{Group, HealthMonitor, Member, Node, NodeFactory};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct SimNode {
    name: String,
    url: String,
}

impl Member for SimNode {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Node for SimNode {
    fn url(&self) -> &str {
        &self.url
    }

    fn close(&self) {
        debug!(node = %self.name, "closed simulated node");
    }
}

/// Builds a [`SimNode`] for every URL; never fails.
#[derive(Debug, Default)]
pub struct SimFactory;

impl NodeFactory for SimFactory {
    fn create(
        &self,
        group: &Group,
        name: &str,
        url: &str,
        _monitor: Arc<dyn HealthMonitor>,
    ) -> anyhow::Result<Arc<dyn Node>> {
        debug!(group = %group, node = %name, "created simulated node");
        Ok(Arc::new(SimNode {
            name: name.to_owned(),
            url: url.to_owned(),
        }))
    }
}
