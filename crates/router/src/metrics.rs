//! Routing metrics.
//!
//! Emitted through the `metrics` facade; without an installed recorder every
//! call is a no-op, so routing never depends on a sink being present.

use crate::group::Group;
use metrics::{counter, gauge};

/// Successful routes, labelled by node. `node="overall"` counts every route.
pub const ROUTES_TOTAL: &str = "rpc_node_routes_total";

/// Members currently on the hash ring of a group.
pub const RING_MEMBERS: &str = "rpc_node_ring_members";

const OVERALL: &str = "overall";

pub(crate) fn record_route(group: &Group, node_name: &str) {
    counter!(
        ROUTES_TOTAL,
        "space" => group.space().to_owned(),
        "group" => group.name().to_owned(),
        "node" => OVERALL
    )
    .increment(1);
    counter!(
        ROUTES_TOTAL,
        "space" => group.space().to_owned(),
        "group" => group.name().to_owned(),
        "node" => node_name.to_owned()
    )
    .increment(1);
}

pub(crate) fn record_ring_members(group: &Group, members: usize) {
    gauge!(
        RING_MEMBERS,
        "space" => group.space().to_owned(),
        "group" => group.name().to_owned()
    )
    .set(members as f64);
}
