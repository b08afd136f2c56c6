//! Node cluster manager.
//!
//! The [`Manager`] owns the full nodes of one [`Group`], keeps them on a
//! consistent hash ring and routes request keys to them. It also receives
//! health signals from those nodes and suspends or restores them on the ring.
//!
//! # Locking
//!
//! One reader/writer lock guards the node set, the ring and the epoch book.
//! Routing and lookups take it shared; membership changes and health reports
//! take it exclusive. Node construction and `Node::close` run outside of it,
//! so a slow backend never stalls routing.
//!
//! # Routing
//!
//! `distribute` hashes the key with xxh64, asks the repartition resolver
//! for the node the key was pinned to, and only falls back to the ring when
//! the pin is missing or its node is no longer routable. Ring answers are
//! pinned for the next request.

use crate::config::RouterConfig;
use crate::epoch::EpochBook;
use crate::error::{Result, RouterError};
use crate::group::Group;
use crate::health::{AcceptAll, EpochPolicy, HealthMonitor, DEFAULT_MAX_EPOCH_JUMP};
use crate::metrics;
use crate::node::{url_to_node_name, Member, Node, NodeFactory};
use crate::resolver::{NoopRepartitionResolver, RepartitionResolver};
use corelib::{topology, HashRing, MemberShare, RingConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use xxhash_rust::xxh64::xxh64;

/// Picks the backend URL that should serve a request key.
pub trait Router: Send + Sync {
    /// `None` when no node is available.
    fn route(&self, key: &[u8]) -> Option<String>;
}

struct NodeEntry {
    node: Arc<dyn Node>,
    /// Last liveness report; nodes start alive.
    alive: bool,
    /// Epoch within policy of the middle epoch; true until a report says otherwise.
    in_sync: bool,
}

impl NodeEntry {
    fn new(node: Arc<dyn Node>) -> Self {
        Self {
            node,
            alive: true,
            in_sync: true,
        }
    }

    fn routable(&self) -> bool {
        self.alive && self.in_sync
    }
}

/// Everything behind the manager lock.
struct ClusterState {
    nodes: HashMap<String, NodeEntry>,
    ring: HashRing<Arc<dyn Node>>,
    epochs: EpochBook,
}

impl ClusterState {
    /// The node called `name` if it is in the node set and on the ring.
    fn routable(&self, name: &str) -> Option<&Arc<dyn Node>> {
        if !self.nodes.contains_key(name) {
            return None;
        }
        self.ring.get(name)
    }

    fn insert(&mut self, name: String, node: Arc<dyn Node>, group: &Group) {
        self.ring.add(Arc::clone(&node));
        self.nodes.insert(name, NodeEntry::new(node));
        metrics::record_ring_members(group, self.ring.member_count());
    }

    fn take(
        &mut self,
        name: &str,
        policy: &dyn EpochPolicy,
        group: &Group,
    ) -> Option<Arc<dyn Node>> {
        let entry = self.nodes.remove(name)?;
        self.ring.remove(name);
        self.epochs.forget(name);
        self.refresh(policy, group);
        metrics::record_ring_members(group, self.ring.member_count());
        Some(entry.node)
    }

    /// Recompute the middle epoch, re-evaluate every node against the epoch
    /// policy and bring ring membership in line with node status.
    fn refresh(&mut self, policy: &dyn EpochPolicy, group: &Group) {
        let nodes = &self.nodes;
        let mid = self
            .epochs
            .recompute(|name| nodes.get(name).is_some_and(|entry| entry.alive));

        let mut changed = false;
        for (name, entry) in self.nodes.iter_mut() {
            let in_sync = match (self.epochs.epoch(name), mid) {
                (Some(epoch), Some(mid)) => policy.is_healthy(epoch, mid),
                _ => true,
            };
            if in_sync != entry.in_sync {
                debug!(
                    node = %name,
                    epoch = ?self.epochs.epoch(name),
                    mid_epoch = ?mid,
                    in_sync,
                    "node epoch status changed"
                );
                entry.in_sync = in_sync;
            }

            let on_ring = self.ring.contains(name);
            if entry.routable() && !on_ring {
                self.ring.add(Arc::clone(&entry.node));
                info!(group = %group, node = %name, "node restored to hash ring");
                changed = true;
            } else if !entry.routable() && on_ring {
                self.ring.remove(name);
                warn!(
                    group = %group,
                    node = %name,
                    alive = entry.alive,
                    in_sync = entry.in_sync,
                    "node suspended from hash ring"
                );
                changed = true;
            }
        }

        if changed {
            metrics::record_ring_members(group, self.ring.member_count());
        }
    }

    fn drain(&mut self, group: &Group) -> Vec<Arc<dyn Node>> {
        let drained: Vec<Arc<dyn Node>> =
            self.nodes.drain().map(|(_, entry)| entry.node).collect();
        for node in &drained {
            self.ring.remove(node.name());
            self.epochs.forget(node.name());
        }
        metrics::record_ring_members(group, 0);
        drained
    }
}

struct Shared {
    group: Group,
    factory: Arc<dyn NodeFactory>,
    resolver: Box<dyn RepartitionResolver>,
    policy: Box<dyn EpochPolicy>,
    max_epoch_jump: u64,
    state: RwLock<ClusterState>,
}

impl Shared {
    /// Non-owning health handle given to the nodes this manager creates.
    fn monitor(self: &Arc<Self>) -> Arc<dyn HealthMonitor> {
        Arc::new(MonitorHandle {
            shared: Arc::downgrade(self),
        })
    }

    fn create_node(self: &Arc<Self>, name: &str, url: &str) -> Result<Arc<dyn Node>> {
        let factory_error = |source: Box<dyn Error + Send + Sync>| RouterError::NodeFactory {
            name: name.to_owned(),
            url: url.to_owned(),
            source,
        };

        let node = self
            .factory
            .create(&self.group, name, url, self.monitor())
            .map_err(|err| factory_error(err.into()))?;

        if node.name() != name {
            let got = node.name().to_owned();
            node.close();
            return Err(factory_error(
                format!("factory returned node named {got:?}, expected {name:?}").into(),
            ));
        }
        Ok(node)
    }
}

impl HealthMonitor for Shared {
    fn healthy_epoch(&self) -> u64 {
        self.state.read().epochs.mid().unwrap_or(0)
    }

    fn report_epoch(&self, node_name: &str, epoch: u64) {
        let mut state = self.state.write();
        if !state.nodes.contains_key(node_name) {
            debug!(
                group = %self.group,
                node = %node_name,
                epoch,
                "epoch report for unknown node ignored"
            );
            return;
        }
        if !state.epochs.is_plausible(node_name, epoch, self.max_epoch_jump) {
            warn!(
                group = %self.group,
                node = %node_name,
                epoch,
                last_epoch = ?state.epochs.epoch(node_name),
                mid_epoch = ?state.epochs.mid(),
                max_jump = self.max_epoch_jump,
                "implausible epoch report ignored"
            );
            return;
        }
        state.epochs.record(node_name, epoch);
        state.refresh(self.policy.as_ref(), &self.group);
    }

    fn report_unhealthy(&self, node_name: &str, remind: bool, reason: &dyn Error) {
        let mut state = self.state.write();
        let Some(entry) = state.nodes.get_mut(node_name) else {
            debug!(
                group = %self.group,
                node = %node_name,
                "unhealthy report for unknown node ignored"
            );
            return;
        };

        if remind {
            warn!(
                group = %self.group,
                node = %node_name,
                error = %reason,
                "node still not healthy"
            );
        } else {
            warn!(
                group = %self.group,
                node = %node_name,
                error = %reason,
                "node became unhealthy"
            );
        }
        entry.alive = false;
        state.refresh(self.policy.as_ref(), &self.group);
    }

    fn report_healthy(&self, node_name: &str) {
        let mut state = self.state.write();
        let Some(entry) = state.nodes.get_mut(node_name) else {
            debug!(
                group = %self.group,
                node = %node_name,
                "healthy report for unknown node ignored"
            );
            return;
        };

        if !entry.alive {
            info!(group = %self.group, node = %node_name, "node became healthy");
        }
        entry.alive = true;
        state.refresh(self.policy.as_ref(), &self.group);
    }
}

/// Health handle held by nodes. Reports after the manager is gone are dropped.
struct MonitorHandle {
    shared: Weak<Shared>,
}

impl HealthMonitor for MonitorHandle {
    fn healthy_epoch(&self) -> u64 {
        self.shared.upgrade().map_or(0, |shared| shared.healthy_epoch())
    }

    fn report_epoch(&self, node_name: &str, epoch: u64) {
        if let Some(shared) = self.shared.upgrade() {
            shared.report_epoch(node_name, epoch);
        }
    }

    fn report_unhealthy(&self, node_name: &str, remind: bool, reason: &dyn Error) {
        if let Some(shared) = self.shared.upgrade() {
            shared.report_unhealthy(node_name, remind, reason);
        }
    }

    fn report_healthy(&self, node_name: &str) {
        if let Some(shared) = self.shared.upgrade() {
            shared.report_healthy(node_name);
        }
    }
}

/// Manages the full node cluster of one group.
///
/// 1. Monitors node health and takes nodes off the ring (and back on)
///    automatically.
/// 2. Implements [`Router`] to route request keys to nodes by consistent
///    hashing, with optional stickiness through a repartition resolver.
///
/// Cloning is cheap and every clone manages the same cluster.
#[derive(Clone)]
pub struct Manager {
    shared: Arc<Shared>,
}

impl Manager {
    /// Manager over `urls` with the default ring and no repartition.
    pub fn new<I, S>(group: Group, factory: Arc<dyn NodeFactory>, urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(group, factory).with_urls(urls).build()
    }

    pub fn builder(group: Group, factory: Arc<dyn NodeFactory>) -> ManagerBuilder {
        ManagerBuilder::new(group, factory)
    }

    pub fn group(&self) -> &Group {
        &self.shared.group
    }

    /// Start managing the node at `url`.
    ///
    /// Returns `Ok(false)` without touching the cluster when a node with the
    /// same derived name already exists. A factory failure leaves the
    /// cluster unchanged.
    pub fn add(&self, url: &str) -> Result<bool> {
        let name = url_to_node_name(url);
        if self.shared.state.read().nodes.contains_key(&name) {
            return Ok(false);
        }

        let node = self.shared.create_node(&name, url)?;

        let mut state = self.shared.state.write();
        if state.nodes.contains_key(&name) {
            // Lost the race to a concurrent add of the same node.
            drop(state);
            node.close();
            return Ok(false);
        }
        state.insert(name.clone(), node, &self.shared.group);
        drop(state);

        info!(group = %self.shared.group, node = %name, url = %url, "added full node");
        Ok(true)
    }

    /// Stop managing the node at `url` and close it.
    ///
    /// Returns `false` when no such node exists. Keys pinned to the node are
    /// re-resolved through the ring on their next request.
    pub fn remove(&self, url: &str) -> bool {
        let name = url_to_node_name(url);
        let removed = self.shared.state.write().take(
            &name,
            self.shared.policy.as_ref(),
            &self.shared.group,
        );

        match removed {
            Some(node) => {
                node.close();
                info!(group = %self.shared.group, node = %name, "removed full node");
                true
            }
            None => false,
        }
    }

    /// Remove and close every node.
    pub fn close(&self) {
        let drained = self.shared.state.write().drain(&self.shared.group);
        for node in drained {
            node.close();
        }
    }

    /// The node at `url`, whether or not it is currently on the ring.
    pub fn get(&self, url: &str) -> Option<Arc<dyn Node>> {
        let name = url_to_node_name(url);
        self.shared
            .state
            .read()
            .nodes
            .get(&name)
            .map(|entry| Arc::clone(&entry.node))
    }

    /// Snapshot of all managed nodes in no particular order.
    pub fn list(&self) -> Vec<Arc<dyn Node>> {
        self.shared
            .state
            .read()
            .nodes
            .values()
            .map(|entry| Arc::clone(&entry.node))
            .collect()
    }

    /// Names of the nodes currently on the ring, sorted.
    pub fn active(&self) -> Vec<String> {
        let state = self.shared.state.read();
        let mut names: Vec<String> = state
            .ring
            .members()
            .map(|node| node.name().to_owned())
            .collect();
        names.sort_unstable();
        names
    }

    /// Share of the token space each node on the ring is responsible for.
    pub fn ownership(&self) -> Vec<MemberShare> {
        topology::ownership(&self.shared.state.read().ring)
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle for feeding health reports about this manager's nodes.
    pub fn health_monitor(&self) -> Arc<dyn HealthMonitor> {
        self.shared.monitor()
    }

    /// Node that should serve `key`, or `None` when no node is on the ring.
    pub fn distribute(&self, key: &[u8]) -> Option<Arc<dyn Node>> {
        let hashed = xxh64(key, 0);
        let state = self.shared.state.read();

        if let Some(name) = self.shared.resolver.get(hashed) {
            if let Some(node) = state.routable(&name) {
                return Some(Arc::clone(node));
            }
            debug!(
                group = %self.shared.group,
                node = %name,
                "pinned node not routable, re-resolving"
            );
        }

        let node = Arc::clone(state.ring.locate_key(key)?);
        self.shared.resolver.put(hashed, node.name());
        Some(node)
    }

    /// URL of the node that should serve `key`.
    pub fn route(&self, key: &[u8]) -> Option<String> {
        let node = self.distribute(key)?;
        metrics::record_route(&self.shared.group, node.name());
        Some(node.url().to_owned())
    }
}

impl Router for Manager {
    fn route(&self, key: &[u8]) -> Option<String> {
        Manager::route(self, key)
    }
}

impl HealthMonitor for Manager {
    fn healthy_epoch(&self) -> u64 {
        self.shared.healthy_epoch()
    }

    fn report_epoch(&self, node_name: &str, epoch: u64) {
        self.shared.report_epoch(node_name, epoch);
    }

    fn report_unhealthy(&self, node_name: &str, remind: bool, reason: &dyn Error) {
        self.shared.report_unhealthy(node_name, remind, reason);
    }

    fn report_healthy(&self, node_name: &str) {
        self.shared.report_healthy(node_name);
    }
}

/// Comma-separated node names in no particular order.
impl fmt::Display for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        let names: Vec<&str> = state.nodes.keys().map(String::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Manager")
            .field("group", &self.shared.group)
            .field("nodes", &state.nodes.len())
            .field("ring", &state.ring)
            .field("mid_epoch", &state.epochs.mid())
            .finish()
    }
}

/// Configures and builds a [`Manager`].
pub struct ManagerBuilder {
    group: Group,
    factory: Arc<dyn NodeFactory>,
    resolver: Box<dyn RepartitionResolver>,
    policy: Box<dyn EpochPolicy>,
    max_epoch_jump: u64,
    ring: RingConfig,
    urls: Vec<String>,
}

impl ManagerBuilder {
    pub fn new(group: Group, factory: Arc<dyn NodeFactory>) -> Self {
        Self {
            group,
            factory,
            resolver: Box::new(NoopRepartitionResolver),
            policy: Box::new(AcceptAll),
            max_epoch_jump: DEFAULT_MAX_EPOCH_JUMP,
            ring: RingConfig::default(),
            urls: Vec::new(),
        }
    }

    /// Apply ring, repartition and health settings from `config`.
    pub fn from_config(self, config: &RouterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver: config.resolver()?,
            policy: config.epoch_policy(),
            max_epoch_jump: config.max_epoch_jump(),
            ring: config.ring,
            ..self
        })
    }

    pub fn with_repartition(mut self, resolver: impl RepartitionResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_epoch_policy(mut self, policy: impl EpochPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Bound on how far past a node's last epoch, or the middle epoch, a
    /// single report may reach before it is discarded.
    pub fn with_max_epoch_jump(mut self, max_jump: u64) -> Self {
        self.max_epoch_jump = max_jump;
        self
    }

    pub fn with_ring_config(mut self, ring: RingConfig) -> Self {
        self.ring = ring;
        self
    }

    /// Initial node URLs; duplicates by derived name are built once.
    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Build the manager and every initial node.
    ///
    /// If any node fails to build, the nodes already built are closed and
    /// the factory error is returned.
    pub fn build(self) -> Result<Manager> {
        if self.max_epoch_jump == 0 {
            return Err(RouterError::Config("max_epoch_jump must be at least 1".into()));
        }
        let ring = HashRing::with_config(&self.ring)?;
        let manager = Manager {
            shared: Arc::new(Shared {
                group: self.group,
                factory: self.factory,
                resolver: self.resolver,
                policy: self.policy,
                max_epoch_jump: self.max_epoch_jump,
                state: RwLock::new(ClusterState {
                    nodes: HashMap::new(),
                    ring,
                    epochs: EpochBook::default(),
                }),
            }),
        };

        for url in &self.urls {
            if let Err(err) = manager.add(url) {
                manager.close();
                return Err(err);
            }
        }
        Ok(manager)
    }
}
