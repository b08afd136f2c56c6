//! Shared fixtures: in-memory nodes and a factory that remembers what it built.

#![allow(dead_code)]

use parking_lot::Mutex;
use router::{
    Group, HealthMonitor, Manager, ManagerBuilder, Member, Node, NodeFactory, RepartitionResolver,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct TestNode {
    name: String,
    url: String,
    closed: AtomicBool,
    monitor: Arc<dyn HealthMonitor>,
}

impl TestNode {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The health handle the manager wired into this node.
    pub fn monitor(&self) -> &Arc<dyn HealthMonitor> {
        &self.monitor
    }
}

impl Member for TestNode {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Node for TestNode {
    fn url(&self) -> &str {
        &self.url
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestNode")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[derive(Default)]
pub struct TestFactory {
    built: Mutex<Vec<Arc<TestNode>>>,
    failing: Mutex<HashSet<String>>,
    /// Name override, to simulate a misbehaving factory.
    rename: Mutex<Option<String>>,
    /// URLs whose nodes report themselves down from inside `create`.
    down_on_create: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl TestFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every `create` for `url` fail.
    pub fn fail_on(&self, url: &str) {
        self.failing.lock().insert(url.to_owned());
    }

    pub fn report_down_on_create(&self, url: &str) {
        self.down_on_create.lock().insert(url.to_owned());
    }

    pub fn rename_to(&self, name: &str) {
        *self.rename.lock() = Some(name.to_owned());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recently built node called `name`.
    pub fn node(&self, name: &str) -> Arc<TestNode> {
        self.built
            .lock()
            .iter()
            .rev()
            .find(|n| n.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("no node named {name} was built"))
    }

    pub fn built(&self) -> Vec<Arc<TestNode>> {
        self.built.lock().clone()
    }
}

impl NodeFactory for TestFactory {
    fn create(
        &self,
        _group: &Group,
        name: &str,
        url: &str,
        monitor: Arc<dyn HealthMonitor>,
    ) -> anyhow::Result<Arc<dyn Node>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(url) {
            anyhow::bail!("dial {url}: connection refused");
        }

        if self.down_on_create.lock().contains(url) {
            let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "not ready");
            monitor.report_unhealthy(name, false, &refused);
        }

        let name = self.rename.lock().clone().unwrap_or_else(|| name.to_owned());
        let node = Arc::new(TestNode {
            name,
            url: url.to_owned(),
            closed: AtomicBool::new(false),
            monitor,
        });
        self.built.lock().push(Arc::clone(&node));
        Ok(node)
    }
}

/// Resolver that shares its pins with the test and counts writes.
#[derive(Clone, Default)]
pub struct RecordingResolver {
    pins: Arc<Mutex<HashMap<u64, String>>>,
    puts: Arc<AtomicUsize>,
}

impl RecordingResolver {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn pins(&self) -> HashMap<u64, String> {
        self.pins.lock().clone()
    }
}

impl RepartitionResolver for RecordingResolver {
    fn get(&self, key: u64) -> Option<String> {
        self.pins.lock().get(&key).cloned()
    }

    fn put(&self, key: u64, node_name: &str) {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.pins.lock().insert(key, node_name.to_owned());
    }
}

pub fn group() -> Group {
    Group::new("eth", "ethhttp")
}

pub fn url(name: &str) -> String {
    format!("http://{name}:8545")
}

/// Node name the manager derives from [`url`].
pub fn node_name(name: &str) -> String {
    format!("{name}:8545")
}

pub fn builder(factory: &Arc<TestFactory>, names: &[&str]) -> ManagerBuilder {
    Manager::builder(group(), Arc::clone(factory) as Arc<dyn NodeFactory>)
        .with_urls(names.iter().map(|n| url(n)))
}

pub fn manager(factory: &Arc<TestFactory>, names: &[&str]) -> Manager {
    builder(factory, names).build().expect("manager builds")
}

pub fn sample_keys(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("chain:{i}").into_bytes()).collect()
}

/// Name of the node serving `key`, if any.
pub fn owner(manager: &Manager, key: &[u8]) -> Option<String> {
    manager.distribute(key).map(|n| n.name().to_owned())
}
