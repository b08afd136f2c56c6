//! Routing groups.

use std::fmt;

/// Independent routing domain, e.g. one chain over one transport.
///
/// Every [`Manager`](crate::Manager) serves exactly one group. The group only
/// labels metrics and logs and is handed to the node factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    space: String,
    name: String,
}

impl Group {
    /// `space` is the chain family (`"eth"`), `name` the group within it (`"ethhttp"`).
    pub fn new(space: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            name: name.into(),
        }
    }

    pub fn space(&self) -> &str {
        &self.space
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
