//! Ring membership abstraction.
//!
//! Anything with a stable string identity can sit on the ring. The name is
//! the member's key: adding a second member with the same name is a no-op
//! and removal is by name.

use std::sync::Arc;

/// A participant of the consistent hash ring.
pub trait Member {
    /// Stable identity of this member, unique within a ring.
    fn name(&self) -> &str;
}

impl<T: Member + ?Sized> Member for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Member + ?Sized> Member for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl Member for String {
    fn name(&self) -> &str {
        self
    }
}
