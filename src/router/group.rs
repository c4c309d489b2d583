//! Enable/disable switches shared by a set of routes.
//!
//! Toggling a group never touches the tree: the flag is read after a match is
//! found, outside the tree lock, and a disabled route resolves to
//! [`MatchOutcome::RouteDisabled`](super::MatchOutcome::RouteDisabled).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag carried by every handler slot registered through a group.
#[derive(Debug, Clone)]
pub(crate) struct GroupFlag(Arc<AtomicBool>);

impl GroupFlag {
    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle for a set of routes that can be switched on and off together.
///
/// Create one with [`Router::group`](super::Router::group) and register routes
/// through [`Router::register_in`](super::Router::register_in). Clones share
/// the same switch.
#[derive(Debug, Clone)]
pub struct Group {
    flag: GroupFlag,
}

impl Group {
    pub(crate) fn new() -> Self {
        Self {
            flag: GroupFlag(Arc::new(AtomicBool::new(true))),
        }
    }

    pub(crate) fn flag(&self) -> GroupFlag {
        self.flag.clone()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.flag.is_enabled()
    }

    pub fn enable(&self) {
        self.flag.0.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.flag.0.store(false, Ordering::Release);
    }
}
