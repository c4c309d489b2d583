//! Per-route method dispatch table.

use std::sync::{Arc, OnceLock};

use crate::method::Method;

use super::group::GroupFlag;

/// A handler registered for one method of one pattern.
#[derive(Debug, Clone)]
pub(crate) struct HandlerSlot {
    pub(crate) handler: Arc<str>,
    /// Set when the route was registered through a [`Group`](super::Group)
    pub(crate) group: Option<GroupFlag>,
}

/// Maps each method to its handler and caches the derived `Allow` value.
///
/// The table is small and fixed-size: one slot per supported method. The
/// `Allow` strings are built on first use and dropped whenever the method set
/// changes.
#[derive(Debug, Default)]
pub(crate) struct MethodTable {
    slots: [Option<HandlerSlot>; Method::COUNT],
    /// Fixed `Allow` value that replaces the derived one
    allow_override: Option<Arc<str>>,
    /// Derived `Allow` values, indexed by whether OPTIONS is auto-answered
    allow: [OnceLock<Arc<str>>; 2],
}

impl MethodTable {
    /// Register `slot` for `method`.
    ///
    /// Returns the slot back when the method is already populated; the caller
    /// must remove it first.
    pub(crate) fn set(&mut self, method: Method, slot: HandlerSlot) -> Result<(), HandlerSlot> {
        let entry = &mut self.slots[method.index()];
        if entry.is_some() {
            return Err(slot);
        }
        *entry = Some(slot);
        self.allow = Default::default();
        Ok(())
    }

    #[inline]
    pub(crate) fn get(&self, method: Method) -> Option<&HandlerSlot> {
        self.slots[method.index()].as_ref()
    }

    pub(crate) fn contains(&self, method: Method) -> bool {
        self.slots[method.index()].is_some()
    }

    /// Remove the handler for `method`; reports whether one was present.
    pub(crate) fn remove(&mut self, method: Method) -> bool {
        let removed = self.slots[method.index()].take().is_some();
        if removed {
            self.allow = Default::default();
        }
        removed
    }

    /// True once no method has a handler. An `Allow` override alone does not
    /// keep a route alive.
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub(crate) fn set_allow_override(&mut self, allow: Option<Arc<str>>) {
        self.allow_override = allow;
        self.allow = Default::default();
    }

    /// Sorted, comma-separated method list for `Allow` headers.
    ///
    /// OPTIONS is listed when it is registered or when `auto_options` says
    /// the router answers it itself.
    pub(crate) fn allow(&self, auto_options: bool) -> Arc<str> {
        if let Some(fixed) = &self.allow_override {
            return Arc::clone(fixed);
        }
        Arc::clone(self.allow[usize::from(auto_options)].get_or_init(|| {
            let mut names: Vec<&str> = Method::ALL
                .into_iter()
                .filter(|m| (*m == Method::Options && auto_options) || self.contains(*m))
                .map(Method::as_str)
                .collect();
            names.sort_unstable();
            Arc::from(names.join(", "))
        }))
    }

    /// Registered methods in declaration order.
    pub(crate) fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.contains(*m))
    }
}
