use std::collections::HashMap;

use anyhow::Context;
use tracing::{debug, info};

use crate::method::Method;
use crate::router::{Group, Router};
use crate::runtime_config::RuntimeConfig;

use super::types::{RouteSpec, RouteTable};

/// Group handles created while applying a table, by group name.
pub type TableGroups = HashMap<String, Group>;

impl RouteSpec {
    /// Parse the method names of this entry.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownMethod`](crate::error::RouterError::UnknownMethod)
    /// for a name outside the supported set.
    pub fn parsed_methods(&self) -> Result<Vec<Method>, crate::error::RouterError> {
        self.methods.iter().map(|m| m.parse()).collect()
    }
}

impl RouteTable {
    /// Register every entry on `router`, in order.
    ///
    /// Routes naming the same group share one [`Group`] handle; the handles
    /// are returned so the caller can switch groups on and off.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that fails to register. Entries before it
    /// stay registered.
    pub fn apply(&self, router: &Router) -> anyhow::Result<TableGroups> {
        let mut groups = TableGroups::new();
        for (index, spec) in self.routes.iter().enumerate() {
            apply_one(router, spec, &mut groups)
                .with_context(|| format!("route #{index} ({})", spec.pattern))?;
        }
        info!(
            routes_count = self.routes.len(),
            groups_count = groups.len(),
            "Route table applied"
        );
        Ok(groups)
    }

    /// Build a fresh router holding exactly this table's routes.
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::apply`].
    pub fn build_router(&self, config: RuntimeConfig) -> anyhow::Result<(Router, TableGroups)> {
        let router = Router::with_config(config);
        let groups = self.apply(&router)?;
        Ok((router, groups))
    }
}

fn apply_one(router: &Router, spec: &RouteSpec, groups: &mut TableGroups) -> anyhow::Result<()> {
    let methods = spec.parsed_methods()?;
    match &spec.group {
        Some(name) => {
            let group = groups
                .entry(name.clone())
                .or_insert_with(|| router.group());
            router.register_in(group, &spec.pattern, &methods, &spec.handler)?;
        }
        None => router.register(&spec.pattern, &methods, &spec.handler)?,
    }
    if let Some(name) = &spec.name {
        router.name(name, &spec.pattern)?;
    }
    if let Some(allow) = &spec.allow {
        router.set_allow(&spec.pattern, Some(allow))?;
    }
    debug!(
        pattern = %spec.pattern,
        handler_name = %spec.handler,
        "Table route registered"
    );
    Ok(())
}
