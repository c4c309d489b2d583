//! # Hot Reload Module
//!
//! Live reloading of route table files without restarting the process.
//!
//! ## Overview
//!
//! [`watch_table`] watches a route table file and, on every modification:
//! - Reloads and parses the table
//! - Builds a fresh [`Router`] from it
//! - Swaps the new router in behind the shared `RwLock`
//! - Calls a hook with the new router and its groups
//!
//! ## Usage
//!
//! ```rust,ignore
//! use muxtree::hot_reload::watch_table;
//! use muxtree::router::Router;
//! use muxtree::runtime_config::RuntimeConfig;
//! use std::sync::{Arc, RwLock};
//!
//! let router = Arc::new(RwLock::new(Router::new()));
//! let watcher = watch_table("routes.yaml", router.clone(), RuntimeConfig::from_env(), |r, _groups| {
//!     println!("Reloaded {} routes", r.len());
//! })?;
//! // Keep `watcher` alive for as long as reloads are wanted
//! ```
//!
//! ## Error Handling
//!
//! If the new table fails to parse or register, the error is logged and the
//! previous router stays active.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::table::{load_table, TableGroups};

/// Watch a route table file and rebuild the [`Router`] when it changes.
///
/// The callback receives the newly installed router and the groups its table
/// declared. Dropping the returned watcher stops the reloads.
///
/// # Errors
///
/// Fails when the watcher cannot be created or the path cannot be watched.
pub fn watch_table<P, F>(
    table_path: P,
    router: Arc<RwLock<Router>>,
    config: RuntimeConfig,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&Router, &TableGroups) + Send + 'static,
{
    let path: PathBuf = table_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let rebuilt =
                    load_table(&watch_path).and_then(|table| table.build_router(config));
                match rebuilt {
                    Ok((new_router, groups)) => {
                        let mut current = router
                            .write()
                            .unwrap_or_else(std::sync::PoisonError::into_inner);
                        *current = new_router;
                        info!(
                            path = %watch_path.display(),
                            routes_count = current.len(),
                            "hot-reload: route table applied"
                        );
                        on_reload(&current, &groups);
                    }
                    Err(e) => warn!(
                        path = %watch_path.display(),
                        error = %format!("{e:#}"),
                        "hot-reload: keeping previous routes"
                    ),
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
