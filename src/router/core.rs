//! Router core module - registration, reverse lookup and the request hot path.
//!
//! # Allocation discipline
//!
//! Matching is the hot path. Parameters are collected into a [`ParamVec`]
//! that stays on the stack for up to [`MAX_INLINE_PARAMS`] entries, parameter
//! names are shared `Arc<str>` values from the tree, and the request path is
//! only copied when it needs cleaning. The lints below keep accidental string
//! building out of this module.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::error::RouterError;
use crate::method::Method;
use crate::runtime_config::RuntimeConfig;

use super::group::{Group, GroupFlag};
use super::methods::HandlerSlot;
use super::path::clean_path;
use super::pattern::{compile, Pattern};
use super::radix::{Hit, RadixNode};
use super::url::{build, ParamSource};

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 captures (e.g. `/users/{id}/posts/{post_id}`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` handles shared with the tree, values are per-request
/// slices of the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Name of the handler registered for the pattern and method
    pub handler_name: Arc<str>,
    /// The registered pattern that matched
    pub pattern: Arc<str>,
    /// The request method
    pub method: Method,
    /// Named capture values in pattern order (e.g. `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    /// Text matched by a `/*` tail, without its leading `/`
    pub wildcard: Option<String>,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if a name appears twice in a
    /// pattern (e.g. `/org/{id}/user/{id}`), the last occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap.
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Outcome of matching a `(host, path, method)` triple.
///
/// Nothing here is an error: mapping outcomes to HTTP statuses is up to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A handler is registered for the path and method
    Found(RouteMatch),
    /// No registered pattern accepts the path
    NotFound,
    /// The path matched but the method is not registered
    MethodNotAllowed { allow: Arc<str> },
    /// Automatic reply to an OPTIONS request
    Options { allow: Arc<str> },
    /// The path matched a route whose group is switched off
    RouteDisabled { pattern: Arc<str> },
}

impl MatchOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, MatchOutcome::Found(_))
    }

    /// The match, if a handler was found.
    #[must_use]
    pub fn found(self) -> Option<RouteMatch> {
        match self {
            MatchOutcome::Found(m) => Some(m),
            _ => None,
        }
    }

    /// `Allow` value carried by 405 and OPTIONS outcomes.
    #[must_use]
    pub fn allow(&self) -> Option<&str> {
        match self {
            MatchOutcome::MethodNotAllowed { allow } | MatchOutcome::Options { allow } => {
                Some(allow)
            }
            _ => None,
        }
    }

    /// Short label for logs and CLI output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MatchOutcome::Found(_) => "found",
            MatchOutcome::NotFound => "not_found",
            MatchOutcome::MethodNotAllowed { .. } => "method_not_allowed",
            MatchOutcome::Options { .. } => "options",
            MatchOutcome::RouteDisabled { .. } => "route_disabled",
        }
    }
}

/// One registered pattern as reported by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub pattern: Arc<str>,
    /// Registered methods with their handler names, in method order
    pub handlers: Vec<(Method, Arc<str>)>,
    pub allow: Arc<str>,
}

#[derive(Debug)]
struct RouteTree {
    /// Patterns starting with `/`
    paths: RadixNode,
    /// Host-qualified patterns, matched against `host + path`
    hosts: RadixNode,
    /// Every registered pattern by its source text
    patterns: HashMap<Arc<str>, Arc<Pattern>>,
    next_seq: u64,
}

impl RouteTree {
    fn new() -> Self {
        Self {
            paths: RadixNode::root(),
            hosts: RadixNode::root(),
            patterns: HashMap::new(),
            next_seq: 0,
        }
    }

    fn root_mut(&mut self, pattern: &Pattern) -> &mut RadixNode {
        if pattern.is_host() {
            &mut self.hosts
        } else {
            &mut self.paths
        }
    }

    /// Remove `methods` from `pattern`; reports whether the pattern is gone.
    fn remove(&mut self, pattern: &str, methods: &[Method]) -> Option<bool> {
        let compiled = self.patterns.get(pattern).cloned()?;
        let gone = self.root_mut(&compiled).remove(&compiled, methods)?;
        if gone {
            self.patterns.remove(pattern);
        }
        Some(gone)
    }
}

/// Owned data pulled out of the tree so the lock can be released before the
/// group flag is read.
struct Resolved {
    pattern: Arc<str>,
    params: ParamVec,
    wildcard: Option<String>,
    slot: Option<HandlerSlot>,
    allow: Option<Arc<str>>,
}

impl Resolved {
    fn from_hit(hit: Hit<'_>, subject: &str, method: Method, auto_options: bool) -> Self {
        let slot = hit.entry.methods.get(method).cloned();
        let allow = slot.is_none().then(|| hit.entry.methods.allow(auto_options));
        Self {
            pattern: Arc::clone(hit.entry.pattern.source_arc()),
            params: hit.params,
            wildcard: hit
                .tail
                .and_then(|at| subject.get(at..))
                .map(str::to_owned),
            slot,
            allow,
        }
    }
}

/// Request router over a radix tree of compiled patterns.
///
/// One mutex guards the tree for both matching and registration; names live
/// behind their own lock. Every router owns its own state, so any number of
/// independent routers can coexist in one process.
///
/// # Example
///
/// ```
/// use muxtree::router::{MatchOutcome, Router};
/// use muxtree::Method;
///
/// let router = Router::new();
/// router.register("/posts/{id:\\d+}", &[Method::Get], "show_post").unwrap();
///
/// match router.route("", "/posts/42", Method::Get) {
///     MatchOutcome::Found(m) => {
///         assert_eq!(&*m.handler_name, "show_post");
///         assert_eq!(m.get_path_param("id"), Some("42"));
///     }
///     other => panic!("unexpected outcome {other:?}"),
/// }
/// ```
#[derive(Debug)]
pub struct Router {
    tree: Mutex<RouteTree>,
    /// Route name → pattern source
    names: RwLock<HashMap<String, Arc<str>>>,
    config: RuntimeConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            tree: Mutex::new(RouteTree::new()),
            names: RwLock::new(HashMap::new()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn lock_tree(&self) -> MutexGuard<'_, RouteTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_names(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<str>>> {
        self.names.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_names(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<str>>> {
        self.names.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a group handle for [`Router::register_in`].
    #[must_use]
    pub fn group(&self) -> Group {
        Group::new()
    }

    /// Register `handler` for `pattern` under each of `methods`.
    ///
    /// An empty method list registers every method except OPTIONS.
    ///
    /// # Errors
    ///
    /// - [`RouterError::MissingHandler`] for a blank handler name
    /// - [`RouterError::Syntax`] when the pattern does not compile
    /// - [`RouterError::DuplicateRoute`] when any of the methods is already
    ///   registered for the pattern; nothing is registered in that case
    pub fn register(
        &self,
        pattern: &str,
        methods: &[Method],
        handler: &str,
    ) -> Result<(), RouterError> {
        self.add(pattern, methods, handler, None)
    }

    /// Like [`Router::register`], with the route gated by `group`.
    ///
    /// # Errors
    ///
    /// Same as [`Router::register`].
    pub fn register_in(
        &self,
        group: &Group,
        pattern: &str,
        methods: &[Method],
        handler: &str,
    ) -> Result<(), RouterError> {
        self.add(pattern, methods, handler, Some(group.flag()))
    }

    fn add(
        &self,
        pattern: &str,
        methods: &[Method],
        handler: &str,
        group: Option<GroupFlag>,
    ) -> Result<(), RouterError> {
        if handler.trim().is_empty() {
            return Err(RouterError::MissingHandler {
                pattern: pattern.to_string(),
            });
        }
        let requested = if methods.is_empty() { &Method::ANY[..] } else { methods };
        // A method listed twice registers once
        let mut methods: SmallVec<[Method; Method::COUNT]> = SmallVec::new();
        for method in requested {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }

        let mut guard = self.lock_tree();
        let tree = &mut *guard;
        let compiled = match tree.patterns.get(pattern) {
            Some(existing) => Arc::clone(existing),
            None => Arc::new(compile(pattern).map_err(|source| RouterError::Syntax {
                pattern: pattern.to_string(),
                source,
            })?),
        };

        let root = if compiled.is_host() {
            &mut tree.hosts
        } else {
            &mut tree.paths
        };
        if let Some(entry) = root.get(&compiled) {
            if let Some(method) = methods.iter().find(|m| entry.methods.contains(**m)) {
                return Err(RouterError::DuplicateRoute {
                    pattern: pattern.to_string(),
                    method: *method,
                });
            }
        }

        let seq = tree.next_seq;
        tree.next_seq += 1;
        let handler: Arc<str> = Arc::from(handler);
        let entry = root.insert(&compiled, seq);
        for method in &methods {
            let slot = HandlerSlot {
                handler: Arc::clone(&handler),
                group: group.clone(),
            };
            if entry.methods.set(*method, slot).is_err() {
                return Err(RouterError::DuplicateRoute {
                    pattern: pattern.to_string(),
                    method: *method,
                });
            }
        }
        tree.patterns
            .insert(Arc::clone(compiled.source_arc()), compiled);

        debug!(
            pattern = %pattern,
            methods = ?methods,
            handler_name = %handler,
            grouped = group.is_some(),
            "Route registered"
        );
        Ok(())
    }

    /// Remove `methods` from `pattern`; an empty list removes every method.
    ///
    /// Returns false when the pattern is not registered. Once a pattern has
    /// no methods left it is dropped from the tree along with its names.
    pub fn remove(&self, pattern: &str, methods: &[Method]) -> bool {
        let methods = if methods.is_empty() { &Method::ALL[..] } else { methods };
        let gone = match self.lock_tree().remove(pattern, methods) {
            Some(gone) => gone,
            None => return false,
        };
        if gone {
            self.write_names().retain(|_, source| &**source != pattern);
        }
        debug!(pattern = %pattern, methods = ?methods, pattern_removed = gone, "Route removed");
        true
    }

    /// Remove every pattern whose source starts with `prefix`.
    ///
    /// An empty prefix clears the router. Returns the number of patterns
    /// removed.
    pub fn clean(&self, prefix: &str) -> usize {
        let removed: Vec<Arc<str>> = {
            let mut tree = self.lock_tree();
            let doomed: Vec<Arc<str>> = tree
                .patterns
                .keys()
                .filter(|source| source.starts_with(prefix))
                .cloned()
                .collect();
            for source in &doomed {
                tree.remove(source, &Method::ALL);
            }
            doomed
        };
        if !removed.is_empty() {
            self.write_names()
                .retain(|_, source| !removed.contains(source));
        }
        info!(prefix = %prefix, removed = removed.len(), "Routes cleaned");
        removed.len()
    }

    /// Fix the `Allow` value reported for `pattern`, or restore the derived
    /// one with `None`.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownRoute`] when the pattern is not registered.
    pub fn set_allow(&self, pattern: &str, allow: Option<&str>) -> Result<(), RouterError> {
        let mut guard = self.lock_tree();
        let tree = &mut *guard;
        let unknown = || RouterError::UnknownRoute {
            route: pattern.to_string(),
        };
        let compiled = tree.patterns.get(pattern).cloned().ok_or_else(unknown)?;
        let entry = tree
            .root_mut(&compiled)
            .get_mut(&compiled)
            .ok_or_else(unknown)?;
        entry.methods.set_allow_override(allow.map(Arc::from));
        Ok(())
    }

    /// Attach a unique `name` to a registered pattern for [`Router::url`].
    ///
    /// # Errors
    ///
    /// - [`RouterError::DuplicateName`] when the name is taken
    /// - [`RouterError::UnknownRoute`] when the pattern is not registered
    pub fn name(&self, name: &str, pattern: &str) -> Result<(), RouterError> {
        let source = self
            .lock_tree()
            .patterns
            .get_key_value(pattern)
            .map(|(source, _)| Arc::clone(source))
            .ok_or_else(|| RouterError::UnknownRoute {
                route: pattern.to_string(),
            })?;

        let mut names = self.write_names();
        if names.contains_key(name) {
            return Err(RouterError::DuplicateName {
                name: name.to_string(),
            });
        }
        names.insert(name.to_string(), source);
        Ok(())
    }

    /// Build a concrete path for a route name or a registered pattern.
    ///
    /// Names are looked up first. `tail` fills a trailing `/*`.
    ///
    /// # Errors
    ///
    /// - [`RouterError::UnknownRoute`] when neither a name nor a pattern matches
    /// - [`RouterError::MissingParameter`] when `params` lacks a capture value
    pub fn url<P>(
        &self,
        name_or_pattern: &str,
        params: &P,
        tail: &str,
    ) -> Result<String, RouterError>
    where
        P: ParamSource + ?Sized,
    {
        let named = self.read_names().get(name_or_pattern).cloned();
        let key = named.as_deref().unwrap_or(name_or_pattern);
        let compiled = self
            .lock_tree()
            .patterns
            .get(key)
            .cloned()
            .ok_or_else(|| RouterError::UnknownRoute {
                route: name_or_pattern.to_string(),
            })?;
        build(compiled.segments(), params, tail)
    }

    /// Match a request.
    ///
    /// `host` is only consulted when host-qualified patterns are registered.
    /// Unless configured otherwise the path is cleaned first.
    pub fn route(&self, host: &str, path: &str, method: Method) -> MatchOutcome {
        let match_start = Instant::now();
        let path = if self.config.skip_clean_path {
            Cow::Borrowed(path)
        } else {
            clean_path(path)
        };

        debug!(method = %method, host = %host, path = %path, "Route match attempt");

        // The tree lock is released here; group flags are read without it
        let resolved = self.resolve(host, &path, method);

        let outcome = match resolved {
            None => MatchOutcome::NotFound,
            Some(resolved) => match resolved.slot {
                Some(slot) if slot.group.as_ref().is_some_and(|g| !g.is_enabled()) => {
                    MatchOutcome::RouteDisabled {
                        pattern: resolved.pattern,
                    }
                }
                Some(slot) => MatchOutcome::Found(RouteMatch {
                    handler_name: slot.handler,
                    pattern: resolved.pattern,
                    method,
                    path_params: resolved.params,
                    wildcard: resolved.wildcard,
                }),
                None => {
                    let allow = resolved.allow.unwrap_or_else(|| Arc::from(""));
                    if method == Method::Options && self.config.auto_options {
                        MatchOutcome::Options { allow }
                    } else {
                        MatchOutcome::MethodNotAllowed { allow }
                    }
                }
            },
        };

        let match_duration = match_start.elapsed();
        if match_duration > self.config.slow_match {
            warn!(
                method = %method,
                path = %path,
                outcome = outcome.kind(),
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            debug!(
                method = %method,
                path = %path,
                outcome = outcome.kind(),
                duration_us = match_duration.as_micros(),
                "Route match finished"
            );
        }
        outcome
    }

    /// Complete host match, then complete path match, then the partial that
    /// leaves the fewest bytes unmatched (earlier registration on a tie).
    fn resolve(&self, host: &str, path: &str, method: Method) -> Option<Resolved> {
        let tree = self.lock_tree();
        let auto_options = self.config.auto_options;

        // (unmatched bytes, seq, resolved)
        let mut host_partial: Option<(usize, u64, Resolved)> = None;
        if !tree.hosts.is_empty() {
            let mut subject = String::with_capacity(host.len() + path.len());
            subject.push_str(host);
            subject.push_str(path);
            if let Some(hit) = tree.hosts.lookup(&subject) {
                let partial = hit.partial;
                let rank = (subject.len().saturating_sub(hit.consumed), hit.entry.seq);
                let resolved = Resolved::from_hit(hit, &subject, method, auto_options);
                if !partial {
                    return Some(resolved);
                }
                host_partial = Some((rank.0, rank.1, resolved));
            }
        }

        match tree.paths.lookup(path) {
            Some(hit) if !hit.partial => Some(Resolved::from_hit(hit, path, method, auto_options)),
            Some(hit) => {
                let rank = (path.len().saturating_sub(hit.consumed), hit.entry.seq);
                match host_partial {
                    Some((unmatched, seq, resolved)) if (unmatched, seq) < rank => Some(resolved),
                    _ => Some(Resolved::from_hit(hit, path, method, auto_options)),
                }
            }
            None => host_partial.map(|(_, _, resolved)| resolved),
        }
    }

    /// Every registered pattern in registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let tree = self.lock_tree();
        let mut entries = tree.paths.entries();
        entries.extend(tree.hosts.entries());
        entries.sort_by_key(|e| e.seq);
        entries
            .into_iter()
            .map(|entry| RouteInfo {
                pattern: Arc::clone(entry.pattern.source_arc()),
                handlers: entry
                    .methods
                    .methods()
                    .filter_map(|m| {
                        entry
                            .methods
                            .get(m)
                            .map(|slot| (m, Arc::clone(&slot.handler)))
                    })
                    .collect(),
                allow: entry.methods.allow(self.config.auto_options),
            })
            .collect()
    }

    /// Pattern a route name points at.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<Arc<str>> {
        self.read_names().get(name).cloned()
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_tree().patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
