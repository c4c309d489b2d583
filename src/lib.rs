//! # muxtree
//!
//! **muxtree** is an HTTP request router built on a radix tree. It maps a
//! `(host, path, method)` triple to a handler name, extracts named path
//! parameters, and builds URLs back from route names.
//!
//! ## Overview
//!
//! Patterns mix literal text, named captures and a trailing wildcard:
//!
//! - `/posts/{id}` captures one path segment
//! - `/posts/{id:\d+}` constrains the capture with a regular expression
//! - `/static/*` matches everything below `/static/`
//! - `/admin/` also matches as a prefix when nothing more specific does
//! - `example.com/about` is only matched for that host
//!
//! Matching never fails with an error. [`Router::route`] returns a
//! [`MatchOutcome`] that separates "no such path" from "path exists, method
//! not allowed", answers `OPTIONS` automatically and reports routes whose
//! [`Group`](router::Group) is switched off.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern compiler, radix tree, matcher and URL builder
//! - **[`method`]** - The closed set of supported request methods
//! - **[`error`]** - Pattern syntax and registration errors
//! - **[`table`]** - Declarative route tables in YAML, JSON or TOML
//! - **[`hot_reload`]** - Rebuild a router whenever its table file changes
//! - **[`runtime_config`]** - Environment-driven matcher settings
//! - **[`logging`]** - Subscriber setup for the `muxtree` binary
//! - **[`cli`]** - The `muxtree` command-line tool
//!
//! ## Quick Start
//!
//! ```
//! use muxtree::{MatchOutcome, Method, Router};
//!
//! let router = Router::new();
//! router.register("/posts/{id:\\d+}", &[Method::Get], "show_post").unwrap();
//! router.register("/static/*", &[Method::Get], "assets").unwrap();
//!
//! let found = router.route("", "/posts/7", Method::Get).found().unwrap();
//! assert_eq!(found.get_path_param("id"), Some("7"));
//!
//! match router.route("", "/posts/7", Method::Delete) {
//!     MatchOutcome::MethodNotAllowed { allow } => assert_eq!(&*allow, "GET, OPTIONS"),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```
//!
//! ## Concurrency
//!
//! A [`Router`] is `Send + Sync`. Matching and registration share one lock on
//! the tree, so routes can be added or removed while requests are served.
//! Routers are independent values; nothing is global.

pub mod cli;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod method;
pub mod router;
pub mod runtime_config;
pub mod table;

pub use error::{RouterError, SyntaxError};
pub use method::Method;
pub use router::{MatchOutcome, RouteMatch, Router};
