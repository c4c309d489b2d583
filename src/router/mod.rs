//! # Router Module
//!
//! Pattern compilation, the radix tree, request matching and reverse URL
//! building.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route patterns into typed [`Segment`] lists
//! - Indexing compiled patterns in a radix tree
//! - Matching `(host, path, method)` triples to handlers and extracting
//!   capture values
//! - Building concrete paths from a pattern or route name plus parameters
//!
//! ## Pattern grammar
//!
//! | Syntax          | Meaning                                                 |
//! |-----------------|---------------------------------------------------------|
//! | `/text`         | literal text                                            |
//! | `{name}`        | capture up to the literal that follows                  |
//! | `{name:regex}`  | capture whose whole value must match `regex`            |
//! | `{:regex}`      | unnamed capture, consumed but not reported              |
//! | trailing `/*`   | any remainder starting with `/`                         |
//! | `host/...`      | a pattern not starting with `/` also constrains the host |
//!
//! ## Priority
//!
//! At each branch literal children are tried first, then regex captures,
//! then plain captures, then the wildcard. A complete match ends the search.
//! Failing that, a route ending in `/` that prefixes the path is used, the
//! longest one winning. Equal candidates go to the earlier registration.
//!
//! ## Example
//!
//! ```rust
//! use muxtree::router::{MatchOutcome, Router};
//! use muxtree::Method;
//!
//! let router = Router::new();
//! router.register("/post/", &[Method::Get], "post_index").unwrap();
//! router.register("/post/{id:\\d+}", &[Method::Get], "show_post").unwrap();
//! router.register("/post/1", &[Method::Get], "first_post").unwrap();
//!
//! let handler = |path: &str| match router.route("", path, Method::Get) {
//!     MatchOutcome::Found(m) => m.handler_name.to_string(),
//!     other => other.kind().to_string(),
//! };
//! assert_eq!(handler("/post/1"), "first_post");
//! assert_eq!(handler("/post/2"), "show_post");
//! assert_eq!(handler("/post/abc"), "post_index");
//!
//! router.name("post", "/post/{id:\\d+}").unwrap();
//! assert_eq!(router.url("post", &[("id", "7")], "").unwrap(), "/post/7");
//! ```
//!
//! ## Performance
//!
//! Lookup cost is bounded by path length times tree depth, not by the number
//! of routes. Literal children are selected by their first byte.

mod core;
mod group;
mod methods;
mod path;
mod pattern;
mod radix;
mod segment;
mod url;

pub use core::{MatchOutcome, ParamVec, RouteInfo, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use group::Group;
pub use path::clean_path;
pub use pattern::{compile, Pattern};
pub use segment::{Capture, CaptureRegex, Segment};
pub use url::{build, ParamSource};
