//! # Route Table Module
//!
//! Declarative route definitions loaded from YAML, JSON or TOML files and
//! applied to a [`Router`](crate::router::Router) in one call.
//!
//! ## Example
//!
//! ```rust
//! use muxtree::table::{parse_table, TableFormat};
//! use muxtree::runtime_config::RuntimeConfig;
//!
//! let table = parse_table(
//!     r#"
//! routes:
//!   - pattern: /posts/{id:\d+}
//!     methods: [GET]
//!     handler: show_post
//!     name: post
//! "#,
//!     TableFormat::Yaml,
//! )
//! .unwrap();
//!
//! let (router, _groups) = table.build_router(RuntimeConfig::default()).unwrap();
//! assert_eq!(router.url("post", &[("id", "3")], "").unwrap(), "/posts/3");
//! ```

mod build;
mod load;
mod types;

pub use build::TableGroups;
pub use load::{load_table, parse_table};
pub use types::{RouteSpec, RouteTable, TableFormat};
