//! # CLI Module
//!
//! Command-line access to route tables: validate them, list their routes,
//! match requests and build URLs without writing any code.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load a table and register every route, failing on the first bad entry:
//!
//! ```bash
//! muxtree check --table routes.yaml
//! ```
//!
//! ### `routes`
//!
//! List every method/pattern/handler triple in registration order:
//!
//! ```bash
//! muxtree routes --table routes.yaml [--json]
//! ```
//!
//! ### `match`
//!
//! Resolve a request and print the outcome:
//!
//! ```bash
//! muxtree match --table routes.yaml --method DELETE /posts/12
//! muxtree match --table routes.yaml --host api.example.com /v1/users
//! ```
//!
//! ### `url`
//!
//! Reverse-build a path from a route name or pattern:
//!
//! ```bash
//! muxtree url --table routes.yaml post -p id=12
//! ```
//!
//! ### `watch`
//!
//! Keep a table loaded and report every hot reload:
//!
//! ```bash
//! RUST_LOG=muxtree=info muxtree watch --table routes.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use muxtree::cli::run_cli;
//!
//! run_cli()?;
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
