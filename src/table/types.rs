use serde::{Deserialize, Serialize};

/// A declarative set of routes, as read from a YAML, JSON or TOML file.
///
/// ```yaml
/// routes:
///   - pattern: /posts/{id:\d+}
///     methods: [GET, DELETE]
///     handler: post_handler
///     name: post
///   - pattern: /admin/*
///     handler: admin
///     group: admin
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteTable {
    /// Required, so a truncated or empty file never parses as an empty table
    pub routes: Vec<RouteSpec>,
}

/// One entry of a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub pattern: String,
    /// Method names; empty means every method except OPTIONS
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    pub handler: String,
    /// Name for reverse URL lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Group the route can be switched off with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Fixed `Allow` value for the pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<String>,
}

/// Serialization format of a route table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Json,
    Toml,
}

impl TableFormat {
    /// Pick the format from a file extension; anything unknown is YAML.
    #[must_use]
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => TableFormat::Json,
            Some("toml") => TableFormat::Toml,
            _ => TableFormat::Yaml,
        }
    }
}
