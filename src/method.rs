//! The closed set of request methods the router dispatches on.

use std::fmt;
use std::str::FromStr;

use crate::error::RouterError;

/// A request method understood by the router.
///
/// The enumeration is closed: anything else is rejected at registration with
/// [`RouterError::UnknownMethod`]. Variants are declared in the order used for
/// per-node handler slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
    Connect,
    Trace,
}

impl Method {
    /// Number of supported methods.
    pub const COUNT: usize = 9;

    /// Every supported method.
    pub const ALL: [Method; Method::COUNT] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Connect,
        Method::Trace,
    ];

    /// Methods targeted by an "any" registration: everything but OPTIONS,
    /// which stays automatic.
    pub const ANY: [Method; Method::COUNT - 1] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Connect,
        Method::Trace,
    ];

    /// Upper-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
        }
    }

    /// Slot index inside a method table.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Whether `name` (any case) is a supported method.
    #[must_use]
    pub fn is_supported(name: &str) -> bool {
        name.parse::<Method>().is_ok()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RouterError::UnknownMethod {
                method: s.to_string(),
            })
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = RouterError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl TryFrom<http::Method> for Method {
    type Error = RouterError;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        Method::try_from(&method)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
            Method::Options => http::Method::OPTIONS,
            Method::Head => http::Method::HEAD,
            Method::Connect => http::Method::CONNECT,
            Method::Trace => http::Method::TRACE,
        }
    }
}

impl serde::Serialize for Method {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Method {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
