//! Typed units of a compiled route pattern.
//!
//! A pattern such as `/posts/{id:\d+}/page/{page}/*` compiles to
//!
//! ```text
//! Literal("/posts/") Named(id, \d+) Literal("/page/") Named(page, endpoint=false) Wildcard
//! ```
//!
//! Literal segments are indexed byte-wise by the radix tree, captures get
//! dedicated child slots, and the wildcard is always the last segment.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouterError;

use super::url::ParamSource;

/// Regex constraint attached to a capture.
///
/// The body is kept as written for display and reverse building; the compiled
/// form is anchored on both ends so it has to cover the whole captured value.
#[derive(Debug, Clone)]
pub struct CaptureRegex {
    body: String,
    compiled: Regex,
}

impl CaptureRegex {
    pub(crate) fn new(body: &str) -> Result<Self, regex::Error> {
        let compiled = Regex::new(&format!("^(?:{body})$"))?;
        Ok(Self {
            body: body.to_string(),
            compiled,
        })
    }

    /// The regex body as it appeared in the pattern.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[inline]
    fn is_match(&self, value: &str) -> bool {
        self.compiled.is_match(value)
    }
}

impl PartialEq for CaptureRegex {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Eq for CaptureRegex {}

/// A `{name}`, `{name:regex}` or `{:regex}` capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// `None` for unnamed captures, whose value is consumed but not reported
    name: Option<Arc<str>>,
    regex: Option<CaptureRegex>,
    /// True when the capture is the last segment of its pattern
    endpoint: bool,
}

impl Capture {
    pub(crate) fn new(name: Option<&str>, regex: Option<CaptureRegex>, endpoint: bool) -> Self {
        Self {
            name: name.map(Arc::from),
            regex,
            endpoint,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn name_arc(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }

    #[must_use]
    pub fn regex(&self) -> Option<&CaptureRegex> {
        self.regex.as_ref()
    }

    #[must_use]
    pub fn is_endpoint(&self) -> bool {
        self.endpoint
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: bool) {
        self.endpoint = endpoint;
    }

    /// Whether a candidate value may be bound to this capture.
    ///
    /// Values are never empty; a regex has to match all of the value.
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        !value.is_empty() && self.regex.as_ref().map_or(true, |re| re.is_match(value))
    }

    /// Two captures share a tree slot when they are written identically.
    /// The endpoint flag belongs to the pattern, not the slot.
    pub(crate) fn same_slot(&self, other: &Capture) -> bool {
        self.name == other.name && self.regex == other.regex
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        if let Some(re) = &self.regex {
            write!(f, ":{}", re.body)?;
        }
        f.write_str("}")
    }
}

/// One unit of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Fixed text, matched byte for byte
    Literal(String),
    /// A capture
    Named(Capture),
    /// The open `/*` tail: any remainder starting with `/`
    Wildcard,
}

impl Segment {
    /// Append this segment's concrete form to `buf`.
    ///
    /// Literals are copied verbatim. A named capture emits its parameter
    /// value; an unnamed regex capture has no canonical inverse and emits its
    /// regex body unchanged. The wildcard emits `/` followed by `tail`.
    pub fn emit<P>(&self, buf: &mut String, params: &P, tail: &str) -> Result<(), RouterError>
    where
        P: ParamSource + ?Sized,
    {
        match self {
            Segment::Literal(text) => buf.push_str(text),
            Segment::Named(capture) => match capture.name() {
                Some(name) => {
                    let value = params.param(name).ok_or_else(|| {
                        RouterError::MissingParameter {
                            name: name.to_string(),
                        }
                    })?;
                    buf.push_str(value);
                }
                None => {
                    if let Some(re) = capture.regex() {
                        buf.push_str(re.body());
                    }
                }
            },
            Segment::Wildcard => {
                buf.push('/');
                buf.push_str(tail.strip_prefix('/').unwrap_or(tail));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Named(capture) => fmt::Display::fmt(capture, f),
            Segment::Wildcard => f.write_str("/*"),
        }
    }
}
