//! Pattern compiler.
//!
//! Turns a registration string into an ordered [`Segment`] list:
//!
//! - text outside braces becomes [`Segment::Literal`]
//! - `{name}` is a capture that extends up to the literal that follows it
//! - `{name:regex}` constrains the capture with a regex over the whole value
//! - `{:regex}` is an unnamed capture: it consumes input but is not reported
//! - a trailing `/*` is an open wildcard tail
//!
//! A pattern whose first byte is not `/` is host-qualified and is matched
//! against `host + path`.

use std::fmt;
use std::sync::Arc;

use crate::error::SyntaxError;

use super::segment::{Capture, CaptureRegex, Segment};

const WILDCARD_TAIL: &str = "/*";

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: Arc<str>,
    segments: Vec<Segment>,
    host: bool,
}

impl Pattern {
    /// The pattern exactly as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn source_arc(&self) -> &Arc<str> {
        &self.source
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern carries a host constraint.
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.host
    }

    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// A pattern ending in a literal `/` also matches any path it prefixes.
    #[must_use]
    pub fn is_prefix_route(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Literal(text)) if text.ends_with('/'))
    }

    /// Names of all named captures, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Named(c) => c.name(),
            _ => None,
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile a pattern string.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for an empty pattern, an unterminated or stray
/// brace, a wildcard anywhere but the tail, two captures with nothing between
/// them, or a regex body that does not compile.
///
/// # Example
///
/// ```
/// use muxtree::router::{compile, Segment};
///
/// let p = compile("/posts/{id:\\d+}/*").unwrap();
/// assert_eq!(p.segments().len(), 3);
/// assert!(matches!(p.segments()[2], Segment::Wildcard));
/// ```
pub fn compile(pattern: &str) -> Result<Pattern, SyntaxError> {
    if pattern.is_empty() {
        return Err(SyntaxError::EmptyPattern);
    }

    let (body, wildcard) = match pattern.strip_suffix(WILDCARD_TAIL) {
        Some(body) => (body, true),
        None => (pattern, false),
    };

    let mut segments = Vec::with_capacity(pattern.matches('{').count() * 2 + 2);
    let mut literal = String::new();
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                } else if matches!(segments.last(), Some(Segment::Named(_))) {
                    return Err(SyntaxError::AdjacentCaptures { position: i });
                }
                let close = closing_brace(bytes, i)?;
                segments.push(Segment::Named(parse_capture(&body[i + 1..close], i)?));
                i = close + 1;
            }
            b'}' => return Err(SyntaxError::UnexpectedClose { position: i }),
            b'*' => return Err(SyntaxError::MisplacedWildcard { position: i }),
            _ => {
                // Copy a whole run of plain text at once; `{`, `}` and `*` are
                // ASCII so the run always ends on a char boundary.
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b'{' | b'}' | b'*') {
                    i += 1;
                }
                literal.push_str(&body[start..i]);
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    if wildcard {
        segments.push(Segment::Wildcard);
    } else if let Some(Segment::Named(capture)) = segments.last_mut() {
        capture.set_endpoint(true);
    }

    Ok(Pattern {
        source: Arc::from(pattern),
        host: !pattern.starts_with('/'),
        segments,
    })
}

/// Index of the `}` that closes the capture opened at `open`.
///
/// Braces nest so regex bodies such as `\d{2,4}` stay inside the capture.
fn closing_brace(bytes: &[u8], open: usize) -> Result<usize, SyntaxError> {
    let mut depth = 0usize;
    for (offset, b) in bytes[open..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(SyntaxError::UnterminatedCapture { position: open })
}

fn parse_capture(inner: &str, position: usize) -> Result<Capture, SyntaxError> {
    let (name, regex) = match inner.split_once(':') {
        Some((name, body)) => {
            if body.is_empty() {
                return Err(SyntaxError::EmptyRegex { position });
            }
            let regex = CaptureRegex::new(body).map_err(|e| SyntaxError::InvalidRegex {
                body: body.to_string(),
                reason: e.to_string(),
            })?;
            (name, Some(regex))
        }
        None => (inner, None),
    };

    let name = (!name.is_empty()).then_some(name);
    Ok(Capture::new(name, regex, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    #[test]
    fn test_static_pattern() {
        let p = compile("/api/v1").unwrap();
        assert_eq!(p.segments(), &[literal("/api/v1")]);
        assert!(!p.is_host());
        assert!(!p.has_wildcard());
    }

    #[test]
    fn test_named_and_regex_captures() {
        let p = compile(r"/posts/{id}/page/{page:\d+}").unwrap();
        let segs = p.segments();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0], literal("/posts/"));
        match &segs[1] {
            Segment::Named(c) => {
                assert_eq!(c.name(), Some("id"));
                assert!(c.regex().is_none());
                assert!(!c.is_endpoint());
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert_eq!(segs[2], literal("/page/"));
        match &segs[3] {
            Segment::Named(c) => {
                assert_eq!(c.name(), Some("page"));
                assert_eq!(c.regex().map(CaptureRegex::body), Some(r"\d+"));
                assert!(c.is_endpoint());
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert_eq!(p.param_names().collect::<Vec<_>>(), vec!["id", "page"]);
    }

    #[test]
    fn test_unnamed_capture() {
        let p = compile(r"/size/{:\d+}").unwrap();
        match &p.segments()[1] {
            Segment::Named(c) => {
                assert_eq!(c.name(), None);
                assert!(c.is_endpoint());
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert_eq!(p.param_names().count(), 0);
    }

    #[test]
    fn test_wildcard_tail() {
        let p = compile(r"/posts/{id:\d+}/*").unwrap();
        assert!(p.has_wildcard());
        match &p.segments()[1] {
            Segment::Named(c) => assert!(!c.is_endpoint()),
            other => panic!("unexpected segment {other:?}"),
        }

        let root = compile("/*").unwrap();
        assert_eq!(root.segments(), &[Segment::Wildcard]);
    }

    #[test]
    fn test_nested_braces_in_regex() {
        let p = compile(r"/year/{y:\d{4}}").unwrap();
        match &p.segments()[1] {
            Segment::Named(c) => assert_eq!(c.regex().map(CaptureRegex::body), Some(r"\d{4}")),
            other => panic!("unexpected segment {other:?}"),
        }
    }

    #[test]
    fn test_host_pattern() {
        let p = compile(r"{sub}.example.com/api").unwrap();
        assert!(p.is_host());
        assert!(compile("127.0.0.1/abc").unwrap().is_host());
    }

    #[test]
    fn test_prefix_route_detection() {
        assert!(compile("/post/").unwrap().is_prefix_route());
        assert!(!compile("/post").unwrap().is_prefix_route());
        assert!(!compile("/post/{id}").unwrap().is_prefix_route());
    }

    #[test]
    fn test_display_round_trips_source() {
        let src = r"/posts/{id}/page/{page:\d+}/size/{:\d+}/*";
        let p = compile(src).unwrap();
        let rebuilt: String = p.segments().iter().map(ToString::to_string).collect();
        assert_eq!(rebuilt, src);
        assert_eq!(p.to_string(), src);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(compile(""), Err(SyntaxError::EmptyPattern));
        assert_eq!(
            compile("/posts/{id"),
            Err(SyntaxError::UnterminatedCapture { position: 7 })
        );
        assert_eq!(
            compile("/posts/id}"),
            Err(SyntaxError::UnexpectedClose { position: 9 })
        );
        assert_eq!(
            compile("/posts/*/edit"),
            Err(SyntaxError::MisplacedWildcard { position: 7 })
        );
        assert_eq!(
            compile("/{a}{b}"),
            Err(SyntaxError::AdjacentCaptures { position: 4 })
        );
        assert_eq!(
            compile("/{id:}"),
            Err(SyntaxError::EmptyRegex { position: 1 })
        );
        assert!(matches!(
            compile("/{id:(}"),
            Err(SyntaxError::InvalidRegex { .. })
        ));
    }
}
