//! Request path normalisation applied before matching.

use std::borrow::Cow;

/// Normalise a request path.
///
/// Repeated slashes collapse, `.` segments are dropped and `..` removes the
/// segment before it (never climbing above the root). A trailing slash on the
/// input is kept and an empty input becomes `/`. Paths that are already clean
/// are returned without allocating.
///
/// # Example
///
/// ```
/// use muxtree::router::clean_path;
///
/// assert_eq!(clean_path("/api//v1/./users/../"), "/api/v1/");
/// assert_eq!(clean_path(""), "/");
/// ```
#[must_use]
pub fn clean_path(path: &str) -> Cow<'_, str> {
    if is_clean(path) {
        return Cow::Borrowed(path);
    }

    let mut parts: Vec<&str> = Vec::with_capacity(path.matches('/').count());
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let mut out = String::with_capacity(path.len() + 1);
    for part in &parts {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() || path.ends_with('/') {
        out.push('/');
    }
    Cow::Owned(out)
}

fn is_clean(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    // Every segment between slashes must be a plain, non-empty name; only the
    // final one may be empty (trailing slash).
    let mut segments = path[1..].split('/').peekable();
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        match segment {
            "" if last => {}
            "" | "." | ".." => return false,
            _ => {}
        }
    }
    true
}
