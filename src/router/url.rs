//! Reverse routing: turn a compiled pattern plus parameter values back into a
//! concrete path.
//!
//! For any pattern without unnamed regex captures, building a path and
//! matching it against the same pattern yields the parameters that were fed
//! in. Unnamed regex captures have no canonical inverse, so the builder emits
//! the regex body itself as a placeholder.
//!
//! Values are emitted verbatim. The router cleans request paths before
//! matching, so a value containing `//`, `.` or `..` segments comes back
//! altered unless `skip_clean_path` is set.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::RouterError;

use super::core::ParamVec;
use super::segment::Segment;

/// Anything parameter values can be looked up in by name.
pub trait ParamSource {
    fn param(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
    fn param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: BuildHasher> ParamSource for HashMap<&str, &str, S> {
    fn param(&self, name: &str) -> Option<&str> {
        self.get(name).copied()
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl ParamSource for [(&str, &str)] {
    fn param(&self, name: &str) -> Option<&str> {
        self.iter().rfind(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> ParamSource for [(&str, &str); N] {
    fn param(&self, name: &str) -> Option<&str> {
        self.as_slice().param(name)
    }
}

/// Matched parameters can be fed straight back into the builder.
impl ParamSource for ParamVec {
    fn param(&self, name: &str) -> Option<&str> {
        self.iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Build a concrete path from `segments`.
///
/// `tail` is what the wildcard segment expands to (after its leading `/`);
/// it is ignored for patterns without a wildcard.
///
/// # Errors
///
/// [`RouterError::MissingParameter`] naming the first named capture without
/// a value in `params`.
///
/// # Example
///
/// ```
/// use muxtree::router::{build, compile};
///
/// let p = compile("/posts/{id}/page/{page:\\d+}").unwrap();
/// let url = build(p.segments(), &[("id", "5.html"), ("page", "1")], "").unwrap();
/// assert_eq!(url, "/posts/5.html/page/1");
/// ```
pub fn build<P>(segments: &[Segment], params: &P, tail: &str) -> Result<String, RouterError>
where
    P: ParamSource + ?Sized,
{
    let mut buf = String::with_capacity(estimate_len(segments, tail));
    for segment in segments {
        segment.emit(&mut buf, params, tail)?;
    }
    Ok(buf)
}

fn estimate_len(segments: &[Segment], tail: &str) -> usize {
    segments
        .iter()
        .map(|s| match s {
            Segment::Literal(text) => text.len(),
            Segment::Named(_) => 8,
            Segment::Wildcard => tail.len() + 1,
        })
        .sum()
}
