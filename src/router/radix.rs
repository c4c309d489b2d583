//! Radix tree over mixed literal/capture/wildcard segments.
//!
//! Literal text is stored byte-wise and compressed: sibling literal prefixes
//! never share a first byte, so picking a literal child costs one byte
//! comparison and lookup time is bounded by path length rather than route
//! count.
//!
//! ## Layout
//!
//! ```text
//! ""                         (root)
//! └── "/post"
//!     ├── "s/"
//!     │   └── {id:\d+}        GET
//!     │       └── /*          GET
//!     └── "/"                 GET (prefix route)
//!         ├── "1"             GET
//!         └── {id:\d+}        GET
//! ```
//!
//! Every node has three child slots, tried in this order while matching:
//!
//! 1. literal children (at most one can accept the next byte)
//! 2. capture children, regex-constrained before unconstrained, each class in
//!    registration order
//! 3. one wildcard child
//!
//! A capture that is not the last segment of its pattern stops in front of
//! the first byte that could start one of its children. If the subtree fails
//! from there the search backtracks and retries at the next stop. A failed
//! `(node, offset)` pair is remembered for the rest of the lookup, so no
//! subtree is walked twice from the same offset. A capture node that carries
//! a route also accepts the whole remainder, after its children have been
//! tried.

use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use crate::method::Method;

use super::core::ParamVec;
use super::methods::MethodTable;
use super::pattern::Pattern;
use super::segment::{Capture, Segment};

/// Terminal data of a registered pattern.
#[derive(Debug)]
pub(crate) struct RouteEntry {
    pub(crate) pattern: Arc<Pattern>,
    /// Registration order; earlier routes win ties
    pub(crate) seq: u64,
    pub(crate) methods: MethodTable,
}

#[derive(Debug)]
enum NodeKind {
    Literal(Vec<u8>),
    Capture(Capture),
    Wildcard,
}

/// Node in the radix tree.
#[derive(Debug)]
pub(crate) struct RadixNode {
    kind: NodeKind,
    literals: Vec<RadixNode>,
    captures: Vec<RadixNode>,
    wildcard: Option<Box<RadixNode>>,
    route: Option<RouteEntry>,
}

/// Where a tree walk currently is inside a segment list.
#[derive(Clone, Copy)]
struct Cursor<'p> {
    segments: &'p [Segment],
    /// Bytes already consumed from a leading literal segment
    offset: usize,
}

enum Step<'p> {
    Bytes(&'p [u8]),
    Capture(&'p Capture),
    Wildcard,
}

impl<'p> Cursor<'p> {
    fn new(segments: &'p [Segment]) -> Self {
        Self {
            segments,
            offset: 0,
        }
    }

    fn peek(&self) -> Option<Step<'p>> {
        self.segments.first().map(|segment| match segment {
            Segment::Literal(text) => Step::Bytes(&text.as_bytes()[self.offset..]),
            Segment::Named(capture) => Step::Capture(capture),
            Segment::Wildcard => Step::Wildcard,
        })
    }

    /// Consume `n` bytes of the leading literal.
    fn advance(self, n: usize) -> Self {
        match self.segments.first() {
            Some(Segment::Literal(text)) if self.offset + n < text.len() => Self {
                segments: self.segments,
                offset: self.offset + n,
            },
            _ => self.next(),
        }
    }

    fn next(self) -> Self {
        Self {
            segments: self.segments.get(1..).unwrap_or_default(),
            offset: 0,
        }
    }
}

/// Best directory-style partial match seen so far.
struct Partial<'t> {
    node: &'t RadixNode,
    consumed: usize,
    params: ParamVec,
}

/// Result of a successful lookup.
pub(crate) struct Hit<'t> {
    pub(crate) entry: &'t RouteEntry,
    pub(crate) params: ParamVec,
    /// Bytes of the subject the route accounted for
    pub(crate) consumed: usize,
    /// Byte offset of the text matched by a wildcard tail (after its `/`)
    pub(crate) tail: Option<usize>,
    pub(crate) partial: bool,
}

/// Mutable state threaded through one lookup.
struct Search<'t> {
    params: ParamVec,
    tail: Option<usize>,
    partial: Option<Partial<'t>>,
    /// `(capture node, position)` pairs whose subtree already failed
    failed: HashSet<(*const RadixNode, usize)>,
}

impl<'t> Search<'t> {
    fn offer_partial(&mut self, node: &'t RadixNode, entry: &RouteEntry, consumed: usize) {
        let better = match &self.partial {
            None => true,
            Some(best) => {
                consumed > best.consumed
                    || (consumed == best.consumed
                        && best.node.route.as_ref().map_or(true, |b| entry.seq < b.seq))
            }
        };
        if better {
            self.partial = Some(Partial {
                node,
                consumed,
                params: self.params.clone(),
            });
        }
    }
}

impl RadixNode {
    pub(crate) fn root() -> Self {
        Self::with_kind(NodeKind::Literal(Vec::new()))
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            literals: Vec::new(),
            captures: Vec::new(),
            wildcard: None,
            route: None,
        }
    }

    fn prefix(&self) -> &[u8] {
        match &self.kind {
            NodeKind::Literal(prefix) => prefix,
            _ => &[],
        }
    }

    /// True when no route is registered at or below this node.
    pub(crate) fn is_empty(&self) -> bool {
        self.route.is_none()
            && self.literals.is_empty()
            && self.captures.is_empty()
            && self.wildcard.is_none()
    }

    /// Walk to the node for `pattern`, creating and splitting nodes as needed,
    /// and return its route entry. An existing entry is returned unchanged.
    pub(crate) fn insert(&mut self, pattern: &Arc<Pattern>, seq: u64) -> &mut RouteEntry {
        let node = self.descend(Cursor::new(pattern.segments()));
        node.route.get_or_insert_with(|| RouteEntry {
            pattern: Arc::clone(pattern),
            seq,
            methods: MethodTable::default(),
        })
    }

    fn descend(&mut self, cursor: Cursor<'_>) -> &mut RadixNode {
        match cursor.peek() {
            None => self,
            Some(Step::Bytes(bytes)) => {
                let i = match self
                    .literals
                    .iter()
                    .position(|c| c.prefix().first() == bytes.first())
                {
                    Some(i) => i,
                    None => {
                        self.literals
                            .push(Self::with_kind(NodeKind::Literal(bytes.to_vec())));
                        self.literals.len() - 1
                    }
                };
                let child = &mut self.literals[i];
                let common = common_prefix_len(child.prefix(), bytes);
                if common < child.prefix().len() {
                    child.split(common);
                }
                child.descend(cursor.advance(common))
            }
            Some(Step::Capture(capture)) => {
                let i = self.capture_slot(capture);
                self.captures[i].descend(cursor.next())
            }
            Some(Step::Wildcard) => self
                .wildcard
                .get_or_insert_with(|| Box::new(Self::with_kind(NodeKind::Wildcard)))
                .descend(cursor.next()),
        }
    }

    /// Index of the capture child for `capture`, inserting it if missing.
    fn capture_slot(&mut self, capture: &Capture) -> usize {
        if let Some(i) = self.captures.iter().position(|c| match &c.kind {
            NodeKind::Capture(existing) => existing.same_slot(capture),
            _ => false,
        }) {
            return i;
        }
        let at = if capture.regex().is_some() {
            self.captures
                .iter()
                .position(|c| matches!(&c.kind, NodeKind::Capture(e) if e.regex().is_none()))
                .unwrap_or(self.captures.len())
        } else {
            self.captures.len()
        };
        self.captures
            .insert(at, Self::with_kind(NodeKind::Capture(capture.clone())));
        at
    }

    /// Split a literal node so that it keeps only its first `at` bytes.
    fn split(&mut self, at: usize) {
        let NodeKind::Literal(prefix) = &mut self.kind else {
            return;
        };
        let suffix = prefix.split_off(at);
        let tail = RadixNode {
            kind: NodeKind::Literal(suffix),
            literals: mem::take(&mut self.literals),
            captures: mem::take(&mut self.captures),
            wildcard: self.wildcard.take(),
            route: self.route.take(),
        };
        self.literals.push(tail);
    }

    /// Merge a routeless literal node with its only literal child.
    fn compact(&mut self) {
        let mergeable = self.route.is_none()
            && self.captures.is_empty()
            && self.wildcard.is_none()
            && self.literals.len() == 1;
        if !mergeable {
            return;
        }
        let Some(child) = self.literals.pop() else {
            return;
        };
        if let (NodeKind::Literal(prefix), NodeKind::Literal(rest)) = (&mut self.kind, &child.kind)
        {
            prefix.extend_from_slice(rest);
        }
        self.literals = child.literals;
        self.captures = child.captures;
        self.wildcard = child.wildcard;
        self.route = child.route;
    }

    /// Route entry registered for exactly `pattern`.
    pub(crate) fn get(&self, pattern: &Pattern) -> Option<&RouteEntry> {
        self.find(Cursor::new(pattern.segments()))?.route.as_ref()
    }

    /// Mutable route entry registered for exactly `pattern`.
    pub(crate) fn get_mut(&mut self, pattern: &Pattern) -> Option<&mut RouteEntry> {
        self.find_mut(Cursor::new(pattern.segments()))?
            .route
            .as_mut()
    }

    fn find(&self, cursor: Cursor<'_>) -> Option<&RadixNode> {
        match cursor.peek() {
            None => Some(self),
            Some(Step::Bytes(bytes)) => {
                let child = self.literals.iter().find(|c| bytes.starts_with(c.prefix()))?;
                child.find(cursor.advance(child.prefix().len()))
            }
            Some(Step::Capture(capture)) => self
                .captures
                .iter()
                .find(|c| matches!(&c.kind, NodeKind::Capture(e) if e.same_slot(capture)))?
                .find(cursor.next()),
            Some(Step::Wildcard) => self.wildcard.as_deref()?.find(cursor.next()),
        }
    }

    fn find_mut(&mut self, cursor: Cursor<'_>) -> Option<&mut RadixNode> {
        match cursor.peek() {
            None => Some(self),
            Some(Step::Bytes(bytes)) => {
                let child = self
                    .literals
                    .iter_mut()
                    .find(|c| bytes.starts_with(c.prefix()))?;
                let len = child.prefix().len();
                child.find_mut(cursor.advance(len))
            }
            Some(Step::Capture(capture)) => self
                .captures
                .iter_mut()
                .find(|c| matches!(&c.kind, NodeKind::Capture(e) if e.same_slot(capture)))?
                .find_mut(cursor.next()),
            Some(Step::Wildcard) => self.wildcard.as_deref_mut()?.find_mut(cursor.next()),
        }
    }

    /// Remove `methods` from the route registered for `pattern`.
    ///
    /// Returns `None` when the pattern is not registered, otherwise whether
    /// the route is gone entirely. Nodes left without routes or children are
    /// pruned on the way back up.
    pub(crate) fn remove(&mut self, pattern: &Pattern, methods: &[Method]) -> Option<bool> {
        self.remove_at(Cursor::new(pattern.segments()), methods)
    }

    fn remove_at(&mut self, cursor: Cursor<'_>, methods: &[Method]) -> Option<bool> {
        match cursor.peek() {
            None => {
                let entry = self.route.as_mut()?;
                for method in methods {
                    entry.methods.remove(*method);
                }
                if entry.methods.is_empty() {
                    self.route = None;
                    return Some(true);
                }
                Some(false)
            }
            Some(Step::Bytes(bytes)) => {
                let i = self
                    .literals
                    .iter()
                    .position(|c| bytes.starts_with(c.prefix()))?;
                let len = self.literals[i].prefix().len();
                let gone = self.literals[i].remove_at(cursor.advance(len), methods)?;
                if self.literals[i].is_empty() {
                    self.literals.remove(i);
                } else {
                    self.literals[i].compact();
                }
                Some(gone)
            }
            Some(Step::Capture(capture)) => {
                let i = self
                    .captures
                    .iter()
                    .position(|c| matches!(&c.kind, NodeKind::Capture(e) if e.same_slot(capture)))?;
                let gone = self.captures[i].remove_at(cursor.next(), methods)?;
                if self.captures[i].is_empty() {
                    self.captures.remove(i);
                }
                Some(gone)
            }
            Some(Step::Wildcard) => {
                let gone = self.wildcard.as_deref_mut()?.remove_at(cursor.next(), methods)?;
                if self.wildcard.as_deref().is_some_and(RadixNode::is_empty) {
                    self.wildcard = None;
                }
                Some(gone)
            }
        }
    }

    /// Every route entry below this node.
    pub(crate) fn entries(&self) -> Vec<&RouteEntry> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'t>(&'t self, out: &mut Vec<&'t RouteEntry>) {
        if let Some(entry) = &self.route {
            out.push(entry);
        }
        for child in self.literals.iter().chain(&self.captures) {
            child.collect(out);
        }
        if let Some(w) = &self.wildcard {
            w.collect(out);
        }
    }

    /// Find the route for `path`.
    ///
    /// A complete match wins outright. Otherwise the directory-style route
    /// that consumed the most input is returned, flagged as partial.
    pub(crate) fn lookup<'t>(&'t self, path: &str) -> Option<Hit<'t>> {
        let mut search = Search {
            params: ParamVec::new(),
            tail: None,
            partial: None,
            failed: HashSet::new(),
        };
        if let Some(node) = self.walk(path, 0, &mut search) {
            let entry = node.route.as_ref()?;
            return Some(Hit {
                entry,
                params: search.params,
                consumed: path.len(),
                tail: search.tail,
                partial: false,
            });
        }
        let best = search.partial?;
        Some(Hit {
            entry: best.node.route.as_ref()?,
            params: best.params,
            consumed: best.consumed,
            tail: None,
            partial: true,
        })
    }

    /// Continue matching below `self`, which has consumed `path[..pos]`.
    fn walk<'t>(&'t self, path: &str, pos: usize, search: &mut Search<'t>) -> Option<&'t RadixNode> {
        let bytes = path.as_bytes();
        if pos == bytes.len() {
            return self.route.as_ref().map(|_| self);
        }
        if let Some(entry) = &self.route {
            if entry.pattern.is_prefix_route() {
                search.offer_partial(self, entry, pos);
            }
        }

        let rest = &bytes[pos..];
        if let Some(child) = self.literals.iter().find(|c| c.prefix().first() == rest.first()) {
            if rest.starts_with(child.prefix()) {
                if let Some(hit) = child.walk(path, pos + child.prefix().len(), search) {
                    return Some(hit);
                }
            }
        }

        for child in &self.captures {
            if let Some(hit) = child.walk_capture(path, pos, search) {
                return Some(hit);
            }
        }

        if let Some(wildcard) = &self.wildcard {
            if rest.first() == Some(&b'/') && wildcard.route.is_some() {
                search.tail = Some(pos + 1);
                return Some(wildcard);
            }
        }
        None
    }

    /// Bind this capture node's value starting at `pos`, then continue.
    fn walk_capture<'t>(
        &'t self,
        path: &str,
        pos: usize,
        search: &mut Search<'t>,
    ) -> Option<&'t RadixNode> {
        let NodeKind::Capture(capture) = &self.kind else {
            return None;
        };
        let bytes = path.as_bytes();
        let key: *const RadixNode = self;

        if !self.literals.is_empty() || self.wildcard.is_some() {
            for end in pos + 1..bytes.len() {
                if !self.is_stop(bytes[end]) || search.failed.contains(&(key, end)) {
                    continue;
                }
                let Some(value) = path.get(pos..end) else {
                    continue;
                };
                if !capture.accepts(value) {
                    continue;
                }
                let pushed = bind(&mut search.params, capture, value);
                if let Some(hit) = self.walk(path, end, search) {
                    return Some(hit);
                }
                if pushed {
                    search.params.pop();
                }
                // Success below `end` depends only on the node and offset
                search.failed.insert((key, end));
            }
        }

        if self.route.is_some() {
            let value = path.get(pos..)?;
            if capture.accepts(value) {
                bind(&mut search.params, capture, value);
                return Some(self);
            }
        }
        None
    }

    /// Whether a capture ending in front of `b` could hand over to a child.
    fn is_stop(&self, b: u8) -> bool {
        (b == b'/' && self.wildcard.is_some())
            || self.literals.iter().any(|c| c.prefix().first() == Some(&b))
    }
}

fn bind(params: &mut ParamVec, capture: &Capture, value: &str) -> bool {
    match capture.name_arc() {
        Some(name) => {
            params.push((Arc::clone(name), value.to_string()));
            true
        }
        None => false,
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::router::compile;
    use crate::router::methods::HandlerSlot;

    fn tree(patterns: &[&str]) -> RadixNode {
        let mut root = RadixNode::root();
        for (seq, p) in patterns.iter().enumerate() {
            let pattern = Arc::new(compile(p).unwrap());
            let entry = root.insert(&pattern, seq as u64);
            entry
                .methods
                .set(
                    Method::Get,
                    HandlerSlot {
                        handler: Arc::from(*p),
                        group: None,
                    },
                )
                .unwrap();
        }
        root
    }

    fn matched<'t>(root: &'t RadixNode, path: &str) -> Option<(&'t str, Vec<(String, String)>)> {
        root.lookup(path).map(|hit| {
            (
                hit.entry.pattern.as_str(),
                hit.params
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            )
        })
    }

    fn param(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_radix_split_keeps_both_routes() {
        let root = tree(&["/users", "/user", "/usage"]);
        assert_eq!(matched(&root, "/users").unwrap().0, "/users");
        assert_eq!(matched(&root, "/user").unwrap().0, "/user");
        assert_eq!(matched(&root, "/usage").unwrap().0, "/usage");
        assert!(matched(&root, "/us").is_none());
        assert!(matched(&root, "/usersx").is_none());

        // "/us" is shared, split into "age" and "er" -> "s"
        assert_eq!(root.literals.len(), 1);
        assert_eq!(root.literals[0].prefix(), b"/us");
        assert_eq!(root.literals[0].literals.len(), 2);
    }

    #[test]
    fn test_sibling_prefixes_are_byte_disjoint() {
        let root = tree(&["/a/b", "/a/c", "/b", "/abc", "/a/bd"]);
        fn check(node: &RadixNode) {
            let mut firsts: Vec<u8> = node.literals.iter().map(|c| c.prefix()[0]).collect();
            let n = firsts.len();
            firsts.sort_unstable();
            firsts.dedup();
            assert_eq!(firsts.len(), n);
            for child in node.literals.iter().chain(&node.captures) {
                check(child);
            }
        }
        check(&root);
    }

    #[test]
    fn test_parameter_extraction() {
        let root = tree(&["/users/{user_id}/posts/{post_id}"]);
        let (pattern, params) = matched(&root, "/users/123/posts/456").unwrap();
        assert_eq!(pattern, "/users/{user_id}/posts/{post_id}");
        assert_eq!(params, param(&[("user_id", "123"), ("post_id", "456")]));
    }

    #[test]
    fn test_different_param_names_same_position() {
        let root = tree(&["/users/{user_id}/posts", "/users/{id}/comments"]);

        let (pattern, params) = matched(&root, "/users/123/posts").unwrap();
        assert_eq!(pattern, "/users/{user_id}/posts");
        assert_eq!(params, param(&[("user_id", "123")]));

        let (pattern, params) = matched(&root, "/users/456/comments").unwrap();
        assert_eq!(pattern, "/users/{id}/comments");
        assert_eq!(params, param(&[("id", "456")]));
    }

    #[test]
    fn test_literal_beats_regex_beats_greedy() {
        let root = tree(&["/post/{name}", r"/post/{id:\d+}", "/post/1"]);
        assert_eq!(matched(&root, "/post/1").unwrap().0, "/post/1");
        assert_eq!(matched(&root, "/post/2").unwrap().0, r"/post/{id:\d+}");
        assert_eq!(matched(&root, "/post/abc").unwrap().0, "/post/{name}");
    }

    #[test]
    fn test_capture_backtracks_to_later_stop() {
        let root = tree(&["/{file}.tar.gz"]);
        let (_, params) = matched(&root, "/v1.2.tar.gz").unwrap();
        assert_eq!(params, param(&[("file", "v1.2")]));
        assert!(matched(&root, "/.tar.gz").is_none());
    }

    #[test]
    fn test_chained_captures_backtrack_once_per_offset() {
        let root = tree(&["/{a}/{b}/end"]);
        let (_, params) = matched(&root, "/x/y/z/end").unwrap();
        assert_eq!(params, param(&[("a", "x"), ("b", "y/z")]));

        let mut path = String::from("/");
        path.push_str(&"x/".repeat(300));
        path.push_str("nomatch");
        assert!(root.lookup(&path).is_none());
    }

    #[test]
    fn test_endpoint_capture_takes_remainder() {
        let root = tree(&["/files/{path}", "/files/{path}/meta"]);
        let (pattern, params) = matched(&root, "/files/a/b").unwrap();
        assert_eq!(pattern, "/files/{path}");
        assert_eq!(params, param(&[("path", "a/b")]));

        // Children of the shared slot are tried before the remainder rule
        let (pattern, params) = matched(&root, "/files/a/meta").unwrap();
        assert_eq!(pattern, "/files/{path}/meta");
        assert_eq!(params, param(&[("path", "a")]));
    }

    #[test]
    fn test_wildcard_requires_slash() {
        let root = tree(&[r"/posts/{id:\d+}/*"]);
        let hit = root.lookup("/posts/1/index.html").unwrap();
        assert_eq!(hit.tail, Some("/posts/1/".len()));
        assert!(root.lookup("/posts/1/").is_some());
        assert!(root.lookup("/posts/1").is_none());
    }

    #[test]
    fn test_partial_match_on_directory_route() {
        let root = tree(&["/post/", r"/post/{id:\d+}"]);
        let hit = root.lookup("/post/abc").unwrap();
        assert!(hit.partial);
        assert_eq!(hit.entry.pattern.as_str(), "/post/");

        let hit = root.lookup("/post/12").unwrap();
        assert!(!hit.partial);
    }

    #[test]
    fn test_longest_partial_wins() {
        let root = tree(&["/a/", "/a/b/"]);
        let hit = root.lookup("/a/b/c").unwrap();
        assert!(hit.partial);
        assert_eq!(hit.consumed, "/a/b/".len());
        assert_eq!(hit.entry.pattern.as_str(), "/a/b/");
        assert_eq!(root.lookup("/a/x").unwrap().entry.pattern.as_str(), "/a/");
    }

    #[test]
    fn test_remove_prunes_and_compacts() {
        let mut root = tree(&["/users", "/user"]);
        let users = compile("/users").unwrap();
        assert_eq!(root.remove(&users, &Method::ALL), Some(true));
        assert!(root.lookup("/users").is_none());
        assert_eq!(matched(&root, "/user").unwrap().0, "/user");
        assert_eq!(root.literals[0].prefix(), b"/user");
        assert!(root.literals[0].literals.is_empty());

        let user = compile("/user").unwrap();
        assert_eq!(root.remove(&user, &[Method::Get]), Some(true));
        assert!(root.is_empty());
        assert_eq!(root.remove(&user, &[Method::Get]), None);
    }

    #[test]
    fn test_remove_one_method_keeps_route() {
        let mut root = tree(&["/x"]);
        let x = Arc::new(compile("/x").unwrap());
        root.insert(&x, 99)
            .methods
            .set(
                Method::Post,
                HandlerSlot {
                    handler: Arc::from("post"),
                    group: None,
                },
            )
            .unwrap();
        assert_eq!(root.remove(&x, &[Method::Get]), Some(false));
        let entry = root.get(&x).unwrap();
        assert_eq!(entry.seq, 0);
        assert!(entry.methods.contains(Method::Post));
    }

    #[test]
    fn test_entries_lists_every_route() {
        let root = tree(&["/a", "/a/{id}", "/a/{id}/*", "/b/"]);
        let mut patterns: Vec<&str> = root.entries().iter().map(|e| e.pattern.as_str()).collect();
        patterns.sort_unstable();
        assert_eq!(patterns, vec!["/a", "/a/{id}", "/a/{id}/*", "/b/"]);
    }
}
