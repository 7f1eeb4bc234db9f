// Persistent tag paths
//
//  Copyright (C) 2014-2022 Ryan Specialty Group, LLC.
//
//  This file is part of RECMAP.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Immutable paths of [`Tag`]s.
//!
//! A [`Path`] addresses a node either in the output schema or in the
//!   source record.
//! The two address spaces are distinct but share this representation.
//!
//! Paths are persistent linked lists:
//!   [`Path::child`] shares the entire parent path and allocates only the
//!   new segment,
//!     so the many paths produced while instantiating a schema or
//!     generating code are cheap to build and to clone.
//!
//! ```
//! use recmap::path::Path;
//!
//! let title: Path = "/record/dc:title".parse().unwrap();
//! let record = title.parent().unwrap();
//!
//! assert!(record.is_ancestor_of(&title));
//! assert_eq!(title.extend_ancestor(&record).unwrap().to_string(), "/dc:title");
//! assert_eq!(title.with_root_removed().unwrap().to_string(), "/dc:title");
//! ```

use crate::{
    global,
    tag::{Tag, TagError},
};
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

/// Ordered sequence of [`Tag`]s beginning at a root.
///
/// The empty path is the unique root.
/// Two paths are equal iff their tag sequences are equal,
///   which is also the case iff their string renderings are equal.
#[derive(Clone, Default)]
pub struct Path(Option<Arc<Segment>>);

struct Segment {
    parent: Path,
    tag: Tag,
    len: usize,
}

assert_impl_all!(Path: Send, Sync);

impl Path {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self(None)
    }

    /// Path built from a sequence of tags,
    ///   root first.
    pub fn from_tags<I: IntoIterator<Item = Tag>>(tags: I) -> Self {
        tags.into_iter().fold(Self::root(), |path, tag| path.child(tag))
    }

    /// Reserved source path denoting a literal constant.
    pub fn constant() -> Self {
        Self::root().child(Tag::local(global::CONSTANT_TAG))
    }

    /// Whether this is the reserved [constant path](Path::constant).
    pub fn is_constant(&self) -> bool {
        self.len() == 1
            && self.last() == Some(&Tag::local(global::CONSTANT_TAG))
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map(|seg| seg.len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Extend this path by a single tag.
    pub fn child(&self, tag: Tag) -> Self {
        Self(Some(Arc::new(Segment {
            parent: self.clone(),
            tag,
            len: self.len() + 1,
        })))
    }

    /// Path with the final tag removed,
    ///   or [`None`] for the root.
    pub fn parent(&self) -> Option<Path> {
        self.0.as_ref().map(|seg| seg.parent.clone())
    }

    /// Final tag,
    ///   or [`None`] for the root.
    pub fn last(&self) -> Option<&Tag> {
        self.0.as_ref().map(|seg| &seg.tag)
    }

    /// Tags of this path, root first.
    pub fn tags(&self) -> Vec<&Tag> {
        let mut tags = Vec::with_capacity(self.len());
        let mut cur = self;

        while let Some(seg) = &cur.0 {
            tags.push(&seg.tag);
            cur = &seg.parent;
        }

        tags.reverse();
        tags
    }

    /// Tag at the given zero-based depth.
    pub fn tag_at(&self, depth: usize) -> Option<&Tag> {
        self.ancestor_with_len(depth + 1).and_then(|path| path.last())
    }

    /// The first `len` tags of this path.
    ///
    /// If `len` exceeds the length of this path,
    ///   the path is returned unchanged.
    pub fn prefix(&self, len: usize) -> Path {
        self.ancestor_with_len(len).cloned().unwrap_or_else(|| self.clone())
    }

    fn ancestor_with_len(&self, len: usize) -> Option<&Path> {
        if len > self.len() {
            return None;
        }

        let mut cur = self;
        while cur.len() > len {
            cur = &cur.0.as_ref()?.parent;
        }

        Some(cur)
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.len() < other.len()
            && other.ancestor_with_len(self.len()) == Some(self)
    }

    /// Whether `self` is an ancestor of,
    ///   descendant of,
    ///   or equal to `other`.
    pub fn is_family_of(&self, other: &Path) -> bool {
        self == other
            || self.is_ancestor_of(other)
            || other.is_ancestor_of(self)
    }

    /// This path with its first tag removed.
    ///
    /// Paths of fewer than two tags have no meaningful remainder and
    ///   produce [`PathError::TooShort`].
    pub fn with_root_removed(&self) -> Result<Path, PathError> {
        if self.len() < 2 {
            return Err(PathError::TooShort(self.clone()));
        }

        Ok(Self::from_tags(self.tags().into_iter().skip(1).cloned()))
    }

    /// The portion of this path beyond `ancestor`.
    ///
    /// `ancestor` must be a strict ancestor of `self`,
    ///   otherwise [`PathError::NotAncestor`] is produced.
    pub fn extend_ancestor(&self, ancestor: &Path) -> Result<Path, PathError> {
        if !ancestor.is_ancestor_of(self) {
            return Err(PathError::NotAncestor {
                path: self.clone(),
                ancestor: ancestor.clone(),
            });
        }

        Ok(Self::from_tags(
            self.tags().into_iter().skip(ancestor.len()).cloned(),
        ))
    }

    /// Append every tag of `rel` to this path.
    pub fn join(&self, rel: &Path) -> Path {
        rel.tags()
            .into_iter()
            .fold(self.clone(), |path, tag| path.child(tag.clone()))
    }

    /// This path with the tag at zero-based `depth` keyed by `key`,
    ///   or [`None`] if the path is not that deep.
    ///
    /// The prefix above `depth` is shared with `self`.
    pub fn with_variant_at<K: Into<String>>(
        &self,
        depth: usize,
        key: K,
    ) -> Option<Path> {
        let tag = self.tag_at(depth)?.with_variant(key);
        let keyed = self.prefix(depth).child(tag);

        Some(
            self.tags()
                .into_iter()
                .skip(depth + 1)
                .fold(keyed, |path, t| path.child(t.clone())),
        )
    }

    /// This path with every variant key stripped from its tags.
    pub fn without_variants(&self) -> Path {
        Self::from_tags(self.tags().into_iter().map(Tag::without_variant))
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => true,
            (Some(a), Some(b)) => {
                a.len == b.len && a.tag == b.tag && a.parent == b.parent
            }
            _ => false,
        }
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for tag in self.tags() {
            tag.hash(state);
        }
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tags().cmp(&other.tags())
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }

        for tag in self.tags() {
            write!(f, "/{tag}")?;
        }

        Ok(())
    }
}

impl Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Parse a `/`-delimited path.
    ///
    /// The leading `/` is optional;
    ///   both `""` and `"/"` denote the root.
    /// A `/` escaped within a variant key does not delimit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix('/').unwrap_or(s);

        if body.is_empty() {
            return Ok(Self::root());
        }

        split_steps(body)
            .into_iter()
            .map(|part| {
                part.parse::<Tag>()
                    .map_err(|e| PathError::InvalidTag(s.to_string(), e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_tags)
    }
}

/// Split path text on every `/` not escaped by a `\`.
fn split_steps(body: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '/' => {
                steps.push(&body[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }

    steps.push(&body[start..]);
    steps
}

/// Violation of the path algebra's contract.
///
/// These represent programming errors in the caller and are surfaced
///   immediately rather than silently producing a wrong path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// [`Path::with_root_removed`] on a path of fewer than two tags.
    TooShort(Path),
    /// [`Path::extend_ancestor`] against a path that is not an ancestor.
    NotAncestor { path: Path, ancestor: Path },
    /// Path text contains an unparsable tag.
    InvalidTag(String, TagError),
}

impl Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(path) => {
                write!(f, "path `{path}` is too short to remove its root")
            }
            Self::NotAncestor { path, ancestor } => {
                write!(f, "`{ancestor}` is not an ancestor of `{path}`")
            }
            Self::InvalidTag(s, e) => write!(f, "invalid path `{s}`: {e}"),
        }
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTag(_, e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test;
