// Node mappings
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

//! Declarative source-to-output field mappings.
//!
//! A [`NodeMapping`] is the atomic unit a curator declares:
//!   "populate this output node from that source path,
//!     combined with this [`Operator`],
//!     optionally translated through a [`Dictionary`]
//!     or computed by a [`Snippet`]".
//! Mappings are attached to nodes of a
//!   [`MappingTree`](crate::node::MappingTree),
//!     which reports every mutation as a [`ChangeEvent`] for the caller
//!     to dispatch.

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic},
    dictionary::Dictionary,
    global,
    node::NodeId,
    operator::Operator,
    optlist::OptRole,
    path::Path,
};
use fxhash::FxHashMap;
use std::fmt::{self, Display};

/// Declared transformation of source values into one output node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMapping {
    /// Primary source path,
    ///   or [`Path::constant`] for a literal.
    pub input: Path,
    /// Additional source paths combined with the primary into a
    ///   map-join.
    ///
    /// Every sibling shares the parent of [`NodeMapping::input`].
    pub siblings: Vec<Path>,
    /// Path of the owning node.
    pub output: Path,
    pub operator: Option<Operator>,
    pub snippet: Option<Snippet>,
    pub constant: Option<String>,
    pub dictionary: Option<Dictionary>,
    pub documentation: Option<String>,
}

impl NodeMapping {
    pub fn new(input: Path, output: Path) -> Self {
        Self {
            input,
            siblings: Vec::new(),
            output,
            operator: None,
            snippet: None,
            constant: None,
            dictionary: None,
            documentation: None,
        }
    }

    /// Mapping emitting a literal value.
    pub fn constant<V: Into<String>>(output: Path, value: V) -> Self {
        Self {
            constant: Some(value.into()),
            ..Self::new(Path::constant(), output)
        }
    }

    pub fn with_operator(self, operator: Operator) -> Self {
        Self {
            operator: Some(operator),
            ..self
        }
    }

    pub fn with_siblings(self, siblings: Vec<Path>) -> Self {
        Self { siblings, ..self }
    }

    pub fn with_snippet(self, snippet: Snippet) -> Self {
        Self {
            snippet: Some(snippet),
            ..self
        }
    }

    pub fn with_dictionary(self, dictionary: Dictionary) -> Self {
        Self {
            dictionary: Some(dictionary),
            ..self
        }
    }

    pub fn is_constant(&self) -> bool {
        self.input.is_constant()
    }

    /// Primary path followed by any siblings.
    pub fn inputs(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(&self.input).chain(self.siblings.iter())
    }

    /// Verify that every sibling shares the parent of the primary input.
    pub fn check_siblings(&self) -> Result<(), AttachError> {
        let parent = self.input.parent();

        match self.siblings.iter().find(|sib| sib.parent() != parent) {
            Some(sibling) => Err(AttachError::SiblingParent {
                input: self.input.clone(),
                sibling: sibling.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Opaque code authored for a node,
///   together with an optional fallback block.
///
/// The fallback block is emitted once more after the primary code,
///   guarded on the output node still being absent,
///     giving the node a second opportunity to receive a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    pub absent: Option<String>,
}

impl Snippet {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            absent: None,
        }
    }

    pub fn with_absent<S: Into<String>>(self, absent: S) -> Self {
        Self {
            absent: Some(absent.into()),
            ..self
        }
    }

    /// Parse authored text,
    ///   lifting an outermost [`global::ABSENT_GUARD`] block into
    ///   [`Snippet::absent`].
    ///
    /// Only a guard at brace depth zero whose line consists solely of the
    ///   guard is recognized;
    ///     anything else is ordinary code.
    pub fn from_text(text: &str) -> Self {
        let mut code = Vec::new();
        let mut absent = None;
        let mut depth = 0i32;
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            let guard = line.trim() == global::ABSENT_GUARD;

            if depth == 0 && absent.is_none() && guard {
                let mut inner = Vec::new();
                let mut inner_depth = 1;

                for line in lines.by_ref() {
                    inner_depth += brace_delta(line);

                    if inner_depth <= 0 {
                        break;
                    }

                    inner.push(line);
                }

                absent = Some(dedent(&inner));
                continue;
            }

            depth += brace_delta(line);
            code.push(line);
        }

        Self {
            code: code.join("\n").trim_end().to_string(),
            absent,
        }
    }
}

impl Display for Snippet {
    /// Render in the form accepted by [`Snippet::from_text`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)?;

        if let Some(absent) = &self.absent {
            let indent = " ".repeat(global::INDENT_WIDTH);

            write!(f, "\n{}\n", global::ABSENT_GUARD)?;
            for line in absent.lines() {
                write!(f, "{indent}{line}\n")?;
            }
            f.write_str("}")?;
        }

        Ok(())
    }
}

fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |n, c| match c {
        '{' => n + 1,
        '}' => n - 1,
        _ => n,
    })
}

fn dedent(lines: &[&str]) -> String {
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(margin..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Store of code previously authored for output nodes.
///
/// [`None`] means that the generated default should be used.
pub trait SnippetStore {
    fn snippet(&self, output: &Path) -> Option<Snippet>;
}

/// Store holding no authored code.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnippets;

impl SnippetStore for NoSnippets {
    fn snippet(&self, _output: &Path) -> Option<Snippet> {
        None
    }
}

impl SnippetStore for FxHashMap<Path, Snippet> {
    fn snippet(&self, output: &Path) -> Option<Snippet> {
        self.get(output).cloned()
    }
}

/// Kind of mutation reported by a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    MappingAdded,
    MappingRemoved,
    CodeChanged,
    DictionaryChanged,
    DocumentationChanged,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MappingAdded => "mapping added",
            Self::MappingRemoved => "mapping removed",
            Self::CodeChanged => "code changed",
            Self::DictionaryChanged => "dictionary changed",
            Self::DocumentationChanged => "documentation changed",
        })
    }
}

/// Notification of a mutation of the mapping document.
///
/// The tree never acts on these itself;
///   it is up to the caller to dispatch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub node: NodeId,
    /// Primary input of the affected mapping.
    pub input: Path,
    pub kind: ChangeKind,
}

/// A mapping cannot be attached to
///   (or located on)
///   a node.
///
/// The mapping document is unchanged when any of these are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The node already holds a mapping with the same primary input.
    Duplicate { output: Path, input: Path },
    /// A sibling input does not share the primary input's parent.
    SiblingParent { input: Path, sibling: Path },
    /// The mapping's output path is not the path of the node.
    OutputMismatch { node: Path, output: Path },
    /// The node is a fixed field of an option and resolves to the
    ///   option's scalar.
    FixedField { node: Path, role: OptRole },
    /// No node exists at the output path.
    UnknownNode(Path),
    /// The node holds no mapping with the given input.
    NotAttached { output: Path, input: Path },
}

impl Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { output, input } => {
                write!(f, "`{output}` is already mapped from `{input}`")
            }
            Self::SiblingParent { input, sibling } => write!(
                f,
                "sibling input `{sibling}` does not share the parent of `{input}`"
            ),
            Self::OutputMismatch { node, output } => write!(
                f,
                "mapping for `{output}` cannot be attached to node `{node}`"
            ),
            Self::FixedField { node, role } => write!(
                f,
                "`{node}` is the {role} of an option and cannot be mapped"
            ),
            Self::UnknownNode(path) => write!(f, "no node exists at `{path}`"),
            Self::NotAttached { output, input } => {
                write!(f, "`{output}` is not mapped from `{input}`")
            }
        }
    }
}

impl std::error::Error for AttachError {}

impl Diagnostic for AttachError {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::Duplicate { output, input } => vec![
                output.clone().error("node already has this mapping"),
                input.clone().note("duplicate input"),
            ],
            Self::SiblingParent { input, sibling } => vec![
                sibling.clone().error("sibling input declared here"),
                input.clone().note("primary input"),
                sibling
                    .clone()
                    .help("a map-join may only combine children of one parent"),
            ],
            Self::OutputMismatch { node, output } => vec![
                node.clone().error("mapping attached here"),
                output.clone().note("mapping targets this path"),
            ],
            Self::FixedField { node, .. } => node
                .clone()
                .error("value is fixed by the selected option")
                .with_help("map the option list element instead"),
            Self::UnknownNode(path) => path.clone().mark_error().into(),
            Self::NotAttached { output, input } => vec![
                output.clone().mark_error(),
                input.clone().note("no mapping from this input"),
            ],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::p;

    #[test]
    fn constant_mapping_uses_reserved_input() {
        let m = NodeMapping::constant(p("/root/rights"), "CC0");

        assert!(m.is_constant());
        assert_eq!(m.constant.as_deref(), Some("CC0"));
    }

    #[test]
    fn siblings_must_share_parent() {
        let ok = NodeMapping::new(p("/record/a/x"), p("/root/t"))
            .with_siblings(vec![p("/record/a/y"), p("/record/a/z")]);
        assert_eq!(ok.check_siblings(), Ok(()));
        assert_eq!(ok.inputs().count(), 3);

        let bad = NodeMapping::new(p("/record/a/x"), p("/root/t"))
            .with_siblings(vec![p("/record/b/y")]);
        assert_eq!(
            bad.check_siblings(),
            Err(AttachError::SiblingParent {
                input: p("/record/a/x"),
                sibling: p("/record/b/y"),
            })
        );
    }

    #[test]
    fn snippet_without_guard() {
        let snippet = Snippet::from_text("if (_x) {\n    _x\n}\n");

        assert_eq!(snippet.code, "if (_x) {\n    _x\n}");
        assert_eq!(snippet.absent, None);
    }

    #[test]
    fn snippet_lifts_outermost_guard() {
        let text = "_title.upper()\n\
                    if (_absent_) {\n\
                    \x20   'untitled'\n\
                    \x20   if (_x) {\n\
                    \x20       _x\n\
                    \x20   }\n\
                    }\n";

        let snippet = Snippet::from_text(text);

        assert_eq!(snippet.code, "_title.upper()");
        assert_eq!(
            snippet.absent.as_deref(),
            Some("'untitled'\nif (_x) {\n    _x\n}")
        );
    }

    #[test]
    fn nested_guard_is_ordinary_code() {
        let text = "if (_y) {\n    if (_absent_) {\n        'z'\n    }\n}";
        let snippet = Snippet::from_text(text);

        assert_eq!(snippet.code, text);
        assert_eq!(snippet.absent, None);
    }

    #[test]
    fn snippet_text_reparses() {
        let snippet = Snippet::new("_title").with_absent("'untitled'");

        assert_eq!(Snippet::from_text(&snippet.to_string()), snippet);
    }

    #[test]
    fn fixed_field_diagnostic_offers_help() {
        let err = AttachError::FixedField {
            node: p("/root/type[b]/@key"),
            role: OptRole::Key,
        };

        let desc = err.describe();
        assert_eq!(desc.len(), 2);
        assert_eq!(
            err.to_string(),
            "`/root/type[b]/@key` is the key of an option and cannot be mapped"
        );
    }
}
