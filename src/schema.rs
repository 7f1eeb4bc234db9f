// Record definitions
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

//! Declarative definition of the target record hierarchy.
//!
//! A record definition exists in two forms:
//!
//!   1. [`SchemaDecl`] is the definition as written,
//!        containing references to named attribute groups,
//!        element groups,
//!        and templates
//!          (see [`ChildDecl`]);
//!        and
//!   2. [`RecDef`] is the _resolved_ definition,
//!        in which every reference has been substituted with the subtree
//!        it names.
//!
//! [`reader`] produces the former from XML and [`resolve`] lowers it into
//!   the latter.
//! Only a [`RecDef`] can be instantiated into a
//!   [`MappingTree`](crate::node::MappingTree);
//!     a definition that fails resolution is never usable.

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic},
    operator::Operator,
    optlist::{Opt, OptListError, OptionList},
    path::Path,
    tag::Tag,
};
use std::fmt::{self, Display};

pub mod reader;
mod resolve;

pub use resolve::resolve;

/// Read and resolve a record definition from XML.
///
/// This is [`reader::read`] followed by [`resolve`].
pub fn load<B: std::io::BufRead>(input: B) -> Result<RecDef, SchemaError> {
    resolve(reader::read(input)?)
}

/// Namespace declaration of the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

/// Designates the output field satisfying a system-required semantic
///   (e.g. the record's title or thumbnail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarker {
    pub name: String,
    pub kind: Option<String>,
    pub path: Path,
}

/// Structural assertion evaluated against the output record by the
///   interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub path: Path,
    pub condition: String,
}

/// Resolved record definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecDef {
    pub prefix: String,
    pub version: String,
    pub namespaces: Vec<Namespace>,
    pub root: SchemaElement,
    pub field_markers: Vec<FieldMarker>,
    pub assertions: Vec<Assertion>,
}

impl RecDef {
    /// Every schema path of the resolved tree in declaration order,
    ///   attributes before child elements.
    pub fn paths(&self) -> Vec<Path> {
        fn walk(elem: &SchemaElement, parent: &Path, out: &mut Vec<Path>) {
            let path = parent.child(elem.tag.clone());

            out.extend(elem.attrs.iter().map(|a| path.child(a.tag.clone())));
            out.push(path.clone());

            for child in &elem.elements {
                walk(child, &path, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &Path::root(), &mut out);
        out
    }
}

/// Attribute of a resolved [`SchemaElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAttribute {
    pub tag: Tag,
    pub required: bool,
    pub function: Option<String>,
    pub init: Option<String>,
    pub doc: Option<String>,
}

/// Element of a resolved record definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    pub tag: Tag,
    pub attrs: Vec<SchemaAttribute>,
    pub elements: Vec<SchemaElement>,
    pub required: bool,
    pub singular: bool,
    /// Default operator for mappings targeting this element.
    pub operator: Option<Operator>,
    pub opt_list: Option<OptionList>,
    pub function: Option<String>,
    pub init: Option<String>,
    pub doc: Option<String>,
}

impl SchemaAttribute {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            required: false,
            function: None,
            init: None,
            doc: None,
        }
    }
}

impl SchemaElement {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            elements: Vec::new(),
            required: false,
            singular: false,
            operator: None,
            opt_list: None,
            function: None,
            init: None,
            doc: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Unresolved record definition as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDecl {
    pub prefix: String,
    pub version: String,
    pub namespaces: Vec<Namespace>,
    pub defs: Vec<NamedDecl>,
    pub root: ElemDecl,
    pub field_markers: Vec<FieldMarker>,
    pub assertions: Vec<Assertion>,
}

impl SchemaDecl {
    pub fn new(root: ElemDecl) -> Self {
        Self {
            prefix: String::new(),
            version: String::new(),
            namespaces: Vec::new(),
            defs: Vec::new(),
            root,
            field_markers: Vec::new(),
            assertions: Vec::new(),
        }
    }
}

/// Kind of a named, reusable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefKind {
    /// A set of attributes (`attr-group`).
    AttrGroup,
    /// A set of elements (`elem-group`).
    ElemGroup,
    /// Children of an element (`template`),
    ///   referenced by the element's `template` attribute.
    Template,
}

impl Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AttrGroup => "attr-group",
            Self::ElemGroup => "elem-group",
            Self::Template => "template",
        })
    }
}

/// Named definition that may be referenced from elsewhere in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDecl {
    pub kind: DefKind,
    pub name: String,
    pub children: Vec<ChildDecl>,
}

/// Child of an element or named definition as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildDecl {
    Attr(AttrDecl),
    Elem(ElemDecl),
    /// Reference to a named definition,
    ///   substituted during [`resolve`].
    Ref(DefKind, String),
}

pub type AttrDecl = SchemaAttribute;

/// Unresolved element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElemDecl {
    pub tag: Tag,
    pub required: bool,
    pub singular: bool,
    pub operator: Option<Operator>,
    pub function: Option<String>,
    pub init: Option<String>,
    pub doc: Option<String>,
    /// Name of a [`DefKind::Template`] supplying children.
    pub template: Option<String>,
    pub opt_list: Option<OptListDecl>,
    pub children: Vec<ChildDecl>,
}

impl ElemDecl {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            required: false,
            singular: false,
            operator: None,
            function: None,
            init: None,
            doc: None,
            template: None,
            opt_list: None,
            children: Vec::new(),
        }
    }
}

/// Unresolved option list.
///
/// Paths are relative to the element carrying the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptListDecl {
    pub dictionary: String,
    pub value: Tag,
    pub key: Option<Path>,
    pub schema: Option<Path>,
    pub schema_uri: Option<Path>,
    pub options: Vec<Opt>,
}

/// Record definition cannot be read or resolved.
///
/// A schema producing any of these errors never becomes usable.
#[derive(Debug)]
pub enum SchemaError {
    /// Underlying XML could not be read.
    Xml(quick_xml::Error),
    /// Document ended before the record definition was closed.
    UnexpectedEof,
    /// Record definition declares no root element.
    MissingRoot,
    /// Element is not permitted in this context.
    UnexpectedElement { parent: String, found: String },
    /// Element is missing an attribute it requires.
    MissingAttr { element: String, attr: &'static str },
    /// Attribute value could not be interpreted.
    InvalidAttr {
        element: String,
        attr: String,
        value: String,
        reason: String,
    },
    /// Two named definitions of the same kind share a name.
    DuplicateDef(DefKind, String),
    /// A reference names a definition that does not exist.
    DanglingRef { at: Path, kind: DefKind, name: String },
    /// Named definitions reference one another in a cycle.
    ///
    /// Every participant of the cycle is listed.
    CyclicRefs(Vec<(DefKind, String)>),
    /// An element declares two children of the same name.
    DuplicateChild(Path),
    /// A reference to an attribute group appeared where attributes are not
    ///   permitted or vice versa.
    MisplacedRef { at: Path, kind: DefKind, name: String },
    /// Option list invariants do not hold.
    OptList(OptListError),
    /// A field marker or assertion names a path absent from the schema.
    UnknownPath { what: &'static str, path: Path },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "malformed record definition: {e}"),
            Self::UnexpectedEof => {
                write!(f, "unexpected end of record definition")
            }
            Self::MissingRoot => {
                write!(f, "record definition declares no `root` element")
            }
            Self::UnexpectedElement { parent, found } => {
                write!(f, "unexpected element `{found}` within `{parent}`")
            }
            Self::MissingAttr { element, attr } => {
                write!(f, "element `{element}` is missing attribute `{attr}`")
            }
            Self::InvalidAttr {
                element,
                attr,
                value,
                reason,
            } => write!(
                f,
                "invalid value `{value}` for `{element}/@{attr}`: {reason}"
            ),
            Self::DuplicateDef(kind, name) => {
                write!(f, "{kind} `{name}` is defined more than once")
            }
            Self::DanglingRef { kind, name, .. } => {
                write!(f, "reference to undefined {kind} `{name}`")
            }
            Self::CyclicRefs(defs) => {
                let names = defs
                    .iter()
                    .map(|(kind, name)| format!("{kind} `{name}`"))
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "cyclic references between {names}")
            }
            Self::DuplicateChild(path) => {
                write!(f, "`{path}` is declared more than once")
            }
            Self::MisplacedRef { kind, name, .. } => {
                write!(f, "{kind} `{name}` cannot be referenced here")
            }
            Self::OptList(e) => Display::fmt(e, f),
            Self::UnknownPath { what, path } => {
                write!(f, "{what} refers to unknown schema path `{path}`")
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::OptList(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for SchemaError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for SchemaError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}

impl From<OptListError> for SchemaError {
    fn from(e: OptListError) -> Self {
        Self::OptList(e)
    }
}

impl SchemaError {
    pub(crate) fn invalid_attr<E: Display>(
        element: &str,
        attr: &str,
        value: &str,
        reason: E,
    ) -> Self {
        Self::InvalidAttr {
            element: element.to_string(),
            attr: attr.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Diagnostic for SchemaError {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::DanglingRef { at, kind, name } => at
                .clone()
                .error(format!("{kind} `{name}` referenced here"))
                .with_help(format!("define a {kind} named `{name}`")),
            Self::MisplacedRef { at, kind, .. } => at.clone().error(format!(
                "a {kind} is not permitted in this position"
            ))
            .into(),
            Self::CyclicRefs(_) => Path::root()
                .help("a template or group may not (indirectly) contain itself")
                .into(),
            Self::DuplicateChild(path) => path.clone().mark_error().into(),
            Self::OptList(OptListError::OutsideRoot(root, path)) => vec![
                path.clone().error("fixed field declared here"),
                root.clone().note("option list is attached here"),
            ],
            Self::OptList(
                OptListError::Empty(root)
                | OptListError::DuplicateValue(root, _)
                | OptListError::DuplicateKey(root, _),
            ) => root.clone().mark_error().into(),
            Self::UnknownPath { path, .. } => path
                .clone()
                .mark_error()
                .with_help("paths must name an element or attribute of the schema"),
            Self::Xml(_)
            | Self::UnexpectedEof
            | Self::MissingRoot
            | Self::UnexpectedElement { .. }
            | Self::MissingAttr { .. }
            | Self::InvalidAttr { .. }
            | Self::DuplicateDef(..) => vec![],
        }
    }
}
