// Controlled vocabularies
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

//! Option lists and the roles their expansion assigns.
//!
//! An [`OptionList`] attaches a controlled vocabulary to a single schema
//!   element.
//! When the [mapping tree](crate::node::MappingTree) is instantiated,
//!   that element is expanded into one sibling node per [`Opt`],
//!     each of which is the [`OptRole::Root`] of its own variant.
//! Within a variant,
//!   the nodes that hold the option's key,
//!   value,
//!   schema,
//!   or schema URI are _fixed fields_:
//!     they resolve to the option's scalars and never accept mappings of
//!     their own.
//!
//! Fixed-field positions are declared relative to the element carrying
//!   the list and stored here as absolute,
//!   variant-free schema paths;
//!     see [`OptionList::role_of`].

use crate::{path::Path, tag::Tag};
use fxhash::FxHashSet;
use std::fmt::{self, Display};

/// A single permitted value of an [`OptionList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    pub key: Option<String>,
    pub value: String,
    pub schema: Option<String>,
    pub schema_uri: Option<String>,
    /// Hidden options are not offered to the curator but still generate.
    pub hidden: bool,
}

impl Opt {
    pub fn new<V: Into<String>>(value: V) -> Self {
        Self {
            key: None,
            value: value.into(),
            schema: None,
            schema_uri: None,
            hidden: false,
        }
    }

    pub fn with_key<K: Into<String>>(self, key: K) -> Self {
        Self {
            key: Some(key.into()),
            ..self
        }
    }

    pub fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }

    /// Key distinguishing this option's variant of the schema tree.
    ///
    /// This is the option's key if it has one,
    ///   otherwise its value.
    pub fn variant_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.value)
    }

    /// Scalar resolved by a fixed-field node of the given role.
    ///
    /// Roots and ordinary children have no fixed scalar.
    pub fn field(&self, role: OptRole) -> Option<&str> {
        match role {
            OptRole::Key => Some(self.variant_key()),
            OptRole::Value => Some(&self.value),
            OptRole::Schema => self.schema.as_deref(),
            OptRole::SchemaUri => self.schema_uri.as_deref(),
            OptRole::Root | OptRole::Child => None,
        }
    }
}

/// Controlled vocabulary attached to exactly one schema element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionList {
    /// Name of the dictionary translating source values into this
    ///   vocabulary.
    pub dictionary: String,
    /// Variant-free schema path of the element carrying this list.
    pub root: Path,
    /// Tag of the node holding the option value:
    ///   either the root element itself or one of its direct children.
    pub value: Tag,
    pub key: Option<Path>,
    pub schema: Option<Path>,
    pub schema_uri: Option<Path>,
    pub options: Vec<Opt>,
}

impl OptionList {
    /// Schema path of the node holding the option value.
    pub fn value_path(&self) -> Path {
        match self.root.last() {
            Some(root_tag) if root_tag.same_name(&self.value) => {
                self.root.clone()
            }
            _ => self.root.child(self.value.clone()),
        }
    }

    /// Whether the root element itself holds the option value.
    pub fn root_is_value(&self) -> bool {
        self.value_path() == self.root
    }

    /// Role of a node within a variant rooted at this list's element.
    ///
    /// `path` must already have its variant keys stripped.
    pub fn role_of(&self, path: &Path) -> OptRole {
        let fixed = [
            (Some(self.value_path()), OptRole::Value),
            (self.key.clone(), OptRole::Key),
            (self.schema.clone(), OptRole::Schema),
            (self.schema_uri.clone(), OptRole::SchemaUri),
        ];

        if path == &self.root {
            return OptRole::Root;
        }

        fixed
            .into_iter()
            .find_map(|(fpath, role)| {
                (fpath.as_ref() == Some(path)).then_some(role)
            })
            .unwrap_or(OptRole::Child)
    }

    /// Options offered to the curator.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Opt)> {
        self.options.iter().enumerate().filter(|(_, opt)| !opt.hidden)
    }

    /// Check the invariants of this list.
    ///
    /// The list must be non-empty,
    ///   option values and variant keys must be unique,
    ///   and every fixed-field path must lie beneath the root element.
    pub fn validate(&self) -> Result<(), OptListError> {
        if self.options.is_empty() {
            return Err(OptListError::Empty(self.root.clone()));
        }

        let mut values = FxHashSet::default();
        let mut keys = FxHashSet::default();

        for opt in &self.options {
            if !values.insert(opt.value.as_str()) {
                return Err(OptListError::DuplicateValue(
                    self.root.clone(),
                    opt.value.clone(),
                ));
            }

            if !keys.insert(opt.variant_key()) {
                return Err(OptListError::DuplicateKey(
                    self.root.clone(),
                    opt.variant_key().to_string(),
                ));
            }
        }

        for fpath in [&self.key, &self.schema, &self.schema_uri]
            .into_iter()
            .flatten()
        {
            if !self.root.is_ancestor_of(fpath) {
                return Err(OptListError::OutsideRoot(
                    self.root.clone(),
                    fpath.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Role a mapping node plays with respect to an option list.
///
/// [`Root`](OptRole::Root) and [`Child`](OptRole::Child) nodes accept
///   mappings;
///     the remaining roles are fixed fields resolved from the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptRole {
    Root,
    Child,
    Key,
    Value,
    Schema,
    SchemaUri,
}

impl OptRole {
    pub fn accepts_mappings(self) -> bool {
        match self {
            Self::Root | Self::Child => true,
            Self::Key | Self::Value | Self::Schema | Self::SchemaUri => false,
        }
    }
}

impl Display for OptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Child => "child",
            Self::Key => "key",
            Self::Value => "value",
            Self::Schema => "schema",
            Self::SchemaUri => "schema-uri",
        })
    }
}

/// Association of a mapping node with one option of one list.
///
/// The list is identified by its index within the owning
///   [`MappingTree`](crate::node::MappingTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptBox {
    pub role: OptRole,
    pub list: usize,
    pub option: usize,
}

/// Option list violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptListError {
    Empty(Path),
    DuplicateValue(Path, String),
    DuplicateKey(Path, String),
    OutsideRoot(Path, Path),
}

impl Display for OptListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(root) => write!(f, "option list at `{root}` is empty"),
            Self::DuplicateValue(root, value) => write!(
                f,
                "option list at `{root}` declares value `{value}` more than once"
            ),
            Self::DuplicateKey(root, key) => write!(
                f,
                "option list at `{root}` declares key `{key}` more than once"
            ),
            Self::OutsideRoot(root, path) => write!(
                f,
                "option list at `{root}` refers to `{path}`, \
                   which is not beneath it"
            ),
        }
    }
}

impl std::error::Error for OptListError {}
