// Mapping node tree
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

//! The instantiated schema that mappings attach to.
//!
//! A [`MappingTree`] is built once from a resolved
//!   [`RecDef`](crate::schema::RecDef).
//! Instantiation expands every element carrying an [`OptionList`] into
//!   one sibling [`MappingNode`] per option,
//!     each the [`OptRole::Root`] of its own variant;
//!     tags of those roots carry the option's variant key,
//!       so that every node has a distinct path
//!         (e.g. `/record/type[b]` and `/record/type[m]`).
//!
//! After instantiation the structure of the tree never changes;
//!   only the [`NodeMapping`]s held by its nodes do.
//!
//! Nodes are stored in an arena in pre-order and addressed by
//!   [`NodeId`].
//! Children are listed attributes first,
//!   then elements,
//!   each in declaration order;
//!     iterating the arena in index order is therefore a depth-first
//!     traversal in schema declaration order.

use crate::{
    dictionary::Dictionary,
    mapping::{AttachError, ChangeEvent, ChangeKind, NodeMapping, Snippet},
    operator::Operator,
    optlist::{Opt, OptBox, OptRole, OptionList},
    path::Path,
    schema::{
        Assertion, FieldMarker, Namespace, RecDef, SchemaAttribute,
        SchemaElement,
    },
    tag::Tag,
};
use fxhash::FxHashMap;
use std::collections::BTreeMap;

/// Index of a [`MappingNode`] within its [`MappingTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the instantiated schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingNode {
    parent: Option<NodeId>,
    path: Path,
    tag: Tag,
    children: Vec<NodeId>,
    leaf: bool,
    opt: Option<OptBox>,
    required: bool,
    singular: bool,
    operator: Option<Operator>,
    function: Option<String>,
    init: Option<String>,
    doc: Option<String>,
    mappings: BTreeMap<Path, NodeMapping>,
}

impl MappingNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn is_attribute(&self) -> bool {
        self.tag().is_attribute()
    }

    /// Whether this node has no child elements.
    ///
    /// Attributes do not count as children for this purpose.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn opt(&self) -> Option<OptBox> {
        self.opt
    }

    pub fn role(&self) -> Option<OptRole> {
        self.opt.map(|opt| opt.role)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// Operator declared by the schema for mappings onto this node.
    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn init(&self) -> Option<&str> {
        self.init.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Mappings of this node ordered by primary input path.
    pub fn mappings(&self) -> impl Iterator<Item = &NodeMapping> {
        self.mappings.values()
    }

    pub fn mapping(&self, input: &Path) -> Option<&NodeMapping> {
        self.mappings.get(input)
    }

    pub fn has_mappings(&self) -> bool {
        !self.mappings.is_empty()
    }
}

/// Schema instantiated into nodes able to hold mappings.
#[derive(Debug, Clone)]
pub struct MappingTree {
    prefix: String,
    version: String,
    namespaces: Vec<Namespace>,
    field_markers: Vec<FieldMarker>,
    assertions: Vec<Assertion>,
    nodes: Vec<MappingNode>,
    opt_lists: Vec<OptionList>,
    by_path: FxHashMap<Path, NodeId>,
}

/// Option list variant being instantiated.
#[derive(Clone, Copy)]
struct Variant {
    list: usize,
    option: usize,
}

impl MappingTree {
    /// Instantiate a resolved record definition.
    pub fn new(recdef: RecDef) -> Self {
        let mut tree = Self {
            prefix: recdef.prefix,
            version: recdef.version,
            namespaces: recdef.namespaces,
            field_markers: recdef.field_markers,
            assertions: recdef.assertions,
            nodes: Vec::new(),
            opt_lists: Vec::new(),
            by_path: FxHashMap::default(),
        };

        tree.elem(&recdef.root, None, &Path::root(), None);

        log::debug!(
            "instantiated `{}` into {} nodes ({} option lists)",
            tree.prefix,
            tree.nodes.len(),
            tree.opt_lists.len(),
        );

        tree
    }

    fn push(&mut self, parent: Option<NodeId>, node: MappingNode) -> NodeId {
        let id = NodeId(self.nodes.len());

        self.by_path.insert(node.path.clone(), id);
        self.nodes.push(node);

        if let Some(pid) = parent {
            self.nodes[pid.0].children.push(id);
        }

        id
    }

    fn role_in(&self, variant: Option<Variant>, path: &Path) -> Option<OptBox> {
        variant.map(|Variant { list, option }| OptBox {
            role: self.opt_lists[list].role_of(&path.without_variants()),
            list,
            option,
        })
    }

    fn elem(
        &mut self,
        elem: &SchemaElement,
        parent: Option<NodeId>,
        parent_path: &Path,
        variant: Option<Variant>,
    ) {
        match &elem.opt_list {
            None => {
                let tag = elem.tag.clone();
                let path = parent_path.child(tag.clone());
                let opt = self.role_in(variant, &path);

                self.instantiate(elem, parent, parent_path, tag, opt, variant);
            }

            Some(list) => {
                let idx = self.opt_lists.len();
                self.opt_lists.push(list.clone());

                for (option, opt) in list.options.iter().enumerate() {
                    let tag = elem.tag.with_variant(opt.variant_key());
                    let root = OptBox {
                        role: OptRole::Root,
                        list: idx,
                        option,
                    };

                    self.instantiate(
                        elem,
                        parent,
                        parent_path,
                        tag,
                        Some(root),
                        Some(Variant { list: idx, option }),
                    );
                }
            }
        }
    }

    fn instantiate(
        &mut self,
        elem: &SchemaElement,
        parent: Option<NodeId>,
        parent_path: &Path,
        tag: Tag,
        opt: Option<OptBox>,
        variant: Option<Variant>,
    ) {
        let path = parent_path.child(tag.clone());

        let id = self.push(
            parent,
            MappingNode {
                parent,
                path: path.clone(),
                tag,
                children: Vec::new(),
                leaf: elem.is_leaf(),
                opt,
                required: elem.required,
                singular: elem.singular,
                operator: elem.operator,
                function: elem.function.clone(),
                init: elem.init.clone(),
                doc: elem.doc.clone(),
                mappings: BTreeMap::new(),
            },
        );

        for attr in &elem.attrs {
            self.attr(attr, id, &path, variant);
        }

        for child in &elem.elements {
            self.elem(child, Some(id), &path, variant);
        }
    }

    fn attr(
        &mut self,
        attr: &SchemaAttribute,
        parent: NodeId,
        parent_path: &Path,
        variant: Option<Variant>,
    ) {
        let path = parent_path.child(attr.tag.clone());
        let opt = self.role_in(variant, &path);

        self.push(
            Some(parent),
            MappingNode {
                parent: Some(parent),
                path,
                tag: attr.tag.clone(),
                children: Vec::new(),
                leaf: true,
                opt,
                required: attr.required,
                singular: true,
                operator: None,
                function: attr.function.clone(),
                init: attr.init.clone(),
                doc: attr.doc.clone(),
                mappings: BTreeMap::new(),
            },
        );
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn field_markers(&self) -> &[FieldMarker] {
        &self.field_markers
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MappingNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in depth-first schema declaration order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn node_at(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn opt_list(&self, list: usize) -> &OptionList {
        &self.opt_lists[list]
    }

    /// Option list and option a node belongs to,
    ///   if any.
    pub fn option_of(&self, id: NodeId) -> Option<(&OptionList, &Opt)> {
        self.node(id).opt.map(|OptBox { list, option, .. }| {
            let list = &self.opt_lists[list];
            (list, &list.options[option])
        })
    }

    /// Whether a node is the root of a hidden option.
    ///
    /// Hidden roots are not offered to the curator,
    ///   but they still generate.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        match self.node(id).opt {
            Some(OptBox {
                role: OptRole::Root,
                list,
                option,
            }) => self.opt_lists[list].options[option].hidden,
            _ => false,
        }
    }

    /// Children of `id` that may be offered to the curator.
    pub fn visible_children(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&child| !self.is_hidden(child))
    }

    /// Option roots that may be offered to the curator,
    ///   in declaration order.
    pub fn visible_roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(move |&id| {
            self.node(id).role() == Some(OptRole::Root) && !self.is_hidden(id)
        })
    }

    /// Whether `id` or any of its descendants holds a mapping.
    pub fn is_populated(&self, id: NodeId) -> bool {
        let node = self.node(id);

        node.has_mappings()
            || node.children.iter().any(|&child| self.is_populated(child))
    }

    /// Gather the mappings of `id` and all of its descendants in
    ///   declaration order.
    pub fn collect_descendant<'a>(
        &'a self,
        id: NodeId,
        mappings: &mut Vec<&'a NodeMapping>,
    ) {
        let node = self.node(id);

        mappings.extend(node.mappings());

        for &child in &node.children {
            self.collect_descendant(child, mappings);
        }
    }

    /// Every mapping of the tree in declaration order.
    pub fn mappings(&self) -> Vec<&NodeMapping> {
        let mut mappings = Vec::new();
        self.collect_descendant(self.root(), &mut mappings);
        mappings
    }

    /// Attach `mapping` to the node at its output path.
    pub fn attach(
        &mut self,
        mapping: NodeMapping,
    ) -> Result<ChangeEvent, AttachError> {
        let id = self
            .node_at(&mapping.output)
            .ok_or_else(|| AttachError::UnknownNode(mapping.output.clone()))?;

        self.add(id, mapping)
    }

    /// Attach `mapping` to the node `id`.
    ///
    /// The tree is unchanged if an error is returned.
    pub fn add(
        &mut self,
        id: NodeId,
        mapping: NodeMapping,
    ) -> Result<ChangeEvent, AttachError> {
        let node = &self.nodes[id.0];

        if mapping.output != node.path {
            return Err(AttachError::OutputMismatch {
                node: node.path.clone(),
                output: mapping.output,
            });
        }

        match node.role() {
            Some(role) if !role.accepts_mappings() => {
                return Err(AttachError::FixedField {
                    node: node.path.clone(),
                    role,
                })
            }
            _ => (),
        }

        mapping.check_siblings()?;

        if node.mappings.contains_key(&mapping.input) {
            return Err(AttachError::Duplicate {
                output: mapping.output,
                input: mapping.input,
            });
        }

        let input = mapping.input.clone();
        log::debug!("mapping `{}` <- `{input}`", mapping.output);

        self.nodes[id.0].mappings.insert(input.clone(), mapping);

        Ok(ChangeEvent {
            node: id,
            input,
            kind: ChangeKind::MappingAdded,
        })
    }

    /// Detach the mapping of `id` with primary input `input`.
    pub fn remove(
        &mut self,
        id: NodeId,
        input: &Path,
    ) -> Result<(NodeMapping, ChangeEvent), AttachError> {
        let node = &mut self.nodes[id.0];

        let mapping = node.mappings.remove(input).ok_or_else(|| {
            AttachError::NotAttached {
                output: node.path.clone(),
                input: input.clone(),
            }
        })?;

        Ok((
            mapping,
            ChangeEvent {
                node: id,
                input: input.clone(),
                kind: ChangeKind::MappingRemoved,
            },
        ))
    }

    fn modify<F>(
        &mut self,
        id: NodeId,
        input: &Path,
        kind: ChangeKind,
        f: F,
    ) -> Result<ChangeEvent, AttachError>
    where
        F: FnOnce(&mut NodeMapping),
    {
        let node = &mut self.nodes[id.0];

        match node.mappings.get_mut(input) {
            Some(mapping) => {
                f(mapping);

                Ok(ChangeEvent {
                    node: id,
                    input: input.clone(),
                    kind,
                })
            }
            None => Err(AttachError::NotAttached {
                output: node.path.clone(),
                input: input.clone(),
            }),
        }
    }

    pub fn set_snippet(
        &mut self,
        id: NodeId,
        input: &Path,
        snippet: Option<Snippet>,
    ) -> Result<ChangeEvent, AttachError> {
        self.modify(id, input, ChangeKind::CodeChanged, |m| m.snippet = snippet)
    }

    pub fn set_dictionary(
        &mut self,
        id: NodeId,
        input: &Path,
        dictionary: Option<Dictionary>,
    ) -> Result<ChangeEvent, AttachError> {
        self.modify(id, input, ChangeKind::DictionaryChanged, |m| {
            m.dictionary = dictionary
        })
    }

    pub fn set_documentation(
        &mut self,
        id: NodeId,
        input: &Path,
        documentation: Option<String>,
    ) -> Result<ChangeEvent, AttachError> {
        self.modify(id, input, ChangeKind::DocumentationChanged, |m| {
            m.documentation = documentation
        })
    }
}

#[cfg(test)]
mod test;
