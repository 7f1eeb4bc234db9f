// Record definition resolution
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

//! Lowering of a [`SchemaDecl`] into a [`RecDef`].
//!
//! Named definitions reference one another,
//!   forming a graph.
//! Before anything is substituted,
//!   that graph is checked for dangling references and for cycles;
//!     a cyclic definition would otherwise expand forever.
//! Once the graph is known to be acyclic,
//!   substitution is a straightforward recursive descent from the root
//!   element.

use super::{
    ChildDecl, DefKind, ElemDecl, NamedDecl, RecDef, SchemaDecl,
    SchemaElement, SchemaError,
};
use crate::{optlist::OptionList, path::Path, tag::Tag};
use fxhash::{FxHashMap, FxHashSet};
use petgraph::graph::{DiGraph, NodeIndex};

type DefKey<'d> = (DefKind, &'d str);

/// Resolve every named reference of `decl`,
///   producing a usable [`RecDef`].
///
/// Errors
/// ======
/// - [`SchemaError::DuplicateDef`] if two definitions of the same kind
///     share a name;
/// - [`SchemaError::DanglingRef`] if a reference names nothing;
/// - [`SchemaError::CyclicRefs`] if definitions (indirectly) contain
///     themselves;
/// - [`SchemaError::MisplacedRef`] if e.g. an element group is referenced
///     from an attribute group;
/// - [`SchemaError::DuplicateChild`] if substitution produces two
///     children of the same name;
/// - [`SchemaError::OptList`] if an option list is invalid; and
/// - [`SchemaError::UnknownPath`] if a field marker,
///     assertion,
///     or option list names a path that does not exist.
pub fn resolve(decl: SchemaDecl) -> Result<RecDef, SchemaError> {
    let defs = index_defs(&decl.defs)?;
    check_refs(&decl.defs, &defs)?;

    let resolver = Resolver { defs };
    let root = resolver.elem(&decl.root, &Path::root())?;

    let recdef = RecDef {
        prefix: decl.prefix,
        version: decl.version,
        namespaces: decl.namespaces,
        root,
        field_markers: decl.field_markers,
        assertions: decl.assertions,
    };

    check_paths(&recdef)?;

    log::debug!(
        "resolved record definition `{}` version `{}` ({} named definitions)",
        recdef.prefix,
        recdef.version,
        decl.defs.len(),
    );

    Ok(recdef)
}

fn index_defs(
    defs: &[NamedDecl],
) -> Result<FxHashMap<DefKey, &NamedDecl>, SchemaError> {
    let mut index = FxHashMap::default();

    for def in defs {
        if index.insert((def.kind, def.name.as_str()), def).is_some() {
            return Err(SchemaError::DuplicateDef(def.kind, def.name.clone()));
        }
    }

    Ok(index)
}

/// Pseudo-path denoting a location within a named definition,
///   used for diagnostics before substitution has taken place.
fn def_path(def: &NamedDecl) -> Path {
    let tag = Tag::element(Some(def.kind.to_string()), def.name.clone());
    Path::root().child(tag)
}

/// Collect every reference made by `children`,
///   recursing into nested elements.
fn collect_refs<'d>(
    children: &'d [ChildDecl],
    at: &Path,
    out: &mut Vec<(DefKey<'d>, Path)>,
) {
    for child in children {
        match child {
            ChildDecl::Attr(_) => (),
            ChildDecl::Ref(kind, name) => out.push(((*kind, name), at.clone())),
            ChildDecl::Elem(elem) => {
                let path = at.child(elem.tag.clone());

                if let Some(tpl) = &elem.template {
                    out.push(((DefKind::Template, tpl), path.clone()));
                }

                collect_refs(&elem.children, &path, out);
            }
        }
    }
}

/// Verify that all references between named definitions resolve and that
///   they do not form cycles.
///
/// References from the root element are checked during substitution,
///   where the path of the reference is known.
fn check_refs(
    defs: &[NamedDecl],
    index: &FxHashMap<DefKey, &NamedDecl>,
) -> Result<(), SchemaError> {
    let mut graph = DiGraph::<DefKey, ()>::new();
    let nodes: FxHashMap<DefKey, NodeIndex> = defs
        .iter()
        .map(|def| {
            let key = (def.kind, def.name.as_str());
            (key, graph.add_node(key))
        })
        .collect();

    for def in defs {
        let from = nodes[&(def.kind, def.name.as_str())];
        let mut refs = Vec::new();
        collect_refs(&def.children, &def_path(def), &mut refs);

        for (key, at) in refs {
            if !index.contains_key(&key) {
                return Err(SchemaError::DanglingRef {
                    at,
                    kind: key.0,
                    name: key.1.to_string(),
                });
            }

            graph.add_edge(from, nodes[&key], ());
        }
    }

    let mut cyclic: Vec<(DefKind, String)> = petgraph::algo::tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| {
            // Single-node SCCs are cycles only if they reference themselves.
            scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
        })
        .flatten()
        .map(|nx| {
            let (kind, name) = graph[nx];
            (kind, name.to_string())
        })
        .collect();

    if cyclic.is_empty() {
        Ok(())
    } else {
        cyclic.sort();
        Err(SchemaError::CyclicRefs(cyclic))
    }
}

struct Resolver<'d> {
    defs: FxHashMap<DefKey<'d>, &'d NamedDecl>,
}

impl<'d> Resolver<'d> {
    fn lookup(
        &self,
        kind: DefKind,
        name: &str,
        at: &Path,
    ) -> Result<&'d NamedDecl, SchemaError> {
        self.defs
            .get(&(kind, name))
            .copied()
            .ok_or_else(|| SchemaError::DanglingRef {
                at: at.clone(),
                kind,
                name: name.to_string(),
            })
    }

    fn elem(
        &self,
        decl: &ElemDecl,
        parent: &Path,
    ) -> Result<SchemaElement, SchemaError> {
        let path = parent.child(decl.tag.clone());

        let mut elem = SchemaElement {
            required: decl.required,
            singular: decl.singular,
            operator: decl.operator,
            function: decl.function.clone(),
            init: decl.init.clone(),
            doc: decl.doc.clone(),
            ..SchemaElement::new(decl.tag.clone())
        };

        if let Some(tpl) = &decl.template {
            let def = self.lookup(DefKind::Template, tpl, &path)?;
            self.children(&def.children, &path, &mut elem, None)?;
        }

        self.children(&decl.children, &path, &mut elem, None)?;

        if let Some(opts) = &decl.opt_list {
            let root = path.without_variants();

            let list = OptionList {
                dictionary: opts.dictionary.clone(),
                value: opts.value.clone(),
                key: opts.key.as_ref().map(|rel| root.join(rel)),
                schema: opts.schema.as_ref().map(|rel| root.join(rel)),
                schema_uri: opts.schema_uri.as_ref().map(|rel| root.join(rel)),
                options: opts.options.clone(),
                root,
            };

            list.validate()?;
            elem.opt_list = Some(list);
        }

        check_unique_children(&elem, &path)?;

        Ok(elem)
    }

    /// Substitute `children` into `elem`.
    ///
    /// `within` is the kind of group being expanded,
    ///   if any,
    ///   which restricts what the group may contain.
    fn children(
        &self,
        children: &'d [ChildDecl],
        path: &Path,
        elem: &mut SchemaElement,
        within: Option<DefKind>,
    ) -> Result<(), SchemaError> {
        for child in children {
            match (child, within) {
                (ChildDecl::Attr(attr), None | Some(DefKind::AttrGroup)) => {
                    elem.attrs.push(attr.clone());
                }

                (ChildDecl::Elem(decl), None | Some(DefKind::ElemGroup)) => {
                    elem.elements.push(self.elem(decl, path)?);
                }

                (
                    ChildDecl::Ref(
                        kind @ (DefKind::AttrGroup | DefKind::ElemGroup),
                        name,
                    ),
                    None,
                ) => {
                    let def = self.lookup(*kind, name, path)?;
                    self.children(&def.children, path, elem, Some(*kind))?;
                }

                (ChildDecl::Ref(kind, name), Some(group)) if kind == &group => {
                    let def = self.lookup(*kind, name, path)?;
                    self.children(&def.children, path, elem, Some(*kind))?;
                }

                (ChildDecl::Ref(kind, name), _) => {
                    return Err(SchemaError::MisplacedRef {
                        at: path.clone(),
                        kind: *kind,
                        name: name.clone(),
                    })
                }

                (ChildDecl::Attr(attr), Some(kind)) => {
                    return Err(SchemaError::MisplacedRef {
                        at: path.child(attr.tag.clone()),
                        kind,
                        name: attr.tag.to_string(),
                    })
                }

                (ChildDecl::Elem(decl), Some(kind)) => {
                    return Err(SchemaError::MisplacedRef {
                        at: path.child(decl.tag.clone()),
                        kind,
                        name: decl.tag.to_string(),
                    })
                }
            }
        }

        Ok(())
    }
}

fn check_unique_children(
    elem: &SchemaElement,
    path: &Path,
) -> Result<(), SchemaError> {
    let mut seen = FxHashSet::default();

    let tags = elem
        .attrs
        .iter()
        .map(|attr| &attr.tag)
        .chain(elem.elements.iter().map(|child| &child.tag));

    for tag in tags {
        if !seen.insert(tag) {
            return Err(SchemaError::DuplicateChild(path.child(tag.clone())));
        }
    }

    Ok(())
}

/// Verify that every path named outside of the element tree exists
///   within it.
fn check_paths(recdef: &RecDef) -> Result<(), SchemaError> {
    let known: FxHashSet<Path> = recdef.paths().into_iter().collect();

    let check = |what: &'static str, path: &Path| {
        if known.contains(path) {
            Ok(())
        } else {
            Err(SchemaError::UnknownPath {
                what,
                path: path.clone(),
            })
        }
    };

    for marker in &recdef.field_markers {
        check("field marker", &marker.path)?;
    }

    for assertion in &recdef.assertions {
        check("assertion", &assertion.path)?;
    }

    fn lists<'a>(elem: &'a SchemaElement, out: &mut Vec<&'a OptionList>) {
        out.extend(elem.opt_list.iter());
        for child in &elem.elements {
            lists(child, out);
        }
    }

    let mut opt_lists = Vec::new();
    lists(&recdef.root, &mut opt_lists);

    for list in opt_lists {
        check("option list value", &list.value_path())?;

        let fields = [&list.key, &list.schema, &list.schema_uri];

        for fpath in fields.into_iter().flatten() {
            check("option list", fpath)?;
        }
    }

    Ok(())
}
