// Lowering of mapping trees into programs
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

//! Lower a [`MappingTree`] into an [`ir::Program`](super::ir::Program).
//!
//! The tree is walked depth-first in schema declaration order.
//! Every node is lowered according to the first rule that applies:
//!
//!   1. Fixed fields of an option emit the option's scalar.
//!   2. Nodes with no mappings anywhere beneath them emit nothing.
//!   3. Nodes holding mappings emit each mapping in input order.
//!   4. A branch whose nearest descendant mappings all draw from children
//!        of one source path is lowered as if it were mapped from that
//!        path (_synthesis_),
//!          so that those descendants share a single enclosing scope.
//!   5. Anything else emits its element constructor around its lowered
//!        children,
//!          or nothing if that constructor would be empty.
//!
//! Attributes never emit on their own.
//! Their values are bound ahead of the constructor of their element,
//!   one variable per mapping,
//!   and passed to that constructor by name.
//!
//! Scopes
//! ======
//! Each mapping is emitted within a nest of scopes binding successive
//!   segments of its source path.
//! The generator keeps a stack of the source paths bound by the scopes
//!   currently open;
//!     a mapping begins from the deepest binding of an ancestor of its
//!     input
//!       (or from [`global::INPUT_VAR`],
//!          bound to the first segment of every source path)
//!     and opens scopes only for the segments beyond it.
//! Intermediate segments iterate over every match;
//!   the final segment uses the mapping's [`Operator`],
//!   falling back to that of the schema
//!     and then to [`Operator::First`] for singular nodes.
//!
//! A mapping with sibling inputs binds its final segment to a single
//!   map-join of the primary and sibling tags instead.

use super::{
    ir::{Cond, Expr, Program, Stmt},
    trace::{CodegenTrace, DefaultTrace},
    Focus, GenerationGap,
};
use crate::{
    dictionary::Dictionary,
    global,
    mapping::{NodeMapping, Snippet, SnippetStore},
    node::{MappingTree, NodeId},
    operator::Operator,
    optlist::OptRole,
    path::Path,
    tag::Tag,
};
use fxhash::{FxHashMap, FxHashSet};

/// Lower `tree` into a program.
///
/// If `focus` names a mapping that does not exist,
///   a [`GenerationGap`] is returned and the complete program is lowered
///   as if no focus were given.
pub fn lower<'t>(
    tree: &'t MappingTree,
    snippets: &'t dyn SnippetStore,
    focus: Option<&'t Focus>,
) -> (Program, Vec<GenerationGap>) {
    let mut gaps = Vec::new();

    let focus = focus.filter(|f| {
        let found = tree
            .node_at(&f.output)
            .and_then(|id| tree.node(id).mapping(&f.input))
            .is_some();

        if !found {
            gaps.push(GenerationGap {
                output: f.output.clone(),
                input: f.input.clone(),
            });
        }

        found
    });

    let mut lowerer = Lowerer::<DefaultTrace>::new(tree, snippets, focus);

    let root = tree.root();
    let mut output = lowerer.node(root);

    // The output document always has its root.
    if output.is_empty() {
        let tag = tree.node(root).tag().clone();
        output = lowerer.attrs(root).construct(tag, None, vec![]);
    }

    let prologue = tree
        .namespaces()
        .iter()
        .map(|ns| Stmt::Namespace {
            prefix: ns.prefix.clone(),
            uri: ns.uri.clone(),
        })
        .chain(lowerer.dictionaries)
        .collect();

    let epilogue = tree
        .assertions()
        .iter()
        .map(|a| Stmt::Assertion {
            path: a.path.clone(),
            condition: a.condition.clone(),
        })
        .chain(tree.field_markers().iter().map(|fm| {
            let kind = fm
                .kind
                .as_ref()
                .map(|k| format!(" ({k})"))
                .unwrap_or_default();

            Stmt::Comment(format!("field {}{kind}: {}", fm.name, fm.path))
        }))
        .collect();

    (
        Program {
            prologue,
            output,
            epilogue,
        },
        gaps,
    )
}

/// Numbers of the dictionaries and map-joins of every mapping in a tree,
///   assigned in declaration order before anything is lowered.
///
/// Names derived from these numbers are therefore the same whether or
///   not generation is focused.
#[derive(Debug, Default)]
struct Numbering {
    dictionaries: FxHashMap<(NodeId, Path), usize>,
    joins: FxHashMap<(NodeId, Path), usize>,
}

impl Numbering {
    fn new(tree: &MappingTree) -> Self {
        let mut numbering = Self::default();

        for id in tree.ids() {
            let node = tree.node(id);

            for m in node.mappings() {
                let key = (id, m.input.clone());

                // Constants are never translated.
                if m.dictionary.is_some() && !m.is_constant() {
                    let n = numbering.dictionaries.len() + 1;
                    numbering.dictionaries.insert(key.clone(), n);
                }

                if !m.siblings.is_empty() && !node.is_attribute() {
                    let n = numbering.joins.len() + 1;
                    numbering.joins.insert(key, n);
                }
            }
        }

        numbering
    }

    fn dictionary(&self, id: NodeId, input: &Path) -> Option<usize> {
        self.dictionaries.get(&(id, input.clone())).copied()
    }

    fn join(&self, id: NodeId, input: &Path) -> Option<usize> {
        self.joins.get(&(id, input.clone())).copied()
    }
}

/// What an open scope binds.
#[derive(Debug, PartialEq, Eq)]
enum BindKey {
    Path(Path),
    Join { parent: Path, keys: Vec<Tag> },
}

#[derive(Debug)]
struct Binding {
    key: BindKey,
    var: String,
}

/// A scope opened for a single mapping,
///   awaiting its body.
#[derive(Debug)]
struct Frame {
    op: Operator,
    var: String,
    source: Expr,
}

/// Attribute values of an element.
///
/// Mapped values are bound ahead of the element constructor,
///   which refers to them by name.
#[derive(Debug, Default)]
struct Attrs {
    lets: Vec<Stmt>,
    values: Vec<(Tag, Expr)>,
    /// Translated values that must be non-empty for the element to be
    ///   constructed.
    guards: Vec<Expr>,
}

impl Attrs {
    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings of these attributes followed by the constructor of `tag`.
    fn construct(
        self,
        tag: Tag,
        value: Option<Expr>,
        body: Vec<Stmt>,
    ) -> Vec<Stmt> {
        let element = Stmt::Element {
            tag,
            attrs: self.values,
            value,
            body,
        };

        let guarded =
            self.guards.into_iter().rev().fold(vec![element], |body, e| {
                vec![Stmt::If {
                    cond: Cond::Present(e),
                    body,
                }]
            });

        self.lets.into_iter().chain(guarded).collect()
    }
}

struct Lowerer<'t, T: CodegenTrace> {
    tree: &'t MappingTree,
    snippets: &'t dyn SnippetStore,
    focus: Option<&'t Focus>,
    stack: Vec<Binding>,
    numbering: Numbering,
    /// Dictionary tables and lookup functions,
    ///   hoisted into the prologue.
    dictionaries: Vec<Stmt>,
    declared: FxHashSet<usize>,
    trace: T,
}

impl<'t, T: CodegenTrace> Lowerer<'t, T> {
    fn new(
        tree: &'t MappingTree,
        snippets: &'t dyn SnippetStore,
        focus: Option<&'t Focus>,
    ) -> Self {
        Self {
            tree,
            snippets,
            focus,
            stack: Vec::new(),
            numbering: Numbering::new(tree),
            dictionaries: Vec::new(),
            declared: FxHashSet::default(),
            trace: T::default(),
        }
    }

    fn in_focus(&self, path: &Path) -> bool {
        self.focus.map_or(true, |f| path.is_family_of(&f.output))
    }

    /// Mappings of `id` to be lowered:
    ///   all of them,
    ///   or only the focused one if `id` is the focused node.
    fn focused_mappings(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = &'t NodeMapping> {
        let tree = self.tree;
        let node = tree.node(id);
        let focused = self.focus.filter(|f| &f.output == node.path());

        node.mappings()
            .filter(move |m| focused.map_or(true, |f| f.input == m.input))
    }

    fn node(&mut self, id: NodeId) -> Vec<Stmt> {
        let tree = self.tree;
        let node = tree.node(id);

        if node.is_attribute() || !self.in_focus(node.path()) {
            return vec![];
        }

        let fixed = node.role().filter(|role| !role.accepts_mappings());

        if let Some(role) = fixed {
            return match self.fixed_field(id, role) {
                Some(value) => self.attrs(id).construct(
                    node.tag().clone(),
                    Some(Expr::Str(value)),
                    vec![],
                ),
                None => vec![],
            };
        }

        if !tree.is_populated(id) {
            return vec![];
        }

        if node.has_mappings() {
            return self
                .focused_mappings(id)
                .flat_map(|m| self.mapping(id, m, true))
                .collect();
        }

        // The output document has exactly one root,
        //   and a leaf drawing its value from a synthesized scope would
        //   not have been mapped by the curator.
        if id != tree.root() && !node.is_leaf() {
            if let Some(parent) = synthesize(tree, id) {
                log::trace!("synthesized `{}` <- `{parent}`", node.path());

                let implicit = NodeMapping::new(parent, node.path().clone());
                return self.mapping(id, &implicit, false);
            }
        }

        let attrs = self.attrs(id);
        let body = self.children(id);

        if attrs.is_empty() && body.is_empty() {
            return vec![];
        }

        attrs.construct(node.tag().clone(), None, body)
    }

    fn children(&mut self, id: NodeId) -> Vec<Stmt> {
        let tree = self.tree;

        tree.node(id)
            .children()
            .iter()
            .flat_map(|&child| self.node(child))
            .collect()
    }

    /// Emit a single mapping of the node `id`.
    ///
    /// Implicit mappings produced by synthesis are not `marked` and are
    ///   therefore invisible to the printer's capture.
    fn mapping(
        &mut self,
        id: NodeId,
        m: &NodeMapping,
        marked: bool,
    ) -> Vec<Stmt> {
        let tree = self.tree;
        let node = tree.node(id);
        let snippet = m
            .snippet
            .clone()
            .or_else(|| self.snippets.snippet(node.path()));

        let mut body = match &m.constant {
            Some(literal) if m.is_constant() => {
                self.emit(id, m, Expr::Str(literal.clone()), snippet.as_ref())
            }
            _ => {
                let (frames, var) = self.open(id, m);
                let inner = self.emit(id, m, Expr::Var(var), snippet.as_ref());

                self.close(frames, inner)
            }
        };

        if let Some(absent) = snippet.as_ref().and_then(|s| s.absent.as_ref()) {
            body.push(Stmt::If {
                cond: Cond::Absent(node.tag().clone()),
                body: vec![Stmt::Element {
                    tag: node.tag().clone(),
                    attrs: vec![],
                    value: None,
                    body: vec![Stmt::Code(absent.clone())],
                }],
            });
        }

        if marked {
            vec![Stmt::Mapping {
                output: m.output.clone(),
                input: m.input.clone(),
                body,
            }]
        } else {
            body
        }
    }

    /// Open the scopes necessary to bind the input of `m`,
    ///   returning the newly opened frames and the variable holding the
    ///   input.
    fn open(&mut self, id: NodeId, m: &NodeMapping) -> (Vec<Frame>, String) {
        let join = self.numbering.join(id, &m.input);
        let target = match m.input.parent() {
            Some(parent) if join.is_some() => parent,
            _ => m.input.clone(),
        };

        let (bound, mut var) = self.nearest(&target);
        let mut frames = Vec::new();

        if var != global::INPUT_VAR {
            self.trace.reuse(self.stack.len(), &var, &bound);
            log::trace!("reuse `{var}` for `{bound}`");
        }

        let rest: Vec<Tag> =
            target.tags().into_iter().skip(bound.len()).cloned().collect();
        let mut path = bound;

        for tag in rest {
            path = path.child(tag.clone());

            let op = match path.len() == m.input.len() {
                true => self.operator(id, m),
                false => Operator::All,
            };

            let fresh = self.fresh_var(&tag);
            let source = Expr::Nav {
                base: var,
                steps: vec![tag],
            };

            self.bind(BindKey::Path(path.clone()), &fresh, &path, op);
            frames.push(Frame {
                op,
                var: fresh.clone(),
                source,
            });

            var = fresh;
        }

        if let Some(n) = join {
            let keys: Vec<Tag> =
                m.inputs().filter_map(Path::last).cloned().collect();
            let key = BindKey::Join {
                parent: target.clone(),
                keys: keys.clone(),
            };

            let existing = self
                .stack
                .iter()
                .rev()
                .find(|b| b.key == key)
                .map(|b| b.var.clone());

            match existing {
                Some(joined) => {
                    self.trace.reuse(self.stack.len(), &joined, &target);
                    var = joined;
                }
                None => {
                    let fresh = format!("{}{n}", global::MAP_JOIN_PREFIX);
                    let op = self.operator(id, m);

                    self.bind(key, &fresh, &target, op);
                    frames.push(Frame {
                        op,
                        var: fresh.clone(),
                        source: Expr::MapJoin { base: var, keys },
                    });

                    var = fresh;
                }
            }
        }

        (frames, var)
    }

    fn bind(&mut self, key: BindKey, var: &str, source: &Path, op: Operator) {
        self.trace.open(self.stack.len(), var, source, op);
        log::trace!("open `{var}` over `{source}` ({op})");

        self.stack.push(Binding {
            key,
            var: var.to_string(),
        });
    }

    /// Wrap `inner` in `frames`,
    ///   innermost last,
    ///   releasing their bindings.
    fn close(&mut self, frames: Vec<Frame>, inner: Vec<Stmt>) -> Vec<Stmt> {
        frames
            .into_iter()
            .rev()
            .fold(inner, |body, Frame { op, var, source }| {
                self.stack.pop();
                self.trace.close(self.stack.len(), &var);
                log::trace!("close `{var}`");

                vec![Stmt::scope(op, var, source, body)]
            })
    }

    /// Deepest binding of `path` or one of its ancestors.
    fn nearest(&self, path: &Path) -> (Path, String) {
        self.stack
            .iter()
            .filter_map(|b| match &b.key {
                BindKey::Path(bound)
                    if bound == path || bound.is_ancestor_of(path) =>
                {
                    Some((bound, &b.var))
                }
                _ => None,
            })
            .max_by_key(|(bound, _)| bound.len())
            .map(|(bound, var)| (bound.clone(), var.clone()))
            .unwrap_or_else(|| (path.prefix(1), global::INPUT_VAR.to_string()))
    }

    fn operator(&self, id: NodeId, m: &NodeMapping) -> Operator {
        let node = self.tree.node(id);

        m.operator.or(node.operator()).unwrap_or(match node.is_singular() {
            true => Operator::First,
            false => Operator::All,
        })
    }

    /// Variable name for a scope over `tag` not shadowing any open scope.
    fn fresh_var(&self, tag: &Tag) -> String {
        let mut base = String::from("_");

        if tag.is_attribute() {
            base.push_str("at_");
        }

        base.push_str(&sanitize(&tag.qname()));

        let taken = |name: &str| {
            name == global::INPUT_VAR
                || self.stack.iter().any(|b| b.var == name)
        };

        let mut name = base.clone();
        let mut n = 1;

        while taken(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }

        name
    }

    /// Dictionary translating the values of the mapping `m` of `id`,
    ///   along with its number.
    ///
    /// The dictionary of an option root is narrowed to the translations
    ///   selecting that option.
    fn dictionary(
        &self,
        id: NodeId,
        m: &NodeMapping,
    ) -> Option<(usize, Dictionary)> {
        let n = self.numbering.dictionary(id, &m.input)?;
        let dict = m.dictionary.as_ref()?;

        match (self.tree.node(id).role(), self.tree.option_of(id)) {
            (Some(OptRole::Root), Some((_, opt))) => {
                Some((n, dict.translating_to(&opt.value)))
            }
            _ => Some((n, dict.clone())),
        }
    }

    /// Element construction for a mapping whose value is `value`,
    ///   emitted within the scopes of that mapping.
    fn emit(
        &mut self,
        id: NodeId,
        m: &NodeMapping,
        value: Expr,
        snippet: Option<&Snippet>,
    ) -> Vec<Stmt> {
        let tree = self.tree;
        let node = tree.node(id);

        let root_value = match (node.role(), tree.option_of(id)) {
            (Some(OptRole::Root), Some((list, opt)))
                if list.root_is_value() =>
            {
                Some(Expr::Str(opt.value.clone()))
            }
            _ => None,
        };

        let (value, guard) = match self.dictionary(id, m) {
            Some((n, dict)) => {
                let lookup = self.declare(n, &dict);
                let translated = format!("_translated{n}");
                let assign = Stmt::Let {
                    var: translated.clone(),
                    value: Expr::Call(lookup, vec![value]),
                };

                (Expr::Var(translated), Some(assign))
            }
            None => (value, None),
        };

        let attrs = self.attrs(id);
        let tag = node.tag().clone();

        let element = match (node.is_leaf(), snippet) {
            (true, Some(snippet)) => attrs.construct(
                tag,
                None,
                vec![Stmt::Code(snippet.code.clone())],
            ),
            (true, None) => attrs.construct(
                tag,
                Some(root_value.unwrap_or_else(|| value.clone())),
                vec![],
            ),
            (false, snippet) => {
                let mut body: Vec<Stmt> = snippet
                    .map(|s| Stmt::Code(s.code.clone()))
                    .into_iter()
                    .collect();

                body.extend(self.children(id));

                attrs.construct(tag, root_value, body)
            }
        };

        match guard {
            Some(assign) => vec![
                assign,
                Stmt::If {
                    cond: Cond::Present(value),
                    body: element,
                },
            ],
            None => element,
        }
    }

    /// Hoist dictionary `n` into the prologue if it has not been already,
    ///   returning the name of its lookup function.
    fn declare(&mut self, n: usize, dict: &Dictionary) -> String {
        let table = format!("{}{n}", global::DICTIONARY_PREFIX);
        let lookup = format!("{}{n}", global::LOOKUP_PREFIX);

        if self.declared.insert(n) {
            self.dictionaries.push(Stmt::Table {
                name: table.clone(),
                entries: dict
                    .iter()
                    .filter(|(_, t)| !t.is_empty())
                    .map(|(k, t)| (k.clone(), t.clone()))
                    .collect(),
            });
            self.dictionaries.push(Stmt::LookupFn {
                name: lookup.clone(),
                table,
            });
        }

        lookup
    }

    /// Attributes of the element `id`.
    ///
    /// Each mapping of an attribute is bound to its own variable;
    ///   an attribute with several mappings takes the first of their
    ///   values that is non-empty.
    fn attrs(&mut self, id: NodeId) -> Attrs {
        let tree = self.tree;
        let mut attrs = Attrs::default();

        for &child in tree.node(id).children() {
            let node = tree.node(child);

            if !node.is_attribute() || !self.in_focus(node.path()) {
                continue;
            }

            if let Some(role) = node.role().filter(|r| !r.accepts_mappings()) {
                if let Some(value) = self.fixed_field(child, role) {
                    attrs.values.push((node.tag().clone(), Expr::Str(value)));
                }
                continue;
            }

            let mut alternatives = Vec::new();
            let mut translated = false;

            for (k, m) in self.focused_mappings(child).enumerate() {
                let var = attr_var(node.path(), k);
                let (body, guarded) = self.attr_mapping(child, m, &var);

                attrs.lets.push(Stmt::Mapping {
                    output: m.output.clone(),
                    input: m.input.clone(),
                    body,
                });
                alternatives.push(Expr::Var(var));
                translated |= guarded;
            }

            let value = match alternatives.len() {
                0 => continue,
                1 => alternatives.swap_remove(0),
                _ => Expr::Or(alternatives),
            };

            if translated {
                attrs.guards.push(value.clone());
            }

            attrs.values.push((node.tag().clone(), value));
        }

        attrs
    }

    /// Bind the value of the attribute mapping `m` to `var`,
    ///   returning the bindings and whether the value is translated by a
    ///   dictionary.
    ///
    /// The value is navigated from the nearest open scope and reduced by
    ///   the mapping's operator:
    ///     the first match,
    ///     the joined text of every match,
    ///     or the whole collection for [`Operator::AsArray`].
    fn attr_mapping(
        &mut self,
        id: NodeId,
        m: &NodeMapping,
        var: &str,
    ) -> (Vec<Stmt>, bool) {
        let tree = self.tree;
        let node = tree.node(id);

        if let (true, Some(literal)) = (m.is_constant(), &m.constant) {
            let value = Expr::Str(literal.clone());
            return (vec![Stmt::Let { var: var.into(), value }], false);
        }

        let (bound, base) = self.nearest(&m.input);
        let steps: Vec<Tag> =
            m.input.tags().into_iter().skip(bound.len()).cloned().collect();

        let mut value = match steps.is_empty() {
            true => Expr::Var(base),
            false => {
                let nav = Box::new(Expr::Nav { base, steps });

                match self.operator(id, m) {
                    Operator::First => Expr::First(nav),
                    Operator::AsArray => *nav,
                    op => Expr::Join(
                        nav,
                        op.delimiter().unwrap_or(global::ATTR_LIST_DELIM),
                    ),
                }
            }
        };

        let snippet = m
            .snippet
            .clone()
            .or_else(|| self.snippets.snippet(node.path()));
        let dictionary = self.dictionary(id, m);

        let mut stmts = Vec::new();

        if let Some(snippet) = snippet {
            let computed = match dictionary {
                Some(_) => format!("{var}_code"),
                None => var.to_string(),
            };
            let param = m
                .input
                .last()
                .map(|tag| self.fresh_var(tag))
                .unwrap_or_else(|| global::INPUT_VAR.to_string());

            stmts.push(Stmt::Compute {
                var: computed.clone(),
                param,
                arg: value,
                body: vec![Stmt::Code(snippet.code)],
            });

            value = Expr::Var(computed);
        }

        let translated = dictionary.is_some();

        match dictionary {
            Some((n, dict)) => {
                let lookup = self.declare(n, &dict);

                stmts.push(Stmt::Let {
                    var: var.into(),
                    value: Expr::Call(lookup, vec![value]),
                });
            }
            None if stmts.is_empty() => stmts.push(Stmt::Let {
                var: var.into(),
                value,
            }),
            None => (),
        }

        (stmts, translated)
    }

    fn fixed_field(&self, id: NodeId, role: OptRole) -> Option<String> {
        self.tree
            .option_of(id)
            .and_then(|(_, opt)| opt.field(role))
            .map(str::to_string)
    }
}

/// `text` with every character not valid in a variable name replaced by
///   `_`.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c.is_ascii_alphanumeric() {
            true => c,
            false => '_',
        })
        .collect()
}

/// Variable holding the value of the `k`th mapping of the attribute at
///   `path`
///     (e.g. `_attr_record_title_xml_lang`).
fn attr_var(path: &Path, k: usize) -> String {
    let mut var = String::from("_attr");

    for tag in path.tags() {
        let text = tag.to_string();

        var.push('_');
        var.push_str(sanitize(text.trim_start_matches('@')).trim_matches('_'));
    }

    match k {
        0 => var,
        _ => format!("{var}_{}", k + 1),
    }
}

/// Common source parent of the nearest mappings beneath `id`,
///   if there is exactly one.
///
/// Constants draw from no source and are disregarded.
/// A parent that is itself the source root offers nothing to share.
fn synthesize(tree: &MappingTree, id: NodeId) -> Option<Path> {
    let mut inputs = Vec::new();
    frontier(tree, id, &mut inputs);

    let mut parents = inputs.into_iter().map(Path::parent);
    let first = parents.next()??;

    let shared = parents.all(|p| p.as_ref() == Some(&first));

    (first.len() > 1 && shared).then_some(first)
}

fn frontier<'a>(tree: &'a MappingTree, id: NodeId, inputs: &mut Vec<&'a Path>) {
    for &child in tree.node(id).children() {
        let node = tree.node(child);

        if node.has_mappings() {
            inputs.extend(
                node.mappings()
                    .filter(|m| !m.is_constant())
                    .map(|m| &m.input),
            );
        } else {
            frontier(tree, child, inputs);
        }
    }
}
