// Intermediate representation of generated programs
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

//! Statement tree of a transformation program.
//!
//! The generator produces this tree and a [`Printer`](super::Printer)
//!   renders it.
//! Every scope-opening construct owns its body,
//!   so the nesting of the printed program is exactly the nesting of this
//!   tree;
//!     a printer cannot open a scope that it does not also close.

use crate::{operator::Operator, path::Path, tag::Tag};

/// A complete program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Declarations preceding the output document:
    ///   namespaces,
    ///   dictionary tables,
    ///   and lookup functions.
    pub prologue: Vec<Stmt>,
    /// Construction of the output document.
    pub output: Vec<Stmt>,
    /// Assertions and field markers.
    pub epilogue: Vec<Stmt>,
}

assert_impl_all!(Program: Send, Sync);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Str(String),
    /// Navigation from a bound variable through child tags.
    Nav { base: String, steps: Vec<Tag> },
    /// Text of every match joined by a delimiter.
    Join(Box<Expr>, &'static str),
    /// Text of the first match.
    First(Box<Expr>),
    Call(String, Vec<Expr>),
    /// Children of `base` named by `keys` combined into a single
    ///   collection keyed by tag.
    MapJoin { base: String, keys: Vec<Tag> },
    /// First of the alternatives that is non-empty.
    Or(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    /// Expression yields a non-empty value.
    Present(Expr),
    /// Output element has not been produced.
    Absent(Tag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Comment(String),
    Namespace { prefix: String, uri: String },
    /// Static lookup table.
    Table { name: String, entries: Vec<(String, String)> },
    /// Function normalizing its argument and consulting `table`,
    ///   yielding an empty string when there is no entry.
    LookupFn { name: String, table: String },
    /// Iterate over the matches of `source`,
    ///   or only the first match if `first`.
    Loop {
        var: String,
        source: Expr,
        first: bool,
        body: Vec<Stmt>,
    },
    /// Bind `value` as a whole,
    ///   running `body` only if it is non-empty.
    Bind {
        var: String,
        value: Expr,
        body: Vec<Stmt>,
    },
    Let { var: String, value: Expr },
    /// Bind `var` to the result of running `body` with `param` bound to
    ///   `arg`.
    Compute {
        var: String,
        param: String,
        arg: Expr,
        body: Vec<Stmt>,
    },
    If { cond: Cond, body: Vec<Stmt> },
    /// Output element constructor.
    Element {
        tag: Tag,
        attrs: Vec<(Tag, Expr)>,
        value: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// Opaque authored code.
    Code(String),
    /// Emission of a single mapping,
    ///   delimited so that a printer may capture its text in isolation.
    Mapping {
        output: Path,
        input: Path,
        body: Vec<Stmt>,
    },
    /// Structural assertion evaluated against the output document.
    Assertion { path: Path, condition: String },
}

impl Stmt {
    /// Scope binding `var` to `source` according to `op`.
    ///
    /// Iterating operators loop;
    ///   delimiting operators bind the joined text;
    ///   and [`Operator::AsArray`] binds the whole collection.
    pub fn scope(
        op: Operator,
        var: String,
        source: Expr,
        body: Vec<Stmt>,
    ) -> Self {
        match (op, op.delimiter()) {
            (Operator::All, _) => Self::Loop {
                var,
                source,
                first: false,
                body,
            },
            (Operator::First, _) => Self::Loop {
                var,
                source,
                first: true,
                body,
            },
            (_, Some(delim)) => Self::Bind {
                var,
                value: Expr::Join(Box::new(source), delim),
                body,
            },
            (_, None) => Self::Bind {
                var,
                value: source,
                body,
            },
        }
    }

    /// Statements directly nested within this one.
    pub fn body(&self) -> &[Stmt] {
        match self {
            Self::Loop { body, .. }
            | Self::Bind { body, .. }
            | Self::If { body, .. }
            | Self::Element { body, .. }
            | Self::Compute { body, .. }
            | Self::Mapping { body, .. } => body,

            Self::Comment(_)
            | Self::Namespace { .. }
            | Self::Table { .. }
            | Self::LookupFn { .. }
            | Self::Let { .. }
            | Self::Code(_)
            | Self::Assertion { .. } => &[],
        }
    }

    /// Number of iteration and binding scopes in this subtree.
    pub fn scope_count(&self) -> usize {
        let own =
            matches!(self, Self::Loop { .. } | Self::Bind { .. }) as usize;

        own + self.body().iter().map(Stmt::scope_count).sum::<usize>()
    }
}
