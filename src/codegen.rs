// Transformation program generation
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

//! Compile a [`MappingTree`] into a transformation program.
//!
//! Generation happens in two passes:
//!
//!   1. [`lower`] walks the tree in schema declaration order and produces
//!        an [`ir::Program`],
//!          deciding which source paths are iterated where and sharing
//!          enclosing scopes between sibling mappings; and
//!   2. a [`Printer`] renders that program as text.
//!
//! The program is a pure function of the tree and the authored
//!   [snippets](SnippetStore);
//!     generating twice from an unmodified tree yields identical text.
//!
//! A [`Focus`] narrows generation to a single mapping.
//! The printer then additionally captures the isolated text of that
//!   mapping so that it can be presented to the curator on its own.
//! A focus naming a mapping that does not exist is not an error;
//!   it is reported as a [`GenerationGap`] and the whole program is
//!   generated instead.

mod ir;
mod lower;
mod printer;
mod trace;

pub use ir::{Cond, Expr, Program, Stmt};
pub use lower::lower;
pub use printer::{Printed, Printer, ScriptPrinter};

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic, Level},
    global,
    mapping::SnippetStore,
    node::MappingTree,
    path::Path,
};
use std::fmt::{self, Display};

/// Printer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Number of spaces per nesting level.
    pub indent: usize,
    /// Comment emitted at the top of the program,
    ///   one comment line per line of text.
    pub header: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent: global::INDENT_WIDTH,
            header: None,
        }
    }
}

/// The single mapping to which generation is narrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub output: Path,
    pub input: Path,
}

/// A focused mapping could not be located.
///
/// This is a warning:
///   the program is still produced,
///   but the isolated text the caller asked for is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationGap {
    pub output: Path,
    pub input: Path,
}

impl Display for GenerationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no mapping of `{}` from `{}` to generate",
            self.output, self.input
        )
    }
}

impl std::error::Error for GenerationGap {}

impl Diagnostic for GenerationGap {
    fn describe(&self) -> Vec<AnnotatedPath> {
        vec![
            self.output.clone().warning("focused node"),
            self.input
                .clone()
                .note("this input is not mapped onto the node"),
            self.output
                .clone()
                .help("the complete program was generated instead"),
        ]
    }

    fn level(&self) -> Level {
        Level::Warning
    }
}

/// Result of [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Complete program text.
    pub text: String,
    /// Isolated text of the focused mapping,
    ///   if one was requested and found.
    pub focus: Option<String>,
    pub gaps: Vec<GenerationGap>,
}

/// Generate and print the program for `tree` using the [`ScriptPrinter`].
pub fn generate(
    tree: &MappingTree,
    snippets: &dyn SnippetStore,
    options: &Options,
    focus: Option<&Focus>,
) -> Generated {
    let (program, gaps) = lower(tree, snippets, focus);

    for gap in &gaps {
        log::warn!("{gap}");
    }

    // A focus that produced a gap was dropped during lowering.
    let focus = focus.filter(|_| gaps.is_empty());
    let printed = ScriptPrinter::new(options).print(&program, focus);

    log::debug!(
        "generated {} bytes for `{}` version {}",
        printed.text.len(),
        tree.prefix(),
        tree.version(),
    );

    Generated {
        text: printed.text,
        focus: printed.focus,
        gaps,
    }
}

#[cfg(test)]
mod test;
