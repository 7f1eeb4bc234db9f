// Code generation tracing
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

//! Tracing for scope transitions during lowering.
//!
//! This provides human-readable traces on standard error any time the
//!   generator opens,
//!   reuses,
//!   or closes a binding scope.
//! These traces are provided automatically when `cfg(test)`,
//!   which means that they are automatically included in the output of any
//!   test failure.
//!
//! Outside of tests,
//!   this can be enabled using the `codegen-trace-stderr` feature flag
//!     (`cargo build --features codegen-trace-stderr`).
//! Scope transitions are always reported to the [`log`] facade at the
//!   `trace` level regardless.
//!
//! _These traces are not meant to be machine-readable!_
//! The format is subject to change without notice.

use crate::{operator::Operator, path::Path};

/// Trace selected for this build.
#[cfg(any(test, feature = "codegen-trace-stderr"))]
pub(super) type DefaultTrace = HumanReadableTrace;
#[cfg(not(any(test, feature = "codegen-trace-stderr")))]
pub(super) type DefaultTrace = VoidTrace;

pub(super) trait CodegenTrace: Default {
    /// A new scope binding `var` to `source` was opened at stack depth
    ///   `depth`.
    fn open(&mut self, depth: usize, var: &str, source: &Path, op: Operator);

    /// An enclosing scope already binding `source` was reused.
    fn reuse(&mut self, depth: usize, var: &str, source: &Path);

    /// The scope binding `var` was closed.
    fn close(&mut self, depth: usize, var: &str);
}

/// Perform no tracing.
///
/// This is the default for non-test builds.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl CodegenTrace for VoidTrace {
    fn open(
        &mut self,
        _depth: usize,
        _var: &str,
        _source: &Path,
        _op: Operator,
    ) {
        // Do nothing at all.
    }

    fn reuse(&mut self, _depth: usize, _var: &str, _source: &Path) {
        // Do nothing at all.
    }

    fn close(&mut self, _depth: usize, _var: &str) {
        // Do nothing at all.
    }
}

/// Human-readable [`CodegenTrace`].
///
/// See [module-level](super) documentation for more information.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

impl HumanReadableTrace {
    fn note() {
        #[allow(unused_variables)]
        let cfg = ""; // so that this compiles without matching cfg
        #[cfg(feature = "codegen-trace-stderr")]
        #[allow(unused_variables)]
        let cfg = "feature = \"codegen-trace-stderr\"";
        #[cfg(test)] // takes precedence if both are set
        let cfg = "test";
        eprint!(
            "= note: this trace was output as a debugging aid \
                because `cfg({cfg})`.\n\n",
        );
    }
}

impl CodegenTrace for HumanReadableTrace {
    fn open(&mut self, depth: usize, var: &str, source: &Path, op: Operator) {
        let action = match op.iterates() {
            true => "iterate",
            false => "bind",
        };

        eprint!(
            "\
[Lowerer::open] (depth {depth})
| ==> {action} `{var}` over `{source}`
|  |  operator: {op}\n",
        );
        Self::note();
    }

    fn reuse(&mut self, depth: usize, var: &str, source: &Path) {
        eprint!(
            "\
[Lowerer::open] (depth {depth})
| ==> reuse `{var}` bound to `{source}`\n",
        );
        Self::note();
    }

    fn close(&mut self, depth: usize, var: &str) {
        eprint!(
            "\
[Lowerer::close] (depth {depth})
| ==> release `{var}`\n",
        );
        Self::note();
    }
}
