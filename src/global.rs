// Global constants across the entire crate
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities between the generator and the interpreter
//!   that runs its output.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// Name of the variable to which the interpreter binds the root of the
///   source record.
///
/// The first tag of every source path denotes this root and is never
///   iterated over.
pub const INPUT_VAR: &str = "_input";

/// Local name of the single tag of the reserved source path denoting a
///   literal constant (`/constant`).
pub const CONSTANT_TAG: &str = "constant";

/// Guard phrase opening an absence fallback block within textual
///   snippets.
///
/// See [`Snippet::from_text`](crate::mapping::Snippet::from_text).
pub const ABSENT_GUARD: &str = "if (_absent_) {";

/// Prefix of generated dictionary table names;
///   the dictionary index is appended.
pub const DICTIONARY_PREFIX: &str = "Dictionary";

/// Prefix of generated dictionary lookup function names;
///   the dictionary index is appended.
pub const LOOKUP_PREFIX: &str = "lookup";

/// Prefix of variables bound to map-join expressions;
///   the number of the join within its tree is appended.
pub const MAP_JOIN_PREFIX: &str = "_M";

/// Separator of the values of an attribute taking every match of its
///   source.
///
/// XML list-valued attributes are whitespace-separated.
pub const ATTR_LIST_DELIM: &str = " ";

/// Number of spaces per level of nesting in printed programs.
pub const INDENT_WIDTH: usize = 4;
