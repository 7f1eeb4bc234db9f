// Multi-value combination operators
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

//! How multiple matches of a source path are combined.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Combination policy for a source path matching more than one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Operator {
    /// Iterate over every match.
    #[default]
    All,
    /// Iterate over only the first match.
    First,
    /// Join matched text with `", "`.
    CommaDelim,
    /// Join matched text with `"; "`.
    SemicolonDelim,
    /// Join matched text with `" "`.
    SpaceDelim,
    /// Join matched text with `" | "`.
    PipeDelim,
    /// Bind the entire matched collection without iterating.
    AsArray,
}

impl Operator {
    /// Every operator,
    ///   in declaration order.
    pub const ALL: [Operator; 7] = [
        Self::All,
        Self::First,
        Self::CommaDelim,
        Self::SemicolonDelim,
        Self::SpaceDelim,
        Self::PipeDelim,
        Self::AsArray,
    ];

    /// Separator for delimited operators.
    pub fn delimiter(self) -> Option<&'static str> {
        match self {
            Self::CommaDelim => Some(", "),
            Self::SemicolonDelim => Some("; "),
            Self::SpaceDelim => Some(" "),
            Self::PipeDelim => Some(" | "),
            Self::All | Self::First | Self::AsArray => None,
        }
    }

    /// Whether the body of a scope using this operator runs once per
    ///   match rather than once for the whole collection.
    pub fn iterates(self) -> bool {
        matches!(self, Self::All | Self::First)
    }

    /// Name used in record definitions and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::First => "first",
            Self::CommaDelim => "comma",
            Self::SemicolonDelim => "semicolon",
            Self::SpaceDelim => "space",
            Self::PipeDelim => "pipe",
            Self::AsArray => "array",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operator name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator `{}`", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|op| op.name() == lower)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}
