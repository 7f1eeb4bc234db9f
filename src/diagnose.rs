// Diagnostic system
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

//! Diagnostic system for error reporting.
//!
//! This system is heavily motivated by Rust's.
//! Whereas a compiler of source text annotates byte spans,
//!   the subjects of diagnostics here are [`Path`]s:
//!     locations in the schema or in the source record.
//!
//! Every error type of this crate implements [`Diagnostic`],
//!   as does the non-fatal [`GenerationGap`](crate::codegen::GenerationGap)
//!   warning.

mod report;

pub use report::{Report, Reporter, VisualReporter};

use crate::path::Path;
use std::{
    borrow::Cow,
    error::Error,
    fmt::{self, Display},
};

/// Diagnostic report.
///
/// This describes an error condition or other special event using a series
///   of [`AnnotatedPath`]s describing the source,
///     cause,
///     and circumstances around an event.
pub trait Diagnostic: Error {
    /// Produce a series of [`AnnotatedPath`]s describing the source and
    ///   circumstances of the diagnostic event.
    fn describe(&self) -> Vec<AnnotatedPath>;

    /// Severity of the event as a whole.
    ///
    /// Most diagnostics are errors.
    fn level(&self) -> Level {
        Level::Error
    }
}

/// Diagnostic severity level.
///
/// Lower levels are more severe
///   (e.g. level 1 is the worst).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[repr(u8)]
pub enum Level {
    /// An error internal to the compiler that the user cannot resolve,
    ///   but may be able to work around.
    InternalError = 1,

    /// A user-resolvable error.
    #[default]
    Error,

    /// A condition that does not prevent output from being produced,
    ///   but whose output may not be what the user expects.
    Warning,

    /// Useful information that supplements other messages.
    Note,

    /// Additional advice to the user that may help in fixing a problem.
    Help,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::InternalError => write!(f, "internal error"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A label associated with an [`AnnotatedPath`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Label(Cow<'static, str>);

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&'static str> for Label {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

/// A path with an associated severity level and optional label.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AnnotatedPath(pub Path, pub Level, pub Option<Label>);

impl AnnotatedPath {
    pub fn with_help<L: Into<Label>>(self, label: L) -> Vec<AnnotatedPath> {
        let path = self.0.clone();
        vec![self, path.help(label)]
    }
}

impl From<AnnotatedPath> for Vec<AnnotatedPath> {
    fn from(x: AnnotatedPath) -> Self {
        vec![x]
    }
}

pub trait Annotate: Sized {
    /// Annotate a path with a severity [`Level`] and an optional
    ///   [`Label`] to display alongside of it.
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedPath;

    /// Annotate a path as the subject of an internal error.
    fn internal_error<L: Into<Label>>(self, label: L) -> AnnotatedPath {
        self.annotate(Level::InternalError, Some(label.into()))
    }

    /// Annotate a path with a clarifying label styled as an error.
    fn error<L: Into<Label>>(self, label: L) -> AnnotatedPath {
        self.annotate(Level::Error, Some(label.into()))
    }

    /// Mark a path as the location of an error without a label.
    fn mark_error(self) -> AnnotatedPath {
        self.annotate(Level::Error, None)
    }

    fn warning<L: Into<Label>>(self, label: L) -> AnnotatedPath {
        self.annotate(Level::Warning, Some(label.into()))
    }

    /// Supplemental context for another annotation.
    fn note<L: Into<Label>>(self, label: L) -> AnnotatedPath {
        self.annotate(Level::Note, Some(label.into()))
    }

    /// Loose guidance that may help the user fix the problem.
    fn help<L: Into<Label>>(self, label: L) -> AnnotatedPath {
        self.annotate(Level::Help, Some(label.into()))
    }
}

impl Annotate for Path {
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedPath {
        AnnotatedPath(self, level, label)
    }
}
