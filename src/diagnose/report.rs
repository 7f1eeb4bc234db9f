// Diagnostic reports
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

//! Rendering of diagnostic information.

// NB: `write!` together with `\n` is preferred to `writeln!` so that there
//   is only a single sequence of characters to search for while tracking
//   down newlines,
//     rather than using both.

use super::{AnnotatedPath, Diagnostic, Label, Level};
use crate::path::Path;
use std::fmt::{self, Display};

pub trait Reporter {
    /// Render diagnostic report.
    ///
    /// The provided [`Report`] implements [`Display`].
    ///
    /// Please be mindful of where this report is being rendered to.
    /// If rendering to standard out,
    ///   it is a good idea to buffer the entire report before flushing,
    ///     otherwise the report may become interleaved with other output.
    ///
    /// This method _does not return [`Result`]_ and should never fail.
    fn render<'d, D: Diagnostic>(
        &mut self,
        diagnostic: &'d D,
    ) -> Report<'d, D>;

    /// Whether any reports of [`Level::Error`] or worse were rendered.
    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of reports of [`Level::Error`] or worse rendered.
    fn error_count(&self) -> usize;

    /// Number of [`Level::Warning`] reports rendered.
    fn warning_count(&self) -> usize;
}

/// Render diagnostic reports in a style modeled after Rust's.
///
/// The reporter keeps a tally of errors and warnings so that the caller
///   may produce a summary and an appropriate exit status.
#[derive(Debug, Default)]
pub struct VisualReporter {
    errors: usize,
    warnings: usize,
}

impl VisualReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for VisualReporter {
    fn render<'d, D: Diagnostic>(
        &mut self,
        diagnostic: &'d D,
    ) -> Report<'d, D> {
        let level = diagnostic.level();

        match level {
            Level::InternalError | Level::Error => self.errors += 1,
            Level::Warning => self.warnings += 1,
            Level::Note | Level::Help => (),
        }

        Report {
            diagnostic,
            level,
            annotations: diagnostic.describe(),
        }
    }

    fn error_count(&self) -> usize {
        self.errors
    }

    fn warning_count(&self) -> usize {
        self.warnings
    }
}

/// A rendered diagnostic.
///
/// Consecutive annotations of the same path are grouped beneath a single
///   `-->` line.
#[derive(Debug)]
pub struct Report<'d, D: Diagnostic> {
    diagnostic: &'d D,
    level: Level,
    annotations: Vec<AnnotatedPath>,
}

impl<'d, D: Diagnostic> Report<'d, D> {
    pub fn level(&self) -> Level {
        self.level
    }
}

impl<'d, D: Diagnostic> Display for Report<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}\n", self.level, self.diagnostic)?;

        let mut prev: Option<&Path> = None;

        for AnnotatedPath(path, level, label) in &self.annotations {
            if prev != Some(path) {
                write!(f, "  --> {path}\n")?;
                prev = Some(path);
            }

            if let Some(Label(text)) = label {
                write!(f, "   = {level}: {text}\n")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnose::Annotate;
    use std::error::Error;

    #[derive(Debug)]
    struct StubError(Level);

    impl Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "stub failure")
        }
    }

    impl Error for StubError {}

    impl Diagnostic for StubError {
        fn describe(&self) -> Vec<AnnotatedPath> {
            let path: Path = "/root/title".parse().unwrap();

            vec![
                path.clone().error("first label"),
                path.note("same path"),
                Path::root().help("try something else"),
            ]
        }

        fn level(&self) -> Level {
            self.0
        }
    }

    #[test]
    fn renders_grouped_annotations() {
        let mut reporter = VisualReporter::new();
        let report = reporter.render(&StubError(Level::Error)).to_string();

        assert_eq!(
            report,
            "error: stub failure\n\
             \x20 --> /root/title\n\
             \x20  = error: first label\n\
             \x20  = note: same path\n\
             \x20 --> /\n\
             \x20  = help: try something else\n"
        );
    }

    #[test]
    fn tallies_errors_and_warnings() {
        let mut reporter = VisualReporter::new();

        let _ = reporter.render(&StubError(Level::Warning));
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warning_count(), 1);

        let _ = reporter.render(&StubError(Level::InternalError));
        let _ = reporter.render(&StubError(Level::Error));
        assert_eq!(reporter.error_count(), 2);
    }
}
