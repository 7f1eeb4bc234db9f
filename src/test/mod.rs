// Test support
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

//! Helpers shared by unit tests.

use crate::path::Path;

/// Parse a path from its textual form,
///   panicking if it is malformed.
pub fn p(s: &str) -> Path {
    s.parse()
        .unwrap_or_else(|e| panic!("malformed test path `{s}`: {e}"))
}

/// Paths assumed by the mapping tests must round-trip through text.
#[test]
fn path_helper_parses_text_form() {
    assert_eq!(p("/record/dc:title").to_string(), "/record/dc:title");
    assert!(p("/").is_empty());
}

/// Ensures that tests will hit debug assertions.
///
/// If this test fails,
///   then optimization settings are inhibiting debug assertions.
/// See the documentation for [`debug_assert!`] for more information.
#[test]
#[should_panic]
fn uses_debug_assertions() {
    debug_assert!(false, "should panic");
}
