// Tests for persistent tag paths
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

use super::*;
use crate::test::p;
use fxhash::FxHashSet;

#[test]
fn child_then_parent_is_identity() {
    for s in ["/", "/a", "/a/b", "/record/dc:title/@xml:lang"] {
        let path = p(s);
        let child = path.child(Tag::local("x"));

        assert_eq!(child.parent(), Some(path.clone()));
        assert_eq!(child.len(), path.len() + 1);
    }
}

#[test]
fn root_has_no_parent() {
    assert_eq!(Path::root().parent(), None);
    assert_eq!(Path::root().last(), None);
    assert_eq!(p("/"), Path::root());
    assert_eq!(p(""), Path::root());
    assert_eq!(Path::root().to_string(), "/");
}

#[test]
fn ancestry_is_antisymmetric() {
    let paths = ["/", "/a", "/a/b", "/a/c", "/a/b/c", "/b"].map(p);

    for x in &paths {
        for y in &paths {
            if x.is_ancestor_of(y) && y.is_ancestor_of(x) {
                panic!("{x} and {y} are mutual ancestors");
            }
        }

        // Strict.
        assert!(!x.is_ancestor_of(x));
    }
}

#[test]
fn ancestry_requires_matching_prefix() {
    assert!(p("/a").is_ancestor_of(&p("/a/b/c")));
    assert!(Path::root().is_ancestor_of(&p("/a")));
    assert!(!p("/a/c").is_ancestor_of(&p("/a/b/c")));
    assert!(!p("/a/b/c").is_ancestor_of(&p("/a")));
}

#[test]
fn family_includes_equal_ancestor_and_descendant() {
    let ab = p("/a/b");

    assert!(ab.is_family_of(&p("/a/b")));
    assert!(ab.is_family_of(&p("/a")));
    assert!(ab.is_family_of(&p("/a/b/c")));
    assert!(!ab.is_family_of(&p("/a/c")));
}

#[test]
fn with_root_removed_requires_two_segments() {
    assert_eq!(p("/a/b/c").with_root_removed(), Ok(p("/b/c")));
    assert_eq!(p("/a/b").with_root_removed(), Ok(p("/b")));
    assert_eq!(p("/a").with_root_removed(), Err(PathError::TooShort(p("/a"))));
    assert_eq!(
        Path::root().with_root_removed(),
        Err(PathError::TooShort(Path::root()))
    );
}

#[test]
fn extend_ancestor_yields_remainder() {
    let path = p("/record/contributor/name");

    assert_eq!(path.extend_ancestor(&p("/record")), Ok(p("/contributor/name")));
    assert_eq!(path.extend_ancestor(&Path::root()), Ok(path.clone()));
}

#[test]
fn extend_ancestor_rejects_non_ancestor() {
    let path = p("/record/contributor/name");

    assert_eq!(
        path.extend_ancestor(&p("/record/title")),
        Err(PathError::NotAncestor {
            path: path.clone(),
            ancestor: p("/record/title"),
        })
    );

    // Equal is not an ancestor.
    assert!(path.extend_ancestor(&path).is_err());
}

#[test]
fn equality_agrees_with_rendering() {
    let built = Path::root()
        .child(Tag::local("record"))
        .child(Tag::element(Some("dc"), "title"))
        .child(Tag::attribute(Some("xml"), "lang"));
    let parsed = p("/record/dc:title/@xml:lang");

    assert_eq!(built, parsed);
    assert_eq!(built.to_string(), parsed.to_string());

    let mut set = FxHashSet::default();
    set.insert(built);
    assert!(set.contains(&parsed));
}

#[test]
fn ordering_is_total_and_prefix_first() {
    let mut paths = vec![p("/b"), p("/a/b"), p("/a"), p("/"), p("/a/@c")];
    paths.sort();

    assert_eq!(paths, vec![p("/"), p("/a"), p("/a/b"), p("/a/@c"), p("/b")]);
}

#[test]
fn prefix_and_tag_at() {
    let path = p("/a/b/c");

    assert_eq!(path.prefix(0), Path::root());
    assert_eq!(path.prefix(2), p("/a/b"));
    assert_eq!(path.prefix(9), path);
    assert_eq!(path.tag_at(1), Some(&Tag::local("b")));
    assert_eq!(path.tag_at(3), None);
}

#[test]
fn strips_variants() {
    assert_eq!(p("/root/type[book]/@key").without_variants(), p("/root/type/@key"));
}

#[test]
fn keys_single_segment() {
    let path = p("/root/type/@key");

    assert_eq!(path.with_variant_at(1, "b"), Some(p("/root/type[b]/@key")));
    assert_eq!(path.with_variant_at(0, "x"), Some(p("/root[x]/type/@key")));
    assert_eq!(path.with_variant_at(3, "b"), None);
}

#[test]
fn variant_key_may_contain_delimiter() {
    let path = p("/root/type/@key").with_variant_at(1, "Sound/Audio").unwrap();

    assert_eq!(path.to_string(), r"/root/type[Sound\/Audio]/@key");
    assert_eq!(path.len(), 3);
    assert_eq!(path.to_string().parse::<Path>(), Ok(path.clone()));
    assert_eq!(path.tags()[1].variant(), Some("Sound/Audio"));
}

#[test]
fn constant_marker() {
    assert!(Path::constant().is_constant());
    assert!(p("/constant").is_constant());
    assert!(!p("/record/constant").is_constant());
}

#[test]
fn invalid_tag_text_fails() {
    assert!(matches!(
        "/a//b".parse::<Path>(),
        Err(PathError::InvalidTag(_, TagError::Empty(_)))
    ));
}
