// Mapping node tree tests
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
use crate::schema;

lazy_static! {
    static ref RECDEF: RecDef = schema::load(
        r#"<record-definition prefix="t" version="1">
             <root tag="root">
               <elem tag="title"><attr tag="xml:lang"/></elem>
               <elem tag="creator">
                 <elem tag="name"/>
                 <elem tag="role"/>
               </elem>
               <elem tag="type">
                 <opt-list dictionary="types" value="type" key="@key">
                   <opt key="b" value="Book"/>
                   <opt key="m" value="Map" hidden="true"/>
                 </opt-list>
                 <attr tag="key"/>
                 <attr tag="note"/>
               </elem>
             </root>
           </record-definition>"#
            .as_bytes()
    )
    .unwrap();
}

fn tree() -> MappingTree {
    MappingTree::new(RECDEF.clone())
}

fn id(tree: &MappingTree, path: &str) -> NodeId {
    tree.node_at(&p(path))
        .unwrap_or_else(|| panic!("no node at {path}"))
}

#[test]
fn instantiates_in_declaration_order() {
    let tree = tree();

    let paths: Vec<String> = tree
        .ids()
        .map(|id| tree.node(id).path().to_string())
        .collect();

    assert_eq!(
        paths,
        [
            "/root",
            "/root/title",
            "/root/title/@xml:lang",
            "/root/creator",
            "/root/creator/name",
            "/root/creator/role",
            "/root/type[b]",
            "/root/type[b]/@key",
            "/root/type[b]/@note",
            "/root/type[m]",
            "/root/type[m]/@key",
            "/root/type[m]/@note",
        ]
    );

    let creator = tree.node(id(&tree, "/root/creator"));
    assert!(!creator.is_leaf());
    assert_eq!(creator.children().len(), 2);
    assert_eq!(creator.parent(), Some(tree.root()));
}

#[test]
fn option_list_expands_into_sibling_roots() {
    let mut tree = tree();

    let book = id(&tree, "/root/type[b]");
    let map = id(&tree, "/root/type[m]");

    assert_eq!(tree.node(book).role(), Some(OptRole::Root));
    assert_eq!(tree.node(map).role(), Some(OptRole::Root));
    assert_eq!(tree.node(book).parent(), tree.node(map).parent());

    let (list, opt) = tree.option_of(map).unwrap();
    assert_eq!(list.dictionary, "types");
    assert_eq!(opt.value, "Map");

    tree.add(book, NodeMapping::new(p("/record/format"), p("/root/type[b]")))
        .unwrap();
    tree.add(map, NodeMapping::new(p("/record/format"), p("/root/type[m]")))
        .unwrap();

    assert!(tree.node(book).has_mappings());
    assert!(tree.node(map).has_mappings());
}

#[test]
fn option_values_with_delimiters_address_their_roots() {
    let recdef = schema::load(
        r#"<record-definition prefix="t" version="1">
             <root tag="root">
               <elem tag="format">
                 <opt-list dictionary="formats" value="format">
                   <opt value="Sound/Audio"/>
                   <opt value="Text"/>
                 </opt-list>
               </elem>
             </root>
           </record-definition>"#
            .as_bytes(),
    )
    .unwrap();
    let mut tree = MappingTree::new(recdef);

    let sound = id(&tree, r"/root/format[Sound\/Audio]");
    assert_eq!(tree.option_of(sound).unwrap().1.value, "Sound/Audio");

    // The rendered path of a node addresses that node again.
    let rendered = tree.node(sound).path().to_string();
    let output: Path = rendered.parse().unwrap();
    assert_eq!(tree.node_at(&output), Some(sound));

    tree.attach(NodeMapping::new(p("/record/format"), output)).unwrap();
    assert!(tree.node(sound).has_mappings());
}

#[test]
fn variant_descendants_receive_roles() {
    let tree = tree();

    assert_eq!(
        tree.node(id(&tree, "/root/type[b]/@key")).role(),
        Some(OptRole::Key)
    );
    assert_eq!(
        tree.node(id(&tree, "/root/type[m]/@note")).role(),
        Some(OptRole::Child)
    );
    assert_eq!(tree.node(id(&tree, "/root/title")).role(), None);
}

#[test]
fn fixed_fields_reject_mappings() {
    let mut tree = tree();
    let key = id(&tree, "/root/type[b]/@key");

    let fixed = NodeMapping::new(p("/record/k"), p("/root/type[b]/@key"));

    assert_eq!(
        tree.add(key, fixed),
        Err(AttachError::FixedField {
            node: p("/root/type[b]/@key"),
            role: OptRole::Key,
        })
    );
    assert!(!tree.node(key).has_mappings());
}

#[test]
fn hidden_options_are_not_offered() {
    let tree = tree();
    let root = tree.root();

    assert!(tree.is_hidden(id(&tree, "/root/type[m]")));
    assert!(!tree.is_hidden(id(&tree, "/root/type[b]")));

    let offered: Vec<String> = tree
        .visible_children(root)
        .map(|id| tree.node(id).path().to_string())
        .collect();

    assert_eq!(offered, ["/root/title", "/root/creator", "/root/type[b]"]);

    let roots: Vec<NodeId> = tree.visible_roots().collect();
    assert_eq!(roots, [id(&tree, "/root/type[b]")]);
}

#[test]
fn attach_reports_added_event() {
    let mut tree = tree();

    let event = tree
        .attach(NodeMapping::new(p("/record/dc:title"), p("/root/title")))
        .unwrap();

    assert_eq!(event.node, id(&tree, "/root/title"));
    assert_eq!(event.input, p("/record/dc:title"));
    assert_eq!(event.kind, ChangeKind::MappingAdded);
}

#[test]
fn attach_rejects_duplicate_input() {
    let mut tree = tree();
    let m = NodeMapping::new(p("/record/dc:title"), p("/root/title"));

    tree.attach(m.clone()).unwrap();

    assert_eq!(
        tree.attach(m.with_operator(Operator::First)),
        Err(AttachError::Duplicate {
            output: p("/root/title"),
            input: p("/record/dc:title"),
        })
    );

    let title = tree.node(id(&tree, "/root/title"));
    assert_eq!(title.mappings().count(), 1);
    assert_eq!(title.mappings().next().unwrap().operator, None);
}

#[test]
fn attach_rejects_foreign_siblings_and_outputs() {
    let mut tree = tree();
    let title = id(&tree, "/root/title");

    let foreign = NodeMapping::new(p("/record/a/x"), p("/root/title"))
        .with_siblings(vec![p("/record/b/y")]);
    assert!(matches!(
        tree.add(title, foreign),
        Err(AttachError::SiblingParent { .. })
    ));

    let elsewhere = NodeMapping::new(p("/record/a"), p("/root/creator"));
    assert_eq!(
        tree.add(title, elsewhere),
        Err(AttachError::OutputMismatch {
            node: p("/root/title"),
            output: p("/root/creator"),
        })
    );

    assert_eq!(
        tree.attach(NodeMapping::new(p("/record/a"), p("/root/nope"))),
        Err(AttachError::UnknownNode(p("/root/nope")))
    );

    assert!(tree.mappings().is_empty());
}

#[test]
fn edits_report_change_kinds() {
    let mut tree = tree();
    let title = id(&tree, "/root/title");
    let input = p("/record/dc:title");

    tree.attach(NodeMapping::new(input.clone(), p("/root/title")))
        .unwrap();

    let code = tree
        .set_snippet(title, &input, Some(Snippet::new("_dc_title.upper()")))
        .unwrap();
    assert_eq!(code.kind, ChangeKind::CodeChanged);

    let dict = Dictionary::from_values(["a"], None);
    let dict = tree.set_dictionary(title, &input, Some(dict)).unwrap();
    assert_eq!(dict.kind, ChangeKind::DictionaryChanged);

    let doc = tree
        .set_documentation(title, &input, Some("Primary title".into()))
        .unwrap();
    assert_eq!(doc.kind, ChangeKind::DocumentationChanged);

    let m = tree.node(title).mapping(&input).unwrap();
    assert!(m.snippet.is_some());
    assert!(m.dictionary.is_some());
    assert_eq!(m.documentation.as_deref(), Some("Primary title"));

    let (removed, event) = tree.remove(title, &input).unwrap();
    assert_eq!(removed.input, input);
    assert_eq!(event.kind, ChangeKind::MappingRemoved);

    assert_eq!(
        tree.set_snippet(title, &input, None),
        Err(AttachError::NotAttached {
            output: p("/root/title"),
            input,
        })
    );
}

#[test]
fn collects_descendants_in_declaration_order() {
    let mut tree = tree();

    // Inserted out of declaration order.
    tree.attach(NodeMapping::new(p("/record/c/role"), p("/root/creator/role")))
        .unwrap();
    tree.attach(NodeMapping::new(p("/record/c/name"), p("/root/creator/name")))
        .unwrap();
    tree.attach(NodeMapping::new(p("/record/t"), p("/root/title")))
        .unwrap();

    let mut under_creator = Vec::new();
    tree.collect_descendant(id(&tree, "/root/creator"), &mut under_creator);

    let outputs: Vec<String> =
        under_creator.iter().map(|m| m.output.to_string()).collect();
    assert_eq!(outputs, ["/root/creator/name", "/root/creator/role"]);

    assert_eq!(tree.mappings().len(), 3);
    assert!(tree.is_populated(tree.root()));
    assert!(tree.is_populated(id(&tree, "/root/creator")));
    assert!(!tree.is_populated(id(&tree, "/root/type[b]")));
}
