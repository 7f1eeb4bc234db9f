// Code generation tests
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
use crate::{
    dictionary::Dictionary,
    mapping::{NoSnippets, NodeMapping, Snippet},
    operator::Operator,
    schema::{self, RecDef},
};
use fxhash::FxHashMap;

lazy_static! {
    static ref RECDEF: RecDef = schema::load(
        r#"<record-definition prefix="demo" version="1.0.0">
             <namespaces>
               <namespace prefix="dc" uri="http://purl.org/dc/elements/1.1/"/>
             </namespaces>
             <root tag="record">
               <elem tag="title" singular="true"><attr tag="xml:lang"/></elem>
               <elem tag="creator">
                 <attr tag="id"/>
                 <elem tag="name"/>
                 <elem tag="role"/>
               </elem>
               <elem tag="type">
                 <opt-list dictionary="types" value="type" key="@key">
                   <opt key="b" value="Book"/>
                   <opt key="m" value="Map" hidden="true"/>
                 </opt-list>
                 <attr tag="key"/>
               </elem>
               <elem tag="subject"/>
               <elem tag="rights"/>
             </root>
             <field-markers>
               <field-marker name="TITLE" type="text" path="/record/title"/>
             </field-markers>
             <assertions>
               <assert path="/record/title">it.size() &gt; 0</assert>
             </assertions>
           </record-definition>"#
            .as_bytes()
    )
    .unwrap();
}

fn tree_with(mappings: Vec<NodeMapping>) -> MappingTree {
    let mut tree = MappingTree::new(RECDEF.clone());

    for m in mappings {
        tree.attach(m).unwrap();
    }

    tree
}

fn map(input: &str, output: &str) -> NodeMapping {
    NodeMapping::new(p(input), p(output))
}

fn gen(tree: &MappingTree) -> String {
    generate(tree, &NoSnippets, &Options::default(), None).text
}

fn contributors() -> Vec<NodeMapping> {
    vec![
        map("/metadata/contributor/name", "/record/creator/name"),
        map("/metadata/contributor/role", "/record/creator/role"),
    ]
}

#[test]
fn single_first_loop() {
    let tree = tree_with(vec![map("/metadata/dc:title", "/record/title")]);

    assert_eq!(
        gen(&tree),
        "\
namespace('dc', 'http://purl.org/dc/elements/1.1/')

output {
    record {
        _input.'dc:title'[0] * { _dc_title ->
            title(_dc_title)
        }
    }
}

assertion('/record/title') {
    it.size() > 0
}
// field TITLE (text): /record/title
"
    );
}

#[test]
fn unmapped_tree_emits_bare_root() {
    let text = gen(&tree_with(vec![]));

    assert!(text.contains("output {\n    record()\n}\n"), "{text}");
}

#[test]
fn siblings_share_synthesized_loop() {
    let tree = tree_with(contributors());
    let text = gen(&tree);

    assert!(
        text.contains(
            "        _input.contributor * { _contributor ->
            creator {
                _contributor.name * { _name ->
                    name(_name)
                }
                _contributor.role * { _role ->
                    role(_role)
                }
            }
        }
"
        ),
        "{text}"
    );

    assert_eq!(text.matches("_input.contributor").count(), 1);
}

#[test]
fn differing_parents_decline_synthesis() {
    let tree = tree_with(vec![
        map("/metadata/contributor/name", "/record/creator/name"),
        map("/metadata/agent/role", "/record/creator/role"),
    ]);
    let text = gen(&tree);

    assert!(text.contains("        creator {\n"), "{text}");
    assert!(text.contains("_input.contributor * { _contributor ->"), "{text}");
    assert!(text.contains("_contributor.name * { _name ->"), "{text}");
    assert!(text.contains("_input.agent * { _agent ->"), "{text}");
    assert!(text.contains("_agent.role * { _role ->"), "{text}");
}

#[test]
fn output_follows_declaration_order() {
    // Attached in reverse.
    let mut mappings = contributors();
    mappings.push(map("/metadata/dc:title", "/record/title"));
    mappings.reverse();

    let text = gen(&tree_with(mappings));

    let title = text.find("title(").unwrap();
    let name = text.find("name(").unwrap();
    let role = text.find("role(").unwrap();

    assert!(title < name && name < role, "{text}");
}

#[test]
fn option_roots_generate_as_siblings() {
    let dict: Dictionary =
        [("book", "Book"), ("novel", "Book"), ("atlas", "Map")]
            .into_iter()
            .collect();

    let tree = tree_with(vec![
        map("/metadata/dc:type", "/record/type[b]")
            .with_dictionary(dict.clone()),
        map("/metadata/dc:type", "/record/type[m]").with_dictionary(dict),
    ]);
    let text = gen(&tree);

    // The hidden `Map` option still generates.
    assert!(
        text.contains(
            "        _input.'dc:type' * { _dc_type ->
            def _translated1 = lookup1(_dc_type)
            if (_translated1) {
                type(key: 'b', 'Book')
            }
        }
        _input.'dc:type' * { _dc_type ->
            def _translated2 = lookup2(_dc_type)
            if (_translated2) {
                type(key: 'm', 'Map')
            }
        }
"
        ),
        "{text}"
    );

    // Each root translates only into its own option.
    assert!(
        text.contains(
            "\
def Dictionary1 = [
    'book': 'Book',
    'novel': 'Book',
]
def lookup1 = { value ->
    def translated = Dictionary1[value.toString().trim()]
    translated ? translated : ''
}
def Dictionary2 = [
    'atlas': 'Map',
]
"
        ),
        "{text}"
    );
}

#[test]
fn dictionary_miss_skips_emission() {
    let mut dict = Dictionary::from_values(["history", "misc"], None);
    dict.insert("history", "History");
    dict.insert("misc", "");

    let tree = tree_with(vec![
        map("/metadata/dc:subject", "/record/subject").with_dictionary(dict)
    ]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "        _input.'dc:subject' * { _dc_subject ->
            def _translated1 = lookup1(_dc_subject)
            if (_translated1) {
                subject(_translated1)
            }
        }
"
        ),
        "{text}"
    );

    // Untranslated values are left out of the table.
    assert!(text.contains("def Dictionary1 = [\n    'history': 'History',\n]\n"));
}

#[test]
fn attributes_inline_into_their_element() {
    let mut mappings = contributors();
    mappings.push(map("/metadata/contributor/@id", "/record/creator/@id"));

    let text = gen(&tree_with(mappings));

    assert!(
        text.contains(
            "        _input.contributor * { _contributor ->
            def _attr_record_creator_id = _contributor.'@id'[0]
            creator(id: _attr_record_creator_id) {
"
        ),
        "{text}"
    );
}

#[test]
fn attribute_dictionary_translates_and_guards() {
    let dict: Dictionary =
        [("english", "en"), ("french", "fr")].into_iter().collect();

    let tree = tree_with(vec![
        map("/metadata/dc:title", "/record/title"),
        map("/metadata/dc:title/@lang", "/record/title/@xml:lang")
            .with_dictionary(dict),
    ]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "        _input.'dc:title'[0] * { _dc_title ->
            def _attr_record_title_xml_lang = lookup1(_dc_title.'@lang'[0])
            if (_attr_record_title_xml_lang) {
                title('xml:lang': _attr_record_title_xml_lang, _dc_title)
            }
        }
"
        ),
        "{text}"
    );
    assert!(text.contains("def Dictionary1 = [\n    'english': 'en',\n"));

    // The raw source value never reaches the attribute.
    assert!(!text.contains("'xml:lang': _dc_title.'@lang'"), "{text}");
}

#[test]
fn attribute_snippet_computes_value() {
    let tree = tree_with(vec![map(
        "/metadata/dc:title/@lang",
        "/record/title/@xml:lang",
    )
    .with_snippet(Snippet::new("_at_lang.text().toLowerCase()"))]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "        def _attr_record_title_xml_lang = { _at_lang ->
            _at_lang.text().toLowerCase()
        }(_input.'dc:title'.'@lang'[0])
        title('xml:lang': _attr_record_title_xml_lang)
"
        ),
        "{text}"
    );
}

#[test]
fn attribute_mappings_fall_back_in_order() {
    let mut mappings = contributors();
    mappings.extend([
        map("/metadata/contributor/@id", "/record/creator/@id"),
        map("/metadata/contributor/@ref", "/record/creator/@id")
            .with_operator(Operator::All),
    ]);

    let text = gen(&tree_with(mappings));

    assert!(
        text.contains(
            "            def _attr_record_creator_id = _contributor.'@id'[0]
            def _attr_record_creator_id_2 = _contributor.'@ref'*.text().join(' ')
            creator(id: _attr_record_creator_id ?: _attr_record_creator_id_2) {
"
        ),
        "{text}"
    );
}

#[test]
fn leaf_with_only_attribute_mapped() {
    let tree = tree_with(vec![map(
        "/metadata/dc:title/@xml:lang",
        "/record/title/@xml:lang",
    )]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "    record {
        def _attr_record_title_xml_lang = _input.'dc:title'.'@xml:lang'[0]
        title('xml:lang': _attr_record_title_xml_lang)
    }
"
        ),
        "{text}"
    );
    assert!(!text.contains(" * {"), "{text}");
}

#[test]
fn delimited_operator_binds_joined_text() {
    let tree = tree_with(vec![
        map("/metadata/contributor/name", "/record/creator/name")
            .with_operator(Operator::SemicolonDelim),
        map("/metadata/contributor/role", "/record/creator/role"),
    ]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "ifPresent(_contributor.name*.text().join('; ')) { _name ->\n                    name(_name)\n"
        ),
        "{text}"
    );
}

#[test]
fn array_operator_binds_whole_collection() {
    let tree = tree_with(vec![map("/metadata/dc:subject", "/record/subject")
        .with_operator(Operator::AsArray)]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "        ifPresent(_input.'dc:subject') { _dc_subject ->
            subject(_dc_subject)
        }
"
        ),
        "{text}"
    );
}

#[test]
fn explicit_first_overrides_plural_node() {
    let tree = tree_with(vec![map("/metadata/dc:subject", "/record/subject")
        .with_operator(Operator::First)]);
    let text = gen(&tree);

    assert!(
        text.contains("_input.'dc:subject'[0] * { _dc_subject ->"),
        "{text}"
    );

    let plural = gen(&tree_with(vec![map(
        "/metadata/dc:subject",
        "/record/subject",
    )]));
    assert!(plural.contains("_input.'dc:subject' * { _dc_subject ->"));
}

#[test]
fn nested_scopes_do_not_shadow() {
    let tree = tree_with(vec![
        map("/metadata/agent", "/record/creator"),
        map("/metadata/agent/agent/name", "/record/creator/name"),
    ]);
    let text = gen(&tree);

    assert!(text.contains("_input.agent * { _agent ->"), "{text}");
    assert!(text.contains("_agent.agent * { _agent_2 ->"), "{text}");
    assert!(text.contains("_agent_2.name * { _name ->"), "{text}");
}

#[test]
fn siblings_map_join() {
    let tree = tree_with(vec![map("/metadata/dc:rights", "/record/rights")
        .with_siblings(vec![p("/metadata/dc:license")])]);
    let text = gen(&tree);

    assert!(
        text.contains(
            "        mapJoin(_input, 'dc:rights', 'dc:license') * { _M1 ->
            rights(_M1)
        }
"
        ),
        "{text}"
    );
}

#[test]
fn constants_emit_without_loops() {
    let tree =
        tree_with(vec![NodeMapping::constant(p("/record/rights"), "CC0")]);
    let text = gen(&tree);

    assert!(text.contains("    record {\n        rights('CC0')\n    }\n"), "{text}");
}

#[test]
fn stored_snippet_with_absent_fallback() {
    let mut snippets = FxHashMap::default();
    snippets.insert(
        p("/record/subject"),
        Snippet::from_text(
            "_dc_subject.text().toUpperCase()\nif (_absent_) {\n    'unclassified'\n}",
        ),
    );

    let tree = tree_with(vec![map("/metadata/dc:subject", "/record/subject")]);
    let text = generate(&tree, &snippets, &Options::default(), None).text;

    assert!(
        text.contains(
            "        _input.'dc:subject' * { _dc_subject ->
            subject {
                _dc_subject.text().toUpperCase()
            }
        }
        if (absent('subject')) {
            subject {
                'unclassified'
            }
        }
"
        ),
        "{text}"
    );
}

#[test]
fn braces_balance_and_output_is_stable() {
    let dict = Dictionary::from_values(["book"], None);

    let mut mappings = contributors();
    mappings.extend([
        map("/metadata/contributor/@id", "/record/creator/@id"),
        map("/metadata/dc:title", "/record/title"),
        map("/metadata/dc:type", "/record/type[b]").with_dictionary(dict),
        map("/metadata/dc:subject", "/record/subject")
            .with_snippet(Snippet::new("_dc_subject").with_absent("'none'")),
        map("/metadata/dc:rights", "/record/rights")
            .with_siblings(vec![p("/metadata/dc:license")]),
    ]);

    let tree = tree_with(mappings);
    let text = gen(&tree);

    assert_eq!(text.matches('{').count(), text.matches('}').count(), "{text}");
    assert_eq!(text.matches('(').count(), text.matches(')').count(), "{text}");
    assert_eq!(gen(&tree), text);
}

#[test]
fn focus_captures_single_mapping() {
    let tree = tree_with(contributors());
    let focus = Focus {
        output: p("/record/creator/name"),
        input: p("/metadata/contributor/name"),
    };

    let generated =
        generate(&tree, &NoSnippets, &Options::default(), Some(&focus));

    assert!(generated.gaps.is_empty());
    assert_eq!(
        generated.focus.as_deref(),
        Some("_contributor.name * { _name ->\n    name(_name)\n}")
    );

    // The program is narrowed to the focused mapping and its context.
    assert!(generated.text.contains("_input.contributor * { _contributor ->"));
    assert!(!generated.text.contains("role("), "{}", generated.text);
}

#[test]
fn focus_keeps_dictionary_numbering() {
    let dict = |from: &str, to: &str| -> Dictionary {
        [(from, to)].into_iter().collect()
    };

    let tree = tree_with(vec![
        map("/metadata/dc:title", "/record/title")
            .with_dictionary(dict("t", "T")),
        map("/metadata/dc:subject", "/record/subject")
            .with_dictionary(dict("s", "S")),
    ]);
    let focus = Focus {
        output: p("/record/subject"),
        input: p("/metadata/dc:subject"),
    };

    let full = gen(&tree);
    let focused =
        generate(&tree, &NoSnippets, &Options::default(), Some(&focus));

    assert_eq!(
        focused.focus.as_deref(),
        Some(
            "_input.'dc:subject' * { _dc_subject ->
    def _translated2 = lookup2(_dc_subject)
    if (_translated2) {
        subject(_translated2)
    }
}"
        )
    );

    // The focused text names the same tables as the full program.
    assert!(full.contains("def _translated2 = lookup2(_dc_subject)"));
    assert!(focused.text.contains("def Dictionary2 = ["));
    assert!(!focused.text.contains("Dictionary1"), "{}", focused.text);
}

#[test]
fn focus_on_attribute_mapping() {
    let mut mappings = contributors();
    mappings.push(map("/metadata/contributor/@id", "/record/creator/@id"));

    let tree = tree_with(mappings);
    let focus = Focus {
        output: p("/record/creator/@id"),
        input: p("/metadata/contributor/@id"),
    };

    let generated =
        generate(&tree, &NoSnippets, &Options::default(), Some(&focus));

    assert!(generated.gaps.is_empty());
    assert_eq!(
        generated.focus.as_deref(),
        Some("def _attr_record_creator_id = _contributor.'@id'[0]")
    );
    assert!(
        generated
            .text
            .contains("            creator(id: _attr_record_creator_id)\n"),
        "{}",
        generated.text
    );
    assert!(!generated.text.contains("name("), "{}", generated.text);
}

#[test]
fn missing_focus_is_a_gap() {
    let tree = tree_with(contributors());
    let focus = Focus {
        output: p("/record/creator/name"),
        input: p("/metadata/nope"),
    };

    let generated =
        generate(&tree, &NoSnippets, &Options::default(), Some(&focus));

    assert_eq!(
        generated.gaps,
        vec![GenerationGap {
            output: p("/record/creator/name"),
            input: p("/metadata/nope"),
        }]
    );
    assert_eq!(generated.gaps[0].level(), Level::Warning);
    assert_eq!(generated.focus, None);
    assert_eq!(generated.text, gen(&tree));
}

#[test]
fn lowered_program_closes_every_scope() {
    let tree = tree_with(contributors());
    let (program, gaps) = lower(&tree, &NoSnippets, None);

    assert!(gaps.is_empty());

    // One synthesized loop enclosing one loop per leaf.
    let scopes: usize = program.output.iter().map(Stmt::scope_count).sum();
    assert_eq!(scopes, 3);
}
