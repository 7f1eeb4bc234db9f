// Record definition reader
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

//! Read record definitions from XML.
//!
//! The document has the following shape:
//!
//! ```xml
//! <record-definition prefix="demo" version="1.0.0">
//!   <namespaces><namespace prefix="dc" uri="http://purl.org/dc/elements/1.1/"/></namespaces>
//!   <attr-group name="lang"><attr tag="xml:lang"/></attr-group>
//!   <template name="person"><attr tag="id"/><elem tag="name"/></template>
//!   <root tag="record">
//!     <elem tag="dc:title" singular="true" operator="first">
//!       <doc>Main title</doc>
//!       <attr-group ref="lang"/>
//!     </elem>
//!     <elem tag="creator" template="person"/>
//!   </root>
//!   <field-markers><field-marker name="TITLE" path="/record/dc:title"/></field-markers>
//!   <assertions><assert path="/record/dc:title">it.size() &gt; 0</assert></assertions>
//! </record-definition>
//! ```
//!
//! Top-level `attr-group`,
//!   `elem-group`,
//!   and `template` elements are _definitions_ and carry a `name`;
//!     within an element,
//!       `attr-group` and `elem-group` are _references_ and carry a `ref`.
//!
//! This reader produces an unresolved [`SchemaDecl`];
//!   see [`resolve`](super::resolve) to lower it into a
//!   [`RecDef`](super::RecDef).
//!
//! How To Use
//! ==========
//! ```
//! use recmap::schema::reader;
//!
//! let src = r#"<record-definition prefix="demo">
//!                <root tag="record"><elem tag="title"/></root>
//!              </record-definition>"#;
//!
//! let decl = reader::read(src.as_bytes()).unwrap();
//! assert_eq!(decl.prefix, "demo");
//! assert_eq!(decl.root.children.len(), 1);
//! ```

use super::{
    Assertion, AttrDecl, ChildDecl, DefKind, ElemDecl, FieldMarker,
    Namespace, NamedDecl, OptListDecl, SchemaDecl, SchemaError,
};
use crate::{optlist::Opt, path::Path, tag::Tag};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use std::{fmt::Display, io::BufRead, str::FromStr};

type ReadResult<T> = Result<T, SchemaError>;

/// Read an unresolved record definition from `input`.
pub fn read<B: BufRead>(input: B) -> ReadResult<SchemaDecl> {
    SchemaReader::new(input).read()
}

/// An XML event reduced to what the reader needs,
///   owning its data so that the read buffer can be reused.
#[derive(Debug)]
enum XmlNode {
    Open { attrs: Attrs, empty: bool },
    Close,
    Text(String),
    Eof,
}

/// Attributes of a single element.
#[derive(Debug)]
struct Attrs {
    element: String,
    pairs: Vec<(String, String)>,
}

impl Attrs {
    fn from_start(e: &BytesStart) -> ReadResult<Self> {
        let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        let pairs = e
            .attributes()
            .map(|attr| -> ReadResult<(String, String)> {
                let attr = attr?;
                let key =
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value()?.into_owned();

                Ok((key, value))
            })
            .collect::<ReadResult<_>>()?;

        Ok(Self { element, pairs })
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(String::from)
    }

    fn require(&self, key: &'static str) -> ReadResult<&str> {
        self.get(key).ok_or_else(|| SchemaError::MissingAttr {
            element: self.element.clone(),
            attr: key,
        })
    }

    fn parse<T>(&self, key: &str) -> ReadResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|value| {
                value.parse().map_err(|e| {
                    SchemaError::invalid_attr(&self.element, key, value, e)
                })
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> ReadResult<bool> {
        match self.get(key) {
            None | Some("false") | Some("0") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some(other) => Err(SchemaError::invalid_attr(
                &self.element,
                key,
                other,
                "expected `true` or `false`",
            )),
        }
    }

    /// Parse the `tag` attribute.
    ///
    /// Attribute tags may be written with or without their leading `@`.
    fn tag(&self, attribute: bool) -> ReadResult<Tag> {
        let raw = self.require("tag")?;

        let text = match (attribute, raw.starts_with('@')) {
            (true, false) => format!("@{raw}"),
            (false, true) => {
                return Err(SchemaError::invalid_attr(
                    &self.element,
                    "tag",
                    raw,
                    "an element cannot be named by an attribute tag",
                ))
            }
            _ => raw.to_string(),
        };

        text.parse().map_err(|e| {
            SchemaError::invalid_attr(&self.element, "tag", raw, e)
        })
    }
}

struct SchemaReader<B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
}

impl<B: BufRead> SchemaReader<B> {
    fn new(input: B) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);

        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next(&mut self) -> ReadResult<XmlNode> {
        loop {
            self.buf.clear();

            let node = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => XmlNode::Open {
                    attrs: Attrs::from_start(&e)?,
                    empty: false,
                },
                Event::Empty(e) => XmlNode::Open {
                    attrs: Attrs::from_start(&e)?,
                    empty: true,
                },
                Event::End(_) => XmlNode::Close,
                Event::Text(t) => XmlNode::Text(t.unescape()?.into_owned()),
                Event::CData(t) => XmlNode::Text(
                    String::from_utf8_lossy(&t.into_inner()).into_owned(),
                ),
                Event::Eof => XmlNode::Eof,

                Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => continue,
            };

            return Ok(node);
        }
    }

    /// Invoke `f` for each child element until the parent closes.
    ///
    /// Text between child elements is ignored.
    fn each_child<F>(&mut self, empty: bool, mut f: F) -> ReadResult<()>
    where
        F: FnMut(&mut Self, Attrs, bool) -> ReadResult<()>,
    {
        if empty {
            return Ok(());
        }

        loop {
            match self.next()? {
                XmlNode::Open { attrs, empty } => f(self, attrs, empty)?,
                XmlNode::Close => return Ok(()),
                XmlNode::Text(_) => (),
                XmlNode::Eof => return Err(SchemaError::UnexpectedEof),
            }
        }
    }

    /// Text content of an element that may contain no child elements.
    fn text(&mut self, parent: &str, empty: bool) -> ReadResult<String> {
        let mut text = String::new();

        if empty {
            return Ok(text);
        }

        loop {
            match self.next()? {
                XmlNode::Text(t) => text.push_str(&t),
                XmlNode::Close => return Ok(text),
                XmlNode::Open { attrs, .. } => {
                    return Err(unexpected(parent, &attrs))
                }
                XmlNode::Eof => return Err(SchemaError::UnexpectedEof),
            }
        }
    }

    fn read(mut self) -> ReadResult<SchemaDecl> {
        let (attrs, empty) = loop {
            match self.next()? {
                XmlNode::Open { attrs, empty } => break (attrs, empty),
                XmlNode::Text(_) | XmlNode::Close => (),
                XmlNode::Eof => return Err(SchemaError::UnexpectedEof),
            }
        };

        if attrs.element != "record-definition" {
            return Err(unexpected("document", &attrs));
        }

        let prefix = attrs.require("prefix")?.to_string();
        let version = attrs.owned("version").unwrap_or_default();

        let mut root = None;
        let mut namespaces = Vec::new();
        let mut defs = Vec::new();
        let mut field_markers = Vec::new();
        let mut assertions = Vec::new();

        self.each_child(empty, |r, attrs, empty| {
            match attrs.element.as_str() {
                "namespaces" => r.each_child(empty, |r, attrs, empty| {
                    expect(&attrs, "namespaces", "namespace")?;
                    namespaces.push(Namespace {
                        prefix: attrs.require("prefix")?.to_string(),
                        uri: attrs.require("uri")?.to_string(),
                    });
                    r.each_child(empty, |_, attrs, _| {
                        Err(unexpected("namespace", &attrs))
                    })
                }),

                "attr-group" => {
                    defs.push(r.named(DefKind::AttrGroup, attrs, empty)?);
                    Ok(())
                }
                "elem-group" => {
                    defs.push(r.named(DefKind::ElemGroup, attrs, empty)?);
                    Ok(())
                }
                "template" => {
                    defs.push(r.named(DefKind::Template, attrs, empty)?);
                    Ok(())
                }

                "root" => {
                    root = Some(r.elem(attrs, empty)?);
                    Ok(())
                }

                "field-markers" => r.each_child(empty, |r, attrs, empty| {
                    expect(&attrs, "field-markers", "field-marker")?;
                    field_markers.push(FieldMarker {
                        name: attrs.require("name")?.to_string(),
                        kind: attrs.owned("type"),
                        path: required_path(&attrs, "path")?,
                    });
                    r.each_child(empty, |_, attrs, _| {
                        Err(unexpected("field-marker", &attrs))
                    })
                }),

                "assertions" => r.each_child(empty, |r, attrs, empty| {
                    expect(&attrs, "assertions", "assert")?;
                    let path = required_path(&attrs, "path")?;
                    let condition = r.text("assert", empty)?;
                    assertions.push(Assertion { path, condition });
                    Ok(())
                }),

                _ => Err(unexpected("record-definition", &attrs)),
            }
        })?;

        let root = root.ok_or(SchemaError::MissingRoot)?;

        Ok(SchemaDecl {
            prefix,
            version,
            namespaces,
            defs,
            root,
            field_markers,
            assertions,
        })
    }

    fn named(
        &mut self,
        kind: DefKind,
        attrs: Attrs,
        empty: bool,
    ) -> ReadResult<NamedDecl> {
        let name = attrs.require("name")?.to_string();
        let mut children = Vec::new();

        self.each_child(empty, |r, child, empty| {
            children.push(r.child(&attrs.element, child, empty)?);
            Ok(())
        })?;

        Ok(NamedDecl {
            kind,
            name,
            children,
        })
    }

    /// A child of an element or named definition.
    fn child(
        &mut self,
        parent: &str,
        attrs: Attrs,
        empty: bool,
    ) -> ReadResult<ChildDecl> {
        match attrs.element.as_str() {
            "attr" => Ok(ChildDecl::Attr(self.attr(attrs, empty)?)),
            "elem" => Ok(ChildDecl::Elem(self.elem(attrs, empty)?)),
            "attr-group" | "elem-group" => {
                let kind = if attrs.element == "attr-group" {
                    DefKind::AttrGroup
                } else {
                    DefKind::ElemGroup
                };

                let name = attrs.require("ref")?.to_string();
                self.each_child(empty, |_, child, _| {
                    Err(unexpected(&attrs.element, &child))
                })?;

                Ok(ChildDecl::Ref(kind, name))
            }
            _ => Err(unexpected(parent, &attrs)),
        }
    }

    fn attr(&mut self, attrs: Attrs, empty: bool) -> ReadResult<AttrDecl> {
        let mut attr = AttrDecl {
            required: attrs.flag("required")?,
            function: attrs.owned("function"),
            init: attrs.owned("init"),
            ..AttrDecl::new(attrs.tag(true)?)
        };

        self.each_child(empty, |r, child, empty| match child.element.as_str() {
            "doc" => {
                attr.doc = Some(r.text("doc", empty)?);
                Ok(())
            }
            _ => Err(unexpected("attr", &child)),
        })?;

        Ok(attr)
    }

    fn elem(&mut self, attrs: Attrs, empty: bool) -> ReadResult<ElemDecl> {
        let mut elem = ElemDecl {
            required: attrs.flag("required")?,
            singular: attrs.flag("singular")?,
            operator: attrs.parse("operator")?,
            function: attrs.owned("function"),
            init: attrs.owned("init"),
            template: attrs.owned("template"),
            ..ElemDecl::new(attrs.tag(false)?)
        };

        self.each_child(empty, |r, child, empty| {
            match child.element.as_str() {
                "doc" => elem.doc = Some(r.text("doc", empty)?),
                "opt-list" => elem.opt_list = Some(r.opt_list(child, empty)?),
                _ => elem.children.push(r.child(&attrs.element, child, empty)?),
            }

            Ok(())
        })?;

        Ok(elem)
    }

    fn opt_list(
        &mut self,
        attrs: Attrs,
        empty: bool,
    ) -> ReadResult<OptListDecl> {
        let value = attrs.require("value")?;

        let mut list = OptListDecl {
            dictionary: attrs.require("dictionary")?.to_string(),
            value: value.parse().map_err(|e| {
                SchemaError::invalid_attr("opt-list", "value", value, e)
            })?,
            key: attrs.parse("key")?,
            schema: attrs.parse("schema")?,
            schema_uri: attrs.parse("schema-uri")?,
            options: Vec::new(),
        };

        self.each_child(empty, |r, attrs, empty| {
            expect(&attrs, "opt-list", "opt")?;

            list.options.push(Opt {
                key: attrs.owned("key"),
                value: attrs.require("value")?.to_string(),
                schema: attrs.owned("schema"),
                schema_uri: attrs.owned("schema-uri"),
                hidden: attrs.flag("hidden")?,
            });

            r.each_child(empty, |_, child, _| Err(unexpected("opt", &child)))
        })?;

        Ok(list)
    }
}

fn unexpected(parent: &str, attrs: &Attrs) -> SchemaError {
    SchemaError::UnexpectedElement {
        parent: parent.to_string(),
        found: attrs.element.clone(),
    }
}

fn expect(attrs: &Attrs, parent: &str, name: &str) -> ReadResult<()> {
    if attrs.element == name {
        Ok(())
    } else {
        Err(unexpected(parent, attrs))
    }
}

fn required_path(attrs: &Attrs, key: &'static str) -> ReadResult<Path> {
    let raw = attrs.require(key)?;

    raw.parse()
        .map_err(|e| SchemaError::invalid_attr(&attrs.element, key, raw, e))
}
