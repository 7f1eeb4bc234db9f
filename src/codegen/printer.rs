// Program printers
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

//! Render [`Program`]s as text.
//!
//! [`ScriptPrinter`] produces the builder-style script understood by the
//!   record interpreter:
//!
//! ```text
//! output {
//!     record {
//!         _input.'dc:title'[0] * { _dc_title ->
//!             title(_dc_title)
//!         }
//!     }
//! }
//! ```
//!
//! Every block the printer opens is closed by the same call that opened
//!   it,
//!     so braces in the output balance provided that authored code
//!     balances its own.

use super::{
    ir::{Cond, Expr, Program, Stmt},
    Focus, Options,
};
use crate::tag::Tag;

/// Renderer of a [`Program`].
pub trait Printer {
    /// Render `program`,
    ///   capturing the text of the mapping named by `focus`.
    fn print(&self, program: &Program, focus: Option<&Focus>) -> Printed;
}

/// Output of a [`Printer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printed {
    pub text: String,
    /// Text of the focused mapping,
    ///   relative to its own indentation.
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPrinter {
    indent: usize,
    header: Option<String>,
}

impl ScriptPrinter {
    pub fn new(options: &Options) -> Self {
        Self {
            indent: options.indent,
            header: options.header.clone(),
        }
    }
}

impl Default for ScriptPrinter {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl Printer for ScriptPrinter {
    fn print(&self, program: &Program, focus: Option<&Focus>) -> Printed {
        let mut w = Writer::new(self.indent, focus);

        if let Some(header) = &self.header {
            for line in header.lines() {
                w.line(format!("// {line}").trim_end());
            }
            w.blank();
        }

        if !program.prologue.is_empty() {
            w.stmts(&program.prologue);
            w.blank();
        }

        w.open("output {");
        w.stmts(&program.output);
        w.close("}");

        if !program.epilogue.is_empty() {
            w.blank();
            w.stmts(&program.epilogue);
        }

        Printed {
            text: w.out,
            focus: w.capture,
        }
    }
}

struct Writer<'f> {
    out: String,
    depth: usize,
    unit: usize,
    focus: Option<&'f Focus>,
    capture: Option<String>,
}

impl<'f> Writer<'f> {
    fn new(unit: usize, focus: Option<&'f Focus>) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            unit,
            focus,
            capture: None,
        }
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            self.out.push_str(&" ".repeat(self.depth * self.unit));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, head: &str) {
        self.line(head);
        self.depth += 1;
    }

    fn close(&mut self, tail: &str) {
        self.depth -= 1;
        self.line(tail);
    }

    fn block(&mut self, head: &str, body: &[Stmt]) {
        self.open(head);
        self.stmts(body);
        self.close("}");
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Comment(text) => {
                for line in text.lines() {
                    self.line(format!("// {line}").trim_end());
                }
            }

            Stmt::Namespace { prefix, uri } => {
                let (prefix, uri) = (quote(prefix), quote(uri));
                self.line(&format!("namespace({prefix}, {uri})"))
            }

            Stmt::Table { name, entries } if entries.is_empty() => {
                self.line(&format!("def {name} = [:]"))
            }

            Stmt::Table { name, entries } => {
                self.open(&format!("def {name} = ["));
                for (key, value) in entries {
                    self.line(&format!("{}: {},", quote(key), quote(value)));
                }
                self.close("]");
            }

            Stmt::LookupFn { name, table } => {
                self.open(&format!("def {name} = {{ value ->"));
                self.line(&format!(
                    "def translated = {table}[value.toString().trim()]"
                ));
                self.line("translated ? translated : ''");
                self.close("}");
            }

            Stmt::Loop {
                var,
                source,
                first,
                body,
            } => {
                let first = if *first { "[0]" } else { "" };
                let source = expr(source);
                self.block(&format!("{source}{first} * {{ {var} ->"), body);
            }

            Stmt::Bind { var, value, body } => {
                let value = expr(value);
                self.block(&format!("ifPresent({value}) {{ {var} ->"), body)
            }

            Stmt::Let { var, value } => {
                self.line(&format!("def {var} = {}", expr(value)))
            }

            Stmt::Compute {
                var,
                param,
                arg,
                body,
            } => {
                self.open(&format!("def {var} = {{ {param} ->"));
                self.stmts(body);
                self.close(&format!("}}({})", expr(arg)));
            }

            Stmt::If { cond, body } => {
                let cond = match cond {
                    Cond::Present(e) => expr(e),
                    Cond::Absent(tag) => {
                        format!("absent({})", quote(&tag.qname()))
                    }
                };

                self.block(&format!("if ({cond}) {{"), body);
            }

            Stmt::Element {
                tag,
                attrs,
                value,
                body,
            } => {
                let args: Vec<String> = attrs
                    .iter()
                    .map(|(attr, e)| {
                        format!("{}: {}", ident(&attr.qname()), expr(e))
                    })
                    .chain(value.iter().map(expr))
                    .collect();

                let name = ident(&tag.qname());
                let args = args.join(", ");

                match (args.is_empty(), body.is_empty()) {
                    (true, true) => self.line(&format!("{name}()")),
                    (false, true) => self.line(&format!("{name}({args})")),
                    (true, false) => self.block(&format!("{name} {{"), body),
                    (false, false) => {
                        self.block(&format!("{name}({args}) {{"), body)
                    }
                }
            }

            Stmt::Code(code) => {
                for line in code.lines() {
                    self.line(line.trim_end());
                }
            }

            Stmt::Mapping {
                output,
                input,
                body,
            } => {
                let capture = self.capture.is_none()
                    && self.focus.map_or(false, |f| {
                        &f.output == output && &f.input == input
                    });

                let start = self.out.len();
                self.stmts(body);

                if capture {
                    let margin = " ".repeat(self.depth * self.unit);

                    self.capture = Some(
                        self.out[start..]
                            .lines()
                            .map(|line| {
                                line.strip_prefix(margin.as_str())
                                    .unwrap_or(line)
                            })
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                }
            }

            Stmt::Assertion { path, condition } => {
                let path = quote(&path.to_string());
                self.open(&format!("assertion({path}) {{"));
                for line in condition.lines() {
                    self.line(line.trim());
                }
                self.close("}");
            }
        }
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Var(var) => var.clone(),
        Expr::Str(s) => quote(s),
        Expr::Nav { base, steps } => steps
            .iter()
            .fold(base.clone(), |acc, tag| format!("{acc}.{}", step(tag))),
        Expr::Join(e, delim) => {
            format!("{}*.text().join({})", expr(e), quote(delim))
        }
        Expr::First(e) => format!("{}[0]", expr(e)),
        Expr::Call(f, args) => format!(
            "{f}({})",
            args.iter().map(expr).collect::<Vec<_>>().join(", ")
        ),
        Expr::MapJoin { base, keys } => format!(
            "mapJoin({base}, {})",
            keys.iter()
                .map(|tag| quote(&source_name(tag)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Expr::Or(alternatives) => alternatives
            .iter()
            .map(expr)
            .collect::<Vec<_>>()
            .join(" ?: "),
    }
}

/// Name of a source tag as understood by navigation.
fn source_name(tag: &Tag) -> String {
    match tag.is_attribute() {
        true => format!("@{}", tag.qname()),
        false => tag.qname(),
    }
}

fn step(tag: &Tag) -> String {
    ident(&source_name(tag))
}

/// `name` as-is if it is a plain identifier,
///   otherwise quoted.
fn ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    match plain {
        true => name.to_string(),
        false => quote(name),
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');

    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }

    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(ident("title"), "title");
        assert_eq!(ident("dc:title"), "'dc:title'");
        assert_eq!(ident("@id"), "'@id'");
        assert_eq!(ident("2nd"), "'2nd'");
    }

    #[test]
    fn escapes_string_literals() {
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote("a\\b\nc"), r"'a\\b\nc'");
    }

    #[test]
    fn renders_navigation_and_joins() {
        let nav = Expr::Nav {
            base: "_input".into(),
            steps: vec![
                Tag::element(Some("dc"), "creator"),
                Tag::attribute(None::<&str>, "id"),
            ],
        };

        assert_eq!(expr(&nav), "_input.'dc:creator'.'@id'");
        assert_eq!(
            expr(&Expr::Join(Box::new(nav.clone()), "; ")),
            "_input.'dc:creator'.'@id'*.text().join('; ')"
        );
        assert_eq!(
            expr(&Expr::First(Box::new(nav))),
            "_input.'dc:creator'.'@id'[0]"
        );
        assert_eq!(
            expr(&Expr::MapJoin {
                base: "_a".into(),
                keys: vec![Tag::local("x"), Tag::attribute(None::<&str>, "y")],
            }),
            "mapJoin(_a, 'x', '@y')"
        );
    }

    #[test]
    fn computed_binding_applies_code_to_argument() {
        let mut w = Writer::new(4, None);

        w.stmt(&Stmt::Compute {
            var: "_attr_x".into(),
            param: "_at_id".into(),
            arg: Expr::First(Box::new(Expr::Nav {
                base: "_a".into(),
                steps: vec![Tag::attribute(None::<&str>, "id")],
            })),
            body: vec![Stmt::Code("_at_id.text().trim()".into())],
        });

        assert_eq!(
            w.out,
            "def _attr_x = { _at_id ->\n    _at_id.text().trim()\n}(_a.'@id'[0])\n"
        );
    }

    #[test]
    fn alternatives_fall_through() {
        assert_eq!(
            expr(&Expr::Or(vec![
                Expr::Var("_a".into()),
                Expr::Str("none".into()),
            ])),
            "_a ?: 'none'"
        );
    }

    #[test]
    fn header_becomes_comment() {
        let printer = ScriptPrinter::new(&Options {
            indent: 2,
            header: Some("Generated\n\nfor demo".into()),
        });

        let printed = printer.print(
            &Program {
                output: vec![Stmt::Element {
                    tag: Tag::local("root"),
                    attrs: vec![],
                    value: None,
                    body: vec![],
                }],
                ..Default::default()
            },
            None,
        );

        assert_eq!(
            printed.text,
            "// Generated\n//\n// for demo\n\noutput {\n  root()\n}\n"
        );
        assert_eq!(printed.focus, None);
    }
}
