// RECMAP compiler
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

//! This is the record mapping compiler.
//!
//! `recmapc` reads a record definition,
//!   attaches the mappings given on the command line,
//!   and prints the generated transformation program.

extern crate recmap;

use getopts::{Fail, Options};
use log::LevelFilter;
use recmap::{
    codegen::{self, Focus},
    diagnose::{AnnotatedPath, Diagnostic, Reporter, VisualReporter},
    mapping::{AttachError, NoSnippets, NodeMapping},
    node::MappingTree,
    operator::Operator,
    path::Path,
    schema::{self, SchemaError},
};
use std::{
    env,
    error::Error,
    fmt::{self, Display},
    fs::{self, File},
    io::{self, BufReader, Write},
};

/// Types of commands
enum Command {
    Compile(Job),
    List(String),
    Usage,
}

/// A single compilation requested on the command line.
struct Job {
    schema: String,
    mappings: Vec<NodeMapping>,
    focus: Option<Focus>,
    output: Option<String>,
}

/// Print every mapping node of the record definition at `src_path`,
///   one per line with its role,
///   schema flags,
///   and the first line of its documentation.
fn list(src_path: &str) -> Result<(), RecmapcError> {
    let tree = load(src_path)?;
    let mut out = String::new();

    for id in tree.ids() {
        let node = tree.node(id);

        out.push_str(&node.path().to_string());

        if let Some(role) = node.role() {
            out.push_str(&format!(" ({role})"));
        }
        if tree.is_hidden(id) {
            out.push_str(" hidden");
        }
        if node.is_required() {
            out.push_str(" required");
        }
        if let Some(function) = node.function() {
            out.push_str(&format!(" function={function}"));
        }
        if let Some(init) = node.init() {
            out.push_str(&format!(" init={init:?}"));
        }
        if let Some(doc) = node.doc().and_then(|d| d.lines().next()) {
            out.push_str(&format!(" -- {}", doc.trim()));
        }

        out.push('\n');
    }

    io::stdout().write_all(out.as_bytes())?;
    Ok(())
}

fn load(src_path: &str) -> Result<MappingTree, RecmapcError> {
    let file = BufReader::new(File::open(src_path)?);

    Ok(MappingTree::new(schema::load(file)?))
}

/// Compile the mappings of `job`,
///   writing the program to its destination.
fn compile<R: Reporter>(
    job: Job,
    reporter: &mut R,
) -> Result<(), RecmapcError> {
    let mut tree = load(&job.schema)?;

    for mapping in job.mappings {
        let event = tree.attach(mapping)?;
        log::debug!("{}: {}", event.kind, tree.node(event.node).path());
    }

    let options = codegen::Options {
        header: Some(format!(
            "{} {} (generated by recmapc)",
            tree.prefix(),
            tree.version()
        )),
        ..Default::default()
    };

    let generated =
        codegen::generate(&tree, &NoSnippets, &options, job.focus.as_ref());

    for gap in &generated.gaps {
        // Rendering to a string ensures buffering so that we don't
        //   interleave output between processes.
        let report = reporter.render(gap).to_string();
        eprint!("{report}");
    }

    let text = generated.focus.unwrap_or(generated.text);

    match &job.output {
        Some(dest) => fs::write(dest, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }

    Ok(())
}

fn init_logger(verbosity: usize) {
    let mut builder = env_logger::Builder::from_default_env();

    match verbosity {
        0 => builder.filter_level(LevelFilter::Warn),
        1 => builder.filter_level(LevelFilter::Debug),
        _ => builder.filter_level(LevelFilter::Trace),
    };

    // RUST_LOG directives still take precedence.
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.format_timestamp(None).init();
}

/// Entrypoint for the compiler
pub fn main() -> Result<(), RecmapcError> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage = opts.usage(&format!("Usage: {} [OPTIONS] SCHEMA", program));

    init_logger(
        opts.parse(&args[1..])
            .map(|m| m.opt_count("v"))
            .unwrap_or(0),
    );

    match parse_options(opts, args) {
        Ok(Command::Compile(job)) => {
            let mut reporter = VisualReporter::new();
            let schema = job.schema.clone();

            compile(job, &mut reporter).or_else(|e: RecmapcError| {
                let report = reporter.render(&e).to_string();
                eprintln!("{report}\nfatal: failed to compile `{schema}`");

                std::process::exit(1);
            })
        }
        Ok(Command::List(schema)) => list(&schema).or_else(|e: RecmapcError| {
            let report = VisualReporter::new().render(&e).to_string();
            eprintln!("{report}\nfatal: failed to read `{schema}`");

            std::process::exit(1);
        }),
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optmulti(
        "m",
        "map",
        "map source path(s) onto an output node",
        "OUT=IN[,SIB...][:OP]",
    );
    opts.optmulti(
        "c",
        "const",
        "map a constant onto an output node",
        "OUT=VALUE",
    );
    opts.optopt(
        "",
        "focus",
        "print only the text of a single mapping",
        "OUT[=IN]",
    );
    opts.optflag("", "list", "list mapping nodes and exit");
    opts.optopt("o", "output", "set output file name", "NAME");
    opts.optflagmulti("v", "verbose", "increase log verbosity");
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    let schema = match matches.free.len() {
        0 => return Err(Fail::OptionMissing(String::from("SCHEMA"))),
        1 => matches.free[0].clone(),
        _ => return Err(Fail::UnrecognizedOption(matches.free[1].clone())),
    };

    if matches.opt_present("list") {
        return Ok(Command::List(schema));
    }

    let mut mappings = matches
        .opt_strs("m")
        .iter()
        .map(|spec| {
            parse_mapping(spec).map_err(|e| {
                Fail::ArgumentMissing(format!(
                    "--map OUT=IN[,SIB...][:OP] (`{spec}`: {e})"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for spec in matches.opt_strs("c") {
        let constant = parse_constant(&spec).map_err(|e| {
            Fail::ArgumentMissing(format!("--const OUT=VALUE (`{spec}`: {e})"))
        })?;

        mappings.push(constant);
    }

    let focus = match matches.opt_str("focus") {
        Some(spec) => Some(parse_focus(&spec, &mappings).map_err(|e| {
            Fail::ArgumentMissing(format!("--focus OUT[=IN] (`{spec}`: {e})"))
        })?),
        None => None,
    };

    Ok(Command::Compile(Job {
        schema,
        mappings,
        focus,
        output: matches.opt_str("o"),
    }))
}

/// Parse `OUT=IN[,SIB...][:OP]`.
///
/// Since qualified tags also contain `:`,
///   a trailing `:OP` is recognized only if it names an operator.
fn parse_mapping(spec: &str) -> Result<NodeMapping, String> {
    let (output, rest) = spec.split_once('=').ok_or("missing `=`")?;

    let (inputs, op) = match rest.rsplit_once(':') {
        Some((inputs, op)) => match op.parse::<Operator>() {
            Ok(op) => (inputs, Some(op)),
            Err(_) => (rest, None),
        },
        None => (rest, None),
    };

    let mut paths = inputs
        .split(',')
        .map(|s| s.parse::<Path>().map_err(|e| e.to_string()));

    let input = paths.next().ok_or("missing input path")??;
    let siblings = paths.collect::<Result<Vec<_>, _>>()?;

    let output = output.parse::<Path>().map_err(|e| e.to_string())?;
    let mapping = NodeMapping::new(input, output).with_siblings(siblings);

    Ok(match op {
        Some(op) => mapping.with_operator(op),
        None => mapping,
    })
}

/// Parse `OUT=VALUE`.
fn parse_constant(spec: &str) -> Result<NodeMapping, String> {
    let (output, value) = spec.split_once('=').ok_or("missing `=`")?;
    let output = output.parse::<Path>().map_err(|e| e.to_string())?;

    Ok(NodeMapping::constant(output, value))
}

/// Parse `OUT[=IN]`.
///
/// Without an input,
///   the first mapping of `OUT` given on the command line is focused.
fn parse_focus(spec: &str, mappings: &[NodeMapping]) -> Result<Focus, String> {
    let (output, input) = match spec.split_once('=') {
        Some((output, input)) => (output, Some(input)),
        None => (spec, None),
    };

    let output = output.parse::<Path>().map_err(|e| e.to_string())?;

    let input = match input {
        Some(input) => input.parse::<Path>().map_err(|e| e.to_string())?,
        None => mappings
            .iter()
            .find(|m| m.output == output)
            .map(|m| m.input.clone())
            .ok_or("no mapping of OUT was given")?,
    };

    Ok(Focus { output, input })
}

/// Compiler (`recmapc`) error.
///
/// This represents the aggregation of all possible errors that can occur
///   during compile-time.
#[derive(Debug)]
pub enum RecmapcError {
    Io(io::Error),
    Schema(SchemaError),
    Attach(AttachError),
}

impl From<io::Error> for RecmapcError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SchemaError> for RecmapcError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

impl From<AttachError> for RecmapcError {
    fn from(e: AttachError) -> Self {
        Self::Attach(e)
    }
}

impl Display for RecmapcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => Display::fmt(e, f),
            Self::Schema(e) => Display::fmt(e, f),
            Self::Attach(e) => Display::fmt(e, f),
        }
    }
}

impl Error for RecmapcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Schema(e) => Some(e),
            Self::Attach(e) => Some(e),
        }
    }
}

impl Diagnostic for RecmapcError {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::Schema(e) => e.describe(),
            Self::Attach(e) => e.describe(),

            // Falls back to rendering just the error `Display`.
            Self::Io(_) => vec![],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(rest: &[&str]) -> Vec<String> {
        std::iter::once("program")
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }

    fn p(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn parse_options_help() {
        match parse_options(get_opts(), args(&["-h"])) {
            Ok(Command::Usage) => {}
            _ => panic!("Help option did not parse"),
        }
    }

    #[test]
    fn parse_options_invalid() {
        match parse_options(get_opts(), args(&["-q"])) {
            Err(Fail::UnrecognizedOption(_)) => {}
            _ => panic!("Invalid option not caught"),
        }
    }

    #[test]
    fn parse_options_missing_schema() {
        match parse_options(get_opts(), args(&["-m", "/r/a=/s/a"])) {
            Err(Fail::OptionMissing(missing)) => assert_eq!(missing, "SCHEMA"),
            _ => panic!("Missing schema not caught"),
        }
    }

    #[test]
    fn parse_options_list() {
        match parse_options(get_opts(), args(&["--list", "demo.xml"])) {
            Ok(Command::List(schema)) => assert_eq!(schema, "demo.xml"),
            _ => panic!("List did not parse"),
        }
    }

    #[test]
    fn parse_options_compile() {
        let result = parse_options(
            get_opts(),
            args(&[
                "demo.xml",
                "-m",
                "/r/title=/s/dc:title:first",
                "-c",
                "/r/rights=CC0",
                "--focus",
                "/r/title",
                "-o",
                "out.groovy",
            ]),
        );

        match result {
            Ok(Command::Compile(job)) => {
                assert_eq!(job.schema, "demo.xml");
                assert_eq!(job.output.as_deref(), Some("out.groovy"));
                assert_eq!(job.mappings.len(), 2);
                assert_eq!(job.mappings[0].operator, Some(Operator::First));
                assert!(job.mappings[1].is_constant());
                assert_eq!(
                    job.focus,
                    Some(Focus {
                        output: p("/r/title"),
                        input: p("/s/dc:title"),
                    })
                );
            }
            _ => panic!("Compile did not parse"),
        }
    }

    #[test]
    fn qualified_tag_is_not_an_operator() {
        let m = parse_mapping("/r/title=/s/dc:title").unwrap();

        assert_eq!(m.input, p("/s/dc:title"));
        assert_eq!(m.operator, None);
    }

    #[test]
    fn siblings_and_delimiter() {
        let m = parse_mapping("/r/rights=/s/a/x,/s/a/y:semicolon").unwrap();

        assert_eq!(m.input, p("/s/a/x"));
        assert_eq!(m.siblings, vec![p("/s/a/y")]);
        assert_eq!(m.operator, Some(Operator::SemicolonDelim));
    }

    #[test]
    fn malformed_mapping_is_usage_error() {
        match parse_options(get_opts(), args(&["demo.xml", "-m", "/r/title"])) {
            Err(Fail::ArgumentMissing(msg)) => assert!(msg.contains("--map")),
            _ => panic!("Malformed mapping not caught"),
        }
    }
}
