// Record mapping compiler (RECMAP)
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

//! Compiler for declarative record mappings.
//!
//! A curator attaches [`NodeMapping`](mapping::NodeMapping)s to the nodes
//!   of a [`MappingTree`](node::MappingTree),
//!     which is instantiated from a resolved [record
//!     definition](schema::RecDef).
//! The [code generator](codegen) then walks that tree in schema
//!   declaration order to produce a transformation program for an
//!   external interpreter.
//!
//! The pipeline looks like this:
//!
//! ```text
//!   XML record definition --(schema::reader)--> SchemaDecl
//!     --(schema::resolve)--> RecDef
//!     --(node::MappingTree::new)--> MappingTree (+ NodeMappings)
//!     --(codegen::generate)--> ir::Program
//!     --(codegen::Printer)--> program text
//! ```

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;
#[cfg(test)]
#[macro_use]
extern crate lazy_static;

pub mod codegen;
pub mod diagnose;
pub mod dictionary;
pub mod mapping;
pub mod node;
pub mod operator;
pub mod optlist;
pub mod path;
pub mod schema;
pub mod tag;

#[cfg(test)]
pub mod test;
