// Qualified tag names
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

//! Tags naming a single step of a [`Path`](crate::path::Path).
//!
//! A [`Tag`] is a qualified XML name
//!   (optional namespace prefix and a local name)
//!   that additionally knows whether it names an attribute,
//!     how deep a recurring tag of the same name sits
//!     (its _descendancy_),
//!     and which option of a controlled vocabulary it selects
//!     (its _variant key_).
//!
//! Tags have a textual form that round-trips through [`FromStr`]:
//!
//! ```
//! use recmap::tag::Tag;
//!
//! let tag: Tag = "@xml:lang".parse().unwrap();
//! assert!(tag.is_attribute());
//! assert_eq!(tag.prefix(), Some("xml"));
//! assert_eq!(tag.local_name(), "lang");
//!
//! let tag: Tag = "type[book]".parse().unwrap();
//! assert_eq!(tag.variant(), Some("book"));
//! assert_eq!(tag.to_string(), "type[book]");
//! ```
//!
//! Within a variant key,
//!   `\`, `[`, `]`, and `/` are escaped with a preceding `\`,
//!   so that any option value can appear in the text of a path.

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    str::FromStr,
};

/// Qualified name of an element or attribute.
///
/// Equality is structural.
/// Ordering places namespaced tags first,
///   then elements before attributes,
///   then sorts by prefix,
///     local name,
///     descendancy,
///     and variant key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    attr: bool,
    prefix: Option<String>,
    local: String,
    descendancy: u32,
    variant: Option<String>,
}

assert_impl_all!(Tag: Send, Sync);

impl Tag {
    /// Element tag with an optional namespace prefix.
    pub fn element<P: Into<String>, L: Into<String>>(
        prefix: Option<P>,
        local: L,
    ) -> Self {
        Self {
            attr: false,
            prefix: prefix.map(Into::into),
            local: local.into(),
            descendancy: 0,
            variant: None,
        }
    }

    /// Attribute tag with an optional namespace prefix.
    pub fn attribute<P: Into<String>, L: Into<String>>(
        prefix: Option<P>,
        local: L,
    ) -> Self {
        Self {
            attr: true,
            ..Self::element(prefix, local)
        }
    }

    /// Unprefixed element tag.
    pub fn local<L: Into<String>>(local: L) -> Self {
        Self::element(None::<String>, local)
    }

    pub fn is_attribute(&self) -> bool {
        self.attr
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn descendancy(&self) -> u32 {
        self.descendancy
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Qualified name without attribute marker,
    ///   descendancy,
    ///   or variant key
    ///     (e.g. `dc:title`).
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Copy of this tag selecting the option identified by `key`.
    pub fn with_variant<K: Into<String>>(&self, key: K) -> Self {
        Self {
            variant: Some(key.into()),
            ..self.clone()
        }
    }

    /// Copy of this tag with any variant key stripped.
    pub fn without_variant(&self) -> Self {
        Self {
            variant: None,
            ..self.clone()
        }
    }

    /// Whether two tags name the same element or attribute,
    ///   disregarding variant keys.
    pub fn same_name(&self, other: &Tag) -> bool {
        self.attr == other.attr
            && self.prefix == other.prefix
            && self.local == other.local
            && self.descendancy == other.descendancy
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        // `None` would normally sort first;
        //   namespaced tags are listed before unqualified ones.
        other
            .prefix
            .is_some()
            .cmp(&self.prefix.is_some())
            .then_with(|| self.attr.cmp(&other.attr))
            .then_with(|| self.prefix.cmp(&other.prefix))
            .then_with(|| self.local.cmp(&other.local))
            .then_with(|| self.descendancy.cmp(&other.descendancy))
            .then_with(|| self.variant.cmp(&other.variant))
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attr {
            f.write_str("@")?;
        }

        f.write_str(&self.qname())?;

        if self.descendancy > 0 {
            write!(f, "#{}", self.descendancy)?;
        }

        if let Some(key) = &self.variant {
            f.write_str("[")?;

            for c in key.chars() {
                if is_variant_reserved(c) {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }

            f.write_str("]")?;
        }

        Ok(())
    }
}

/// Tag text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Tag text or one of its components is empty.
    Empty(String),
    /// Tag contains a character that cannot appear in a name.
    InvalidChar(String, char),
    /// Descendancy suffix is not an unsigned integer.
    BadDescendancy(String),
    /// Variant key is opened with `[` but never closed.
    UnclosedVariant(String),
}

impl Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(s) => write!(f, "empty tag name in `{s}`"),
            Self::InvalidChar(s, c) => {
                write!(f, "invalid character `{c}` in tag `{s}`")
            }
            Self::BadDescendancy(s) => {
                write!(f, "descendancy of tag `{s}` is not a number")
            }
            Self::UnclosedVariant(s) => {
                write!(f, "variant key of tag `{s}` is missing `]`")
            }
        }
    }
}

impl std::error::Error for TagError {}

fn check_name(whole: &str, name: &str) -> Result<(), TagError> {
    if name.is_empty() {
        return Err(TagError::Empty(whole.into()));
    }

    let reserved = |c: &char| matches!(c, '/' | ':' | '@' | '[' | ']' | '#');

    match name.chars().find(|c| c.is_whitespace() || reserved(c)) {
        Some(c) => Err(TagError::InvalidChar(whole.into(), c)),
        None => Ok(()),
    }
}

/// Characters escaped with `\` within the text of a variant key.
///
/// Keys are option values and may contain path delimiters.
fn is_variant_reserved(c: char) -> bool {
    matches!(c, '\\' | '[' | ']' | '/')
}

/// Unescape the variant key `text` following its opening `[`;
///   its closing `]` must end the tag.
fn parse_variant(whole: &str, text: &str) -> Result<String, TagError> {
    let mut key = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => key.push(escaped),
                None => break,
            },
            ']' if !chars.as_str().is_empty() => {
                return Err(TagError::InvalidChar(whole.into(), c));
            }
            ']' if key.is_empty() => return Err(TagError::Empty(whole.into())),
            ']' => return Ok(key),
            _ => key.push(c),
        }
    }

    Err(TagError::UnclosedVariant(whole.into()))
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attr, rest) = match s.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (rest, variant) = match rest.find('[') {
            Some(i) => (&rest[..i], Some(parse_variant(s, &rest[i + 1..])?)),
            None => (rest, None),
        };

        let (rest, descendancy) = match rest.split_once('#') {
            Some((name, n)) => (
                name,
                n.parse::<u32>()
                    .map_err(|_| TagError::BadDescendancy(s.into()))?,
            ),
            None => (rest, 0),
        };

        let (prefix, local) = match rest.split_once(':') {
            Some((prefix, local)) => {
                check_name(s, prefix)?;
                (Some(prefix.to_string()), local)
            }
            None => (None, rest),
        };

        check_name(s, local)?;

        Ok(Self {
            attr,
            prefix,
            local: local.to_string(),
            descendancy,
            variant,
        })
    }
}
