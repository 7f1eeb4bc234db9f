// Value translation dictionaries
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

//! Static value-to-value translation tables.
//!
//! A [`Dictionary`] translates the distinct values observed at a source
//!   path into the values the output expects,
//!     most commonly the values of a controlled vocabulary
//!     (see [`OptionList`]).
//! Generated code consults the dictionary and emits nothing for a value
//!   that has no translation,
//!     so that untranslated source values never leak into the output.
//!
//! The set of observed values is supplied by a [`DomainValues`]
//!   collaborator.
//! Values are [normalized](normalize) both when the dictionary is built
//!   and when it is consulted.

use crate::{optlist::OptionList, path::Path};
use fxhash::FxHashMap;
use std::collections::{btree_map, BTreeMap};

/// Supplier of the distinct values observed at a source path.
pub trait DomainValues {
    fn values(&self, input: &Path) -> Vec<String>;
}

impl DomainValues for FxHashMap<Path, Vec<String>> {
    fn values(&self, input: &Path) -> Vec<String> {
        self.get(input).cloned().unwrap_or_default()
    }
}

/// Normalized form of a source value.
pub fn normalize(value: &str) -> &str {
    value.trim()
}

/// Translation table keyed by normalized source value.
///
/// Entries are kept sorted so that generated tables are deterministic.
/// An entry with an empty translation is awaiting a decision by the
///   curator and is treated as [`Lookup::NotFound`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary(BTreeMap<String, String>);

/// Result of consulting a [`Dictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from the values observed at `input`.
    ///
    /// See [`Dictionary::from_values`] for the initial translations.
    pub fn build<D: DomainValues + ?Sized>(
        domain: &D,
        input: &Path,
        vocabulary: Option<&OptionList>,
    ) -> Self {
        let dict = Self::from_values(domain.values(input), vocabulary);

        log::debug!(
            "built dictionary for `{input}`: {} entries, {} untranslated",
            dict.len(),
            dict.untranslated().count(),
        );

        dict
    }

    /// Build a dictionary from a set of values.
    ///
    /// Without a vocabulary every value initially translates to itself.
    /// With a vocabulary,
    ///   a value translates to the option whose value or key it names
    ///     (ignoring ASCII case),
    ///   and is left untranslated otherwise.
    pub fn from_values<I, S>(values: I, vocabulary: Option<&OptionList>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .filter_map(|value| {
                    let key = normalize(value.as_ref());

                    (!key.is_empty()).then(|| {
                        (key.to_string(), initial_translation(key, vocabulary))
                    })
                })
                .collect(),
        )
    }

    /// Reconcile this dictionary with the values currently observed at
    ///   `input`.
    ///
    /// Existing translations are kept,
    ///   values no longer observed are dropped,
    ///   and newly observed values receive their initial translation.
    pub fn rebuild<D: DomainValues + ?Sized>(
        &self,
        domain: &D,
        input: &Path,
        vocabulary: Option<&OptionList>,
    ) -> Self {
        let fresh = Self::from_values(domain.values(input), vocabulary);

        Self(
            fresh
                .0
                .into_iter()
                .map(|(key, initial)| match self.0.get(&key) {
                    Some(kept) => (key, kept.clone()),
                    None => (key, initial),
                })
                .collect(),
        )
    }

    /// Set the translation of `value`,
    ///   returning the previous translation.
    pub fn insert<K: AsRef<str>, V: Into<String>>(
        &mut self,
        value: K,
        translation: V,
    ) -> Option<String> {
        self.0
            .insert(normalize(value.as_ref()).to_string(), translation.into())
    }

    pub fn lookup(&self, value: &str) -> Lookup {
        match self.0.get(normalize(value)) {
            Some(t) if !t.is_empty() => Lookup::Found(t),
            _ => Lookup::NotFound,
        }
    }

    /// Subset of entries translating to exactly `translation`.
    pub fn translating_to(&self, translation: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(_, t)| t.as_str() == translation)
                .map(|(k, t)| (k.clone(), t.clone()))
                .collect(),
        )
    }

    /// Source values still awaiting a translation.
    pub fn untranslated(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, t)| t.is_empty())
            .map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();

        for (k, v) in iter {
            dict.insert(k, v);
        }

        dict
    }
}

fn initial_translation(key: &str, vocabulary: Option<&OptionList>) -> String {
    match vocabulary {
        None => key.to_string(),
        Some(list) => list
            .options
            .iter()
            .find(|opt| {
                let by_key = opt
                    .key
                    .as_deref()
                    .map_or(false, |k| k.eq_ignore_ascii_case(key));

                opt.value.eq_ignore_ascii_case(key) || by_key
            })
            .map(|opt| opt.value.clone())
            .unwrap_or_default(),
    }
}
