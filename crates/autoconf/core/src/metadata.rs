// Autoconf
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Precomputed condition metadata
//!
//! A flat index of `<unit>.<key> = value` entries produced ahead of time, so
//! the pre-filter can reject units without loading their full definitions.
//! A missing entry always means "no opinion".

use crate::environment::{parse_properties, split_list};
use crate::error::MetadataError;
use autoconf_common::ConditionKind;
use std::collections::HashMap;
use tracing::debug;

/// Metadata key for a unit's numeric precedence.
pub const ORDER_KEY: &str = "AutoConfigureOrder";
/// Metadata key for units that must come after this one.
pub const BEFORE_KEY: &str = "AutoConfigureBefore";
/// Metadata key for units that must come before this one.
pub const AFTER_KEY: &str = "AutoConfigureAfter";

/// Read-only after construction; shared freely across pre-filter threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataIndex {
    entries: HashMap<String, String>,
}

impl MetadataIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn from_properties_str(text: &str) -> Self {
        Self::from_pairs(parse_properties(text))
    }

    /// Merges several property texts; later sources override earlier ones.
    pub fn from_sources<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::empty();
        for text in texts {
            index.entries.extend(parse_properties(text));
        }
        debug!(entries = index.entries.len(), "Loaded condition metadata");
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the metadata generator saw `unit` at all (it writes a bare `<unit>=` entry).
    pub fn was_processed(&self, unit: &str) -> bool {
        self.entries.contains_key(unit)
    }

    pub fn get(&self, unit: &str, key: &str) -> Option<&str> {
        self.entries.get(&format!("{unit}.{key}")).map(String::as_str)
    }

    /// Raw declaration for a condition kind, e.g. the comma list of required symbols.
    pub fn lookup(&self, unit: &str, kind: ConditionKind) -> Option<&str> {
        self.get(unit, kind.metadata_key())
    }

    /// Comma-delimited entry as distinct items in declaration order.
    pub fn get_set(&self, unit: &str, key: &str) -> Option<Vec<String>> {
        let value = self.get(unit, key)?;
        let mut items: Vec<String> = Vec::new();
        for item in split_list(value) {
            if !items.iter().any(|existing| existing == item) {
                items.push(item.to_string());
            }
        }
        Some(items)
    }

    pub fn get_integer(&self, unit: &str, key: &str) -> Result<Option<i32>, MetadataError> {
        let Some(value) = self.get(unit, key) else {
            return Ok(None);
        };
        value.trim().parse::<i32>().map(Some).map_err(|_| MetadataError::InvalidInteger {
            key: format!("{unit}.{key}"),
            value: value.to_string(),
        })
    }
}
