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

//! Property environment
//!
//! An ordered list of named property sources. Lookups walk the sources in
//! order and the first source that defines a key wins.

pub mod properties;

pub use properties::{parse_properties, split_list};

use std::collections::{BTreeMap, HashSet};

/// Name given to the source built from process environment variables.
pub const SYSTEM_ENVIRONMENT: &str = "systemEnvironment";

/// Prefix of process environment variables bound into the environment.
pub const ENV_VAR_PREFIX: &str = "AUTOCONFIGURE_";

/// Named set of properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySource {
    name: String,
    properties: BTreeMap<String, String>,
    hidden: HashSet<String>,
}

impl PropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_map<K, V>(name: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            hidden: HashSet::new(),
        }
    }

    /// Parses property-format text. The last definition of a key wins.
    pub fn from_properties_str(name: impl Into<String>, text: &str) -> Self {
        Self::from_map(name, parse_properties(text))
    }

    /// Binds variables starting with [`ENV_VAR_PREFIX`] by relaxed naming:
    /// `AUTOCONFIGURE_PREFILTER_MODE` becomes `autoconfigure.prefilter.mode`.
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let properties = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(ENV_VAR_PREFIX))
            .map(|(key, value)| (key.to_lowercase().replace('_', "."), value));
        Self::from_map(SYSTEM_ENVIRONMENT, properties)
    }

    /// Binds the current process environment.
    pub fn system_environment() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if self.hidden.contains(key) {
            return None;
        }
        self.properties.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Keys visible through this source, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().filter(|key| !self.hidden.contains(*key)).map(String::as_str)
    }

    fn filtered(&self, hidden: &[&str]) -> Self {
        let mut filtered = self.clone();
        filtered.hidden.extend(hidden.iter().map(|key| key.to_string()));
        filtered
    }
}

/// Ordered property sources; the first source defining a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    sources: Vec<PropertySource>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: PropertySource) -> Self {
        self.add_last(source);
        self
    }

    /// Adds a source with the highest precedence.
    pub fn add_first(&mut self, source: PropertySource) {
        self.sources.insert(0, source);
    }

    /// Adds a source with the lowest precedence.
    pub fn add_last(&mut self, source: PropertySource) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[PropertySource] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&PropertySource> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// Comma-delimited value as trimmed, non-empty items. Absent keys yield an empty list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get_property(key).map(|value| split_list(value).map(str::to_string).collect()).unwrap_or_default()
    }

    /// Boolean value; `None` when the key is absent or not `true`/`false`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let value = self.get_property(key)?.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Runs `operation` against a view in which `hidden` keys of the named
    /// source are invisible. The environment itself is left untouched.
    pub fn with_filtered_source<R>(&self, source_name: &str, hidden: &[&str], operation: impl FnOnce(&Environment) -> R) -> R {
        if self.source(source_name).is_none() {
            return operation(self);
        }
        let view = Environment {
            sources: self
                .sources
                .iter()
                .map(|source| if source.name == source_name { source.filtered(hidden) } else { source.clone() })
                .collect(),
        };
        operation(&view)
    }
}
