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

//! Candidate registry
//!
//! Maps a capability key to the ordered list of candidate units registered for
//! it. Loaded once per process and never mutated after installation.

use crate::environment::{parse_properties, split_list};
use autoconf_common::UnitName;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

static GLOBAL: OnceLock<FactoriesRegistry> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactoriesRegistry {
    entries: HashMap<String, Vec<UnitName>>,
}

impl FactoriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `capability=UnitA,UnitB` entries. Repeated keys append.
    pub fn from_properties_str(text: &str) -> Self {
        let mut registry = Self::new();
        for (key, value) in parse_properties(text) {
            registry.add(key.trim(), split_list(&value).map(UnitName::from));
        }
        registry
    }

    /// Merges several sources in order. Duplicate names are kept; the engine
    /// deduplicates per resolution pass.
    pub fn from_sources<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut registry = Self::new();
        for text in texts {
            registry.merge(Self::from_properties_str(text));
        }
        registry
    }

    pub fn add(&mut self, key: impl Into<String>, names: impl IntoIterator<Item = UnitName>) {
        self.entries.entry(key.into()).or_default().extend(names);
    }

    pub fn merge(&mut self, other: FactoriesRegistry) {
        for (key, names) in other.entries {
            self.add(key, names);
        }
    }

    /// Candidate names for `key` in registration order; empty if unknown.
    pub fn load_factory_names(&self, key: &str) -> Vec<UnitName> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Installs the process-wide registry. Fails, returning the rejected
    /// registry, if one is already installed.
    pub fn install(self) -> Result<&'static FactoriesRegistry, FactoriesRegistry> {
        GLOBAL.set(self)?;
        let installed = GLOBAL.get().ok_or_else(FactoriesRegistry::new)?;
        debug!(keys = installed.entries.len(), "Installed process-wide candidate registry");
        Ok(installed)
    }

    /// The process-wide registry, if installed.
    pub fn global() -> Option<&'static FactoriesRegistry> {
        GLOBAL.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &FactoriesRegistry, key: &str) -> Vec<String> {
        registry.load_factory_names(key).into_iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_and_load() {
        let registry = FactoriesRegistry::from_properties_str("auto-configuration=Alpha,\\\n  Beta,Gamma\nlisteners=L1");
        assert_eq!(names(&registry, "auto-configuration"), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(names(&registry, "listeners"), vec!["L1"]);
        assert!(names(&registry, "missing").is_empty());
    }

    #[test]
    fn test_merge_preserves_order_and_duplicates() {
        let registry = FactoriesRegistry::from_sources(["auto-configuration=A,B", "auto-configuration=A,C"]);
        assert_eq!(names(&registry, "auto-configuration"), vec!["A", "B", "A", "C"]);
    }

    #[test]
    fn test_install_once() {
        let mut first = FactoriesRegistry::new();
        first.add("auto-configuration", [UnitName::from("Installed")]);
        let installed = first.install().unwrap();
        assert_eq!(installed.load_factory_names("auto-configuration"), vec![UnitName::from("Installed")]);

        let rejected = FactoriesRegistry::from_properties_str("auto-configuration=Other").install();
        assert!(rejected.is_err());
        assert_eq!(FactoriesRegistry::global().map(|g| g.load_factory_names("auto-configuration").len()), Some(1));
    }
}
