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

//! Full unit definitions
//!
//! The catalog holds what the metadata index only summarizes: every declared
//! condition plus ordering hints and the beans a unit provides once accepted.

use crate::conditions::ConditionRule;
use crate::registry::BeanDefinition;
use autoconf_common::UnitName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: UnitName,
    #[serde(default)]
    pub conditions: Vec<ConditionRule>,
    /// Numeric precedence; lower runs earlier. Falls back to metadata when unset.
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub before: Vec<UnitName>,
    #[serde(default)]
    pub after: Vec<UnitName>,
    #[serde(default)]
    pub provides: Vec<BeanDefinition>,
}

impl UnitDefinition {
    pub fn new(name: impl Into<UnitName>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            order: None,
            before: Vec::new(),
            after: Vec::new(),
            provides: Vec::new(),
        }
    }

    pub fn with_condition(mut self, rule: ConditionRule) -> Self {
        self.conditions.push(rule);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn before(mut self, unit: impl Into<UnitName>) -> Self {
        self.before.push(unit.into());
        self
    }

    pub fn after(mut self, unit: impl Into<UnitName>) -> Self {
        self.after.push(unit.into());
        self
    }

    pub fn providing(mut self, bean: BeanDefinition) -> Self {
        self.provides.push(bean);
        self
    }

    /// Units without conditions are accepted unconditionally.
    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Source of full unit definitions
pub trait UnitCatalog: Send + Sync {
    fn definition(&self, name: &UnitName) -> Option<&UnitDefinition>;
}

/// Catalog backed by a map of definitions
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    definitions: HashMap<UnitName, UnitDefinition>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = UnitDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }

    pub fn insert(&mut self, definition: UnitDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl UnitCatalog for StaticCatalog {
    fn definition(&self, name: &UnitName) -> Option<&UnitDefinition> {
        self.definitions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = StaticCatalog::from_definitions([UnitDefinition::new("Alpha").with_order(5), UnitDefinition::new("Beta").after("Alpha")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.definition(&UnitName::from("Alpha")).and_then(|d| d.order), Some(5));
        assert_eq!(catalog.definition(&UnitName::from("Beta")).map(|d| d.after.clone()), Some(vec![UnitName::from("Alpha")]));
        assert!(catalog.definition(&UnitName::from("Gamma")).is_none());
    }

    #[test]
    fn test_definition_deserializes_from_toml() {
        let definition: UnitDefinition = toml::from_str(
            r#"
            name = "Cache"
            order = 10
            after = ["Alpha"]
            conditions = [{ kind = "on-class", symbols = ["X"] }, { kind = "on-single-candidate", types = ["Store"] }]
            provides = [{ name = "cacheManager", types = ["CacheManager"] }]
            "#,
        )
        .unwrap();
        assert_eq!(definition.name, UnitName::from("Cache"));
        assert_eq!(definition.conditions.len(), 2);
        assert_eq!(definition.provides[0].name, "cacheManager");
        assert!(!definition.is_unconditional());
    }
}
