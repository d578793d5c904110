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

//! Bean registry query interface
//!
//! The engine only reads from the registry. Hosts that want accepted units to
//! be visible to later bean conditions register them through a
//! [`RegistrationListener`].

pub mod memory;

pub use memory::InMemoryBeanRegistry;

use crate::catalog::UnitDefinition;
use autoconf_common::UnitName;
use serde::{Deserialize, Serialize};

/// A registered bean as seen by registry conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanDefinition {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub primary: bool,
}

impl BeanDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            annotations: Vec::new(),
            primary: false,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

/// Read-only view of a (possibly hierarchical) bean registry.
///
/// `include_ancestors` extends a lookup from the current scope to every parent
/// scope. Implementations own their thread safety.
pub trait BeanRegistry: Send + Sync {
    /// Names of beans assignable to `type_name`, in registration order.
    fn bean_names_for_type(&self, type_name: &str, include_ancestors: bool) -> Vec<String>;

    /// Names of beans carrying `annotation`, in registration order.
    fn bean_names_for_annotation(&self, annotation: &str, include_ancestors: bool) -> Vec<String>;

    fn contains_bean(&self, name: &str, include_ancestors: bool) -> bool;

    /// Whether the named bean is marked primary in the scope that defines it.
    fn is_primary(&self, name: &str, include_ancestors: bool) -> bool;

    /// The enclosing scope, if any.
    fn parent(&self) -> Option<&dyn BeanRegistry>;
}

/// Hook invoked for each unit accepted during full evaluation.
pub trait RegistrationListener {
    fn unit_accepted(&self, unit: &UnitName, definition: Option<&UnitDefinition>);
}

/// Listener that ignores every acceptance
pub struct NoopListener;

impl RegistrationListener for NoopListener {
    fn unit_accepted(&self, _unit: &UnitName, _definition: Option<&UnitDefinition>) {}
}
