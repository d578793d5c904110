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

//! In-memory hierarchical bean registry

use super::{BeanDefinition, BeanRegistry, RegistrationListener};
use crate::catalog::UnitDefinition;
use autoconf_common::UnitName;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Registry scope holding bean definitions in registration order.
#[derive(Default)]
pub struct InMemoryBeanRegistry {
    beans: RwLock<Vec<BeanDefinition>>,
    parent: Option<Arc<InMemoryBeanRegistry>>,
}

impl InMemoryBeanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Arc<InMemoryBeanRegistry>) -> Self {
        Self {
            beans: RwLock::new(Vec::new()),
            parent: Some(parent),
        }
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = BeanDefinition>) -> Self {
        let registry = Self::new();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Registers a bean, replacing any existing bean with the same name in this scope.
    pub fn register(&self, definition: BeanDefinition) {
        let mut beans = self.beans.write();
        match beans.iter_mut().find(|existing| existing.name == definition.name) {
            Some(existing) => *existing = definition,
            None => beans.push(definition),
        }
    }

    pub fn len(&self) -> usize {
        self.beans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.read().is_empty()
    }

    fn local_names(&self, predicate: impl Fn(&BeanDefinition) -> bool) -> Vec<String> {
        self.beans.read().iter().filter(|bean| predicate(bean)).map(|bean| bean.name.clone()).collect()
    }

    fn with_ancestors(&self, mut names: Vec<String>, include_ancestors: bool, lookup: impl Fn(&InMemoryBeanRegistry) -> Vec<String>) -> Vec<String> {
        if include_ancestors && let Some(parent) = self.parent.as_deref() {
            for name in lookup(parent) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl BeanRegistry for InMemoryBeanRegistry {
    fn bean_names_for_type(&self, type_name: &str, include_ancestors: bool) -> Vec<String> {
        let local = self.local_names(|bean| bean.has_type(type_name));
        self.with_ancestors(local, include_ancestors, |parent| parent.bean_names_for_type(type_name, true))
    }

    fn bean_names_for_annotation(&self, annotation: &str, include_ancestors: bool) -> Vec<String> {
        let local = self.local_names(|bean| bean.has_annotation(annotation));
        self.with_ancestors(local, include_ancestors, |parent| parent.bean_names_for_annotation(annotation, true))
    }

    fn contains_bean(&self, name: &str, include_ancestors: bool) -> bool {
        if self.beans.read().iter().any(|bean| bean.name == name) {
            return true;
        }
        include_ancestors && self.parent.as_ref().is_some_and(|parent| parent.contains_bean(name, true))
    }

    fn is_primary(&self, name: &str, include_ancestors: bool) -> bool {
        if let Some(bean) = self.beans.read().iter().find(|bean| bean.name == name) {
            return bean.primary;
        }
        include_ancestors && self.parent.as_ref().is_some_and(|parent| parent.is_primary(name, true))
    }

    fn parent(&self) -> Option<&dyn BeanRegistry> {
        self.parent.as_deref().map(|parent| parent as &dyn BeanRegistry)
    }
}

/// Registers the beans an accepted unit provides, so later bean conditions see them.
impl RegistrationListener for InMemoryBeanRegistry {
    fn unit_accepted(&self, unit: &UnitName, definition: Option<&UnitDefinition>) {
        let Some(definition) = definition else {
            return;
        };
        for bean in &definition.provides {
            debug!(unit = %unit, bean = %bean.name, "Registering bean provided by accepted unit");
            self.register(bean.clone());
        }
    }
}
