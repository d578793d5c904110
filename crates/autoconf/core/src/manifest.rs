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

//! Build manifest
//!
//! A single TOML file describing everything a resolution pass needs: the
//! symbols present in the build, the candidate registry, condition metadata,
//! properties, pre-registered beans and full unit definitions.
//!
//! ```toml
//! classpath = ["X", "Y"]
//!
//! [factories]
//! auto-configuration = ["Alpha", "Beta"]
//!
//! [metadata]
//! "Alpha.ConditionalOnClass" = "X"
//!
//! [properties]
//! "feature.enabled" = "true"
//!
//! [[beans]]
//! name = "store"
//! types = ["Store"]
//! ```

use crate::catalog::{StaticCatalog, UnitDefinition};
use crate::config::EngineConfig;
use crate::environment::{Environment, PropertySource};
use crate::factories::FactoriesRegistry;
use crate::metadata::MetadataIndex;
use crate::oracle::StaticOracle;
use crate::registry::{BeanDefinition, InMemoryBeanRegistry};
use autoconf_common::UnitName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Name of the property source built from the manifest's `[properties]` table.
pub const MANIFEST_SOURCE: &str = "manifest";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Symbols present in the build
    pub classpath: Vec<String>,
    /// Symbols known to the build whose own dependencies are missing
    pub broken: Vec<String>,
    pub factories: BTreeMap<String, Vec<String>>,
    pub metadata: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
    pub beans: Vec<BeanDefinition>,
    pub units: Vec<UnitDefinition>,
    pub engine: EngineConfig,
}

impl Manifest {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = content.parse()?;
        debug!(path = %path.display(), units = manifest.units.len(), "Loaded build manifest");
        Ok(manifest)
    }

    pub fn oracle(&self) -> StaticOracle {
        StaticOracle::new(self.classpath.iter().cloned()).with_broken(self.broken.iter().cloned())
    }

    pub fn registry(&self) -> InMemoryBeanRegistry {
        InMemoryBeanRegistry::from_definitions(self.beans.iter().cloned())
    }

    pub fn property_source(&self) -> PropertySource {
        PropertySource::from_map(MANIFEST_SOURCE, self.properties.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Environment holding only the manifest's properties.
    pub fn environment(&self) -> Environment {
        Environment::new().with_source(self.property_source())
    }

    pub fn factories(&self) -> FactoriesRegistry {
        let mut registry = FactoriesRegistry::new();
        for (key, names) in &self.factories {
            registry.add(key.clone(), names.iter().map(|name| UnitName::new(name.as_str())));
        }
        registry
    }

    pub fn metadata(&self) -> MetadataIndex {
        MetadataIndex::from_pairs(self.metadata.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::from_definitions(self.units.iter().cloned())
    }
}

impl std::str::FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
