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

//! Engine configuration

use crate::environment::Environment;
use crate::exclusions::ExclusionPolicy;
use crate::prefilter::PrefilterMode;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENABLED_PROPERTY: &str = "autoconfigure.enabled";
pub const PREFILTER_MODE_PROPERTY: &str = "autoconfigure.prefilter.mode";
pub const EXCLUSION_POLICY_PROPERTY: &str = "autoconfigure.exclusion.policy";
pub const CAPABILITY_PROPERTY: &str = "autoconfigure.capability";

/// Capability key whose candidates are resolved by default.
pub const DEFAULT_CAPABILITY_KEY: &str = "auto-configuration";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Registry key that lists the candidate units
    pub capability_key: String,
    pub prefilter_mode: PrefilterMode,
    pub exclusion_policy: ExclusionPolicy,
    /// Master switch; when off, resolution accepts nothing.
    pub enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capability_key: DEFAULT_CAPABILITY_KEY.to_string(),
            prefilter_mode: PrefilterMode::default(),
            exclusion_policy: ExclusionPolicy::default(),
            enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn from_environment(environment: &Environment) -> Self {
        Self::default().overridden_by(environment)
    }

    /// Applies property overrides. Invalid values are logged and the current value kept.
    pub fn overridden_by(mut self, environment: &Environment) -> Self {
        if let Some(raw) = environment.get_property(ENABLED_PROPERTY) {
            match environment.get_bool(ENABLED_PROPERTY) {
                Some(enabled) => self.enabled = enabled,
                None => warn!(property = ENABLED_PROPERTY, value = raw, "Invalid boolean, keeping {}", self.enabled),
            }
        }

        if let Some(raw) = environment.get_property(PREFILTER_MODE_PROPERTY) {
            match raw.parse::<PrefilterMode>() {
                Ok(mode) => self.prefilter_mode = mode,
                Err(err) => warn!(property = PREFILTER_MODE_PROPERTY, "{err}, keeping {}", self.prefilter_mode),
            }
        }

        if let Some(raw) = environment.get_property(EXCLUSION_POLICY_PROPERTY) {
            match raw.parse::<ExclusionPolicy>() {
                Ok(policy) => self.exclusion_policy = policy,
                Err(err) => warn!(property = EXCLUSION_POLICY_PROPERTY, "{err}, keeping {}", self.exclusion_policy),
            }
        }

        if let Some(raw) = environment.get_property(CAPABILITY_PROPERTY) {
            let key = raw.trim();
            if key.is_empty() {
                warn!(property = CAPABILITY_PROPERTY, "Empty capability key, keeping {}", self.capability_key);
            } else {
                self.capability_key = key.to_string();
            }
        }

        self
    }
}
