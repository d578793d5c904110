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

//! Candidate deduplication and exclusion handling

use crate::environment::Environment;
use crate::error::ResolutionError;
use crate::oracle::ClassPresenceOracle;
use autoconf_common::UnitName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Property listing additional units to exclude, comma-delimited.
pub const EXCLUDE_PROPERTY: &str = "autoconfigure.exclude";

/// Which explicit exclusions are rejected as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionPolicy {
    /// Every exclusion must name a candidate.
    #[default]
    Strict,
    /// Only exclusions naming a present symbol that is not a candidate are
    /// rejected; names unknown to the build are ignored.
    Lenient,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown exclusion policy: {0} (expected strict or lenient)")]
pub struct UnknownExclusionPolicy(pub String);

impl FromStr for ExclusionPolicy {
    type Err = UnknownExclusionPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ExclusionPolicy::Strict),
            "lenient" => Ok(ExclusionPolicy::Lenient),
            _ => Err(UnknownExclusionPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ExclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionPolicy::Strict => f.write_str("strict"),
            ExclusionPolicy::Lenient => f.write_str("lenient"),
        }
    }
}

/// Collapses duplicates, keeping the first occurrence of each name.
pub fn remove_duplicates(candidates: Vec<UnitName>) -> Vec<UnitName> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates.into_iter().filter(|name| seen.insert(name.clone())).collect()
}

/// Explicit exclusions, then name-based ones, then those from the environment.
/// The result keeps first-seen order and holds no duplicates.
pub fn collect_exclusions(exclude: &[UnitName], exclude_names: &[String], environment: &Environment) -> Vec<UnitName> {
    let explicit = exclude.iter().cloned();
    let by_name = exclude_names.iter().map(|name| UnitName::new(name.trim())).filter(|name| !name.as_str().is_empty());
    let from_environment = environment.get_list(EXCLUDE_PROPERTY).into_iter().map(UnitName::new);
    remove_duplicates(explicit.chain(by_name).chain(from_environment).collect())
}

/// Fails with every invalid exclusion at once.
pub fn check_excluded(candidates: &[UnitName], exclusions: &[UnitName], oracle: &dyn ClassPresenceOracle, policy: ExclusionPolicy) -> Result<(), ResolutionError> {
    let candidate_set: HashSet<&UnitName> = candidates.iter().collect();
    let invalid: Vec<String> = exclusions
        .iter()
        .filter(|name| !candidate_set.contains(name))
        .filter(|name| match policy {
            ExclusionPolicy::Strict => true,
            ExclusionPolicy::Lenient => oracle.is_present(name.as_str()),
        })
        .map(|name| name.to_string())
        .collect();

    if invalid.is_empty() { Ok(()) } else { Err(ResolutionError::InvalidExclusions(invalid)) }
}

/// Removes excluded names, preserving the order of the rest.
pub fn apply_exclusions(candidates: Vec<UnitName>, exclusions: &[UnitName]) -> (Vec<UnitName>, Vec<UnitName>) {
    let excluded: HashSet<&UnitName> = exclusions.iter().collect();
    candidates.into_iter().partition(|name| !excluded.contains(name))
}
