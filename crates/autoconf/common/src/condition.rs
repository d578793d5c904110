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

//! Condition kinds
//!
//! A closed set of gating conditions a unit may declare. Each kind has a stable
//! metadata key used by the precomputed index (`<unit>.<key>`) and a display
//! label used in diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown condition kind: {0}")]
pub struct UnknownConditionKind(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    /// All listed symbols must be present
    OnClass,
    /// None of the listed symbols may be present
    OnMissingClass,
    /// The registry must contain an entry for every requirement
    OnBean,
    /// Like `OnBean`, restricted to a single (or single primary) match
    OnSingleCandidate,
    /// The registry must contain no entry for any requirement
    OnMissingBean,
    /// Environment property predicate
    OnProperty,
    /// Required web application type
    OnWebApplication,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 7] = [
        ConditionKind::OnClass,
        ConditionKind::OnMissingClass,
        ConditionKind::OnBean,
        ConditionKind::OnSingleCandidate,
        ConditionKind::OnMissingBean,
        ConditionKind::OnProperty,
        ConditionKind::OnWebApplication,
    ];

    /// Key suffix used by the metadata index.
    pub fn metadata_key(&self) -> &'static str {
        match self {
            ConditionKind::OnClass => "ConditionalOnClass",
            ConditionKind::OnMissingClass => "ConditionalOnMissingClass",
            ConditionKind::OnBean => "ConditionalOnBean",
            ConditionKind::OnSingleCandidate => "ConditionalOnSingleCandidate",
            ConditionKind::OnMissingBean => "ConditionalOnMissingBean",
            ConditionKind::OnProperty => "ConditionalOnProperty",
            ConditionKind::OnWebApplication => "ConditionalOnWebApplication",
        }
    }

    /// Label used as the subject of diagnostic messages.
    pub fn label(&self) -> String {
        format!("@{}", self.metadata_key())
    }

    /// Whether evaluation depends on mutable registry state.
    ///
    /// Registry-dependent kinds are always evaluated explicitly and never
    /// answered by an absent outcome.
    pub fn is_registry_dependent(&self) -> bool {
        matches!(self, ConditionKind::OnBean | ConditionKind::OnSingleCandidate | ConditionKind::OnMissingBean)
    }

    /// Evaluation rank within a unit: cheap symbol checks first, registry last.
    pub fn evaluation_rank(&self) -> u8 {
        match self {
            ConditionKind::OnClass => 0,
            ConditionKind::OnMissingClass => 1,
            ConditionKind::OnWebApplication => 2,
            ConditionKind::OnProperty => 3,
            ConditionKind::OnBean => 4,
            ConditionKind::OnSingleCandidate => 5,
            ConditionKind::OnMissingBean => 6,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata_key())
    }
}

impl FromStr for ConditionKind {
    type Err = UnknownConditionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.metadata_key() == s)
            .ok_or_else(|| UnknownConditionKind(s.to_string()))
    }
}
