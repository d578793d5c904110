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

//! Registry search scope

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which registry scopes a registry condition searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Only the current registry
    Current,
    /// Every ancestor registry, excluding the current one
    Ancestors,
    /// The current registry and all of its ancestors
    #[default]
    All,
}

impl SearchStrategy {
    /// Whether lookups should walk up through parent registries.
    pub fn considers_hierarchy(&self) -> bool {
        *self != SearchStrategy::Current
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Current => f.write_str("current"),
            SearchStrategy::Ancestors => f.write_str("ancestors"),
            SearchStrategy::All => f.write_str("all"),
        }
    }
}
