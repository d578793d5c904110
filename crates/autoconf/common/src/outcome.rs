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

//! Condition outcomes

use crate::{ConditionKind, ConditionMessage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of evaluating one condition against one unit.
///
/// Where a slice of outcomes is positionally aligned with candidates, a `None`
/// entry means "no opinion" and is treated as a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    pub matched: bool,
    pub kind: ConditionKind,
    pub message: ConditionMessage,
}

impl ConditionOutcome {
    pub fn matched(kind: ConditionKind, message: ConditionMessage) -> Self {
        Self { matched: true, kind, message }
    }

    pub fn no_match(kind: ConditionKind, message: ConditionMessage) -> Self {
        Self { matched: false, kind, message }
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// Treats an absent outcome as a match.
    pub fn is_match_or_absent(outcome: Option<&ConditionOutcome>) -> bool {
        outcome.is_none_or(|o| o.matched)
    }
}

impl fmt::Display for ConditionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.matched { "matched" } else { "did not match" };
        if self.message.is_empty() {
            write!(f, "{} {}", self.kind, verdict)
        } else {
            write!(f, "{} {} due to {}", self.kind, verdict, self.message)
        }
    }
}
