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

//! Candidate unit identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Symbolic name of a configuration unit considered for activation.
///
/// Names are compared byte-for-byte; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dot-separated segment, used in compact diagnostics.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UnitName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_short_name() {
        assert_eq!(UnitName::from("com.example.CacheAutoConfiguration").short_name(), "CacheAutoConfiguration");
        assert_eq!(UnitName::from("Alpha").short_name(), "Alpha");
    }

    #[test]
    fn test_lookup_by_str() {
        let mut names = HashSet::new();
        names.insert(UnitName::from("Alpha"));
        assert!(names.contains("Alpha"));
        assert!(!names.contains("Beta"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&UnitName::from("Alpha")).unwrap();
        assert_eq!(json, "\"Alpha\"");
    }
}
