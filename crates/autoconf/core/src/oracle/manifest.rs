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

//! Oracle backed by a static build manifest

use super::ClassPresenceOracle;
use std::collections::HashSet;

/// Presence lookup against a fixed set of symbols known at build time.
///
/// Symbols listed as `broken` are known to the build but depend on something
/// that is missing; they are reported as absent.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    present: HashSet<String>,
    broken: HashSet<String>,
}

impl StaticOracle {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: symbols.into_iter().map(Into::into).collect(),
            broken: HashSet::new(),
        }
    }

    pub fn with_broken<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.broken.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn add(&mut self, symbol: impl Into<String>) {
        self.present.insert(symbol.into());
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

impl ClassPresenceOracle for StaticOracle {
    fn is_present(&self, symbol: &str) -> bool {
        let symbol = symbol.trim();
        !symbol.is_empty() && self.present.contains(symbol) && !self.broken.contains(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let oracle = StaticOracle::new(["X", "Y"]);
        assert!(oracle.is_present("X"));
        assert!(oracle.is_present(" Y "));
        assert!(!oracle.is_present("Z"));
        assert!(!oracle.is_present(""));
    }

    #[test]
    fn test_broken_symbols_are_absent() {
        let oracle = StaticOracle::new(["X", "Half.Linked"]).with_broken(["Half.Linked"]);
        assert!(oracle.is_present("X"));
        assert!(!oracle.is_present("Half.Linked"));
    }
}
