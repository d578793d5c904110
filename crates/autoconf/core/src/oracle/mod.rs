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

//! Symbol presence checks
//!
//! The oracle answers whether a symbolic name is available in the current
//! build. Anything that cannot be fully resolved is reported as absent.

pub mod caching;
pub mod manifest;

pub use caching::CachingOracle;
pub use manifest::StaticOracle;

use std::sync::Arc;

/// Answers "does symbol X exist in the current build".
///
/// Implementations must be safe to query from both halves of the parallel
/// pre-filter at once.
#[cfg_attr(test, mockall::automock)]
pub trait ClassPresenceOracle: Send + Sync {
    fn is_present(&self, symbol: &str) -> bool;
}

impl<T: ClassPresenceOracle + ?Sized> ClassPresenceOracle for Arc<T> {
    fn is_present(&self, symbol: &str) -> bool {
        (**self).is_present(symbol)
    }
}

impl<T: ClassPresenceOracle + ?Sized> ClassPresenceOracle for &T {
    fn is_present(&self, symbol: &str) -> bool {
        (**self).is_present(symbol)
    }
}

/// Selects symbols by presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassNameFilter {
    Present,
    Missing,
}

impl ClassNameFilter {
    pub fn matches(&self, symbol: &str, oracle: &dyn ClassPresenceOracle) -> bool {
        let present = oracle.is_present(symbol);
        match self {
            ClassNameFilter::Present => present,
            ClassNameFilter::Missing => !present,
        }
    }

    /// Returns the symbols selected by this filter, preserving input order.
    pub fn filter<S: AsRef<str>>(&self, symbols: &[S], oracle: &dyn ClassPresenceOracle) -> Vec<String> {
        symbols
            .iter()
            .map(AsRef::as_ref)
            .filter(|symbol| self.matches(symbol, oracle))
            .map(str::to_string)
            .collect()
    }
}
