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

//! Memoizing oracle wrapper

use super::ClassPresenceOracle;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Caches answers from an inner oracle.
///
/// Reads take a shared lock, so both halves of the pre-filter can query the
/// cache concurrently. Two threads racing on the same uncached symbol may both
/// ask the inner oracle; the answers are identical, so either insert wins.
pub struct CachingOracle<O> {
    inner: O,
    cache: RwLock<HashMap<String, bool>>,
}

impl<O: ClassPresenceOracle> CachingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

impl<O: ClassPresenceOracle> ClassPresenceOracle for CachingOracle<O> {
    fn is_present(&self, symbol: &str) -> bool {
        if let Some(&present) = self.cache.read().get(symbol) {
            return present;
        }
        let present = self.inner.is_present(symbol);
        self.cache.write().insert(symbol.to_string(), present);
        present
    }
}
