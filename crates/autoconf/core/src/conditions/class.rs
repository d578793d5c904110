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

//! Symbol presence conditions

use crate::oracle::{ClassNameFilter, ClassPresenceOracle};
use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, ItemStyle};
use serde::{Deserialize, Serialize};

/// Symbols a unit requires or forbids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub symbols: Vec<String>,
}

impl SymbolSpec {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Matches iff every symbol is present. A failure lists every missing symbol.
    pub fn evaluate_required(&self, oracle: &dyn ClassPresenceOracle) -> ConditionOutcome {
        let kind = ConditionKind::OnClass;
        let missing = ClassNameFilter::Missing.filter(&self.symbols, oracle);
        if !missing.is_empty() {
            let message = ConditionMessage::for_condition(kind).did_not_find("required class", "required classes").items(ItemStyle::Quote, &missing);
            return ConditionOutcome::no_match(kind, message);
        }
        let message = ConditionMessage::for_condition(kind).found("required class", "required classes").items(ItemStyle::Quote, &self.symbols);
        ConditionOutcome::matched(kind, message)
    }

    /// Matches iff no symbol is present.
    pub fn evaluate_forbidden(&self, oracle: &dyn ClassPresenceOracle) -> ConditionOutcome {
        let kind = ConditionKind::OnMissingClass;
        let present = ClassNameFilter::Present.filter(&self.symbols, oracle);
        if !present.is_empty() {
            let message = ConditionMessage::for_condition(kind).found("unwanted class", "unwanted classes").items(ItemStyle::Quote, &present);
            return ConditionOutcome::no_match(kind, message);
        }
        let message = ConditionMessage::for_condition(kind).did_not_find("unwanted class", "unwanted classes").items(ItemStyle::Quote, &self.symbols);
        ConditionOutcome::matched(kind, message)
    }
}

/// Pre-filter form of the required-symbols check over a raw comma list.
///
/// Stops at the first missing symbol.
pub fn first_missing_outcome<'a>(symbols: impl IntoIterator<Item = &'a str>, oracle: &dyn ClassPresenceOracle) -> Option<ConditionOutcome> {
    let kind = ConditionKind::OnClass;
    symbols.into_iter().find(|symbol| !oracle.is_present(symbol)).map(|missing| {
        let message = ConditionMessage::for_condition(kind).did_not_find("required class", "required classes").items(ItemStyle::Quote, &[missing]);
        ConditionOutcome::no_match(kind, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;

    #[test]
    fn test_required_symbols_lists_missing() {
        let oracle = StaticOracle::new(["X"]);
        let outcome = SymbolSpec::new(["X", "Y", "Z"]).evaluate_required(&oracle);
        assert!(!outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnClass did not find required classes 'Y', 'Z'");

        let outcome = SymbolSpec::new(["X"]).evaluate_required(&oracle);
        assert!(outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnClass found required class 'X'");
    }

    #[test]
    fn test_forbidden_symbols() {
        let oracle = StaticOracle::new(["X"]);
        let outcome = SymbolSpec::new(["X", "Y"]).evaluate_forbidden(&oracle);
        assert!(!outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnMissingClass found unwanted class 'X'");
        assert!(SymbolSpec::new(["Y"]).evaluate_forbidden(&oracle).matched);
    }

    #[test]
    fn test_first_missing_names_only_first() {
        let oracle = StaticOracle::new(["B"]);
        let outcome = first_missing_outcome(["B", "C", "D"], &oracle).unwrap();
        assert_eq!(outcome.message.as_str(), "@ConditionalOnClass did not find required class 'C'");
        assert!(first_missing_outcome(["B"], &oracle).is_none());
    }
}
