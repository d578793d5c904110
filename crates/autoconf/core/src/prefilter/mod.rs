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

//! Metadata pre-filter
//!
//! Cheap elimination pass run before full condition evaluation. Filters only
//! read the metadata index and the presence oracle, never the bean registry.
//! Each filter sees the slots left open by the filters before it.

pub mod filters;
pub mod resolver;

pub use filters::{OnBeanTypeFilter, OnClassFilter, OnWebApplicationFilter};
pub use resolver::{CandidateSlots, Outcomes, ParallelOutcomeResolver, PrefilterMode};

use crate::metadata::MetadataIndex;
use crate::oracle::ClassPresenceOracle;
use autoconf_common::{ConditionOutcome, UnitName};
use tracing::debug;

/// Read-only inputs shared by every filter; safe to use from both pre-filter threads.
pub struct FilterContext<'a> {
    pub oracle: &'a dyn ClassPresenceOracle,
    pub metadata: &'a MetadataIndex,
}

pub trait ImportFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// One outcome per slot. Closed slots and units without metadata get `None`.
    fn outcomes(&self, candidates: &CandidateSlots<'_>, context: &FilterContext<'_>) -> Outcomes;
}

/// Units that survived the pre-filter, plus the rejections in candidate order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefilterResult {
    pub survivors: Vec<UnitName>,
    pub rejected: Vec<(UnitName, ConditionOutcome)>,
}

/// Filters applied in sequence
pub struct ImportFilterChain {
    filters: Vec<Box<dyn ImportFilter>>,
}

impl ImportFilterChain {
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Symbol presence, then bean type presence, then web stack availability.
    pub fn standard(mode: PrefilterMode) -> Self {
        Self::new().with(OnClassFilter::new(mode)).with(OnBeanTypeFilter).with(OnWebApplicationFilter)
    }

    pub fn with(mut self, filter: impl ImportFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, candidates: &[UnitName], context: &FilterContext<'_>) -> PrefilterResult {
        let mut slots: Vec<Option<&UnitName>> = candidates.iter().map(Some).collect();
        let mut rejected: Vec<(usize, ConditionOutcome)> = Vec::new();

        for filter in &self.filters {
            let outcomes = filter.outcomes(&slots, context);
            debug_assert_eq!(outcomes.len(), slots.len(), "{} returned misaligned outcomes", filter.name());
            for (index, outcome) in outcomes.into_iter().enumerate() {
                let Some(outcome) = outcome else { continue };
                if outcome.matched {
                    continue;
                }
                if let Some(unit) = slots.get_mut(index).and_then(Option::take) {
                    debug!(unit = %unit, filter = filter.name(), "Filtered out by pre-filter: {}", outcome.message);
                    rejected.push((index, outcome));
                }
            }
        }

        rejected.sort_by_key(|(index, _)| *index);
        PrefilterResult {
            survivors: slots.into_iter().flatten().cloned().collect(),
            rejected: rejected.into_iter().map(|(index, outcome)| (candidates[index].clone(), outcome)).collect(),
        }
    }
}

impl Default for ImportFilterChain {
    fn default() -> Self {
        Self::standard(PrefilterMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use autoconf_common::{ConditionKind, ConditionMessage};

    /// Rejects every open slot, recording the filter that did so.
    struct RejectAll;

    impl ImportFilter for RejectAll {
        fn name(&self) -> &'static str {
            "RejectAll"
        }

        fn outcomes(&self, candidates: &CandidateSlots<'_>, _context: &FilterContext<'_>) -> Outcomes {
            candidates
                .iter()
                .map(|slot| slot.map(|_| ConditionOutcome::no_match(ConditionKind::OnProperty, ConditionMessage::of("rejected by RejectAll"))))
                .collect()
        }
    }

    #[test]
    fn test_later_filters_only_see_open_slots() {
        let metadata = MetadataIndex::from_pairs([("Alpha.ConditionalOnClass", "X")]);
        let oracle = StaticOracle::default();
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let units = vec![UnitName::from("Alpha"), UnitName::from("Beta")];

        let chain = ImportFilterChain::new().with(OnClassFilter::new(PrefilterMode::Serial)).with(RejectAll);
        let result = chain.apply(&units, &context);
        assert!(result.survivors.is_empty());
        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[0].1.kind, ConditionKind::OnClass);
        assert_eq!(result.rejected[1].1.kind, ConditionKind::OnProperty);
    }

    #[test]
    fn test_standard_chain_keeps_order() {
        let metadata = MetadataIndex::from_pairs([("Beta.ConditionalOnClass", "Missing"), ("Delta.ConditionalOnBean", "Store")]);
        let oracle = StaticOracle::default();
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let units: Vec<UnitName> = ["Alpha", "Beta", "Gamma", "Delta"].into_iter().map(UnitName::from).collect();

        let result = ImportFilterChain::standard(PrefilterMode::Parallel).apply(&units, &context);
        assert_eq!(result.survivors, vec![UnitName::from("Alpha"), UnitName::from("Gamma")]);
        let rejected: Vec<&str> = result.rejected.iter().map(|(unit, _)| unit.as_str()).collect();
        assert_eq!(rejected, vec!["Beta", "Delta"]);
    }
}
