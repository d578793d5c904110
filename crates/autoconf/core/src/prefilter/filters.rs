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

//! Metadata-driven import filters

use super::resolver::{CandidateSlots, Outcomes, ParallelOutcomeResolver, PrefilterMode};
use super::{FilterContext, ImportFilter};
use crate::conditions::WebSpec;
use crate::conditions::class::first_missing_outcome;
use crate::environment::split_list;
use crate::oracle::ClassNameFilter;
use crate::web::WebRequirement;
use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, ItemStyle, UnitName};
use tracing::debug;

/// Rejects units whose required symbols are absent. Runs through the
/// fork-join resolver since it is the filter that sees every candidate.
pub struct OnClassFilter {
    resolver: ParallelOutcomeResolver,
}

impl OnClassFilter {
    pub fn new(mode: PrefilterMode) -> Self {
        Self {
            resolver: ParallelOutcomeResolver::new(mode),
        }
    }

    fn outcome(unit: &UnitName, context: &FilterContext<'_>) -> Option<ConditionOutcome> {
        let symbols = context.metadata.lookup(unit.as_str(), ConditionKind::OnClass)?;
        first_missing_outcome(split_list(symbols), context.oracle)
    }
}

impl ImportFilter for OnClassFilter {
    fn name(&self) -> &'static str {
        "OnClassFilter"
    }

    fn outcomes(&self, candidates: &CandidateSlots<'_>, context: &FilterContext<'_>) -> Outcomes {
        self.resolver
            .resolve(candidates, |slots| slots.iter().map(|slot| slot.and_then(|unit| Self::outcome(unit, context))).collect())
    }
}

/// Rejects units whose required bean types are not even present as symbols.
pub struct OnBeanTypeFilter;

impl OnBeanTypeFilter {
    fn missing_types(unit: &UnitName, kind: ConditionKind, context: &FilterContext<'_>) -> Option<ConditionOutcome> {
        let types = context.metadata.get_set(unit.as_str(), kind.metadata_key())?;
        let missing = ClassNameFilter::Missing.filter(&types, context.oracle);
        if missing.is_empty() {
            return None;
        }
        let message = ConditionMessage::for_condition(kind).did_not_find("required type", "required types").items(ItemStyle::Quote, &missing);
        Some(ConditionOutcome::no_match(kind, message))
    }
}

impl ImportFilter for OnBeanTypeFilter {
    fn name(&self) -> &'static str {
        "OnBeanTypeFilter"
    }

    fn outcomes(&self, candidates: &CandidateSlots<'_>, context: &FilterContext<'_>) -> Outcomes {
        candidates
            .iter()
            .map(|slot| {
                let unit = (*slot)?;
                Self::missing_types(unit, ConditionKind::OnBean, context).or_else(|| Self::missing_types(unit, ConditionKind::OnSingleCandidate, context))
            })
            .collect()
    }
}

/// Rejects units whose required web stack is unavailable.
pub struct OnWebApplicationFilter;

impl ImportFilter for OnWebApplicationFilter {
    fn name(&self) -> &'static str {
        "OnWebApplicationFilter"
    }

    fn outcomes(&self, candidates: &CandidateSlots<'_>, context: &FilterContext<'_>) -> Outcomes {
        candidates
            .iter()
            .map(|slot| {
                let unit = (*slot)?;
                let value = context.metadata.lookup(unit.as_str(), ConditionKind::OnWebApplication)?;
                let requirement = WebRequirement::from_metadata(value).unwrap_or_else(|| {
                    debug!(unit = %unit, value, "Unrecognized web application type in metadata, treating as any");
                    WebRequirement::Any
                });
                WebSpec::availability_outcome(requirement, context.oracle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataIndex;
    use crate::oracle::StaticOracle;
    use crate::web::SERVLET_APPLICATION_SYMBOL;

    fn slots(units: &[UnitName]) -> Vec<Option<&UnitName>> {
        units.iter().map(Some).collect()
    }

    #[test]
    fn test_on_class_filter() {
        let metadata = MetadataIndex::from_pairs([("Alpha.ConditionalOnClass", "X"), ("Beta.ConditionalOnClass", "Present")]);
        let oracle = StaticOracle::new(["Present"]);
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let units = vec![UnitName::from("Alpha"), UnitName::from("Beta"), UnitName::from("Gamma")];

        let outcomes = OnClassFilter::new(PrefilterMode::Serial).outcomes(&slots(&units), &context);
        assert_eq!(outcomes[0].as_ref().map(|o| o.message.as_str()), Some("@ConditionalOnClass did not find required class 'X'"));
        assert!(outcomes[1].is_none());
        assert!(outcomes[2].is_none());
    }

    #[test]
    fn test_on_bean_type_filter_checks_single_candidate_too() {
        let metadata = MetadataIndex::from_pairs([("Alpha.ConditionalOnBean", "Store"), ("Beta.ConditionalOnSingleCandidate", "Cache,Store"), ("Gamma.ConditionalOnBean", "Store,Store")]);
        let oracle = StaticOracle::new(["Store"]);
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let units = vec![UnitName::from("Alpha"), UnitName::from("Beta"), UnitName::from("Gamma")];

        let outcomes = OnBeanTypeFilter.outcomes(&slots(&units), &context);
        assert!(outcomes[0].is_none());
        let beta = outcomes[1].as_ref().unwrap();
        assert_eq!(beta.kind, ConditionKind::OnSingleCandidate);
        assert_eq!(beta.message.as_str(), "@ConditionalOnSingleCandidate did not find required type 'Cache'");
        assert!(outcomes[2].is_none());
    }

    #[test]
    fn test_on_web_application_filter() {
        let metadata = MetadataIndex::from_pairs([("Servlet.ConditionalOnWebApplication", "SERVLET"), ("Reactive.ConditionalOnWebApplication", "REACTIVE"), ("Any.ConditionalOnWebApplication", "")]);
        let oracle = StaticOracle::new([SERVLET_APPLICATION_SYMBOL]);
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let units = vec![UnitName::from("Servlet"), UnitName::from("Reactive"), UnitName::from("Any"), UnitName::from("Plain")];

        let outcomes = OnWebApplicationFilter.outcomes(&slots(&units), &context);
        assert!(outcomes[0].is_none());
        assert!(outcomes[1].as_ref().is_some_and(|o| !o.matched));
        assert!(outcomes[2].is_none());
        assert!(outcomes[3].is_none());
    }

    #[test]
    fn test_rejected_slots_are_skipped() {
        let metadata = MetadataIndex::from_pairs([("Alpha.ConditionalOnClass", "X")]);
        let oracle = StaticOracle::default();
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let outcomes = OnClassFilter::new(PrefilterMode::Parallel).outcomes(&[None, None], &context);
        assert_eq!(outcomes, vec![None, None]);
    }
}
