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

//! Resolution engine
//!
//! Drives one resolution pass through its stages:
//! gather, deduplicate, exclude, pre-filter, evaluate, order, emit.
//! Non-matching units are recorded and dropped; only configuration errors
//! abort the pass.

use crate::catalog::UnitCatalog;
use crate::conditions::{ConditionContext, evaluate_unit};
use crate::config::EngineConfig;
use crate::environment::Environment;
use crate::error::ResolutionError;
use crate::exclusions::{apply_exclusions, check_excluded, collect_exclusions, remove_duplicates};
use crate::factories::FactoriesRegistry;
use crate::metadata::MetadataIndex;
use crate::oracle::ClassPresenceOracle;
use crate::ordering::PriorityOrderer;
use crate::prefilter::{FilterContext, ImportFilterChain};
use crate::registry::{BeanRegistry, NoopListener, RegistrationListener};
use crate::report::ConditionEvaluationReport;
use crate::web::WebApplicationType;
use autoconf_common::{ConditionOutcome, UnitName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resolution stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Gather,
    Deduplicate,
    Exclude,
    PreFilter,
    Evaluate,
    Order,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Gather => "gather",
            Stage::Deduplicate => "deduplicate",
            Stage::Exclude => "exclude",
            Stage::PreFilter => "pre-filter",
            Stage::Evaluate => "evaluate",
            Stage::Order => "order",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Inputs of one resolution pass
pub struct ResolutionRequest<'a> {
    pub candidates: Vec<UnitName>,
    pub exclude: Vec<UnitName>,
    /// Exclusions given as plain names, e.g. from user input
    pub exclude_names: Vec<String>,
    pub environment: &'a Environment,
    pub registry: &'a dyn BeanRegistry,
}

impl<'a> ResolutionRequest<'a> {
    pub fn new(candidates: Vec<UnitName>, environment: &'a Environment, registry: &'a dyn BeanRegistry) -> Self {
        Self {
            candidates,
            exclude: Vec::new(),
            exclude_names: Vec::new(),
            environment,
            registry,
        }
    }

    /// Candidates registered under `capability_key`.
    pub fn from_factories(factories: &FactoriesRegistry, capability_key: &str, environment: &'a Environment, registry: &'a dyn BeanRegistry) -> Self {
        Self::new(factories.load_factory_names(capability_key), environment, registry)
    }

    pub fn excluding(mut self, unit: impl Into<UnitName>) -> Self {
        self.exclude.push(unit.into());
        self
    }

    pub fn excluding_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_names.push(name.into());
        self
    }
}

/// Outcome of a resolution pass.
///
/// Every deduplicated candidate ends up in exactly one of `accepted`,
/// `rejected` or `excluded`, unless the engine is disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub accepted: Vec<UnitName>,
    pub rejected: BTreeMap<UnitName, Vec<ConditionOutcome>>,
    /// Excluded candidates, in candidate order
    pub excluded: Vec<UnitName>,
    pub report: ConditionEvaluationReport,
    /// Set when the master switch turned resolution off
    pub disabled: bool,
}

impl ResolutionResult {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Default::default()
        }
    }

    pub fn is_accepted(&self, unit: &str) -> bool {
        self.accepted.iter().any(|accepted| accepted.as_str() == unit)
    }

    pub fn is_rejected(&self, unit: &str) -> bool {
        self.rejected.keys().any(|rejected| rejected.as_str() == unit)
    }

    /// Number of units the pass accounted for.
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len() + self.excluded.len()
    }
}

pub struct ResolutionEngine {
    oracle: Arc<dyn ClassPresenceOracle>,
    metadata: Arc<MetadataIndex>,
    catalog: Arc<dyn UnitCatalog>,
    config: EngineConfig,
    filters: Option<ImportFilterChain>,
}

impl ResolutionEngine {
    pub fn new(oracle: Arc<dyn ClassPresenceOracle>, metadata: Arc<MetadataIndex>, catalog: Arc<dyn UnitCatalog>) -> Self {
        Self {
            oracle,
            metadata,
            catalog,
            config: EngineConfig::default(),
            filters: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the standard pre-filter chain.
    pub fn with_filters(mut self, filters: ImportFilterChain) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn web_application_type(&self) -> WebApplicationType {
        WebApplicationType::deduce(&*self.oracle)
    }

    /// Candidates for the configured capability key.
    pub fn gather(&self, factories: &FactoriesRegistry) -> Vec<UnitName> {
        factories.load_factory_names(&self.config.capability_key)
    }

    pub fn resolve(&self, request: ResolutionRequest<'_>) -> Result<ResolutionResult, ResolutionError> {
        self.resolve_with_listener(request, &NoopListener)
    }

    /// Runs a pass, notifying `listener` as each unit is accepted during
    /// evaluation. A listener that registers beans makes them visible to the
    /// registry conditions of units evaluated afterwards.
    #[instrument(skip(self, request, listener), fields(candidates = request.candidates.len()))]
    pub fn resolve_with_listener(&self, request: ResolutionRequest<'_>, listener: &dyn RegistrationListener) -> Result<ResolutionResult, ResolutionError> {
        let config = self.config.clone().overridden_by(request.environment);
        if !config.enabled {
            info!("Auto-configuration disabled, no units resolved");
            return Ok(ResolutionResult::disabled());
        }

        let ResolutionRequest {
            candidates,
            exclude,
            exclude_names,
            environment,
            registry,
        } = request;
        let mut report = ConditionEvaluationReport::new();
        let mut rejected: BTreeMap<UnitName, Vec<ConditionOutcome>> = BTreeMap::new();

        debug!(stage = %Stage::Gather, count = candidates.len(), "Gathered candidates");
        if candidates.is_empty() {
            warn!(capability = %config.capability_key, "No candidate units to resolve");
        }

        let candidates = remove_duplicates(candidates);
        debug!(stage = %Stage::Deduplicate, count = candidates.len(), "Removed duplicate candidates");

        let exclusions = collect_exclusions(&exclude, &exclude_names, environment);
        check_excluded(&candidates, &exclusions, &*self.oracle, config.exclusion_policy)?;
        let (remaining, excluded) = apply_exclusions(candidates, &exclusions);
        report.record_exclusions(&exclusions);
        debug!(stage = %Stage::Exclude, excluded = excluded.len(), remaining = remaining.len(), "Applied exclusions");

        let standard;
        let chain = match &self.filters {
            Some(chain) => chain,
            None => {
                standard = ImportFilterChain::standard(config.prefilter_mode);
                &standard
            }
        };
        let filter_context = FilterContext {
            oracle: &*self.oracle,
            metadata: &self.metadata,
        };
        let prefiltered = chain.apply(&remaining, &filter_context);
        for (unit, outcome) in prefiltered.rejected {
            report.record_outcomes(&unit, [outcome.clone()]);
            rejected.entry(unit).or_default().push(outcome);
        }
        debug!(stage = %Stage::PreFilter, survivors = prefiltered.survivors.len(), "Pre-filter complete");

        let condition_context = ConditionContext::new(&*self.oracle, registry, environment);
        let mut accepted = Vec::with_capacity(prefiltered.survivors.len());
        for unit in prefiltered.survivors {
            let definition = self.catalog.definition(&unit);
            match definition.filter(|d| !d.is_unconditional()) {
                Some(definition) => {
                    let evaluation = evaluate_unit(&unit, &definition.conditions, &condition_context)?;
                    report.record_outcomes(&unit, evaluation.outcomes.iter().cloned());
                    if !evaluation.matched {
                        debug!(unit = %unit, "Rejected by condition evaluation");
                        rejected.insert(unit, evaluation.outcomes);
                        continue;
                    }
                }
                None => report.record_unconditional(&unit),
            }
            listener.unit_accepted(&unit, definition);
            accepted.push(unit);
        }
        debug!(stage = %Stage::Evaluate, accepted = accepted.len(), rejected = rejected.len(), "Evaluation complete");

        let accepted = PriorityOrderer::new(&self.metadata, &*self.catalog).order(&accepted)?;
        debug!(stage = %Stage::Order, "Ordered accepted units");

        info!(stage = %Stage::Emit, accepted = accepted.len(), rejected = rejected.len(), excluded = excluded.len(), "Resolution complete");
        Ok(ResolutionResult {
            accepted,
            rejected,
            excluded,
            report,
            disabled: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StaticCatalog, UnitDefinition};
    use crate::conditions::{BeanSpec, ConditionRule};
    use crate::environment::PropertySource;
    use crate::oracle::StaticOracle;
    use crate::registry::{BeanDefinition, InMemoryBeanRegistry};

    fn engine(oracle: StaticOracle, metadata: MetadataIndex, definitions: Vec<UnitDefinition>) -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(oracle), Arc::new(metadata), Arc::new(StaticCatalog::from_definitions(definitions)))
    }

    fn names(values: &[&str]) -> Vec<UnitName> {
        values.iter().copied().map(UnitName::from).collect()
    }

    #[test]
    fn test_prefilter_and_evaluation_rejections() {
        let metadata = MetadataIndex::from_pairs([("Alpha.ConditionalOnClass", "X")]);
        let definitions = vec![UnitDefinition::new("Beta").with_condition(ConditionRule::RequiresRegistryEntries(BeanSpec::of_type("Store")))];
        let engine = engine(StaticOracle::default(), metadata, definitions);
        let environment = Environment::new();
        let registry = InMemoryBeanRegistry::new();

        let result = engine.resolve(ResolutionRequest::new(names(&["Alpha", "Beta", "Gamma"]), &environment, &registry)).unwrap();
        assert_eq!(result.accepted, names(&["Gamma"]));
        assert!(result.is_rejected("Alpha"));
        assert!(result.is_rejected("Beta"));
        assert_eq!(result.total(), 3);
        assert_eq!(result.report.unconditional(), names(&["Gamma"]).as_slice());
    }

    #[test]
    fn test_disabled_by_environment() {
        let engine = engine(StaticOracle::default(), MetadataIndex::empty(), Vec::new());
        let environment = Environment::new().with_source(PropertySource::from_map("test", [("autoconfigure.enabled", "false")]));
        let registry = InMemoryBeanRegistry::new();
        let result = engine.resolve(ResolutionRequest::new(names(&["Alpha"]), &environment, &registry)).unwrap();
        assert!(result.disabled);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_excluded_units_keep_candidate_order() {
        let engine = engine(StaticOracle::default(), MetadataIndex::empty(), Vec::new());
        let environment = Environment::new().with_source(PropertySource::from_map("test", [("autoconfigure.exclude", "Gamma")]));
        let registry = InMemoryBeanRegistry::new();
        let request = ResolutionRequest::new(names(&["Alpha", "Beta", "Gamma"]), &environment, &registry).excluding("Alpha");
        let result = engine.resolve(request).unwrap();
        assert_eq!(result.excluded, names(&["Alpha", "Gamma"]));
        assert_eq!(result.accepted, names(&["Beta"]));
    }

    #[test]
    fn test_listener_sees_accepted_units_in_evaluation_order() {
        let definitions = vec![
            UnitDefinition::new("Consumer").with_condition(ConditionRule::RequiresRegistryEntries(BeanSpec::of_type("Store"))),
            UnitDefinition::new("Provider").providing(BeanDefinition::new("store").with_type("Store")),
        ];
        let engine = engine(StaticOracle::default(), MetadataIndex::empty(), definitions);
        let environment = Environment::new();
        let registry = InMemoryBeanRegistry::new();

        let provider_first = engine
            .resolve_with_listener(ResolutionRequest::new(names(&["Provider", "Consumer"]), &environment, &registry), &registry)
            .unwrap();
        assert_eq!(provider_first.accepted, names(&["Provider", "Consumer"]));
    }

    #[test]
    fn test_gather_uses_capability_key() {
        let engine = engine(StaticOracle::default(), MetadataIndex::empty(), Vec::new());
        let factories = FactoriesRegistry::from_properties_str("auto-configuration=A,B\nother=C");
        assert_eq!(engine.gather(&factories), names(&["A", "B"]));
    }
}
