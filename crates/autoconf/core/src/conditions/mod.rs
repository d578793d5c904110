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

//! Condition rules
//!
//! A closed set of rule variants a unit can declare. Every declared rule must
//! match for the unit to be accepted. Rules of the same kind are evaluated as
//! a group so that all of their diagnostics are collected; evaluation stops
//! after the first group that fails.

pub mod bean;
pub mod class;
pub mod property;

pub use bean::{BeanSpec, MatchResult};
pub use class::SymbolSpec;
pub use property::PropertySpec;

use crate::environment::Environment;
use crate::error::ConditionError;
use crate::oracle::ClassPresenceOracle;
use crate::registry::BeanRegistry;
use crate::web::{REACTIVE_APPLICATION_SYMBOL, SERVLET_APPLICATION_SYMBOL, WebApplicationType, WebRequirement};
use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, UnitName};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Capability shared by every rule variant.
pub trait Condition {
    fn kind(&self) -> ConditionKind;

    /// Rejects declarations that specify no criteria.
    fn validate(&self, unit: &UnitName) -> Result<(), ConditionError>;

    fn evaluate(&self, context: &ConditionContext<'_>) -> ConditionOutcome;
}

/// Everything a rule may consult while evaluating.
pub struct ConditionContext<'a> {
    pub oracle: &'a dyn ClassPresenceOracle,
    pub registry: &'a dyn BeanRegistry,
    pub environment: &'a Environment,
    pub web_type: WebApplicationType,
}

impl<'a> ConditionContext<'a> {
    pub fn new(oracle: &'a dyn ClassPresenceOracle, registry: &'a dyn BeanRegistry, environment: &'a Environment) -> Self {
        Self {
            oracle,
            registry,
            environment,
            web_type: WebApplicationType::deduce(oracle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebSpec {
    #[serde(default)]
    pub web_type: WebRequirement,
}

impl WebSpec {
    pub fn evaluate(&self, web_type: WebApplicationType) -> ConditionOutcome {
        let kind = ConditionKind::OnWebApplication;
        if self.web_type.is_satisfied_by(web_type) {
            ConditionOutcome::matched(kind, ConditionMessage::for_condition(kind).because(format!("found {web_type} web application")))
        } else {
            let message = ConditionMessage::for_condition(kind).because(format!("requires {} web application but the application type is {web_type}", self.web_type));
            ConditionOutcome::no_match(kind, message)
        }
    }

    /// Pre-filter form: only checks that the required web stack is available at all.
    pub fn availability_outcome(requirement: WebRequirement, oracle: &dyn ClassPresenceOracle) -> Option<ConditionOutcome> {
        let kind = ConditionKind::OnWebApplication;
        let servlet = oracle.is_present(SERVLET_APPLICATION_SYMBOL);
        let reactive = oracle.is_present(REACTIVE_APPLICATION_SYMBOL);
        let missing = match requirement {
            WebRequirement::Servlet if !servlet => "servlet web application classes",
            WebRequirement::Reactive if !reactive => "reactive web application classes",
            WebRequirement::Any if !servlet && !reactive => "reactive or servlet web application classes",
            _ => return None,
        };
        Some(ConditionOutcome::no_match(kind, ConditionMessage::for_condition(kind).did_not_find(missing, missing).at_all()))
    }
}

/// A single declared condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConditionRule {
    #[serde(rename = "on-class")]
    RequiresSymbols(SymbolSpec),
    #[serde(rename = "on-missing-class")]
    ForbidsSymbols(SymbolSpec),
    #[serde(rename = "on-bean")]
    RequiresRegistryEntries(BeanSpec),
    #[serde(rename = "on-single-candidate")]
    RequiresSingleCandidate(BeanSpec),
    #[serde(rename = "on-missing-bean")]
    ForbidsRegistryEntries(BeanSpec),
    #[serde(rename = "on-property")]
    RequiresProperty(PropertySpec),
    #[serde(rename = "on-web-application")]
    RequiresWebApplication(WebSpec),
}

impl ConditionRule {
    pub fn requires_symbols<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        ConditionRule::RequiresSymbols(SymbolSpec::new(symbols))
    }

    pub fn forbids_symbols<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        ConditionRule::ForbidsSymbols(SymbolSpec::new(symbols))
    }
}

impl Condition for ConditionRule {
    fn kind(&self) -> ConditionKind {
        match self {
            ConditionRule::RequiresSymbols(_) => ConditionKind::OnClass,
            ConditionRule::ForbidsSymbols(_) => ConditionKind::OnMissingClass,
            ConditionRule::RequiresRegistryEntries(_) => ConditionKind::OnBean,
            ConditionRule::RequiresSingleCandidate(_) => ConditionKind::OnSingleCandidate,
            ConditionRule::ForbidsRegistryEntries(_) => ConditionKind::OnMissingBean,
            ConditionRule::RequiresProperty(_) => ConditionKind::OnProperty,
            ConditionRule::RequiresWebApplication(_) => ConditionKind::OnWebApplication,
        }
    }

    fn validate(&self, unit: &UnitName) -> Result<(), ConditionError> {
        match self {
            ConditionRule::RequiresSymbols(spec) | ConditionRule::ForbidsSymbols(spec) => {
                if spec.symbols.iter().all(|symbol| symbol.trim().is_empty()) {
                    return Err(ConditionError::MalformedDeclaration {
                        unit: unit.to_string(),
                        kind: self.kind(),
                        reason: "at least one symbol must be specified".to_string(),
                    });
                }
                Ok(())
            }
            ConditionRule::RequiresRegistryEntries(spec) | ConditionRule::RequiresSingleCandidate(spec) | ConditionRule::ForbidsRegistryEntries(spec) => spec.validate(unit, self.kind()),
            ConditionRule::RequiresProperty(spec) => spec.validate(unit),
            ConditionRule::RequiresWebApplication(_) => Ok(()),
        }
    }

    fn evaluate(&self, context: &ConditionContext<'_>) -> ConditionOutcome {
        match self {
            ConditionRule::RequiresSymbols(spec) => spec.evaluate_required(context.oracle),
            ConditionRule::ForbidsSymbols(spec) => spec.evaluate_forbidden(context.oracle),
            ConditionRule::RequiresRegistryEntries(spec) => bean::evaluate_on_bean(spec, context.registry),
            ConditionRule::RequiresSingleCandidate(spec) => bean::evaluate_single_candidate(spec, context.registry),
            ConditionRule::ForbidsRegistryEntries(spec) => bean::evaluate_missing_bean(spec, context.registry),
            ConditionRule::RequiresProperty(spec) => spec.evaluate(context.environment),
            ConditionRule::RequiresWebApplication(spec) => spec.evaluate(context.web_type),
        }
    }
}

/// Outcomes for one unit, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitEvaluation {
    pub matched: bool,
    pub outcomes: Vec<ConditionOutcome>,
}

/// Validates every rule, then evaluates them grouped by kind, cheapest first.
///
/// Each group is evaluated in full before the verdict is checked, so one
/// failing group still reports every rule of that kind.
pub fn evaluate_unit(unit: &UnitName, rules: &[ConditionRule], context: &ConditionContext<'_>) -> Result<UnitEvaluation, ConditionError> {
    for rule in rules {
        rule.validate(unit)?;
    }

    let mut ordered: Vec<&ConditionRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.kind().evaluation_rank());

    let mut outcomes = Vec::with_capacity(ordered.len());
    for group in ordered.chunk_by(|a, b| a.kind() == b.kind()) {
        let mut group_matched = true;
        for rule in group {
            let outcome = rule.evaluate(context);
            trace!(unit = %unit, "Condition {outcome}");
            group_matched &= outcome.matched;
            outcomes.push(outcome);
        }
        if !group_matched {
            return Ok(UnitEvaluation { matched: false, outcomes });
        }
    }

    Ok(UnitEvaluation { matched: true, outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PropertySource;
    use crate::oracle::StaticOracle;
    use crate::registry::{BeanDefinition, InMemoryBeanRegistry};

    struct Fixture {
        oracle: StaticOracle,
        registry: InMemoryBeanRegistry,
        environment: Environment,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                oracle: StaticOracle::new(["X", "Y"]),
                registry: InMemoryBeanRegistry::from_definitions([BeanDefinition::new("store").with_type("Store")]),
                environment: Environment::new().with_source(PropertySource::from_map("test", [("feature.enabled", "true")])),
            }
        }

        fn context(&self) -> ConditionContext<'_> {
            ConditionContext::new(&self.oracle, &self.registry, &self.environment)
        }
    }

    #[test]
    fn test_all_rules_must_match() {
        let fixture = Fixture::new();
        let rules = vec![
            ConditionRule::requires_symbols(["X"]),
            ConditionRule::RequiresRegistryEntries(BeanSpec::of_type("Store")),
            ConditionRule::RequiresProperty(PropertySpec::new("enabled").with_prefix("feature")),
        ];
        let evaluation = evaluate_unit(&UnitName::from("Unit"), &rules, &fixture.context()).unwrap();
        assert!(evaluation.matched);
        assert_eq!(evaluation.outcomes.len(), 3);
    }

    #[test]
    fn test_group_collects_all_diagnostics_then_stops() {
        let fixture = Fixture::new();
        let rules = vec![
            ConditionRule::RequiresRegistryEntries(BeanSpec::of_type("Store")),
            ConditionRule::requires_symbols(["Missing.One"]),
            ConditionRule::requires_symbols(["Missing.Two"]),
        ];
        let evaluation = evaluate_unit(&UnitName::from("Unit"), &rules, &fixture.context()).unwrap();
        assert!(!evaluation.matched);
        // Both symbol rules reported; the registry group never ran.
        assert_eq!(evaluation.outcomes.len(), 2);
        assert!(evaluation.outcomes.iter().all(|o| o.kind == ConditionKind::OnClass && !o.matched));
    }

    #[test]
    fn test_symbol_rules_run_before_registry_rules() {
        let fixture = Fixture::new();
        let rules = vec![ConditionRule::ForbidsRegistryEntries(BeanSpec::of_type("Store")), ConditionRule::forbids_symbols(["Z"])];
        let evaluation = evaluate_unit(&UnitName::from("Unit"), &rules, &fixture.context()).unwrap();
        assert_eq!(evaluation.outcomes[0].kind, ConditionKind::OnMissingClass);
        assert_eq!(evaluation.outcomes[1].kind, ConditionKind::OnMissingBean);
        assert!(!evaluation.matched);
    }

    #[test]
    fn test_malformed_declaration_is_fatal() {
        let fixture = Fixture::new();
        let rules = vec![ConditionRule::requires_symbols(["X"]), ConditionRule::RequiresRegistryEntries(BeanSpec::default())];
        let err = evaluate_unit(&UnitName::from("Broken.Unit"), &rules, &fixture.context()).unwrap_err();
        assert!(err.to_string().contains("Broken.Unit"));
        assert!(err.to_string().contains("ConditionalOnBean"));

        let empty_symbols = vec![ConditionRule::requires_symbols(Vec::<String>::new())];
        assert!(evaluate_unit(&UnitName::from("Unit"), &empty_symbols, &fixture.context()).is_err());
    }

    #[test]
    fn test_no_rules_match() {
        let fixture = Fixture::new();
        let evaluation = evaluate_unit(&UnitName::from("Unit"), &[], &fixture.context()).unwrap();
        assert!(evaluation.matched);
        assert!(evaluation.outcomes.is_empty());
    }

    #[test]
    fn test_web_rule_uses_deduced_type() {
        let fixture = Fixture::new();
        let context = fixture.context();
        assert_eq!(context.web_type, WebApplicationType::None);
        let rule = ConditionRule::RequiresWebApplication(WebSpec::default());
        let outcome = rule.evaluate(&context);
        assert!(!outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnWebApplication requires any web application but the application type is none");
    }

    #[test]
    fn test_web_availability_outcome() {
        let oracle = StaticOracle::new([SERVLET_APPLICATION_SYMBOL]);
        assert!(WebSpec::availability_outcome(WebRequirement::Servlet, &oracle).is_none());
        assert!(WebSpec::availability_outcome(WebRequirement::Any, &oracle).is_none());
        let outcome = WebSpec::availability_outcome(WebRequirement::Reactive, &oracle).unwrap();
        assert_eq!(outcome.message.as_str(), "@ConditionalOnWebApplication did not find reactive web application classes");
    }

    #[test]
    fn test_rule_deserializes_with_kind_tag() {
        let rule: ConditionRule = serde_json::from_str(r#"{"kind":"on-bean","types":["Store"],"search":"current"}"#).unwrap();
        assert_eq!(rule, ConditionRule::RequiresRegistryEntries(BeanSpec::of_type("Store").with_search(autoconf_common::SearchStrategy::Current)));
        let web: ConditionRule = serde_json::from_str(r#"{"kind":"on-web-application","web_type":"servlet"}"#).unwrap();
        assert_eq!(web.kind(), ConditionKind::OnWebApplication);
    }
}
