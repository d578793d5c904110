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

//! Registry conditions
//!
//! Bean conditions query the live registry and must always be evaluated
//! explicitly. They depend on what the host has registered so far, so a unit
//! processed early may not see beans provided by a unit processed later.

use crate::error::ConditionError;
use crate::registry::BeanRegistry;
use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, ItemStyle, SearchStrategy, UnitName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Criteria for registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeanSpec {
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Beans of these types never count as matches.
    #[serde(default)]
    pub ignored_types: Vec<String>,
    #[serde(default)]
    pub search: SearchStrategy,
}

impl BeanSpec {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            types: vec![type_name.into()],
            ..Default::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn annotated_with(annotation: impl Into<String>) -> Self {
        Self {
            annotations: vec![annotation.into()],
            ..Default::default()
        }
    }

    pub fn ignoring(mut self, type_name: impl Into<String>) -> Self {
        self.ignored_types.push(type_name.into());
        self
    }

    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    pub fn validate(&self, unit: &UnitName, kind: ConditionKind) -> Result<(), ConditionError> {
        if self.types.is_empty() && self.names.is_empty() && self.annotations.is_empty() {
            return Err(ConditionError::MalformedDeclaration {
                unit: unit.to_string(),
                kind,
                reason: "no bean type, name or annotation specified".to_string(),
            });
        }
        if kind == ConditionKind::OnSingleCandidate {
            let types = self.candidate_types();
            if types.len() != 1 {
                return Err(ConditionError::MalformedDeclaration {
                    unit: unit.to_string(),
                    kind,
                    reason: format!("exactly one type must be specified (got [{}])", types.join(", ")),
                });
            }
        }
        Ok(())
    }

    // Blank and catch-all types say nothing about a single candidate.
    fn candidate_types(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.trim()).filter(|t| !t.is_empty() && *t != "Object").collect()
    }

    /// Runs every lookup this spec declares against the scope its search strategy selects.
    pub fn find_matches(&self, registry: &dyn BeanRegistry) -> MatchResult {
        let mut result = MatchResult::default();
        let scope = match self.search {
            SearchStrategy::Ancestors => registry.parent(),
            SearchStrategy::Current | SearchStrategy::All => Some(registry),
        };
        let Some(scope) = scope else {
            // No parent scope to search
            self.types.iter().for_each(|t| result.unmatched_types.push(t.clone()));
            self.annotations.iter().for_each(|a| result.unmatched_annotations.push(a.clone()));
            self.names.iter().for_each(|n| result.unmatched_names.push(n.clone()));
            return result;
        };
        let hierarchy = self.search.considers_hierarchy();

        let ignored: Vec<String> = self.ignored_types.iter().flat_map(|t| scope.bean_names_for_type(t, hierarchy)).collect();

        for type_name in &self.types {
            let matches: Vec<String> = scope.bean_names_for_type(type_name, hierarchy).into_iter().filter(|n| !ignored.contains(n)).collect();
            if matches.is_empty() {
                result.unmatched_types.push(type_name.clone());
            } else {
                result.push_matches(&matches);
                result.matched_types.insert(type_name.clone(), matches);
            }
        }

        for annotation in &self.annotations {
            let matches: Vec<String> = scope.bean_names_for_annotation(annotation, hierarchy).into_iter().filter(|n| !ignored.contains(n)).collect();
            if matches.is_empty() {
                result.unmatched_annotations.push(annotation.clone());
            } else {
                result.push_matches(&matches);
                result.matched_annotations.insert(annotation.clone(), matches);
            }
        }

        for name in &self.names {
            if !ignored.contains(name) && scope.contains_bean(name, hierarchy) {
                result.matched_names.push(name.clone());
                result.push_match(name.clone());
            } else {
                result.unmatched_names.push(name.clone());
            }
        }

        result
    }
}

impl fmt::Display for BeanSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.names.is_empty() {
            parts.push(format!("names: {}", self.names.join(",")));
        }
        if !self.types.is_empty() {
            parts.push(format!("types: {}", self.types.join(",")));
        }
        if !self.annotations.is_empty() {
            parts.push(format!("annotations: {}", self.annotations.join(",")));
        }
        if !self.ignored_types.is_empty() {
            parts.push(format!("ignored: {}", self.ignored_types.join(",")));
        }
        parts.push(format!("SearchStrategy: {}", self.search));
        write!(f, "({})", parts.join("; "))
    }
}

/// Registry lookup results grouped by criterion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched_types: BTreeMap<String, Vec<String>>,
    pub matched_annotations: BTreeMap<String, Vec<String>>,
    pub matched_names: Vec<String>,
    pub unmatched_types: Vec<String>,
    pub unmatched_annotations: Vec<String>,
    pub unmatched_names: Vec<String>,
    names_of_all_matches: Vec<String>,
}

impl MatchResult {
    fn push_matches(&mut self, names: &[String]) {
        for name in names {
            self.push_match(name.clone());
        }
    }

    fn push_match(&mut self, name: String) {
        if !self.names_of_all_matches.contains(&name) {
            self.names_of_all_matches.push(name);
        }
    }

    pub fn is_all_matched(&self) -> bool {
        self.unmatched_types.is_empty() && self.unmatched_annotations.is_empty() && self.unmatched_names.is_empty()
    }

    pub fn is_any_matched(&self) -> bool {
        !self.matched_types.is_empty() || !self.matched_annotations.is_empty() || !self.matched_names.is_empty()
    }

    /// Distinct matching bean names in discovery order.
    pub fn names_of_all_matches(&self) -> &[String] {
        &self.names_of_all_matches
    }

    fn no_match_reason(&self) -> String {
        let mut clauses = Vec::new();
        for (description, unmatched) in [("annotated with", &self.unmatched_annotations), ("of type", &self.unmatched_types), ("named", &self.unmatched_names)] {
            if !unmatched.is_empty() {
                clauses.push(format!("did not find any beans {description} {}", unmatched.join(", ")));
            }
        }
        clauses.join(" and ")
    }

    fn unwanted_match_reason(&self) -> String {
        let mut clauses = Vec::new();
        for (description, matched) in [("annotated with", &self.matched_annotations), ("of type", &self.matched_types)] {
            for (key, names) in matched {
                clauses.push(format!("found beans {description} '{key}' {}", names.join(", ")));
            }
        }
        if !self.matched_names.is_empty() {
            clauses.push(format!("found beans named {}", self.matched_names.join(", ")));
        }
        clauses.join(" and ")
    }
}

/// At least one entry for every requirement.
pub fn evaluate_on_bean(spec: &BeanSpec, registry: &dyn BeanRegistry) -> ConditionOutcome {
    let kind = ConditionKind::OnBean;
    let result = spec.find_matches(registry);
    if !result.is_all_matched() {
        let message = ConditionMessage::for_condition_with(kind, spec).because(result.no_match_reason());
        return ConditionOutcome::no_match(kind, message);
    }
    let message = ConditionMessage::for_condition_with(kind, spec).found("bean", "beans").items(ItemStyle::Quote, result.names_of_all_matches());
    ConditionOutcome::matched(kind, message)
}

/// Matching beans must resolve to one candidate: a single match, or a single
/// primary among several.
pub fn evaluate_single_candidate(spec: &BeanSpec, registry: &dyn BeanRegistry) -> ConditionOutcome {
    let kind = ConditionKind::OnSingleCandidate;
    let result = spec.find_matches(registry);
    if !result.is_all_matched() {
        let message = ConditionMessage::for_condition_with(kind, spec).did_not_find("any beans", "any beans").at_all();
        return ConditionOutcome::no_match(kind, message);
    }

    let names = result.names_of_all_matches();
    let hierarchy = spec.search == SearchStrategy::All;
    let single = names.len() == 1 || names.iter().filter(|name| registry.is_primary(name, hierarchy)).count() == 1;
    if !single {
        let message = ConditionMessage::for_condition_with(kind, spec).did_not_find("a primary bean from beans", "a primary bean from beans").items(ItemStyle::Quote, names);
        return ConditionOutcome::no_match(kind, message);
    }
    let message = ConditionMessage::for_condition_with(kind, spec).found("a primary bean from beans", "a primary bean from beans").items(ItemStyle::Quote, names);
    ConditionOutcome::matched(kind, message)
}

/// No entry for any requirement. A failure enumerates every group that matched.
pub fn evaluate_missing_bean(spec: &BeanSpec, registry: &dyn BeanRegistry) -> ConditionOutcome {
    let kind = ConditionKind::OnMissingBean;
    let result = spec.find_matches(registry);
    if result.is_any_matched() {
        let message = ConditionMessage::for_condition_with(kind, spec).because(result.unwanted_match_reason());
        return ConditionOutcome::no_match(kind, message);
    }
    let message = ConditionMessage::for_condition_with(kind, spec).did_not_find("any beans", "any beans").at_all();
    ConditionOutcome::matched(kind, message)
}
