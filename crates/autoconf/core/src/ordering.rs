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

//! Final ordering of accepted units
//!
//! Units are first sorted by numeric precedence (lower first, ties keep
//! candidate order), then arranged so every unit follows the units it must
//! run after. Relations naming units outside the accepted set are ignored.

use crate::catalog::UnitCatalog;
use crate::error::{MetadataError, OrderingError, ResolutionError};
use crate::metadata::{AFTER_KEY, BEFORE_KEY, MetadataIndex, ORDER_KEY};
use autoconf_common::UnitName;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Precedence used when a unit declares none.
pub const DEFAULT_ORDER: i32 = 0;

/// Ordering declarations for one unit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderingHints {
    pub order: i32,
    pub before: Vec<UnitName>,
    pub after: Vec<UnitName>,
}

pub struct PriorityOrderer<'a> {
    metadata: &'a MetadataIndex,
    catalog: &'a dyn UnitCatalog,
}

impl<'a> PriorityOrderer<'a> {
    pub fn new(metadata: &'a MetadataIndex, catalog: &'a dyn UnitCatalog) -> Self {
        Self { metadata, catalog }
    }

    /// Definition values win; metadata fills in whatever the definition leaves unset.
    pub fn hints(&self, unit: &UnitName) -> Result<OrderingHints, MetadataError> {
        let definition = self.catalog.definition(unit);
        let metadata_list = |key: &str| -> Vec<UnitName> { self.metadata.get_set(unit.as_str(), key).unwrap_or_default().into_iter().map(UnitName::new).collect() };

        let order = match definition.and_then(|d| d.order) {
            Some(order) => order,
            None => self.metadata.get_integer(unit.as_str(), ORDER_KEY)?.unwrap_or(DEFAULT_ORDER),
        };
        let before = match definition {
            Some(d) if !d.before.is_empty() => d.before.clone(),
            _ => metadata_list(BEFORE_KEY),
        };
        let after = match definition {
            Some(d) if !d.after.is_empty() => d.after.clone(),
            _ => metadata_list(AFTER_KEY),
        };
        Ok(OrderingHints { order, before, after })
    }

    pub fn order(&self, accepted: &[UnitName]) -> Result<Vec<UnitName>, ResolutionError> {
        let mut hints = HashMap::with_capacity(accepted.len());
        for unit in accepted {
            hints.insert(unit, self.hints(unit)?);
        }

        let mut prioritized: Vec<&UnitName> = accepted.iter().collect();
        prioritized.sort_by_key(|unit| hints.get(unit).map_or(DEFAULT_ORDER, |h| h.order));

        let sorter = AfterSorter::new(&prioritized, &hints);
        let ordered = sorter.sort()?;
        debug!(units = ordered.len(), "Ordered accepted units");
        Ok(ordered)
    }
}

/// Depth-first arrangement honoring before/after relations.
struct AfterSorter<'s> {
    prioritized: &'s [&'s UnitName],
    requested_after: HashMap<&'s UnitName, Vec<&'s UnitName>>,
}

impl<'s> AfterSorter<'s> {
    /// Own `after` entries come first, then every unit declaring `before`
    /// this one, in prioritized order.
    fn new(prioritized: &'s [&'s UnitName], hints: &'s HashMap<&'s UnitName, OrderingHints>) -> Self {
        let known: HashSet<&UnitName> = prioritized.iter().copied().collect();
        let mut requested_after: HashMap<&UnitName, Vec<&UnitName>> = HashMap::with_capacity(prioritized.len());
        let mut seen: HashMap<&UnitName, HashSet<&UnitName>> = HashMap::with_capacity(prioritized.len());

        for &unit in prioritized {
            let afters = requested_after.entry(unit).or_default();
            let unit_seen = seen.entry(unit).or_default();
            for after in hints.get(unit).map(|h| h.after.as_slice()).unwrap_or_default() {
                if let Some(&known_after) = known.get(after)
                    && unit_seen.insert(known_after)
                {
                    afters.push(known_after);
                }
            }
        }

        for &other in prioritized {
            for before in hints.get(other).map(|h| h.before.as_slice()).unwrap_or_default() {
                let Some(&known_before) = known.get(before) else {
                    continue;
                };
                if seen.entry(known_before).or_default().insert(other) {
                    requested_after.entry(known_before).or_default().push(other);
                }
            }
        }

        Self { prioritized, requested_after }
    }

    fn sort(&self) -> Result<Vec<UnitName>, OrderingError> {
        let mut sorted: Vec<&UnitName> = Vec::with_capacity(self.prioritized.len());
        let mut done: HashSet<&UnitName> = HashSet::with_capacity(self.prioritized.len());
        let mut processing: HashSet<&UnitName> = HashSet::new();

        for &unit in self.prioritized {
            if !done.contains(unit) {
                self.visit(unit, &mut sorted, &mut done, &mut processing)?;
            }
        }
        Ok(sorted.into_iter().cloned().collect())
    }

    /// Depth-first walk from `start` using an explicit stack of
    /// `(unit, next after index)` frames, so chain length is bounded by heap only.
    fn visit(&self, start: &'s UnitName, sorted: &mut Vec<&'s UnitName>, done: &mut HashSet<&'s UnitName>, processing: &mut HashSet<&'s UnitName>) -> Result<(), OrderingError> {
        processing.insert(start);
        let mut stack: Vec<(&'s UnitName, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            let next = self.requested_after.get(current).and_then(|afters| afters.get(frame.1)).copied();
            frame.1 += 1;

            match next {
                Some(after) => {
                    if processing.contains(after) {
                        return Err(self.cycle_error(current, after));
                    }
                    if !done.contains(after) {
                        processing.insert(after);
                        stack.push((after, 0));
                    }
                }
                None => {
                    processing.remove(current);
                    done.insert(current);
                    sorted.push(current);
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Names the detected pair plus every unit in the same strongly connected component.
    fn cycle_error(&self, first: &UnitName, second: &UnitName) -> OrderingError {
        let mut graph: DiGraph<&UnitName, ()> = DiGraph::new();
        let indices: HashMap<&UnitName, NodeIndex> = self.prioritized.iter().map(|&unit| (unit, graph.add_node(unit))).collect();
        for (unit, afters) in &self.requested_after {
            for after in afters {
                graph.add_edge(indices[after], indices[unit], ());
            }
        }

        let component = tarjan_scc(&graph).into_iter().find(|component| component.iter().any(|&index| graph[index] == first)).unwrap_or_default();
        let in_component: HashSet<&UnitName> = component.iter().map(|&index| graph[index]).collect();
        let members = self.prioritized.iter().filter(|unit| in_component.contains(*unit)).map(|unit| unit.to_string()).collect();

        OrderingError::Cycle {
            first: first.to_string(),
            second: second.to_string(),
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StaticCatalog, UnitDefinition};

    fn names(values: &[&str]) -> Vec<UnitName> {
        values.iter().copied().map(UnitName::from).collect()
    }

    fn order(definitions: Vec<UnitDefinition>, metadata: MetadataIndex, accepted: &[&str]) -> Result<Vec<UnitName>, ResolutionError> {
        let catalog = StaticCatalog::from_definitions(definitions);
        PriorityOrderer::new(&metadata, &catalog).order(&names(accepted))
    }

    #[test]
    fn test_numeric_precedence_with_stable_ties() {
        let definitions = vec![UnitDefinition::new("Late").with_order(10), UnitDefinition::new("Early").with_order(-5)];
        let ordered = order(definitions, MetadataIndex::empty(), &["Late", "TieOne", "Early", "TieTwo"]).unwrap();
        assert_eq!(ordered, names(&["Early", "TieOne", "TieTwo", "Late"]));
    }

    #[test]
    fn test_after_and_before_relations() {
        let definitions = vec![UnitDefinition::new("A").after("C"), UnitDefinition::new("D").before("B")];
        let ordered = order(definitions, MetadataIndex::empty(), &["A", "B", "C", "D"]).unwrap();
        assert_eq!(ordered, names(&["C", "A", "D", "B"]));
    }

    #[test]
    fn test_relations_outside_accepted_set_are_ignored() {
        let definitions = vec![UnitDefinition::new("A").after("Rejected")];
        let ordered = order(definitions, MetadataIndex::empty(), &["A", "B"]).unwrap();
        assert_eq!(ordered, names(&["A", "B"]));
    }

    #[test]
    fn test_metadata_fallback() {
        let metadata = MetadataIndex::from_pairs([("A.AutoConfigureOrder", "5"), ("B.AutoConfigureAfter", "C"), ("C.AutoConfigureOrder", "1")]);
        let definitions = vec![UnitDefinition::new("C").with_order(9)];
        let ordered = order(definitions, metadata, &["A", "B", "C"]).unwrap();
        // B (order 0) pulls C (definition order 9) ahead of A (metadata order 5).
        assert_eq!(ordered, names(&["C", "B", "A"]));
    }

    #[test]
    fn test_invalid_metadata_order_is_fatal() {
        let metadata = MetadataIndex::from_pairs([("A.AutoConfigureOrder", "first")]);
        let err = order(Vec::new(), metadata, &["A"]).unwrap_err();
        assert!(matches!(err, ResolutionError::Metadata(MetadataError::InvalidInteger { .. })));
    }

    #[test]
    fn test_mutual_before_is_a_cycle() {
        let definitions = vec![UnitDefinition::new("A").before("B"), UnitDefinition::new("B").before("A")];
        let err = order(definitions, MetadataIndex::empty(), &["A", "B"]).unwrap_err();
        let ResolutionError::Ordering(OrderingError::Cycle { first, second, members }) = err else {
            panic!("expected a cycle error");
        };
        let mut pair = vec![first, second];
        pair.sort();
        assert_eq!(pair, vec!["A", "B"]);
        assert_eq!(members, vec!["A", "B"]);
    }

    #[test]
    fn test_cycle_members_exclude_bystanders() {
        let definitions = vec![UnitDefinition::new("A").after("C"), UnitDefinition::new("B").after("A"), UnitDefinition::new("C").after("B"), UnitDefinition::new("D").after("A")];
        let err = order(definitions, MetadataIndex::empty(), &["D", "A", "B", "C"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cycle members: A, B, C"), "{message}");
    }

    #[test]
    fn test_duplicate_relations_add_one_edge() {
        let definitions = vec![UnitDefinition::new("A").after("B").after("B"), UnitDefinition::new("B").before("A")];
        let catalog = StaticCatalog::from_definitions(definitions);
        let metadata = MetadataIndex::empty();
        let orderer = PriorityOrderer::new(&metadata, &catalog);
        let accepted = names(&["A", "B"]);
        let hints: HashMap<&UnitName, OrderingHints> = accepted.iter().map(|unit| (unit, orderer.hints(unit).unwrap())).collect();
        let prioritized: Vec<&UnitName> = accepted.iter().collect();

        let sorter = AfterSorter::new(&prioritized, &hints);
        assert_eq!(sorter.requested_after[&accepted[0]], vec![&accepted[1]]);
        assert!(sorter.requested_after[&accepted[1]].is_empty());
        assert_eq!(sorter.sort().unwrap(), names(&["B", "A"]));
    }

    #[test]
    fn test_long_after_chain() {
        const LENGTH: usize = 20_000;
        let units: Vec<UnitName> = (0..LENGTH).map(|i| UnitName::new(format!("U{i}"))).collect();
        let definitions = units.windows(2).map(|pair| UnitDefinition::new(pair[0].as_str()).after(pair[1].as_str()));
        let catalog = StaticCatalog::from_definitions(definitions);
        let metadata = MetadataIndex::empty();

        let ordered = PriorityOrderer::new(&metadata, &catalog).order(&units).unwrap();
        assert_eq!(ordered.len(), LENGTH);
        assert_eq!(ordered[0].as_str(), "U19999");
        assert_eq!(ordered[LENGTH - 1].as_str(), "U0");
    }

    #[test]
    fn test_flat_list_keeps_candidate_order() {
        let units: Vec<UnitName> = (0..10_000).map(|i| UnitName::new(format!("U{i}"))).collect();
        let catalog = StaticCatalog::from_definitions(Vec::new());
        let metadata = MetadataIndex::empty();

        let ordered = PriorityOrderer::new(&metadata, &catalog).order(&units).unwrap();
        assert_eq!(ordered, units);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let definitions = vec![UnitDefinition::new("A").after("A")];
        assert!(order(definitions, MetadataIndex::empty(), &["A"]).is_err());
    }
}
