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

//! Condition evaluation report
//!
//! Collects every outcome produced during a resolution pass so a host can
//! explain why each unit was or was not applied.

use autoconf_common::{ConditionOutcome, UnitName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Outcomes recorded for one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitOutcomes {
    pub full_match: bool,
    pub outcomes: Vec<ConditionOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionEvaluationReport {
    units: BTreeMap<UnitName, UnitOutcomes>,
    exclusions: Vec<UnitName>,
    unconditional: Vec<UnitName>,
}

impl ConditionEvaluationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends outcomes for `unit`. A unit fully matches only if every recorded outcome matched.
    pub fn record_outcomes(&mut self, unit: &UnitName, outcomes: impl IntoIterator<Item = ConditionOutcome>) {
        let entry = self.units.entry(unit.clone()).or_insert_with(|| UnitOutcomes {
            full_match: true,
            outcomes: Vec::new(),
        });
        for outcome in outcomes {
            entry.full_match &= outcome.matched;
            entry.outcomes.push(outcome);
        }
    }

    pub fn record_exclusions(&mut self, exclusions: &[UnitName]) {
        for unit in exclusions {
            if !self.exclusions.contains(unit) {
                self.exclusions.push(unit.clone());
            }
        }
    }

    pub fn record_unconditional(&mut self, unit: &UnitName) {
        if !self.unconditional.contains(unit) {
            self.unconditional.push(unit.clone());
        }
    }

    pub fn outcomes_for(&self, unit: &UnitName) -> Option<&UnitOutcomes> {
        self.units.get(unit)
    }

    pub fn exclusions(&self) -> &[UnitName] {
        &self.exclusions
    }

    pub fn unconditional(&self) -> &[UnitName] {
        &self.unconditional
    }

    pub fn positive_matches(&self) -> impl Iterator<Item = (&UnitName, &UnitOutcomes)> {
        self.units.iter().filter(|(_, outcomes)| outcomes.full_match)
    }

    pub fn negative_matches(&self) -> impl Iterator<Item = (&UnitName, &UnitOutcomes)> {
        self.units.iter().filter(|(_, outcomes)| !outcomes.full_match)
    }

    /// Human-readable rendering, grouped into positive and negative matches,
    /// exclusions and unconditional units.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConditionEvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let banner = "=".repeat(28);
        writeln!(f, "{banner}\nCONDITIONS EVALUATION REPORT\n{banner}\n")?;

        section(f, "Positive matches")?;
        let mut any = false;
        for (unit, recorded) in self.positive_matches() {
            any = true;
            writeln!(f, "   {unit} matched:")?;
            for outcome in &recorded.outcomes {
                writeln!(f, "      - {} ({})", outcome.message, outcome.kind)?;
            }
            writeln!(f)?;
        }
        none_if_empty(f, any)?;

        section(f, "Negative matches")?;
        any = false;
        for (unit, recorded) in self.negative_matches() {
            any = true;
            writeln!(f, "   {unit}:")?;
            let (failed, passed): (Vec<_>, Vec<_>) = recorded.outcomes.iter().partition(|outcome| !outcome.matched);
            writeln!(f, "      Did not match:")?;
            for outcome in failed {
                writeln!(f, "         - {} ({})", outcome.message, outcome.kind)?;
            }
            if !passed.is_empty() {
                writeln!(f, "      Matched:")?;
                for outcome in passed {
                    writeln!(f, "         - {} ({})", outcome.message, outcome.kind)?;
                }
            }
            writeln!(f)?;
        }
        none_if_empty(f, any)?;

        section(f, "Exclusions")?;
        names_or_none(f, &self.exclusions)?;

        section(f, "Unconditional units")?;
        names_or_none(f, &self.unconditional)
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}:\n{}\n", "-".repeat(title.len() + 1))
}

fn none_if_empty(f: &mut fmt::Formatter<'_>, any: bool) -> fmt::Result {
    if any { Ok(()) } else { f.write_str("    None\n\n") }
}

fn names_or_none(f: &mut fmt::Formatter<'_>, names: &[UnitName]) -> fmt::Result {
    if names.is_empty() {
        return f.write_str("    None\n\n");
    }
    for name in names {
        writeln!(f, "    {name}")?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoconf_common::{ConditionKind, ConditionMessage};

    fn outcome(matched: bool, text: &str) -> ConditionOutcome {
        ConditionOutcome {
            matched,
            kind: ConditionKind::OnClass,
            message: ConditionMessage::of(text),
        }
    }

    #[test]
    fn test_full_match_tracks_every_outcome() {
        let mut report = ConditionEvaluationReport::new();
        let unit = UnitName::from("Alpha");
        report.record_outcomes(&unit, [outcome(true, "first")]);
        assert!(report.outcomes_for(&unit).unwrap().full_match);
        report.record_outcomes(&unit, [outcome(false, "second")]);
        let recorded = report.outcomes_for(&unit).unwrap();
        assert!(!recorded.full_match);
        assert_eq!(recorded.outcomes.len(), 2);
    }

    #[test]
    fn test_render_sections() {
        let mut report = ConditionEvaluationReport::new();
        report.record_outcomes(&UnitName::from("Alpha"), [outcome(true, "@ConditionalOnClass found required class 'X'")]);
        report.record_outcomes(&UnitName::from("Beta"), [outcome(false, "@ConditionalOnClass did not find required class 'Y'")]);
        report.record_exclusions(&[UnitName::from("Gamma"), UnitName::from("Gamma")]);

        let rendered = report.render();
        assert!(rendered.contains("Positive matches:"));
        assert!(rendered.contains("   Alpha matched:\n      - @ConditionalOnClass found required class 'X' (ConditionalOnClass)"));
        assert!(rendered.contains("   Beta:\n      Did not match:\n         - @ConditionalOnClass did not find required class 'Y' (ConditionalOnClass)"));
        assert!(rendered.contains("Exclusions:\n-----------\n\n    Gamma\n"));
        assert!(rendered.contains("Unconditional units:\n--------------------\n\n    None"));
        assert_eq!(report.exclusions().len(), 1);
    }

    #[test]
    fn test_display_matches_render() {
        let mut report = ConditionEvaluationReport::new();
        report.record_outcomes(&UnitName::from("Beta"), [outcome(true, "first"), outcome(false, "second")]);
        report.record_unconditional(&UnitName::from("Delta"));

        let rendered = report.render();
        assert_eq!(format!("{report}"), rendered);
        assert!(rendered.starts_with("============================\nCONDITIONS EVALUATION REPORT\n"));
        assert!(rendered.contains("Positive matches:\n-----------------\n\n    None\n\n"));
        assert!(rendered.contains("      Matched:\n         - first (ConditionalOnClass)\n"));
        assert!(rendered.ends_with("    Delta\n\n"));
    }

    #[test]
    fn test_serializes_to_json() {
        let mut report = ConditionEvaluationReport::new();
        report.record_unconditional(&UnitName::from("Delta"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unconditional"][0], "Delta");
    }
}
