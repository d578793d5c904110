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

//! Environment property conditions

use crate::environment::Environment;
use crate::error::ConditionError;
use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, ItemStyle, UnitName};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(default)]
    pub prefix: String,
    pub names: Vec<String>,
    /// Expected value, compared case-insensitively. Empty means "anything but `false`".
    #[serde(default)]
    pub having_value: String,
    #[serde(default)]
    pub match_if_missing: bool,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn having_value(mut self, value: impl Into<String>) -> Self {
        self.having_value = value.into();
        self
    }

    pub fn match_if_missing(mut self) -> Self {
        self.match_if_missing = true;
        self
    }

    pub fn validate(&self, unit: &UnitName) -> Result<(), ConditionError> {
        if self.names.iter().all(|name| name.trim().is_empty()) {
            return Err(ConditionError::MalformedDeclaration {
                unit: unit.to_string(),
                kind: ConditionKind::OnProperty,
                reason: "at least one property name must be specified".to_string(),
            });
        }
        Ok(())
    }

    fn normalized_prefix(&self) -> String {
        let prefix = self.prefix.trim();
        if prefix.is_empty() || prefix.ends_with('.') { prefix.to_string() } else { format!("{prefix}.") }
    }

    fn is_match(&self, value: &str) -> bool {
        if self.having_value.is_empty() {
            !value.trim().eq_ignore_ascii_case("false")
        } else {
            value.trim().eq_ignore_ascii_case(&self.having_value)
        }
    }

    pub fn evaluate(&self, environment: &Environment) -> ConditionOutcome {
        let kind = ConditionKind::OnProperty;
        let prefix = self.normalized_prefix();
        let mut missing = Vec::new();
        let mut non_matching = Vec::new();

        for name in &self.names {
            let key = format!("{prefix}{name}");
            match environment.get_property(&key) {
                Some(value) if !self.is_match(value) => non_matching.push(name.as_str()),
                Some(_) => {}
                None if !self.match_if_missing => missing.push(name.as_str()),
                None => {}
            }
        }

        if !missing.is_empty() {
            let message = ConditionMessage::for_condition_with(kind, self).did_not_find("property", "properties").items(ItemStyle::Quote, &missing);
            return ConditionOutcome::no_match(kind, message);
        }
        if !non_matching.is_empty() {
            let message = ConditionMessage::for_condition_with(kind, self)
                .found("different value in property", "different value in properties")
                .items(ItemStyle::Quote, &non_matching);
            return ConditionOutcome::no_match(kind, message);
        }
        ConditionOutcome::matched(kind, ConditionMessage::for_condition_with(kind, self).because("matched"))
    }
}

impl fmt::Display for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.normalized_prefix())?;
        match self.names.as_slice() {
            [single] => f.write_str(single)?,
            names => write!(f, "[{}]", names.join(", "))?,
        }
        if !self.having_value.is_empty() {
            write!(f, "={}", self.having_value)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PropertySource;

    fn environment(pairs: &[(&str, &str)]) -> Environment {
        Environment::new().with_source(PropertySource::from_map("test", pairs.iter().copied()))
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertySpec::new("enabled").with_prefix("cache").having_value("true").to_string(), "(cache.enabled=true)");
        let multi = PropertySpec {
            names: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        assert_eq!(multi.to_string(), "([a, b])");
    }

    #[test]
    fn test_any_value_but_false() {
        let spec = PropertySpec::new("enabled").with_prefix("cache.");
        assert!(spec.evaluate(&environment(&[("cache.enabled", "yes")])).matched);
        let outcome = spec.evaluate(&environment(&[("cache.enabled", "FALSE")]));
        assert!(!outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnProperty (cache.enabled) found different value in property 'enabled'");
    }

    #[test]
    fn test_having_value_is_case_insensitive() {
        let spec = PropertySpec::new("mode").having_value("redis");
        assert!(spec.evaluate(&environment(&[("mode", "REDIS")])).matched);
        assert!(!spec.evaluate(&environment(&[("mode", "simple")])).matched);
    }

    #[test]
    fn test_missing_property() {
        let spec = PropertySpec::new("enabled").with_prefix("cache");
        let outcome = spec.evaluate(&environment(&[]));
        assert!(!outcome.matched);
        assert_eq!(outcome.message.as_str(), "@ConditionalOnProperty (cache.enabled) did not find property 'enabled'");
        assert!(spec.match_if_missing().evaluate(&environment(&[])).matched);
    }

    #[test]
    fn test_validation() {
        let unit = UnitName::from("Unit");
        assert!(PropertySpec::default().validate(&unit).is_err());
        assert!(PropertySpec::new("name").validate(&unit).is_ok());
    }
}
