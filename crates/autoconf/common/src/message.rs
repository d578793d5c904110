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

//! Human-readable condition diagnostics
//!
//! Messages are built fluently, e.g.
//! `ConditionMessage::for_condition(ConditionKind::OnClass).did_not_find("required class", "required classes").items(ItemStyle::Quote, &["X"])`
//! renders as `@ConditionalOnClass did not find required class 'X'`.

use crate::ConditionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How items are rendered inside a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStyle {
    Normal,
    Quote,
}

impl ItemStyle {
    fn apply(&self, item: &str) -> String {
        match self {
            ItemStyle::Normal => item.to_string(),
            ItemStyle::Quote => format!("'{item}'"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionMessage {
    text: String,
}

impl ConditionMessage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Starts a message about the given condition.
    pub fn for_condition(kind: ConditionKind) -> MessageBuilder {
        MessageBuilder {
            base: ConditionMessage::empty(),
            condition: kind.label(),
        }
    }

    /// Starts a message about the given condition with a parenthesized detail, e.g. the bean spec.
    pub fn for_condition_with(kind: ConditionKind, details: impl fmt::Display) -> MessageBuilder {
        MessageBuilder {
            base: ConditionMessage::empty(),
            condition: format!("{} {}", kind.label(), details),
        }
    }

    /// Continues this message with a clause about another condition.
    pub fn and_condition(self, kind: ConditionKind) -> MessageBuilder {
        MessageBuilder { base: self, condition: kind.label() }
    }

    /// Continues this message with a clause about another condition with a detail.
    pub fn and_condition_with(self, kind: ConditionKind, details: impl fmt::Display) -> MessageBuilder {
        MessageBuilder {
            base: self,
            condition: format!("{} {}", kind.label(), details),
        }
    }

    /// Appends a full message, separated by `; `.
    pub fn append(mut self, other: &ConditionMessage) -> Self {
        if other.is_empty() {
            return self;
        }
        if !self.text.is_empty() {
            self.text.push_str("; ");
        }
        self.text.push_str(&other.text);
        self
    }

    fn with_clause(self, clause: String) -> Self {
        self.append(&ConditionMessage::of(clause))
    }
}

impl fmt::Display for ConditionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builder for a single condition clause
pub struct MessageBuilder {
    base: ConditionMessage,
    condition: String,
}

impl MessageBuilder {
    pub fn found(self, singular: &str, plural: &str) -> ItemsBuilder {
        self.reason("found", singular, plural)
    }

    pub fn did_not_find(self, singular: &str, plural: &str) -> ItemsBuilder {
        self.reason("did not find", singular, plural)
    }

    /// Free-form reason, e.g. an aggregated registry explanation.
    pub fn because(self, reason: impl fmt::Display) -> ConditionMessage {
        let clause = format!("{} {}", self.condition, reason);
        self.base.with_clause(clause)
    }

    pub fn available(self, item: &str) -> ConditionMessage {
        let clause = format!("{} {} is available", self.condition, item);
        self.base.with_clause(clause)
    }

    pub fn not_available(self, item: &str) -> ConditionMessage {
        let clause = format!("{} {} is not available", self.condition, item);
        self.base.with_clause(clause)
    }

    fn reason(self, verb: &str, singular: &str, plural: &str) -> ItemsBuilder {
        ItemsBuilder {
            base: self.base,
            prefix: format!("{} {}", self.condition, verb),
            singular: singular.to_string(),
            plural: plural.to_string(),
        }
    }
}

pub struct ItemsBuilder {
    base: ConditionMessage,
    prefix: String,
    singular: String,
    plural: String,
}

impl ItemsBuilder {
    /// Renders the listed items, choosing the singular or plural noun by count.
    pub fn items<S: AsRef<str>>(self, style: ItemStyle, items: &[S]) -> ConditionMessage {
        let noun = if items.len() == 1 { &self.singular } else { &self.plural };
        let rendered: Vec<String> = items.iter().map(|i| style.apply(i.as_ref())).collect();
        let clause = if rendered.is_empty() {
            format!("{} {}", self.prefix, noun)
        } else {
            format!("{} {} {}", self.prefix, noun, rendered.join(", "))
        };
        self.base.with_clause(clause)
    }

    /// Renders `<prefix> <singular> at all`, ignoring the plural noun.
    pub fn at_all(self) -> ConditionMessage {
        let clause = format!("{} {}", self.prefix, self.singular);
        self.base.with_clause(clause)
    }
}
