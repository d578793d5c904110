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

//! Error types for the resolution engine
//!
//! Only fatal configuration problems are errors. A condition that does not
//! match is an ordinary outcome and is reported through `ResolutionResult`.

use autoconf_common::ConditionKind;
use thiserror::Error;

/// Malformed condition declarations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Malformed {kind} declaration on {unit}: {reason}")]
    MalformedDeclaration { unit: String, kind: ConditionKind, reason: String },
}

/// Problems reading the metadata index
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetadataError {
    #[error("Metadata entry '{key}' is not an integer: '{value}'")]
    InvalidInteger { key: String, value: String },
}

/// Before/after declarations that cannot be satisfied
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderingError {
    #[error("Ordering cycle detected between {first} and {second} (cycle members: {})", .members.join(", "))]
    Cycle { first: String, second: String, members: Vec<String> },
}

/// Fatal errors that abort a resolution pass
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("The following units could not be excluded because they are not candidates:\n{}", format_list(.0))]
    InvalidExclusions(Vec<String>),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

fn format_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\t- {item}")).collect::<Vec<_>>().join("\n")
}
