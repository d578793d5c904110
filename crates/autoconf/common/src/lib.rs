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

//! Shared data model for the auto-configuration resolution engine.
//!
//! Types in this crate carry no behavior beyond formatting and comparison; the
//! engine itself lives in `autoconf-core`.

pub mod condition;
pub mod message;
pub mod outcome;
pub mod search;
pub mod unit;

pub use condition::ConditionKind;
pub use message::{ConditionMessage, ItemStyle};
pub use outcome::ConditionOutcome;
pub use search::SearchStrategy;
pub use unit::UnitName;
