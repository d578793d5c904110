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

//! Conditional auto-configuration resolution
//!
//! Decides which candidate configuration units apply to a build. Candidates
//! are gathered from a [`FactoriesRegistry`], deduplicated, filtered by user
//! exclusions, cheaply pre-filtered against the [`MetadataIndex`], evaluated
//! in full against their declared conditions and finally ordered by
//! precedence and before/after relations.
//!
//! ```ignore
//! let engine = ResolutionEngine::new(oracle, metadata, catalog);
//! let request = ResolutionRequest::new(candidates, &environment, &registry);
//! let result = engine.resolve(request)?;
//! ```

pub mod catalog;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod exclusions;
pub mod factories;
pub mod manifest;
pub mod metadata;
pub mod oracle;
pub mod ordering;
pub mod prefilter;
pub mod registry;
pub mod report;
pub mod web;

pub use catalog::{StaticCatalog, UnitCatalog, UnitDefinition};
pub use conditions::{BeanSpec, ConditionContext, ConditionRule, PropertySpec, SymbolSpec, WebSpec};
pub use config::EngineConfig;
pub use engine::{ResolutionEngine, ResolutionRequest, ResolutionResult, Stage};
pub use environment::{Environment, PropertySource};
pub use error::{ConditionError, MetadataError, OrderingError, ResolutionError};
pub use exclusions::ExclusionPolicy;
pub use factories::FactoriesRegistry;
pub use manifest::{Manifest, ManifestError};
pub use metadata::MetadataIndex;
pub use oracle::{CachingOracle, ClassPresenceOracle, StaticOracle};
pub use ordering::PriorityOrderer;
pub use prefilter::{FilterContext, ImportFilter, ImportFilterChain, ParallelOutcomeResolver, PrefilterMode};
pub use registry::{BeanDefinition, BeanRegistry, InMemoryBeanRegistry, NoopListener, RegistrationListener};
pub use report::ConditionEvaluationReport;
pub use web::WebApplicationType;

pub use autoconf_common::{ConditionKind, ConditionMessage, ConditionOutcome, SearchStrategy, UnitName};
