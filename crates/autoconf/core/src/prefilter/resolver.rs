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

//! Fork-join evaluation of pre-filter outcomes
//!
//! The candidate list is split at `len / 2`. The second half is handed to a
//! dedicated single-worker pool while the calling thread evaluates the first
//! half itself; once both are done the results are concatenated so positions
//! line up with the input.

use autoconf_common::{ConditionOutcome, UnitName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

static FORK_POOL: OnceLock<Option<rayon::ThreadPool>> = OnceLock::new();

/// Candidate slots: `None` marks a unit already rejected by an earlier filter.
pub type CandidateSlots<'a> = [Option<&'a UnitName>];

/// Outcomes aligned with their candidate slots; `None` means no opinion.
pub type Outcomes = Vec<Option<ConditionOutcome>>;

/// How the pre-filter distributes work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefilterMode {
    /// Split only when more than one processor is available
    #[default]
    Auto,
    Serial,
    Parallel,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown pre-filter mode: {0} (expected auto, serial or parallel)")]
pub struct UnknownPrefilterMode(pub String);

impl FromStr for PrefilterMode {
    type Err = UnknownPrefilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PrefilterMode::Auto),
            "serial" => Ok(PrefilterMode::Serial),
            "parallel" => Ok(PrefilterMode::Parallel),
            _ => Err(UnknownPrefilterMode(s.to_string())),
        }
    }
}

impl fmt::Display for PrefilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefilterMode::Auto => f.write_str("auto"),
            PrefilterMode::Serial => f.write_str("serial"),
            PrefilterMode::Parallel => f.write_str("parallel"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelOutcomeResolver {
    mode: PrefilterMode,
}

impl ParallelOutcomeResolver {
    pub fn new(mode: PrefilterMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PrefilterMode {
        self.mode
    }

    pub fn should_split(&self) -> bool {
        match self.mode {
            PrefilterMode::Serial => false,
            PrefilterMode::Parallel => true,
            PrefilterMode::Auto => num_cpus::get() > 1,
        }
    }

    /// Evaluates `candidates` with `evaluate`, possibly as two concurrent halves.
    ///
    /// `evaluate` must return exactly one outcome per slot it is given. The
    /// calling thread evaluates the first half and a pool worker the second.
    /// Each half only ever sees its own slice, and the merge happens after both
    /// halves have completed.
    pub fn resolve<F>(&self, candidates: &CandidateSlots<'_>, evaluate: F) -> Outcomes
    where
        F: Fn(&CandidateSlots<'_>) -> Outcomes + Sync,
    {
        if !self.should_split() {
            return evaluate(candidates);
        }
        let Some(pool) = fork_pool() else {
            return evaluate(candidates);
        };

        let (first, second) = candidates.split_at(candidates.len() / 2);
        debug!(first = first.len(), second = second.len(), "Splitting pre-filter evaluation");
        let evaluate = &evaluate;
        let mut second_outcomes = None;
        let slot = &mut second_outcomes;
        let mut outcomes = pool.in_place_scope(move |scope| {
            scope.spawn(move |_| *slot = Some(evaluate(second)));
            evaluate(first)
        });
        outcomes.extend(second_outcomes.unwrap_or_else(|| evaluate(second)));
        outcomes
    }
}

fn fork_pool() -> Option<&'static rayon::ThreadPool> {
    FORK_POOL
        .get_or_init(|| {
            match rayon::ThreadPoolBuilder::new().num_threads(1).thread_name(|index| format!("autoconf-prefilter-{index}")).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!(error = %err, "Unable to start pre-filter worker pool, evaluating serially");
                    None
                }
            }
        })
        .as_ref()
}
