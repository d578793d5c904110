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

//! Web application type deduction

use crate::oracle::ClassPresenceOracle;
use serde::{Deserialize, Serialize};
use std::fmt;

const SERVLET_INDICATORS: [&str; 2] = ["javax.servlet.Servlet", "org.springframework.web.context.ConfigurableWebApplicationContext"];
const WEBMVC_INDICATOR: &str = "org.springframework.web.servlet.DispatcherServlet";
const WEBFLUX_INDICATOR: &str = "org.springframework.web.reactive.DispatcherHandler";
const JERSEY_INDICATOR: &str = "org.glassfish.jersey.servlet.ServletContainer";

/// Symbol whose presence makes a servlet web application possible.
pub const SERVLET_APPLICATION_SYMBOL: &str = "org.springframework.web.context.support.GenericWebApplicationContext";
/// Symbol whose presence makes a reactive web application possible.
pub const REACTIVE_APPLICATION_SYMBOL: &str = "org.springframework.web.reactive.HandlerResult";

/// Kind of application the build supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebApplicationType {
    None,
    Servlet,
    Reactive,
}

impl WebApplicationType {
    /// Reactive wins only when neither servlet stack is present; otherwise a
    /// servlet application needs every servlet indicator.
    pub fn deduce(oracle: &dyn ClassPresenceOracle) -> Self {
        if oracle.is_present(WEBFLUX_INDICATOR) && !oracle.is_present(WEBMVC_INDICATOR) && !oracle.is_present(JERSEY_INDICATOR) {
            return WebApplicationType::Reactive;
        }
        if SERVLET_INDICATORS.iter().any(|indicator| !oracle.is_present(indicator)) {
            return WebApplicationType::None;
        }
        WebApplicationType::Servlet
    }
}

impl fmt::Display for WebApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebApplicationType::None => f.write_str("none"),
            WebApplicationType::Servlet => f.write_str("servlet"),
            WebApplicationType::Reactive => f.write_str("reactive"),
        }
    }
}

/// Web application type a unit requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebRequirement {
    #[default]
    Any,
    Servlet,
    Reactive,
}

impl WebRequirement {
    /// Parses the metadata form: `SERVLET`, `REACTIVE`, or empty for any.
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value.trim() {
            "" => Some(WebRequirement::Any),
            v if v.eq_ignore_ascii_case("SERVLET") => Some(WebRequirement::Servlet),
            v if v.eq_ignore_ascii_case("REACTIVE") => Some(WebRequirement::Reactive),
            _ => None,
        }
    }

    pub fn is_satisfied_by(&self, web_type: WebApplicationType) -> bool {
        match self {
            WebRequirement::Any => web_type != WebApplicationType::None,
            WebRequirement::Servlet => web_type == WebApplicationType::Servlet,
            WebRequirement::Reactive => web_type == WebApplicationType::Reactive,
        }
    }
}

impl fmt::Display for WebRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebRequirement::Any => f.write_str("any"),
            WebRequirement::Servlet => f.write_str("servlet"),
            WebRequirement::Reactive => f.write_str("reactive"),
        }
    }
}
