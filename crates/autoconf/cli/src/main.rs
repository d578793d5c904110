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

//! Autoconf CLI Tool
//!
//! Command-line interface for resolving a build manifest into the ordered list
//! of auto-configuration units that apply to it.

use anyhow::{Context, Result};
use autoconf_core::config::PREFILTER_MODE_PROPERTY;
use autoconf_core::environment::SYSTEM_ENVIRONMENT;
use autoconf_core::exclusions::EXCLUDE_PROPERTY;
use autoconf_core::{Environment, FactoriesRegistry, Manifest, PrefilterMode, PropertySource, ResolutionEngine, ResolutionRequest, ResolutionResult};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{Level, error, info};

/// Highest-precedence property source, built from command-line flags.
const COMMAND_LINE_SOURCE: &str = "commandLineArgs";

#[derive(Parser)]
#[command(name = "autoconf")]
#[command(about = "Autoconf - conditional auto-configuration resolver")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the units that apply to a build manifest
    Resolve {
        /// Path to the build manifest (TOML)
        manifest: PathBuf,
        /// Unit to exclude; may be repeated
        #[arg(long, short = 'e')]
        exclude: Vec<String>,
        /// Pre-filter mode: auto, serial or parallel
        #[arg(long)]
        mode: Option<PrefilterMode>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Print the condition evaluation report
        #[arg(long)]
        report: bool,
        /// Ignore exclusions set through AUTOCONFIGURE_EXCLUDE
        #[arg(long)]
        ignore_env_exclude: bool,
    },
    /// Print the web application type the manifest's symbols support
    WebType {
        /// Path to the build manifest (TOML)
        manifest: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let result = match cli.command {
        Commands::Resolve {
            manifest,
            exclude,
            mode,
            format,
            report,
            ignore_env_exclude,
        } => handle_resolve(&manifest, exclude, mode, format, report, ignore_env_exclude),
        Commands::WebType { manifest } => handle_web_type(&manifest),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::load_from_file(path).with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Command-line flags first, then process variables, then the manifest's own properties.
fn build_environment(manifest: &Manifest, mode: Option<PrefilterMode>) -> Environment {
    let mut environment = Environment::new().with_source(PropertySource::system_environment()).with_source(manifest.property_source());
    if let Some(mode) = mode {
        environment.add_first(PropertySource::from_map(COMMAND_LINE_SOURCE, [(PREFILTER_MODE_PROPERTY, mode.to_string())]));
    }
    environment
}

fn install_factories(manifest: &Manifest) -> Result<&'static FactoriesRegistry> {
    match manifest.factories().install() {
        Ok(factories) => Ok(factories),
        Err(_) => FactoriesRegistry::global().context("Candidate registry is not available"),
    }
}

fn handle_resolve(path: &Path, exclude: Vec<String>, mode: Option<PrefilterMode>, format: OutputFormat, report: bool, ignore_env_exclude: bool) -> Result<()> {
    let manifest = load_manifest(path)?;
    let engine = ResolutionEngine::new(Arc::new(manifest.oracle()), Arc::new(manifest.metadata()), Arc::new(manifest.catalog())).with_config(manifest.engine.clone());
    let environment = build_environment(&manifest, mode);
    let registry = manifest.registry();
    let factories = install_factories(&manifest)?;

    let resolve = |environment: &Environment| -> Result<ResolutionResult> {
        let capability = engine.config().clone().overridden_by(environment).capability_key;
        let request = exclude
            .iter()
            .fold(ResolutionRequest::from_factories(factories, &capability, environment, &registry), |request, name| request.excluding_name(name.as_str()));
        Ok(engine.resolve(request)?)
    };

    let result = if ignore_env_exclude {
        environment.with_filtered_source(SYSTEM_ENVIRONMENT, &[EXCLUDE_PROPERTY], resolve)?
    } else {
        resolve(&environment)?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text(&result, report),
    }
    info!(accepted = result.accepted.len(), rejected = result.rejected.len(), excluded = result.excluded.len(), "Resolved {}", path.display());
    Ok(())
}

fn print_text(result: &ResolutionResult, report: bool) {
    if result.disabled {
        println!("Auto-configuration is disabled");
        return;
    }

    println!("Accepted units ({}):", result.accepted.len());
    for (position, unit) in result.accepted.iter().enumerate() {
        println!("  {}. {unit}", position + 1);
    }

    if !result.rejected.is_empty() {
        println!("Rejected units ({}):", result.rejected.len());
        for (unit, outcomes) in &result.rejected {
            let reasons: Vec<&str> = outcomes.iter().filter(|outcome| !outcome.matched).map(|outcome| outcome.message.as_str()).collect();
            println!("  {unit}: {}", reasons.join("; "));
        }
    }

    if !result.excluded.is_empty() {
        println!("Excluded units ({}):", result.excluded.len());
        for unit in &result.excluded {
            println!("  {unit}");
        }
    }

    if report {
        println!();
        print!("{}", result.report.render());
    }
}

fn handle_web_type(path: &Path) -> Result<()> {
    let manifest = load_manifest(path)?;
    let engine = ResolutionEngine::new(Arc::new(manifest.oracle()), Arc::new(manifest.metadata()), Arc::new(manifest.catalog()));
    println!("{}", engine.web_application_type());
    Ok(())
}
