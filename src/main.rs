// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stackcfg` command-line interface.
//!
//! Plans a stack against the in-memory engine, resolves single configuration
//! keys, and lists the registered components.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use stackcfg::domain::{ConfigKey, ConfigValue, ValueType};
use stackcfg::modules::DEFAULT_REGION;
use stackcfg::ports::{ResourceKind, ResourceSpec};
use stackcfg::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stackcfg", version, about = "Plan AWS stacks named <environment>-<component>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch a stack and print the planned resources and outputs
    Up {
        /// Stack identifier, e.g. dev-vpc
        stack: String,

        #[command(flatten)]
        sources: SourceArgs,

        /// Print secret outputs in clear text
        #[arg(long)]
        show_secrets: bool,
    },

    /// Resolve one configuration key for a stack
    Resolve {
        /// Stack identifier, e.g. prod-vpc
        stack: String,

        /// Namespaced key, e.g. vpc:nat_strategy
        key: String,

        /// Type to coerce the value to
        #[arg(long = "type", value_enum, default_value_t = TypeArg::String)]
        value_type: TypeArg,

        /// Value used when neither configuration nor defaults provide one
        #[arg(long)]
        fallback: Option<String>,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// List registered components
    Components,
}

#[derive(Args)]
struct SourceArgs {
    /// Stack file to read instead of Pulumi.<stack>.yaml
    #[arg(long, value_name = "PATH")]
    stack_file: Option<PathBuf>,

    /// Directory searched for Pulumi.<stack>.yaml
    #[arg(long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Explicit override, may be repeated
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE")]
    config: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    String,
    Bool,
    Int,
}

impl From<TypeArg> for ValueType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::String => ValueType::String,
            TypeArg::Bool => ValueType::Bool,
            TypeArg::Int => ValueType::Int,
        }
    }
}

#[derive(Serialize)]
struct PlanReport<'a> {
    stack: &'a str,
    engine: &'a str,
    summary: BTreeMap<&'static str, usize>,
    resources: &'a [ResourceSpec],
    outputs: &'a ResourceOutputs,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let stack = match &cli.command {
        Commands::Up { stack, .. } | Commands::Resolve { stack, .. } => Some(stack.clone()),
        Commands::Components => None,
    };

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match stack {
                Some(stack) => eprintln!("error: stack '{}': {}", stack, e),
                None => eprintln!("error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Up {
            stack,
            sources,
            show_secrets,
        } => cmd_up(&stack, &sources, show_secrets),
        Commands::Resolve {
            stack,
            key,
            value_type,
            fallback,
            sources,
        } => cmd_resolve(&stack, &key, value_type.into(), fallback, &sources),
        Commands::Components => cmd_components(),
    }
}

fn build_store(stack: &StackIdentifier, sources: &SourceArgs) -> Result<StackConfigStore> {
    let mut builder = StackConfigStore::builder();
    builder = match &sources.stack_file {
        Some(path) => builder.with_stack_file(path)?,
        None => builder.with_discovered_stack_file(&sources.dir, stack)?,
    };
    #[cfg(feature = "env")]
    {
        builder = builder.with_env_vars();
    }
    builder = builder.with_cli_overrides(sources.config.clone())?;

    let store = builder.build();
    tracing::debug!("Explicit sources: {}", store.source_names().join(", "));
    Ok(store)
}

fn cmd_up(stack_id: &str, sources: &SourceArgs, show_secrets: bool) -> Result<()> {
    let stack = StackIdentifier::parse(stack_id)?;
    let store = build_store(&stack, sources)?;
    let dispatcher = StackDispatcher::builder().with_store(store).build();

    let region = dispatcher
        .resolver(stack.environment().clone())
        .get_string("aws:region", DEFAULT_REGION)?;
    let mut engine = PlanEngine::new().with_region(region);

    let outputs = dispatcher.dispatch(stack.as_str(), &mut engine)?;
    let outputs = if show_secrets {
        outputs.revealed()
    } else {
        outputs
    };

    let summary = engine
        .summary()
        .into_iter()
        .map(|(kind, count): (ResourceKind, usize)| (kind.type_token(), count))
        .collect();
    let report = PlanReport {
        stack: stack.as_str(),
        engine: engine.name(),
        summary,
        resources: engine.resources(),
        outputs: &outputs,
    };
    print!("{}", to_yaml(&report)?);
    Ok(())
}

fn cmd_resolve(
    stack_id: &str,
    key: &str,
    value_type: ValueType,
    fallback: Option<String>,
    sources: &SourceArgs,
) -> Result<()> {
    let stack = StackIdentifier::parse(stack_id)?;
    let store = build_store(&stack, sources)?;
    let dispatcher = StackDispatcher::builder().with_store(store).build();
    let resolver = dispatcher.resolver(stack.environment().clone());

    let key = ConfigKey::from(key);
    let fallback = fallback.map(ConfigValue::from);
    let origin = resolver.origin(key.as_str(), fallback.as_ref())?;
    match resolver.resolve(&key, value_type, fallback.as_ref())? {
        Some(value) => println!("{} = {} ({})", key, value, origin),
        None => println!("{} is not set ({})", key, origin),
    }
    Ok(())
}

fn cmd_components() -> Result<()> {
    let registry = ModuleRegistry::builtin();
    for component in registry.components() {
        let description = registry
            .get(component)
            .map(|m| m.description())
            .unwrap_or_default();
        println!("{:<6} {}", component, description);
    }
    Ok(())
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| StackError::ParseError {
        message: format!("Failed to render YAML: {}", e),
        source: Some(Box::new(e)),
    })
}
