//! # Load CLI: Load, check and print one entity file.
//!
//! ## Usage
//!
//! ```bash
//! # Load a job and print the normalized entity:
//! mlent load job jobs/train.yml
//!
//! # Override fields before validation; later values win:
//! mlent load online-deployment blue.yml --set instance_count=3 --set model=azureml:m:2
//!
//! # Read from stdin, resolving relative paths as if the file lived elsewhere:
//! cat model.yml | mlent load model - --origin models/model.yml --format json
//!
//! # List the accepted families:
//! mlent families
//! ```
//!
//! User errors (bad YAML, schema violations) print their diagnostics to
//! stderr and exit with status 2. I/O failures exit with status 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use mlent_core::{EntityFamily, Override, Source};
use mlent_load::{
    load_batch_deployment, load_batch_endpoint, load_code, load_component, load_compute,
    load_data, load_datastore, load_environment, load_job, load_model, load_online_deployment,
    load_online_endpoint, load_registry, load_schedule, load_workspace,
    load_workspace_connection, ComponentLoadArgs, LoadError,
};

use crate::output::{render, OutputFormat};

/// Exit status for documents rejected by the loaders.
pub const EXIT_INVALID: u8 = 2;

/// `mlent load` arguments.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Entity family (job, model, online-deployment, ...).
    pub family: EntityFamily,

    /// YAML file to load, or `-` for stdin.
    pub source: PathBuf,

    /// Location that relative paths in the document resolve against.
    #[arg(long)]
    pub origin: Option<String>,

    /// Field override as `path=value`. The value is read as YAML.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub set: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Parse one `--set` entry.
pub fn parse_override(raw: &str) -> Result<Override> {
    let (path, value) = raw
        .split_once('=')
        .with_context(|| format!("override {raw:?} is not of the form path=value"))?;
    let path = path.trim();
    if path.is_empty() {
        anyhow::bail!("override {raw:?} has an empty field path");
    }
    let value: Value = if value.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str(value)
            .with_context(|| format!("override value {value:?} is not valid YAML"))?
    };
    Ok(Override::new(path, value))
}

/// Execute `mlent load`.
pub fn run_load(args: &LoadArgs) -> Result<u8> {
    let overrides = args
        .set
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>>>()?;

    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    let source = if args.source.as_os_str() == "-" {
        Source::stream(&mut stdin_lock)
    } else {
        Source::path(args.source.clone())
    };

    let mut load_args = mlent_load::LoadArgs::from_source(source).params_override(overrides);
    if let Some(origin) = &args.origin {
        load_args = load_args.relative_origin(origin.as_str());
    }

    tracing::info!(family = %args.family, source = %args.source.display(), "loading entity");

    match load_rendered(args.family, load_args, args.format) {
        Ok(text) => {
            println!("{text}");
            Ok(0)
        }
        Err(err) => match err.downcast_ref::<LoadError>() {
            Some(load_err) if load_err.category().is_some() => {
                eprintln!("{load_err}");
                Ok(EXIT_INVALID)
            }
            _ => Err(err.context(format!(
                "failed to load {} from {}",
                args.family,
                args.source.display()
            ))),
        },
    }
}

/// Load one entity of `family` and render it.
pub fn load_rendered(
    family: EntityFamily,
    args: mlent_load::LoadArgs<'_>,
    format: OutputFormat,
) -> Result<String> {
    match family {
        EntityFamily::Job => render(&load_job(args)?, format),
        EntityFamily::Workspace => render(&load_workspace(args)?, format),
        EntityFamily::Registry => render(&load_registry(args)?, format),
        EntityFamily::Datastore => render(&load_datastore(args)?, format),
        EntityFamily::Code => render(&load_code(args)?, format),
        EntityFamily::Compute => render(&load_compute(args)?, format),
        EntityFamily::Component => render(&load_component(ComponentLoadArgs::from(args))?, format),
        EntityFamily::Model => render(&load_model(args)?, format),
        EntityFamily::Data => render(&load_data(args)?, format),
        EntityFamily::Environment => render(&load_environment(args)?, format),
        EntityFamily::OnlineDeployment => render(&load_online_deployment(args)?, format),
        EntityFamily::BatchDeployment => render(&load_batch_deployment(args)?, format),
        EntityFamily::OnlineEndpoint => render(&load_online_endpoint(args)?, format),
        EntityFamily::BatchEndpoint => render(&load_batch_endpoint(args)?, format),
        EntityFamily::WorkspaceConnection => render(&load_workspace_connection(args)?, format),
        EntityFamily::Schedule => render(&load_schedule(args)?, format),
    }
}

/// Execute `mlent families`.
pub fn run_families() -> Result<u8> {
    for family in EntityFamily::all() {
        println!("{}", family.as_str().replace('_', "-"));
    }
    Ok(0)
}
