//! # Component CLI: Fetch a registered component from a workspace.
//!
//! The workspace connection comes from the environment:
//!
//! ```bash
//! export MLENT_ENDPOINT=https://management.azure.com
//! export MLENT_SUBSCRIPTION_ID=... MLENT_RESOURCE_GROUP=... MLENT_WORKSPACE=...
//! export MLENT_TOKEN=...
//! mlent component --name train_model --version 2 --format json
//! ```
//!
//! Local component files go through `mlent load component <file>` instead.

use anyhow::{Context, Result};
use clap::Args;

use mlent_client::{ClientConfig, HttpMlClient};
use mlent_load::{load_component, ComponentLoadArgs};

use crate::output::{render, OutputFormat};

/// `mlent component` arguments.
#[derive(Args, Debug)]
pub struct ComponentArgs {
    /// Registered component name.
    #[arg(long)]
    pub name: String,

    /// Component version.
    #[arg(long)]
    pub version: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Execute `mlent component`.
pub fn run_component(args: &ComponentArgs) -> Result<u8> {
    let config = ClientConfig::from_env().context("workspace connection is not configured")?;
    tracing::info!(
        endpoint = %config.endpoint,
        workspace = %config.workspace,
        name = %args.name,
        version = %args.version,
        "fetching component"
    );
    let client = HttpMlClient::new(config).context("failed to build the workspace client")?;

    let component = load_component(ComponentLoadArgs::remote(&client, &args.name, &args.version))
        .with_context(|| format!("failed to fetch component {}:{}", args.name, args.version))?;
    println!("{}", render(&component, args.format)?);
    Ok(0)
}
