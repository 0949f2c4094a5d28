//! # mlent CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mlent_cli::component::{run_component, ComponentArgs};
use mlent_cli::load::{run_families, run_load, LoadArgs};

/// Load and check ML entity YAML files.
#[derive(Parser, Debug)]
#[command(name = "mlent", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load one entity file, validate it and print the result.
    Load(LoadArgs),

    /// Fetch a registered component by name and version.
    Component(ComponentArgs),

    /// List the entity families `load` accepts.
    Families,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Load(args) => run_load(&args),
        Commands::Component(args) => run_component(&args),
        Commands::Families => run_families(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlent_cli::output::OutputFormat;
    use mlent_core::EntityFamily;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_load_basic() {
        let cli = Cli::try_parse_from(["mlent", "load", "job", "jobs/train.yml"]).unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.family, EntityFamily::Job);
        assert_eq!(args.source, PathBuf::from("jobs/train.yml"));
        assert!(args.origin.is_none());
        assert!(args.set.is_empty());
        assert_eq!(args.format, OutputFormat::Yaml);
    }

    #[test]
    fn cli_parse_load_hyphenated_family() {
        let cli = Cli::try_parse_from(["mlent", "load", "online-deployment", "blue.yml"]).unwrap();
        if let Commands::Load(args) = cli.command {
            assert_eq!(args.family, EntityFamily::OnlineDeployment);
        }
    }

    #[test]
    fn cli_parse_load_with_overrides() {
        let cli = Cli::try_parse_from([
            "mlent",
            "load",
            "model",
            "-",
            "--origin",
            "models/model.yml",
            "--set",
            "name=a",
            "--set",
            "name=b",
            "--format",
            "json",
        ])
        .unwrap();
        if let Commands::Load(args) = cli.command {
            assert_eq!(args.source, PathBuf::from("-"));
            assert_eq!(args.origin.as_deref(), Some("models/model.yml"));
            assert_eq!(args.set, ["name=a", "name=b"]);
            assert_eq!(args.format, OutputFormat::Json);
        }
    }

    #[test]
    fn cli_parse_load_unknown_family() {
        assert!(Cli::try_parse_from(["mlent", "load", "pipeline", "p.yml"]).is_err());
    }

    #[test]
    fn cli_parse_component() {
        let cli = Cli::try_parse_from([
            "mlent",
            "component",
            "--name",
            "train_model",
            "--version",
            "2",
        ])
        .unwrap();
        let Commands::Component(args) = cli.command else {
            panic!("expected component command");
        };
        assert_eq!(args.name, "train_model");
        assert_eq!(args.version, "2");
    }

    #[test]
    fn cli_parse_component_requires_version() {
        assert!(Cli::try_parse_from(["mlent", "component", "--name", "train_model"]).is_err());
    }

    #[test]
    fn cli_parse_verbose_is_global() {
        let cli = Cli::try_parse_from(["mlent", "families", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Families));
    }
}
