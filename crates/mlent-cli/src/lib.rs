//! # mlent-cli: Command-Line Front End for the Entity Loaders
//!
//! Provides the `mlent` binary.
//!
//! ## Subcommands
//!
//! - `mlent load <family> <file>`: Load, check and print one entity.
//! - `mlent component --name --version`: Fetch a registered component.
//! - `mlent families`: List accepted family names.

pub mod component;
pub mod load;
pub mod output;
