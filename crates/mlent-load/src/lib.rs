//! # mlent-load: YAML Entity Loaders
//!
//! Public entry points that turn a YAML document into a typed entity:
//!
//! ```no_run
//! use mlent_load::{load_job, LoadArgs};
//!
//! let job = load_job(LoadArgs::from_source("jobs/train.yml"))?;
//! println!("loaded a {} job", job.job_type());
//! # Ok::<(), mlent_load::LoadError>(())
//! ```
//!
//! ## Pipeline
//!
//! Every loader is [`load_common`] bound to one family:
//!
//! 1. **Source resolution** ([`resolve_source`]): `source`, else the first
//!    positional arg, else the deprecated `path` (with a warning). The
//!    origin is derived from the chosen source.
//! 2. **Materialization**: the source is read and parsed into a non-empty
//!    mapping, or fails with a `ParseError`.
//! 3. **Overrides**: `params_override` entries are written over the parsed
//!    fields, last write wins.
//! 4. **Type resolution and construction**: the family registry picks a
//!    subtype from the discriminator and builds it.
//! 5. **Error translation**: schema failures of families with structured
//!    validation become a `SchemaValidationError`; other families get the
//!    raw `SchemaError`.
//!
//! [`load_component`] can skip all of this and fetch a component through
//! an injected [`mlent_client::MlClient`].

pub mod args;
pub mod component;
pub mod error;
pub mod loaders;
pub mod pipeline;

pub use args::{resolve_source, LoadArgs, ResolvedSource};
pub use component::{load_component, ComponentLoadArgs, ComponentSource};
pub use error::LoadError;
pub use loaders::{
    load_batch_deployment, load_batch_endpoint, load_code, load_compute, load_data,
    load_datastore, load_environment, load_job, load_model, load_online_deployment,
    load_online_endpoint, load_registry, load_schedule, load_workspace,
    load_workspace_connection,
};
pub use pipeline::{load_common, type_guidance};
