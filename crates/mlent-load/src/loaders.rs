//! Per-family load functions.
//!
//! Each function binds [`load_common`] to one entity family and takes the
//! same [`LoadArgs`]. Components have their own loader in
//! [`crate::component`] because they can also be fetched remotely.

use mlent_entities::{
    BatchDeployment, BatchEndpoint, Code, Compute, Data, Datastore, Environment, Job, JobSchedule,
    Model, OnlineDeployment, OnlineEndpoint, Registry, Workspace, WorkspaceConnection,
};

use crate::args::LoadArgs;
use crate::error::LoadError;
use crate::pipeline::load_common;

/// Load a job (command, sweep, pipeline or spark). Defaults to a command
/// job when `type` is absent.
pub fn load_job(args: LoadArgs<'_>) -> Result<Job, LoadError> {
    load_common(args)
}

/// Load a workspace. Schema failures surface as [`LoadError::Schema`].
pub fn load_workspace(args: LoadArgs<'_>) -> Result<Workspace, LoadError> {
    load_common(args)
}

pub fn load_registry(args: LoadArgs<'_>) -> Result<Registry, LoadError> {
    load_common(args)
}

/// Load a datastore. `type` is required.
pub fn load_datastore(args: LoadArgs<'_>) -> Result<Datastore, LoadError> {
    load_common(args)
}

/// Load a code asset. A relative `path` resolves against the origin.
pub fn load_code(args: LoadArgs<'_>) -> Result<Code, LoadError> {
    load_common(args)
}

/// Load a compute target. `type` is required.
pub fn load_compute(args: LoadArgs<'_>) -> Result<Compute, LoadError> {
    load_common(args)
}

pub fn load_model(args: LoadArgs<'_>) -> Result<Model, LoadError> {
    load_common(args)
}

pub fn load_data(args: LoadArgs<'_>) -> Result<Data, LoadError> {
    load_common(args)
}

pub fn load_environment(args: LoadArgs<'_>) -> Result<Environment, LoadError> {
    load_common(args)
}

/// Load a managed or Kubernetes online deployment. Defaults to managed.
pub fn load_online_deployment(args: LoadArgs<'_>) -> Result<OnlineDeployment, LoadError> {
    load_common(args)
}

pub fn load_batch_deployment(args: LoadArgs<'_>) -> Result<BatchDeployment, LoadError> {
    load_common(args)
}

/// Load an online endpoint. Without an explicit `type`, an endpoint with a
/// `compute` field is a Kubernetes endpoint.
pub fn load_online_endpoint(args: LoadArgs<'_>) -> Result<OnlineEndpoint, LoadError> {
    load_common(args)
}

pub fn load_batch_endpoint(args: LoadArgs<'_>) -> Result<BatchEndpoint, LoadError> {
    load_common(args)
}

pub fn load_workspace_connection(args: LoadArgs<'_>) -> Result<WorkspaceConnection, LoadError> {
    load_common(args)
}

/// Load a job schedule. An inline `create_job` is loaded as a job, and its
/// errors are reported under `create_job.*`.
pub fn load_schedule(args: LoadArgs<'_>) -> Result<JobSchedule, LoadError> {
    load_common(args)
}
