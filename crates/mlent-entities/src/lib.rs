//! # mlent-entities: Typed Platform Entities
//!
//! Every entity family the loaders can produce, the concrete subtypes of
//! each family, and the registry that picks a subtype from a parsed
//! document.
//!
//! ## Families
//!
//! | family | subtypes (discriminator) | default |
//! |---|---|---|
//! | [`Job`] | `command`, `sweep`, `pipeline`, `spark` | `command` |
//! | [`Component`] | `command`, `parallel`, `pipeline` | `command` |
//! | [`Compute`] | `amlcompute`, `computeinstance`, `virtualmachine`, `kubernetes` | none |
//! | [`Datastore`] | `azure_blob`, `azure_file`, `azure_data_lake_gen1`, `azure_data_lake_gen2` | none |
//! | [`OnlineDeployment`] | `managed`, `kubernetes` | `managed` |
//! | [`OnlineEndpoint`] | `managed`, `kubernetes` | inferred from `compute` |
//!
//! The remaining families ([`Code`], [`Model`], [`Data`], [`Environment`],
//! [`Workspace`], [`Registry`], [`WorkspaceConnection`],
//! [`BatchDeployment`], [`BatchEndpoint`], [`JobSchedule`]) have a single
//! shape.
//!
//! ## Construction
//!
//! [`resolve_subtype`] reads the discriminator and returns the matching
//! [`SubtypeSpec`]. Its `build` function validates the document against
//! the subtype's embedded JSON Schema, deserializes it, and rewrites local
//! file references relative to the document's origin.
//!
//! ## Crate Policy
//!
//! - Schemas are compiled into the binary; validation never touches the
//!   network or the filesystem.
//! - Remote references (`azureml:...`, URLs, storage URIs) are carried
//!   verbatim.

pub mod assets;
pub mod common;
pub mod component;
pub mod compute;
pub mod datastore;
pub mod deployment;
pub mod endpoint;
pub mod job;
pub mod paths;
pub mod registry;
pub mod schedule;
pub mod workspace;

pub use assets::{BuildContext, Code, Data, Environment, Model};
pub use common::{
    CodeConfiguration, Distribution, EnvironmentRef, Identity, InlineModel, InputSpec, JobInput,
    JobOutput, ModelRef, OutputSpec, Probe, Resources, RetrySettings,
};
pub use component::{CommandComponent, Component, ParallelComponent, PipelineComponent};
pub use compute::{AmlCompute, Compute, ComputeInstance, KubernetesCompute, VirtualMachine};
pub use datastore::{
    AzureBlobDatastore, AzureDataLakeGen1Datastore, AzureDataLakeGen2Datastore,
    AzureFileDatastore, Datastore,
};
pub use deployment::{
    BatchDeployment, KubernetesOnlineDeployment, ManagedOnlineDeployment, OnlineDeployment,
};
pub use endpoint::{BatchEndpoint, KubernetesOnlineEndpoint, ManagedOnlineEndpoint, OnlineEndpoint};
pub use job::{CommandJob, Job, PipelineJob, PipelineStep, SparkJob, SweepJob};
pub use paths::{is_remote_reference, resolve_reference};
pub use registry::{
    build_from_schema, embedded_validator, resolve_subtype, LoadContext, Resolved, Resource,
    SubtypeSpec, EMBEDDED_SCHEMAS,
};
pub use schedule::{JobSchedule, ScheduledJob, Trigger};
pub use workspace::{Registry, Workspace, WorkspaceConnection};
