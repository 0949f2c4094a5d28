//! Datastores: named connections to storage accounts.

use std::path::Path;

use mlent_core::EntityFamily;
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Tags;
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Datastore {
    AzureBlob(AzureBlobDatastore),
    AzureFile(AzureFileDatastore),
    #[serde(rename = "azure_data_lake_gen1")]
    AzureDataLakeGen1(AzureDataLakeGen1Datastore),
    #[serde(rename = "azure_data_lake_gen2")]
    AzureDataLakeGen2(AzureDataLakeGen2Datastore),
}

impl Datastore {
    pub fn name(&self) -> &str {
        match self {
            Datastore::AzureBlob(d) => &d.name,
            Datastore::AzureFile(d) => &d.name,
            Datastore::AzureDataLakeGen1(d) => &d.name,
            Datastore::AzureDataLakeGen2(d) => &d.name,
        }
    }
}

/// Account key, SAS token or service principal. Omitted for
/// identity-based access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureBlobDatastore {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    pub account_name: String,
    pub container_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<DatastoreCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureFileDatastore {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    pub account_name: String,
    pub file_share_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<DatastoreCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureDataLakeGen1Datastore {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<DatastoreCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureDataLakeGen2Datastore {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    pub account_name: String,
    pub filesystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<DatastoreCredentials>,
}

// Datastores reference storage accounts, never local files.
macro_rules! no_local_paths {
    ($($ty:ty),*) => {
        $(impl ResolvePaths for $ty {
            fn resolve_paths(&mut self, _: &Path) {}
        })*
    };
}

no_local_paths!(
    AzureBlobDatastore,
    AzureFileDatastore,
    AzureDataLakeGen1Datastore,
    AzureDataLakeGen2Datastore
);

fn build_blob(value: Value, ctx: &LoadContext<'_>) -> Result<Datastore, SchemaError> {
    build_resolved(value, "azure_blob_datastore.schema.json", ctx).map(Datastore::AzureBlob)
}

fn build_file(value: Value, ctx: &LoadContext<'_>) -> Result<Datastore, SchemaError> {
    build_resolved(value, "azure_file_datastore.schema.json", ctx).map(Datastore::AzureFile)
}

fn build_gen1(value: Value, ctx: &LoadContext<'_>) -> Result<Datastore, SchemaError> {
    build_resolved(value, "azure_data_lake_gen1_datastore.schema.json", ctx)
        .map(Datastore::AzureDataLakeGen1)
}

fn build_gen2(value: Value, ctx: &LoadContext<'_>) -> Result<Datastore, SchemaError> {
    build_resolved(value, "azure_data_lake_gen2_datastore.schema.json", ctx)
        .map(Datastore::AzureDataLakeGen2)
}

static DATASTORE_SUBTYPES: [SubtypeSpec<Datastore>; 4] = [
    SubtypeSpec {
        discriminator: "azure_blob",
        schema: "azure_blob_datastore.schema.json",
        build: build_blob,
    },
    SubtypeSpec {
        discriminator: "azure_file",
        schema: "azure_file_datastore.schema.json",
        build: build_file,
    },
    SubtypeSpec {
        discriminator: "azure_data_lake_gen1",
        schema: "azure_data_lake_gen1_datastore.schema.json",
        build: build_gen1,
    },
    SubtypeSpec {
        discriminator: "azure_data_lake_gen2",
        schema: "azure_data_lake_gen2_datastore.schema.json",
        build: build_gen2,
    },
];

impl Resource for Datastore {
    const FAMILY: EntityFamily = EntityFamily::Datastore;
    const STRUCTURED_VALIDATION: bool = false;
    const DEFAULT_SUBTYPE: Option<&'static str> = None;

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &DATASTORE_SUBTYPES
    }
}
