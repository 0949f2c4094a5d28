//! # Component Loading
//!
//! A component comes either from local YAML or from a workspace, fetched
//! by name and version through an injected [`MlClient`]. The two modes are
//! resolved up front into a [`ComponentSource`]:
//!
//! | local source | client + name + version | result |
//! |---|---|---|
//! | yes | any | local load (a full remote triple is ignored with a warning) |
//! | no | complete | remote fetch, no YAML parsing |
//! | no | incomplete | `MissingValueError` |

use std::path::PathBuf;

use mlent_client::MlClient;
use mlent_core::{EntityFamily, MissingValueError, Override, Source};
use mlent_entities::Component;

use crate::args::{LoadArgs, ResolvedSource};
use crate::error::LoadError;
use crate::pipeline::load_resolved;

const MISSING_COMPONENT_INPUT: &str = "One of (client, name, version), (source) should be provided.";

/// [`LoadArgs`] plus the remote lookup inputs.
#[derive(Default)]
pub struct ComponentLoadArgs<'a> {
    load: LoadArgs<'a>,
    client: Option<&'a dyn MlClient>,
    name: Option<String>,
    version: Option<String>,
}

impl std::fmt::Debug for ComponentLoadArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLoadArgs")
            .field("load", &self.load)
            .field("client", &self.client.map(|_| "<client>"))
            .field("name", &self.name)
            .field("version", &self.version)
            .finish()
    }
}

impl<'a> ComponentLoadArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local load from `source`.
    pub fn from_source(source: impl Into<Source<'a>>) -> Self {
        Self::from(LoadArgs::from_source(source))
    }

    /// Remote fetch of `name` at `version`.
    pub fn remote(
        client: &'a dyn MlClient,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new().client(client).name(name).version(version)
    }

    pub fn source(mut self, source: impl Into<Source<'a>>) -> Self {
        self.load = self.load.source(source);
        self
    }

    pub fn relative_origin(mut self, origin: impl Into<String>) -> Self {
        self.load = self.load.relative_origin(origin);
        self
    }

    pub fn arg(mut self, source: impl Into<Source<'a>>) -> Self {
        self.load = self.load.arg(source);
        self
    }

    #[deprecated(note = "the `path` input for load functions is deprecated, use `source` instead")]
    #[allow(deprecated)]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.load = self.load.path(path);
        self
    }

    pub fn params_override(mut self, overrides: Vec<Override>) -> Self {
        self.load = self.load.params_override(overrides);
        self
    }

    pub fn with_override(mut self, entry: Override) -> Self {
        self.load = self.load.with_override(entry);
        self
    }

    pub fn client(mut self, client: &'a dyn MlClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Decide between the local and remote modes.
    ///
    /// # Errors
    ///
    /// [`MissingValueError`] when there is no usable local source and the
    /// remote triple is incomplete.
    pub fn into_component_source(self) -> Result<ComponentSource<'a>, MissingValueError> {
        let (resolved, params_override) = self.load.into_parts();
        let remote = match (self.client, self.name, self.version) {
            (Some(client), Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
                Some((client, name, version))
            }
            _ => None,
        };

        if resolved.has_usable_source() {
            if let Some((_, name, version)) = &remote {
                tracing::warn!(
                    source = %resolved.origin,
                    %name,
                    %version,
                    "both a local source and a remote component were given; loading the local source"
                );
            }
            return Ok(ComponentSource::Local {
                resolved,
                params_override,
            });
        }

        match remote {
            Some((client, name, version)) => Ok(ComponentSource::Remote {
                client,
                name,
                version,
            }),
            None => Err(MissingValueError::new(
                EntityFamily::Component,
                MISSING_COMPONENT_INPUT,
            )),
        }
    }
}

impl<'a> From<LoadArgs<'a>> for ComponentLoadArgs<'a> {
    fn from(load: LoadArgs<'a>) -> Self {
        Self {
            load,
            ..Self::default()
        }
    }
}

/// Where a component comes from.
pub enum ComponentSource<'a> {
    Local {
        resolved: ResolvedSource<'a>,
        params_override: Vec<Override>,
    },
    Remote {
        client: &'a dyn MlClient,
        name: String,
        version: String,
    },
}

impl std::fmt::Debug for ComponentSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local {
                resolved,
                params_override,
            } => f
                .debug_struct("Local")
                .field("resolved", resolved)
                .field("params_override", params_override)
                .finish(),
            Self::Remote { name, version, .. } => f
                .debug_struct("Remote")
                .field("name", name)
                .field("version", version)
                .finish_non_exhaustive(),
        }
    }
}

/// Load a command, parallel or pipeline component, locally or remotely.
///
/// A remote result is returned exactly as the client produced it.
pub fn load_component(args: ComponentLoadArgs<'_>) -> Result<Component, LoadError> {
    match args.into_component_source()? {
        ComponentSource::Local {
            resolved,
            params_override,
        } => load_resolved::<Component>(resolved, &params_override),
        ComponentSource::Remote {
            client,
            name,
            version,
        } => {
            tracing::debug!(%name, %version, "fetching remote component");
            Ok(client.components().get(&name, &version)?)
        }
    }
}
