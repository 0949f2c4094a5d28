//! In-memory workspace client.
//!
//! Holds components keyed by `(name, version)` and records every lookup,
//! so callers can assert that a load went remote without a network.

use std::collections::BTreeMap;
use std::sync::Mutex;

use mlent_entities::Component;

use crate::error::ClientError;
use crate::{ComponentOperations, MlClient};

#[derive(Debug, Default)]
pub struct InMemoryMlClient {
    components: BTreeMap<(String, String), Component>,
    lookups: Mutex<Vec<(String, String)>>,
}

impl InMemoryMlClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` under its own name and `version`.
    pub fn insert(&mut self, version: impl Into<String>, component: Component) {
        let key = (component.name().to_string(), version.into());
        self.components.insert(key, component);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_component(mut self, version: impl Into<String>, component: Component) -> Self {
        self.insert(version, component);
        self
    }

    /// Every `(name, version)` requested so far, in call order.
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl MlClient for InMemoryMlClient {
    fn components(&self) -> &dyn ComponentOperations {
        self
    }
}

impl ComponentOperations for InMemoryMlClient {
    fn get(&self, name: &str, version: &str) -> Result<Component, ClientError> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((name.to_string(), version.to_string()));

        self.components
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}
