//! Node-registry collaborator
//!
//! The registry returns one capability schema per node kind. The
//! schema-to-UI deriver is the only consumer. Schemas are fetched at
//! most once per kind per session through [`CachedSchemaRegistry`].

use std::collections::HashMap;

use async_trait::async_trait;
use graph_engine::NodeSchema;
use parking_lot::RwLock;

use crate::error::{Result, ServiceError};

/// Source of capability schemas, keyed by node kind
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Fetch the capability schema for a node kind
    async fn fetch_schema(&self, kind: &str) -> Result<NodeSchema>;
}

/// Session-scoped cache wrapper around another registry
///
/// Guarantees one upstream request per distinct kind for the lifetime
/// of the session. There is no invalidation: a schema updated upstream
/// is not observed until a new session.
pub struct CachedSchemaRegistry<R> {
    inner: R,
    cache: RwLock<HashMap<String, NodeSchema>>,
}

impl<R: SchemaRegistry> CachedSchemaRegistry<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of kinds cached so far
    pub fn cached_kinds(&self) -> usize {
        self.cache.read().len()
    }
}

#[async_trait]
impl<R: SchemaRegistry> SchemaRegistry for CachedSchemaRegistry<R> {
    async fn fetch_schema(&self, kind: &str) -> Result<NodeSchema> {
        {
            let cache = self.cache.read();
            if let Some(schema) = cache.get(kind) {
                return Ok(schema.clone());
            }
        }

        let schema = self.inner.fetch_schema(kind).await?;
        log::debug!("Cached capability schema for kind '{}'", kind);
        self.cache.write().insert(kind.to_string(), schema.clone());
        Ok(schema)
    }
}

/// HTTP-backed registry collaborator
pub struct HttpSchemaRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSchemaRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn fetch_schema(&self, kind: &str) -> Result<NodeSchema> {
        let url = format!("{}/nodes/{}/schema", self.base_url, kind);
        let value: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        // Lenient parse: malformed fragments degrade instead of failing
        Ok(NodeSchema::from_value(&value))
    }
}

/// Fixed in-memory registry for tests and offline hosts
#[derive(Default)]
pub struct StaticSchemaRegistry {
    schemas: HashMap<String, NodeSchema>,
}

impl StaticSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, schema: NodeSchema) {
        self.schemas.insert(kind.into(), schema);
    }
}

#[async_trait]
impl SchemaRegistry for StaticSchemaRegistry {
    async fn fetch_schema(&self, kind: &str) -> Result<NodeSchema> {
        self.schemas
            .get(kind)
            .cloned()
            .ok_or_else(|| ServiceError::SchemaFetch {
                kind: kind.to_string(),
                message: "kind not registered".to_string(),
            })
    }
}
