//! Typed CRUD over one model's table.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{decode_row, decode_rows, Client, ConnectionOptions, LogLevel, ReturnMode, Status};
use crate::error::{ConfigurationError, RemoteError, Result};
use crate::model::{Model, ModelKey, ModelSchema};
use crate::query::compiler::{
    compile_assign, compile_create, compile_delete, compile_find_by_id, compile_find_many, compile_update,
};
use crate::query::{Assign, Bindings, CompiledQuery, Create, Delete, FindById, FindMany, Update};
use crate::schema::synchronize_statements;

pub struct Collection<M: Model> {
    client: Client,
    schema: Arc<ModelSchema>,
    opts: ConnectionOptions,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            schema: Arc::clone(&self.schema),
            opts: self.opts.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Collection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("model", &self.schema.model().name())
            .field("table", &self.schema.table())
            .finish_non_exhaustive()
    }
}

impl<M: Model> Collection<M> {
    /// Binds `schema` to `M` and synchronizes its table definition before
    /// returning.
    pub async fn bind(client: Client, schema: Arc<ModelSchema>) -> Result<Self> {
        Self::bind_with(client, schema, ConnectionOptions::default()).await
    }

    /// Like [`Collection::bind`], with options layered over the client's
    /// for every call on this collection.
    pub async fn bind_with(
        client: Client,
        schema: Arc<ModelSchema>,
        opts: ConnectionOptions,
    ) -> Result<Self> {
        let expected = ModelKey::of::<M>();
        if schema.model() != expected {
            return Err(ConfigurationError::ModelMismatch {
                expected: expected.name(),
                found: schema.model().name(),
            }
            .into());
        }
        let collection = Self {
            client,
            schema,
            opts,
            _model: PhantomData,
        };
        collection.synchronize().await?;
        Ok(collection)
    }

    /// Re-sends the `DEFINE` statements for this table.
    pub async fn synchronize(&self) -> Result<()> {
        let statements = synchronize_statements(&self.schema)?;
        let batch = self
            .client
            .query_raw(statements.as_str(), Bindings::new(), &self.opts)
            .await?;
        // Every DEFINE must succeed, not only the first.
        if let Some(failed) = batch.iter().find(|entry| entry.status == Status::Err) {
            warn!(table = self.table(), detail = ?failed.detail, "collection.synchronize failed");
            return Err(RemoteError::Statement(failed.clone()).into());
        }
        info!(table = self.table(), statements = batch.len(), "collection.synchronize");
        self.client.log(
            LogLevel::Info,
            &serde_json::json!({"method": "synchronize", "table": self.table()}),
        );
        Ok(())
    }

    pub fn table(&self) -> &str {
        self.schema.table()
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Inserts one record; `None` when the database returns no row.
    pub async fn create(&self, params: Create) -> Result<Option<M>> {
        let query = compile_create(&self.schema, &params)?;
        self.single(&query, &params.opts).await
    }

    pub async fn find_many(&self, params: FindMany) -> Result<Vec<M>> {
        let query = compile_find_many(&self.schema, &params)?;
        self.many(&query, &params.opts).await
    }

    /// `None` when no record has this identifier.
    pub async fn find_by_id(&self, id: &str, params: FindById) -> Result<Option<M>> {
        let query = compile_find_by_id(&self.schema, id, &params)?;
        self.single(&query, &params.opts).await
    }

    pub async fn update(&self, params: Update) -> Result<Vec<M>> {
        let query = compile_update(&self.schema, &params)?;
        self.many(&query, &params.opts).await
    }

    pub async fn assign(&self, params: Assign) -> Result<Vec<M>> {
        let query = compile_assign(&self.schema, &params)?;
        self.many(&query, &params.opts).await
    }

    /// Returns the removed records as they were before deletion.
    pub async fn delete(&self, params: Delete) -> Result<Vec<M>> {
        let query = compile_delete(&self.schema, &params)?;
        self.many(&query, &params.opts).await
    }

    async fn single(&self, query: &CompiledQuery, call: &ConnectionOptions) -> Result<Option<M>> {
        let row = self
            .client
            .execute(query, ReturnMode::Single, &self.opts.merged(call))
            .await?
            .into_single();
        debug!(table = self.table(), found = row.is_some(), "collection.single");
        row.map(decode_row).transpose()
    }

    async fn many(&self, query: &CompiledQuery, call: &ConnectionOptions) -> Result<Vec<M>> {
        let rows = self
            .client
            .execute(query, ReturnMode::Array, &self.opts.merged(call))
            .await?
            .into_array();
        debug!(table = self.table(), rows = rows.len(), "collection.many");
        decode_rows(rows)
    }
}
