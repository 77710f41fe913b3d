//! Request dispatch against the database's statement endpoint.
//!
//! A [`Client`] owns the endpoint, the default [`ConnectionOptions`], a
//! [`Transport`], and an optional [`QueryLogger`]. Every operation is a
//! single round trip: render the compiled query, submit it, interpret the
//! batched response.

mod logger;
mod options;
pub mod response;
mod transport;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::collection::Collection;
use crate::config::Profile;
use crate::error::{Error, Result};
use crate::model::{Model, Registry};
use crate::query::compiler::compile_relate;
use crate::query::{Bindings, CompiledQuery, Endpoint, TrustedFragment, Value};

pub use logger::{LogLevel, QueryLogger, TracingLogger};
pub use options::ConnectionOptions;
pub use response::{decode_row, decode_rows, Edge, QueryOutput, ReturnMode, StatementResponse, Status};
pub use transport::{RequestHeaders, Transport};

#[derive(Clone)]
pub struct Client {
    endpoint: String,
    options: ConnectionOptions,
    transport: Arc<dyn Transport>,
    logger: Option<Arc<dyn QueryLogger>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("ns", &self.options.ns)
            .field("db", &self.options.db)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// `endpoint` is the server base URL; statements go to `<endpoint>/sql`.
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            options: ConnectionOptions::default(),
            transport,
            logger: None,
        }
    }

    /// Builds a client from a configured profile.
    pub fn from_profile(profile: &Profile, transport: Arc<dyn Transport>) -> Self {
        Self::new(profile.endpoint.clone(), transport).with_options(profile.options.clone())
    }

    pub fn with_options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn sql_endpoint(&self) -> String {
        format!("{}/sql", self.endpoint)
    }

    /// Sends a compiled query. `opts` override the client defaults for this
    /// call only.
    pub async fn execute(
        &self,
        query: &CompiledQuery,
        mode: ReturnMode,
        opts: &ConnectionOptions,
    ) -> Result<QueryOutput> {
        let opts = self.options.merged(opts);
        let body = query.render()?;
        self.log(
            LogLevel::Debug,
            &json!({
                "method": "query",
                "query": body,
                "variables": query.bindings.to_json(),
            }),
        );
        debug!(endpoint = %self.endpoint, ?mode, bindings = query.bindings.len(), "client.dispatch");

        let headers = RequestHeaders::from_options(&opts);
        let payload = self
            .transport
            .submit(&self.sql_endpoint(), body, &headers)
            .await
            .map_err(Error::transport)?;
        self.log(
            LogLevel::Debug,
            &json!({"method": "parseResponse", "response": payload}),
        );

        response::interpret(payload, mode).inspect_err(|err| {
            self.log(
                LogLevel::Error,
                &json!({"method": "parseResponse", "code": err.code(), "error": err.to_string()}),
            );
        })
    }

    /// Runs caller-written statement text with `vars` bound as `LET`
    /// variables ahead of it.
    pub async fn query(
        &self,
        statement: impl Into<TrustedFragment>,
        vars: Bindings,
        mode: ReturnMode,
        opts: &ConnectionOptions,
    ) -> Result<QueryOutput> {
        let statement: TrustedFragment = statement.into();
        let query = CompiledQuery::new(statement.as_str(), vars);
        self.execute(&query, mode, opts).await
    }

    /// Every statement entry of the response batch.
    pub async fn query_raw(
        &self,
        statement: impl Into<TrustedFragment>,
        vars: Bindings,
        opts: &ConnectionOptions,
    ) -> Result<Vec<StatementResponse>> {
        Ok(self
            .query(statement, vars, ReturnMode::Raw, opts)
            .await?
            .into_raw())
    }

    /// First row of the last statement, decoded as `T`.
    pub async fn query_last<T: DeserializeOwned>(
        &self,
        statement: impl Into<TrustedFragment>,
        vars: Bindings,
        opts: &ConnectionOptions,
    ) -> Result<Option<T>> {
        self.query(statement, vars, ReturnMode::Single, opts)
            .await?
            .into_single()
            .map(decode_row)
            .transpose()
    }

    /// All rows of the last statement, decoded as `T`.
    pub async fn query_last_array<T: DeserializeOwned>(
        &self,
        statement: impl Into<TrustedFragment>,
        vars: Bindings,
        opts: &ConnectionOptions,
    ) -> Result<Vec<T>> {
        let rows = self
            .query(statement, vars, ReturnMode::Array, opts)
            .await?
            .into_array();
        decode_rows(rows)
    }

    /// Creates an `edge` record linking `from` to `to`.
    ///
    /// Endpoints are identifiers or records carrying an `id`; either is
    /// validated before anything is sent.
    pub async fn relate<E: DeserializeOwned>(
        &self,
        from: impl Into<Endpoint>,
        edge: impl Into<TrustedFragment>,
        to: impl Into<Endpoint>,
        data: Option<Value>,
        opts: &ConnectionOptions,
    ) -> Result<Option<Edge<E>>> {
        let query = compile_relate(&from.into(), &edge.into(), &to.into(), data)?;
        self.execute(&query, ReturnMode::Single, opts)
            .await?
            .into_single()
            .map(decode_row)
            .transpose()
    }

    /// Folds `M`'s declarations from `registry` and binds a collection,
    /// synchronizing its schema.
    pub async fn collection<M: Model>(&self, registry: &Registry) -> Result<Collection<M>> {
        let schema = registry.schema::<M>()?;
        Collection::bind(self.clone(), Arc::new(schema)).await
    }

    pub(crate) fn log(&self, level: LogLevel, payload: &serde_json::Value) {
        if let Some(logger) = &self.logger {
            logger.log(level, payload);
        }
    }
}
