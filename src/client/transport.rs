//! Boundary to the HTTP layer.
//!
//! The crate never opens connections itself. A [`Transport`] receives the
//! fully rendered request body and headers and hands back the decoded JSON
//! envelope; timeouts, retries, and TLS belong to the implementation.

use async_trait::async_trait;

use crate::client::options::ConnectionOptions;
use crate::error::TransportError;

/// Headers attached to every statement request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestHeaders {
    pub accept: &'static str,
    pub authorization: Option<String>,
    /// Namespace selector; empty when unset.
    pub ns: String,
    /// Database selector; empty when unset.
    pub db: String,
}

impl RequestHeaders {
    pub fn from_options(opts: &ConnectionOptions) -> Self {
        Self {
            accept: "application/json",
            authorization: opts.authorization(),
            ns: opts.ns.clone().unwrap_or_default(),
            db: opts.db.clone().unwrap_or_default(),
        }
    }

    /// Header name/value pairs in wire order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("Accept", self.accept.to_string())];
        if let Some(auth) = &self.authorization {
            pairs.push(("Authorization", auth.clone()));
        }
        pairs.push(("NS", self.ns.clone()));
        pairs.push(("DB", self.db.clone()));
        pairs
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` to `endpoint` and returns the decoded JSON response.
    async fn submit(
        &self,
        endpoint: &str,
        body: String,
        headers: &RequestHeaders,
    ) -> std::result::Result<serde_json::Value, TransportError>;
}
