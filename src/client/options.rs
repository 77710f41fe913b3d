use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Namespace, database, and credential selectors.
///
/// Unset fields fall through to the next layer: per-call options override a
/// collection's options, which override the client's.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    #[serde(default)]
    pub ns: Option<String>,
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
    /// Access token; takes precedence over `user`/`pass`.
    #[serde(default)]
    pub token: Option<String>,
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ns(mut self, ns: impl Into<String>) -> Self {
        self.ns = Some(ns.into());
        self
    }

    pub fn db(mut self, db: impl Into<String>) -> Self {
        self.db = Some(db.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn pass(mut self, pass: impl Into<String>) -> Self {
        self.pass = Some(pass.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns `self` with every field set in `overrides` replaced.
    pub fn merged(&self, overrides: &ConnectionOptions) -> ConnectionOptions {
        ConnectionOptions {
            ns: overrides.ns.clone().or_else(|| self.ns.clone()),
            db: overrides.db.clone().or_else(|| self.db.clone()),
            user: overrides.user.clone().or_else(|| self.user.clone()),
            pass: overrides.pass.clone().or_else(|| self.pass.clone()),
            token: overrides.token.clone().or_else(|| self.token.clone()),
        }
    }

    /// `Bearer <token>` when a token is set, otherwise `Basic` over
    /// `user:pass`. `None` when no credential is configured.
    pub fn authorization(&self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(format!("Bearer {token}"));
        }
        if self.user.is_none() && self.pass.is_none() {
            return None;
        }
        let pair = format!(
            "{}:{}",
            self.user.as_deref().unwrap_or_default(),
            self.pass.as_deref().unwrap_or_default()
        );
        Some(format!("Basic {}", STANDARD.encode(pair)))
    }
}
