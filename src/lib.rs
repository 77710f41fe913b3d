//! Typed object mapping over a record/graph database's REST statement
//! endpoint.
//!
//! Models describe themselves once through [`model::Model::declare`]. A
//! [`collection::Collection`] bound to the folded [`model::ModelSchema`]
//! compiles every call into statement text with bound variables, sends it
//! through the client's [`client::Transport`], and decodes the governing
//! statement's rows back into the model type.

#![warn(missing_docs)]

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod schema;

pub use client::{Client, ConnectionOptions, Edge, QueryLogger, ReturnMode, Transport};
pub use collection::Collection;
pub use config::{ClientConfig, ConfigError, Profile};
pub use error::{Error, Result};
pub use model::{Model, ModelSchema, Registry};
pub use query::{RawReference, TrustedFragment, Value};
