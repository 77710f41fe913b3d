#![forbid(unsafe_code)]

//! Model metadata: entity, field, index, and projection declarations.
//!
//! Data-model types implement [`Model`] and describe themselves through a
//! [`Declaration`]. The resulting [`ModelSchema`] drives both schema
//! synchronization and query compilation.

mod entity;
mod field;
mod index;
mod permissions;
mod projection;
mod registry;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use entity::{EntityDescriptor, SchemaMode};
pub use field::{FieldDescriptor, FieldType, PrimitiveKind};
pub use index::IndexDescriptor;
pub use permissions::{ActionRules, Permissions, Rule};
pub use projection::ProjectionAlias;
pub use registry::{Declaration, Descriptor, DescriptorKind, ModelKey, ModelSchema, Registry};

/// A data-model type stored in one table.
///
/// Rows are decoded into `Self` through serde, so a row that does not match
/// the type fails instead of producing a partially populated value.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Registers this type's descriptors.
    fn declare(model: &mut Declaration<'_>);
}
