#![forbid(unsafe_code)]

//! Statement compilation and literal serialization.
//!
//! This module turns structured request parameters into statement text,
//! keeping caller data out of the text except as escaped literals or bound
//! variables.

/// Named `LET` variables sent ahead of a statement.
pub mod bindings;

/// Per-operation statement compilers.
///
/// Each compiler is a pure function from parameters and model metadata to a
/// [`CompiledQuery`].
pub mod compiler;

/// Request parameter types for collection operations.
pub mod params;

/// Literal encoding and identifier validation.
pub mod serializer;

/// Untrusted values, raw record references, and trusted fragments.
pub mod value;

pub use bindings::Bindings;
pub use compiler::CompiledQuery;
pub use params::{
    Assign, Create, Delete, Endpoint, Filter, FindById, FindMany, Order, Selection, Update,
};
pub use serializer::{
    encode, encode_assignments, ensure_field_path, ensure_key, ensure_record_key, format_datetime,
};
pub use value::{RawReference, TrustedFragment, Value};
