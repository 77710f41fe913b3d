use std::fmt;

use crate::model::permissions::Permissions;
use crate::query::value::TrustedFragment;

/// Storage type emitted in `DEFINE FIELD ... TYPE <type>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Any,
    Array,
    Bool,
    Datetime,
    Decimal,
    Duration,
    Float,
    Int,
    Number,
    Object,
    String,
    /// `record(<table>)`
    Record(String),
    /// `geometry(<kind>)`
    Geometry(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => f.write_str("any"),
            FieldType::Array => f.write_str("array"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Datetime => f.write_str("datetime"),
            FieldType::Decimal => f.write_str("decimal"),
            FieldType::Duration => f.write_str("duration"),
            FieldType::Float => f.write_str("float"),
            FieldType::Int => f.write_str("int"),
            FieldType::Number => f.write_str("number"),
            FieldType::Object => f.write_str("object"),
            FieldType::String => f.write_str("string"),
            FieldType::Record(table) => write!(f, "record({table})"),
            FieldType::Geometry(kind) => write!(f, "geometry({kind})"),
        }
    }
}

/// Opt-in source-type tag mapped onto a storage type when no explicit type
/// is declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean,
    Number,
    BigInt,
    String,
    Any,
    Date,
}

impl PrimitiveKind {
    pub fn storage_type(self) -> FieldType {
        match self {
            PrimitiveKind::Boolean => FieldType::Bool,
            PrimitiveKind::Number | PrimitiveKind::BigInt => FieldType::Number,
            PrimitiveKind::String => FieldType::String,
            PrimitiveKind::Any => FieldType::Any,
            PrimitiveKind::Date => FieldType::Datetime,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub storage_type: Option<FieldType>,
    pub required: bool,
    /// Computed-value expression (`VALUE <expr>`).
    pub value: Option<TrustedFragment>,
    /// Assertion expression (`ASSERT <expr>`).
    pub assert: Option<TrustedFragment>,
    pub permissions: Option<Permissions>,
    pub type_hint: Option<PrimitiveKind>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: None,
            required: false,
            value: None,
            assert: None,
            permissions: None,
            type_hint: None,
        }
    }

    pub fn typed(mut self, storage_type: FieldType) -> Self {
        self.storage_type = Some(storage_type);
        self
    }

    pub fn hinted(mut self, kind: PrimitiveKind) -> Self {
        self.type_hint = Some(kind);
        self
    }

    /// Rejects `NONE`. Combined with an explicit [`Self::assert`] by `AND`.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn value(mut self, expr: impl Into<TrustedFragment>) -> Self {
        self.value = Some(expr.into());
        self
    }

    pub fn assert(mut self, expr: impl Into<TrustedFragment>) -> Self {
        self.assert = Some(expr.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Explicit type first, then the primitive hint.
    pub fn resolved_type(&self) -> Option<FieldType> {
        self.storage_type
            .clone()
            .or_else(|| self.type_hint.map(PrimitiveKind::storage_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_type_wins_over_hint() {
        let field = FieldDescriptor::new("best_friend")
            .hinted(PrimitiveKind::String)
            .typed(FieldType::Record("animal".into()));
        assert_eq!(field.resolved_type().unwrap().to_string(), "record(animal)");
    }

    #[test]
    fn hint_maps_to_storage_type() {
        let field = FieldDescriptor::new("created_at").hinted(PrimitiveKind::Date);
        assert_eq!(field.resolved_type(), Some(FieldType::Datetime));
        assert_eq!(FieldDescriptor::new("x").resolved_type(), None);
    }
}
