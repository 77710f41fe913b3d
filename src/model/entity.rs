use crate::model::permissions::Permissions;
use crate::query::value::TrustedFragment;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaMode {
    /// Only declared fields are stored.
    Enforced,
    /// Undeclared fields are accepted.
    #[default]
    Flexible,
}

impl SchemaMode {
    pub fn keyword(self) -> &'static str {
        match self {
            SchemaMode::Enforced => "SCHEMAFULL",
            SchemaMode::Flexible => "SCHEMALESS",
        }
    }
}

/// Table-level declaration for a model type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub table: String,
    pub mode: SchemaMode,
    /// Projection the table is derived from (`AS SELECT ...`).
    pub derived_from: Option<TrustedFragment>,
    /// Discard writes, used for pre-defined aggregate views.
    pub drop_writes: bool,
    pub permissions: Option<Permissions>,
}

impl EntityDescriptor {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            mode: SchemaMode::default(),
            derived_from: None,
            drop_writes: false,
            permissions: None,
        }
    }

    pub fn schemafull(mut self) -> Self {
        self.mode = SchemaMode::Enforced;
        self
    }

    pub fn schemaless(mut self) -> Self {
        self.mode = SchemaMode::Flexible;
        self
    }

    pub fn derived_from(mut self, expr: impl Into<TrustedFragment>) -> Self {
        self.derived_from = Some(expr.into());
        self
    }

    pub fn drop_writes(mut self) -> Self {
        self.drop_writes = true;
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}
