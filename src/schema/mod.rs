#![forbid(unsafe_code)]

//! DEFINE statements derived from a [`ModelSchema`].
//!
//! The output is deterministic for a given schema, so submitting it again is
//! harmless: the database treats repeated definitions as replacements.

use crate::error::{ConfigurationError, Result};
use crate::model::{EntityDescriptor, FieldDescriptor, IndexDescriptor, ModelSchema};

/// Renders the table, field, and index definitions, one statement per line.
pub fn synchronize_statements(schema: &ModelSchema) -> Result<String> {
    let table = schema.table();
    let mut statements = Vec::with_capacity(1 + schema.fields().len() + schema.indexes().len());
    statements.push(define_table(schema.entity()));
    for field in schema.fields() {
        statements.push(define_field(table, field)?);
    }
    for index in schema.indexes() {
        statements.push(define_index(table, index));
    }
    Ok(statements.join("\n"))
}

pub fn define_table(entity: &EntityDescriptor) -> String {
    let mut stmt = format!("DEFINE TABLE {}", entity.table);
    if entity.drop_writes {
        stmt.push_str(" DROP");
    }
    stmt.push(' ');
    stmt.push_str(entity.mode.keyword());
    if let Some(expr) = &entity.derived_from {
        stmt.push_str(" AS ");
        stmt.push_str(expr.as_str());
    }
    if let Some(perms) = &entity.permissions {
        stmt.push(' ');
        stmt.push_str(&perms.to_clause());
    }
    stmt.push(';');
    stmt
}

pub fn define_field(table: &str, field: &FieldDescriptor) -> Result<String> {
    let storage_type = field
        .resolved_type()
        .ok_or_else(|| ConfigurationError::UnresolvedFieldType {
            table: table.to_string(),
            field: field.name.clone(),
        })?;
    let mut stmt = format!(
        "DEFINE FIELD {} ON TABLE {table} TYPE {storage_type}",
        field.name
    );
    if let Some(expr) = &field.value {
        stmt.push_str(" VALUE ");
        stmt.push_str(expr.as_str());
    }
    match (&field.assert, field.required) {
        (Some(expr), true) => {
            stmt.push_str(" ASSERT (");
            stmt.push_str(expr.as_str());
            stmt.push_str(") AND $value != NONE");
        }
        (Some(expr), false) => {
            stmt.push_str(" ASSERT ");
            stmt.push_str(expr.as_str());
        }
        (None, true) => stmt.push_str(" ASSERT $value != NONE"),
        (None, false) => {}
    }
    if let Some(perms) = &field.permissions {
        stmt.push(' ');
        stmt.push_str(&perms.to_clause());
    }
    stmt.push(';');
    Ok(stmt)
}

pub fn define_index(table: &str, index: &IndexDescriptor) -> String {
    let mut stmt = format!(
        "DEFINE INDEX {} ON TABLE {table} COLUMNS {}",
        index.resolved_name(table),
        index.fields.join(", ")
    );
    if index.unique {
        stmt.push_str(" UNIQUE");
    }
    stmt.push(';');
    stmt
}
