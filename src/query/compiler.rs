//! Statement compilation for collection operations.
//!
//! Every function is pure: it turns request parameters plus model metadata
//! into statement text and the variables the statement references. Values
//! reach the text only as `$name` references or as escaped literals.

use tracing::trace;

use crate::error::{Result, SerializeError, ValidationError};
use crate::model::ModelSchema;
use crate::query::bindings::Bindings;
use crate::query::params::{
    Assign, Create, Delete, Endpoint, Filter, FindById, FindMany, Selection, Update,
};
use crate::query::serializer::{encode, encode_assignments, ensure_field_path, ensure_record_key};
use crate::query::value::{RawReference, TrustedFragment, Value};

/// Statement text plus the bindings it references.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    pub statement: String,
    pub bindings: Bindings,
}

impl CompiledQuery {
    pub fn new(statement: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            statement: statement.into(),
            bindings,
        }
    }

    /// Request body: the `LET` preamble followed by the statement.
    pub fn render(&self) -> Result<String> {
        let mut body = self.bindings.preamble()?;
        body.push_str(&self.statement);
        Ok(body)
    }
}

/// `CREATE <table|id> CONTENT $data`
pub fn compile_create(schema: &ModelSchema, params: &Create) -> Result<CompiledQuery> {
    let table = schema.table();
    let data = &params.data;
    let target = match data.get("id") {
        None | Some(Value::Null) => table.to_string(),
        Some(Value::String(id)) => owned_record_id(table, id)?.to_string(),
        Some(Value::Record(reference)) => owned_record_id(table, reference.as_str())?.to_string(),
        Some(_) => return Err(ValidationError::NonStringId.into()),
    };
    let statement = format!("CREATE {target} CONTENT $data");
    trace!(table, statement = %statement, "compile.create");
    Ok(CompiledQuery::new(
        statement,
        Bindings::new().with("data", data.clone()),
    ))
}

/// `SELECT ... FROM <table> [WHERE] [ORDER BY] [LIMIT] [START] [FETCH]`
pub fn compile_find_many(schema: &ModelSchema, params: &FindMany) -> Result<CompiledQuery> {
    let mut statement = format!(
        "SELECT {} FROM {}",
        projection(schema, params.select.as_deref())?,
        schema.table()
    );
    statement.push_str(&where_clause(&params.filter)?);
    if !params.order_by.is_empty() {
        let parts: Vec<String> = params
            .order_by
            .iter()
            .map(|(field, order)| Ok(format!("{} {}", ensure_field_path(field)?, order.keyword())))
            .collect::<Result<_>>()?;
        statement.push_str(" ORDER BY ");
        statement.push_str(&parts.join(", "));
    }
    if let Some(limit) = params.limit {
        statement.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(start) = params.start {
        statement.push_str(&format!(" START {start}"));
    }
    let fetch: Vec<&str> = params
        .fetch
        .iter()
        .filter(|(_, eager)| *eager)
        .map(|(field, _)| ensure_field_path(field))
        .collect::<Result<_>>()?;
    if !fetch.is_empty() {
        statement.push_str(" FETCH ");
        statement.push_str(&fetch.join(", "));
    }
    trace!(table = schema.table(), statement = %statement, "compile.find_many");
    Ok(CompiledQuery::new(statement, params.vars.clone()))
}

/// Single-record lookup; the identifier must belong to the schema's table.
pub fn compile_find_by_id(schema: &ModelSchema, id: &str, params: &FindById) -> Result<CompiledQuery> {
    let reference = RawReference::record(owned_record_id(schema.table(), id)?)?;
    let query = FindMany {
        select: params.select.clone(),
        fetch: params.fetch.clone(),
        limit: Some(1),
        ..FindMany::default()
    }
    .matching("id", reference);
    compile_find_many(schema, &query)
}

/// `UPDATE <table> CONTENT|MERGE $data [WHERE] RETURN AFTER`
pub fn compile_update(schema: &ModelSchema, params: &Update) -> Result<CompiledQuery> {
    let method = if params.replace { "CONTENT" } else { "MERGE" };
    let statement = format!(
        "UPDATE {} {method} $data{} RETURN AFTER",
        schema.table(),
        where_clause(&params.filter)?
    );
    let mut bindings = params.vars.clone();
    bindings.insert("data", params.data.clone());
    Ok(CompiledQuery::new(statement, bindings))
}

/// `UPDATE <table> SET k = v, ... [WHERE] RETURN AFTER`
pub fn compile_assign(schema: &ModelSchema, params: &Assign) -> Result<CompiledQuery> {
    let non_empty = matches!(&params.assignments, Value::Object(map) if !map.is_empty());
    if !non_empty {
        return Err(SerializeError::Unserializable(
            "assignments must be a non-empty object".to_string(),
        )
        .into());
    }
    let statement = format!(
        "UPDATE {} SET{}{} RETURN AFTER",
        schema.table(),
        encode_assignments(&params.assignments)?,
        where_clause(&params.filter)?
    );
    Ok(CompiledQuery::new(statement, Bindings::new()))
}

/// `DELETE <table> [WHERE] RETURN BEFORE`
pub fn compile_delete(schema: &ModelSchema, params: &Delete) -> Result<CompiledQuery> {
    let statement = format!(
        "DELETE {}{} RETURN BEFORE",
        schema.table(),
        where_clause(&params.filter)?
    );
    Ok(CompiledQuery::new(statement, params.vars.clone()))
}

/// `RELATE $fromId -> <edge> -> $toId CONTENT $data`
pub fn compile_relate(
    from: &Endpoint,
    edge: &TrustedFragment,
    to: &Endpoint,
    data: Option<Value>,
) -> Result<CompiledQuery> {
    let from_id = endpoint_reference(from, "from")?;
    let to_id = endpoint_reference(to, "to")?;
    let statement = format!("RELATE $fromId -> {edge} -> $toId CONTENT $data");
    let bindings = Bindings::new()
        .with("fromId", from_id)
        .with("toId", to_id)
        .with("data", data.unwrap_or_else(Value::empty_object));
    Ok(CompiledQuery::new(statement, bindings))
}

fn projection(schema: &ModelSchema, select: Option<&[(String, Selection)]>) -> Result<String> {
    let Some(select) = select else {
        return Ok("*".to_string());
    };
    let mut parts = Vec::with_capacity(select.len());
    for (field, selection) in select {
        let field = ensure_field_path(field)?;
        match selection {
            Selection::Include(false) => {}
            Selection::Include(true) => parts.push(match schema.projection(field) {
                Some(alias) => format!("{} AS {field}", alias.expression),
                None => field.to_string(),
            }),
            Selection::Expr(expr) => parts.push(format!("{expr} AS {field}")),
        }
    }
    if parts.is_empty() {
        Ok("*".to_string())
    } else {
        Ok(parts.join(", "))
    }
}

/// Leading-space ` WHERE ...`, or empty when the filter has no conditions.
fn where_clause(filter: &Filter) -> Result<String> {
    if filter.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(filter.matching.len() + 1);
    for (field, value) in &filter.matching {
        parts.push(format!("{} = {}", ensure_field_path(field)?, encode(value)?));
    }
    if let Some(condition) = &filter.where_clause {
        parts.push(condition.as_str().to_string());
    }
    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// Validates `id` and checks that its table segment is `table`.
fn owned_record_id<'a>(table: &str, id: &'a str) -> Result<&'a str> {
    let prefix = id.split(':').next().unwrap_or_default();
    if prefix != table {
        return Err(ValidationError::TableMismatch {
            table: table.to_string(),
            id: id.to_string(),
        }
        .into());
    }
    ensure_record_key(id)
}

fn endpoint_reference(endpoint: &Endpoint, side: &'static str) -> Result<RawReference> {
    match endpoint {
        Endpoint::Id(id) => RawReference::record(id.as_str()),
        Endpoint::Ref(reference) => Ok(reference.clone()),
        Endpoint::Record(record) => match record.get("id") {
            Some(Value::String(id)) => RawReference::record(id.as_str()),
            Some(Value::Record(reference)) => Ok(reference.clone()),
            _ => Err(ValidationError::InvalidEndpoint { side }.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Declaration, EntityDescriptor, FieldDescriptor, FieldType, Model, ProjectionAlias,
        Registry,
    };
    use crate::query::params::Order;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize)]
    struct Fruit {
        name: String,
    }

    impl Model for Fruit {
        fn declare(model: &mut Declaration<'_>) {
            model
                .entity(EntityDescriptor::new("fruit"))
                .field(FieldDescriptor::new("name").typed(FieldType::String))
                .projection(ProjectionAlias::new("eatenBy", "<-eats<-animal.*"));
        }
    }

    fn schema() -> ModelSchema {
        let mut registry = Registry::new();
        registry.declare::<Fruit>();
        registry.schema::<Fruit>().unwrap()
    }

    fn object(entries: &[(&str, Value)]) -> Value {
        Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn bare_find_many() {
        let q = compile_find_many(&schema(), &FindMany::new()).unwrap();
        assert_eq!(q.statement, "SELECT * FROM fruit");
        assert!(q.bindings.is_empty());
    }

    #[test]
    fn matching_with_limit() {
        let q = compile_find_many(&schema(), &FindMany::new().matching("isRed", true).limit(1))
            .unwrap();
        assert_eq!(q.statement, "SELECT * FROM fruit WHERE isRed = true LIMIT 1");
    }

    #[test]
    fn every_clause() {
        let params = FindMany::new()
            .select("name", true)
            .select("color", false)
            .select("eatenBy", true)
            .select("owner", "owner.name")
            .matching("name", "ap\"ple")
            .where_clause("weight > $min")
            .var("min", 10i64)
            .order_by("name", 1)
            .order_by("weight", Order::Desc)
            .limit(5)
            .start(10)
            .fetch("owner", true)
            .fetch("seller", false);
        let q = compile_find_many(&schema(), &params).unwrap();
        assert_eq!(
            q.statement,
            "SELECT name, <-eats<-animal.* AS eatenBy, owner.name AS owner FROM fruit \
             WHERE name = \"ap\\\"ple\" AND weight > $min ORDER BY name ASC, weight DESC \
             LIMIT 5 START 10 FETCH owner"
        );
        assert_eq!(q.bindings.get("min"), Some(&Value::Int(10)));
    }

    #[test]
    fn all_false_select_falls_back_to_star() {
        let q = compile_find_many(&schema(), &FindMany::new().select("name", false)).unwrap();
        assert_eq!(q.statement, "SELECT * FROM fruit");
    }

    #[test]
    fn find_by_id_uses_record_literal() {
        let q = compile_find_by_id(&schema(), "fruit:apple", &FindById::new()).unwrap();
        assert_eq!(q.statement, "SELECT * FROM fruit WHERE id = fruit:apple LIMIT 1");
    }

    #[test]
    fn find_by_id_rejects_foreign_table() {
        let err = compile_find_by_id(&schema(), "animal:tiger", &FindById::new()).unwrap_err();
        assert_eq!(err.code(), "TableMismatch");
        let err = compile_find_by_id(&schema(), "fruit:a b", &FindById::new()).unwrap_err();
        assert_eq!(err.code(), "InvalidRecordKey");
    }

    #[test]
    fn create_targets() {
        let q = compile_create(&schema(), &Create::new(object(&[("name", "apple".into())]))).unwrap();
        assert_eq!(q.statement, "CREATE fruit CONTENT $data");
        assert!(q.bindings.get("data").is_some());

        let q = compile_create(
            &schema(),
            &Create::new(object(&[("id", "fruit:apple".into()), ("name", "apple".into())])),
        )
        .unwrap();
        assert_eq!(q.statement, "CREATE fruit:apple CONTENT $data");

        let err = compile_create(&schema(), &Create::new(object(&[("id", "animal:x".into())]))).unwrap_err();
        assert_eq!(err.code(), "TableMismatch");
        let err = compile_create(&schema(), &Create::new(object(&[("id", Value::Int(3))]))).unwrap_err();
        assert_eq!(err.code(), "NonStringId");
    }

    #[test]
    fn update_methods() {
        let data = object(&[("name", "pear".into())]);
        let merge = compile_update(&schema(), &Update::new(data.clone()).matching("name", "apple"))
            .unwrap();
        assert_eq!(
            merge.statement,
            "UPDATE fruit MERGE $data WHERE name = \"apple\" RETURN AFTER"
        );
        let content = compile_update(&schema(), &Update::new(data).replace(true)).unwrap();
        assert_eq!(content.statement, "UPDATE fruit CONTENT $data RETURN AFTER");
    }

    #[test]
    fn assign_uses_set() {
        let q = compile_assign(
            &schema(),
            &Assign::new(object(&[("name", "kiwi".into())])).matching("name", "apple"),
        )
        .unwrap();
        assert_eq!(
            q.statement,
            "UPDATE fruit SET name = \"kiwi\" WHERE name = \"apple\" RETURN AFTER"
        );
        assert!(compile_assign(&schema(), &Assign::new(Value::empty_object())).is_err());
    }

    #[test]
    fn delete_returns_before() {
        let q = compile_delete(&schema(), &Delete::new()).unwrap();
        assert_eq!(q.statement, "DELETE fruit RETURN BEFORE");
        let q = compile_delete(&schema(), &Delete::new().matching("isRed", true)).unwrap();
        assert_eq!(q.statement, "DELETE fruit WHERE isRed = true RETURN BEFORE");
    }

    #[test]
    fn relate_binds_endpoints() {
        let from = Endpoint::Record(object(&[("id", "animal:tiger".into())]));
        let q = compile_relate(&from, &"eats".into(), &"fruit:apple".into(), None).unwrap();
        assert_eq!(q.statement, "RELATE $fromId -> eats -> $toId CONTENT $data");
        assert_eq!(
            q.render().unwrap(),
            "LET $fromId = animal:tiger;\nLET $toId = fruit:apple;\nLET $data = {};\n\
             RELATE $fromId -> eats -> $toId CONTENT $data"
        );
    }

    #[test]
    fn relate_accepts_record_pointers() {
        let tiger = RawReference::record("animal:tiger").unwrap();
        let from = Endpoint::from(Value::Record(tiger.clone()));
        assert_eq!(from, Endpoint::Ref(tiger.clone()));
        let q = compile_relate(&from, &"eats".into(), &tiger.into(), None).unwrap();
        assert_eq!(
            q.bindings.get("fromId"),
            Some(&Value::Record(RawReference::record("animal:tiger").unwrap()))
        );
        assert!(q.render().unwrap().starts_with("LET $fromId = animal:tiger;\nLET $toId = animal:tiger;"));
    }

    #[test]
    fn field_names_are_validated() {
        let err = compile_find_many(&schema(), &FindMany::new().matching("name = 1 OR true", 1i64))
            .unwrap_err();
        assert_eq!(err.code(), "InvalidKey");
        let err = compile_find_many(&schema(), &FindMany::new().order_by("name; DELETE fruit", 1))
            .unwrap_err();
        assert_eq!(err.code(), "InvalidKey");
        let err = compile_find_many(&schema(), &FindMany::new().fetch("owner, seller", true))
            .unwrap_err();
        assert_eq!(err.code(), "InvalidKey");
        let err = compile_find_many(&schema(), &FindMany::new().select("* FROM user;", true))
            .unwrap_err();
        assert_eq!(err.code(), "InvalidKey");
        let err = compile_delete(&schema(), &Delete::new().matching("a OR 1 = 1 --", true)).unwrap_err();
        assert_eq!(err.code(), "InvalidKey");
        let q = compile_find_many(&schema(), &FindMany::new().matching("owner.name", "al")).unwrap();
        assert_eq!(q.statement, "SELECT * FROM fruit WHERE owner.name = \"al\"");
    }

    #[test]
    fn relate_rejects_bad_endpoints() {
        let err = compile_relate(&"tiger".into(), &"eats".into(), &"fruit:apple".into(), None)
            .unwrap_err();
        assert_eq!(err.code(), "InvalidRecordKey");
        let no_id = Endpoint::Record(object(&[("name", "tiger".into())]));
        let err = compile_relate(&"animal:tiger".into(), &"eats".into(), &no_id, None).unwrap_err();
        assert_eq!(err.code(), "InvalidEndpoint");
    }

    #[test]
    fn render_prepends_let_preamble() {
        let q = compile_update(&schema(), &Update::new(object(&[("name", "fig".into())]))).unwrap();
        assert_eq!(
            q.render().unwrap(),
            "LET $data = {\"name\":\"fig\"};\nUPDATE fruit MERGE $data RETURN AFTER"
        );
    }
}
