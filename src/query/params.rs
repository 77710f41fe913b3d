//! Structured request parameters accepted by the compiler.
//!
//! Every map-like clause is an ordered list so the emitted statement follows
//! the caller's order (significant for `ORDER BY`).

use crate::client::ConnectionOptions;
use crate::query::bindings::Bindings;
use crate::query::value::{RawReference, TrustedFragment, Value};

/// One entry of a select filter.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// `true` selects the field (or its registered projection alias);
    /// `false` leaves it out.
    Include(bool),
    /// Re-aliases an expression: `<expr> AS field`.
    Expr(TrustedFragment),
}

impl From<bool> for Selection {
    fn from(value: bool) -> Self {
        Selection::Include(value)
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::Expr(TrustedFragment::new(value))
    }
}

impl From<TrustedFragment> for Selection {
    fn from(value: TrustedFragment) -> Self {
        Selection::Expr(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// `1` sorts ascending; any other value sorts descending.
impl From<i32> for Order {
    fn from(value: i32) -> Self {
        if value == 1 {
            Order::Asc
        } else {
            Order::Desc
        }
    }
}

/// Row filter shared by select, update, and delete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    /// `field = <literal>` conditions, AND-joined.
    pub matching: Vec<(String, Value)>,
    /// Extra condition appended verbatim.
    pub where_clause: Option<TrustedFragment>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.matching.is_empty() && self.where_clause.is_none()
    }
}

/// Record payload for `CREATE`. An `id` field selects the record key.
#[derive(Clone, Debug)]
pub struct Create {
    pub data: Value,
    pub opts: ConnectionOptions,
}

impl Create {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            opts: ConnectionOptions::default(),
        }
    }

    pub fn from_serialize<T: serde::Serialize + ?Sized>(data: &T) -> crate::error::Result<Self> {
        Ok(Self::new(Value::from_serialize(data)?))
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FindMany {
    pub select: Option<Vec<(String, Selection)>>,
    pub filter: Filter,
    pub order_by: Vec<(String, Order)>,
    pub limit: Option<u64>,
    pub start: Option<u64>,
    pub fetch: Vec<(String, bool)>,
    pub vars: Bindings,
    pub opts: ConnectionOptions,
}

impl FindMany {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, field: impl Into<String>, selection: impl Into<Selection>) -> Self {
        self.select
            .get_or_insert_with(Vec::new)
            .push((field.into(), selection.into()));
        self
    }

    pub fn matching(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.matching.push((field.into(), value.into()));
        self
    }

    pub fn where_clause(mut self, condition: impl Into<TrustedFragment>) -> Self {
        self.filter.where_clause = Some(condition.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: impl Into<Order>) -> Self {
        self.order_by.push((field.into(), order.into()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn fetch(mut self, field: impl Into<String>, eager: bool) -> Self {
        self.fetch.push((field.into(), eager));
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name, value);
        self
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FindById {
    pub select: Option<Vec<(String, Selection)>>,
    pub fetch: Vec<(String, bool)>,
    pub opts: ConnectionOptions,
}

impl FindById {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, field: impl Into<String>, selection: impl Into<Selection>) -> Self {
        self.select
            .get_or_insert_with(Vec::new)
            .push((field.into(), selection.into()));
        self
    }

    pub fn fetch(mut self, field: impl Into<String>, eager: bool) -> Self {
        self.fetch.push((field.into(), eager));
        self
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Update {
    pub filter: Filter,
    pub data: Value,
    /// `true` replaces the record (`CONTENT`), otherwise fields merge.
    pub replace: bool,
    pub vars: Bindings,
    pub opts: ConnectionOptions,
}

impl Update {
    pub fn new(data: Value) -> Self {
        Self {
            filter: Filter::default(),
            data,
            replace: false,
            vars: Bindings::new(),
            opts: ConnectionOptions::default(),
        }
    }

    pub fn matching(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.matching.push((field.into(), value.into()));
        self
    }

    pub fn where_clause(mut self, condition: impl Into<TrustedFragment>) -> Self {
        self.filter.where_clause = Some(condition.into());
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name, value);
        self
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

/// Field assignments applied with `SET`.
#[derive(Clone, Debug)]
pub struct Assign {
    pub filter: Filter,
    pub assignments: Value,
    pub opts: ConnectionOptions,
}

impl Assign {
    pub fn new(assignments: Value) -> Self {
        Self {
            filter: Filter::default(),
            assignments,
            opts: ConnectionOptions::default(),
        }
    }

    pub fn matching(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.matching.push((field.into(), value.into()));
        self
    }

    pub fn where_clause(mut self, condition: impl Into<TrustedFragment>) -> Self {
        self.filter.where_clause = Some(condition.into());
        self
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Delete {
    pub filter: Filter,
    pub vars: Bindings,
    pub opts: ConnectionOptions,
}

impl Delete {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.matching.push((field.into(), value.into()));
        self
    }

    pub fn where_clause(mut self, condition: impl Into<TrustedFragment>) -> Self {
        self.filter.where_clause = Some(condition.into());
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name, value);
        self
    }

    pub fn opts(mut self, opts: ConnectionOptions) -> Self {
        self.opts = opts;
        self
    }
}

/// Relation endpoint: a bare identifier, a validated record pointer, or a
/// record carrying an `id` field.
#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    Id(String),
    Ref(RawReference),
    Record(Value),
}

impl From<RawReference> for Endpoint {
    fn from(value: RawReference) -> Self {
        Endpoint::Ref(value)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Endpoint::Id(value.to_owned())
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Endpoint::Id(value)
    }
}

impl From<Value> for Endpoint {
    fn from(value: Value) -> Self {
        match value {
            Value::String(id) => Endpoint::Id(id),
            Value::Record(reference) => Endpoint::Ref(reference),
            other => Endpoint::Record(other),
        }
    }
}
