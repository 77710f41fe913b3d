//! Interpretation of the batched statement envelope.
//!
//! A request is a `LET` preamble followed by the caller's statement, so the
//! database answers with one entry per statement. The first entry fails only
//! when the request itself is malformed; the last entry carries the result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, RemoteError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERR")]
    Err,
}

/// One statement's entry in the response batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStatement")]
pub struct StatementResponse {
    pub time: String,
    pub status: Status,
    pub result: Option<Vec<serde_json::Value>>,
    /// Diagnostic text reported for failed statements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Deserialize)]
struct RawStatement {
    time: String,
    status: Status,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    detail: Option<String>,
}

impl TryFrom<RawStatement> for StatementResponse {
    type Error = String;

    fn try_from(raw: RawStatement) -> std::result::Result<Self, Self::Error> {
        let (result, detail) = match raw.result {
            serde_json::Value::Null => (None, raw.detail),
            serde_json::Value::Array(rows) => (Some(rows), raw.detail),
            // Failed statements may report their message in place of rows.
            serde_json::Value::String(message) if raw.status == Status::Err => {
                (None, raw.detail.or(Some(message)))
            }
            other => return Err(format!("statement result must be null or an array, got {other}")),
        };
        Ok(Self {
            time: raw.time,
            status: raw.status,
            result,
            detail,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnMode {
    /// The whole batch.
    Raw,
    /// First row of the last statement.
    Single,
    /// All rows of the last statement.
    Array,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutput {
    Raw(Vec<StatementResponse>),
    Single(Option<serde_json::Value>),
    Array(Vec<serde_json::Value>),
}

impl QueryOutput {
    pub fn into_raw(self) -> Vec<StatementResponse> {
        match self {
            QueryOutput::Raw(batch) => batch,
            QueryOutput::Single(row) => vec![synthetic(row.into_iter().collect())],
            QueryOutput::Array(rows) => vec![synthetic(rows)],
        }
    }

    pub fn into_single(self) -> Option<serde_json::Value> {
        match self {
            QueryOutput::Raw(batch) => last_rows(batch).into_iter().next(),
            QueryOutput::Single(row) => row,
            QueryOutput::Array(rows) => rows.into_iter().next(),
        }
    }

    pub fn into_array(self) -> Vec<serde_json::Value> {
        match self {
            QueryOutput::Raw(batch) => last_rows(batch),
            QueryOutput::Single(row) => row.into_iter().collect(),
            QueryOutput::Array(rows) => rows,
        }
    }
}

fn synthetic(rows: Vec<serde_json::Value>) -> StatementResponse {
    StatementResponse {
        time: String::new(),
        status: Status::Ok,
        result: Some(rows),
        detail: None,
    }
}

fn last_rows(batch: Vec<StatementResponse>) -> Vec<serde_json::Value> {
    batch
        .into_iter()
        .last()
        .and_then(|statement| statement.result)
        .unwrap_or_default()
}

/// Validates a decoded envelope and selects the shape requested by `mode`.
pub fn interpret(payload: serde_json::Value, mode: ReturnMode) -> Result<QueryOutput> {
    if let Some(code) = payload.get("code").filter(|code| !code.is_null()) {
        let code = code.clone();
        warn!(%code, "request rejected");
        return Err(RemoteError::Envelope { code, payload }.into());
    }
    let batch: Vec<StatementResponse> = serde_json::from_value(payload).map_err(Error::Decode)?;

    if let Some(first) = batch.first() {
        if first.status == Status::Err {
            warn!(time = %first.time, detail = ?first.detail, "statement failed");
            return Err(RemoteError::Statement(first.clone()).into());
        }
    }
    if mode == ReturnMode::Raw {
        return Ok(QueryOutput::Raw(batch));
    }
    if let Some(last) = batch.last() {
        if last.status == Status::Err {
            warn!(time = %last.time, detail = ?last.detail, "statement failed");
            return Err(RemoteError::Statement(last.clone()).into());
        }
    }
    Ok(match mode {
        ReturnMode::Single => QueryOutput::Single(
            batch
                .last()
                .and_then(|statement| statement.result.as_ref())
                .and_then(|rows| rows.first().cloned()),
        ),
        _ => QueryOutput::Array(last_rows(batch)),
    })
}

/// Deserializes one result row into a typed record.
pub fn decode_row<T: DeserializeOwned>(row: serde_json::Value) -> Result<T> {
    serde_json::from_value(row).map_err(Error::Decode)
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<serde_json::Value>) -> Result<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}

/// Row returned by `RELATE`: the edge record with its two endpoints.
///
/// Edge content other than `id`, `in`, and `out` lands in `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge<E = serde_json::Map<String, serde_json::Value>> {
    pub id: String,
    #[serde(rename = "in")]
    pub from: String,
    #[serde(rename = "out")]
    pub to: String,
    #[serde(flatten)]
    pub data: E,
}
