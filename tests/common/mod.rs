#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use surreal_rest::client::{RequestHeaders, Transport};
use surreal_rest::error::TransportError;
use surreal_rest::model::{Declaration, EntityDescriptor, FieldDescriptor, FieldType, IndexDescriptor, ProjectionAlias};
use surreal_rest::{Client, Model};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("surreal_rest=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

#[derive(Clone, Debug)]
pub struct Request {
    pub endpoint: String,
    pub body: String,
    pub headers: RequestHeaders,
}

/// Replays queued payloads in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Json, String>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, payload: Json) {
        self.replies.lock().unwrap().push_back(Ok(payload));
    }

    /// Queues the usual batch for a statement preceded by `lets` bindings.
    pub fn reply_rows(&self, lets: usize, rows: Json) {
        let mut batch: Vec<Json> = (0..lets).map(|_| ok(Json::Null)).collect();
        batch.push(ok(rows));
        self.reply(Json::Array(batch));
    }

    pub fn fail(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Request {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(
        &self,
        endpoint: &str,
        body: String,
        headers: &RequestHeaders,
    ) -> Result<Json, TransportError> {
        self.requests.lock().unwrap().push(Request {
            endpoint: endpoint.to_string(),
            body,
            headers: headers.clone(),
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(message)) => Err(message.into()),
            None => Ok(json!([])),
        }
    }
}

pub fn ok(result: Json) -> Json {
    json!({"time": "12.3µs", "status": "OK", "result": result})
}

pub fn err(detail: &str) -> Json {
    json!({"time": "4.1µs", "status": "ERR", "detail": detail})
}

pub fn client(transport: &Arc<ScriptedTransport>) -> Client {
    init_tracing();
    Client::new("http://localhost:8000/", transport.clone())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fruit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub color: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl Model for Fruit {
    fn declare(model: &mut Declaration<'_>) {
        model
            .entity(EntityDescriptor::new("fruit").schemafull())
            .field(FieldDescriptor::new("name").typed(FieldType::String).required())
            .field(FieldDescriptor::new("color").typed(FieldType::String))
            .field(FieldDescriptor::new("created_at").typed(FieldType::Datetime))
            .index(IndexDescriptor::new(["name"]).unique());
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub species: String,
    #[serde(default)]
    pub diet: Vec<String>,
}

impl Model for Animal {
    fn declare(model: &mut Declaration<'_>) {
        model
            .entity(EntityDescriptor::new("animal"))
            .field(FieldDescriptor::new("species").typed(FieldType::String))
            .projection(ProjectionAlias::new("diet", "->eats->fruit.name"));
    }
}
