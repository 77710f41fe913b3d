use std::fmt;

use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// Optional sink for request and response payloads.
pub trait QueryLogger: Send + Sync {
    fn log(&self, level: LogLevel, payload: &serde_json::Value);
}

impl<F> QueryLogger for F
where
    F: Fn(LogLevel, &serde_json::Value) + Send + Sync,
{
    fn log(&self, level: LogLevel, payload: &serde_json::Value) {
        self(level, payload);
    }
}

/// Forwards payloads to `tracing`; `Fatal` is emitted at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl QueryLogger for TracingLogger {
    fn log(&self, level: LogLevel, payload: &serde_json::Value) {
        match level {
            LogLevel::Debug => debug!(target: "surreal_rest::query", %payload),
            LogLevel::Info => info!(target: "surreal_rest::query", %payload),
            LogLevel::Warn => warn!(target: "surreal_rest::query", %payload),
            LogLevel::Error => error!(target: "surreal_rest::query", %payload),
            LogLevel::Fatal => error!(target: "surreal_rest::query", fatal = true, %payload),
        }
    }
}
