// Test doubles shared by the service tests.

use serde_json::{json, Value};
use std::sync::Mutex;

use super::onchain::ReadOnlyTransport;
use crate::error::{AppError, Result};

type Responder = Box<dyn Fn(&str, &[String]) -> Result<Value> + Send + Sync>;

/// Answers read-only calls from a closure and records every call made.
pub(crate) struct ScriptedTransport {
    responder: Responder,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ReadOnlyTransport for ScriptedTransport {
    async fn call_read_only(&self, function: &str, args: &[String]) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((function.to_string(), args.to_vec()));
        (self.responder)(function, args)
    }
}

pub(crate) fn ok_body(hex: String) -> Result<Value> {
    Ok(json!({ "okay": true, "result": hex }))
}

pub(crate) fn http_500() -> Result<Value> {
    Err(AppError::HttpError {
        status: 500,
        body: "upstream exploded".to_string(),
    })
}

/// `(ok <inner>)` for a `0x` hex value.
pub(crate) fn ok_wrap(hex: &str) -> String {
    format!("0x07{}", hex.trim_start_matches("0x"))
}

pub(crate) fn some_wrap(hex: &str) -> String {
    format!("0x0a{}", hex.trim_start_matches("0x"))
}

pub(crate) fn tuple_hex(fields: &[(&str, String)]) -> String {
    let mut out = format!("0x0c{:08x}", fields.len());
    for (name, value) in fields {
        out.push_str(&format!("{:02x}{}", name.len(), hex::encode(name)));
        out.push_str(value.trim_start_matches("0x"));
    }
    out
}
