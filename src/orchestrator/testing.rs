//! In-memory transport for driving the orchestrator in tests

use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use super::transport::{ExchangeError, Transport};

type Responder = Box<dyn Fn(&str, &Value) -> Result<Value, ExchangeError> + Send + Sync>;

/// A request the orchestrator made
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub url: String,
    pub body: Value,
    pub at: Instant,
}

/// Answers each request with a scripted reply after an optional delay
pub(crate) struct ScriptedTransport {
    responder: Responder,
    latency: Duration,
    raw_replies: Mutex<Vec<(String, Vec<u8>)>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, ExchangeError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            latency: Duration::ZERO,
            raw_replies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every peer replies `{}`
    pub fn silent() -> Self {
        Self::new(|_, _| Ok(Value::Object(Default::default())))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Reply to `url` with these exact bytes instead of the scripted value
    pub fn with_raw_reply(self, url: &str, bytes: &[u8]) -> Self {
        self.raw_replies.lock().push((url.to_string(), bytes.to_vec()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call.url.clone()).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, ExchangeError> {
        let body: Value = serde_json::from_slice(&body).expect("orchestrator sends JSON");
        self.calls.lock().push(Call {
            url: url.to_string(),
            body: body.clone(),
            at: Instant::now(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let raw = self
            .raw_replies
            .lock()
            .iter()
            .find(|(raw_url, _)| raw_url == url)
            .map(|(_, bytes)| bytes.clone());
        if let Some(bytes) = raw {
            return Ok(bytes);
        }

        let reply = (self.responder)(url, &body)?;
        Ok(serde_json::to_vec(&reply).expect("reply encodes"))
    }
}
