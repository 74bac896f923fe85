//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hybrid_relay_gateway::providers::{
    Provider, ProviderAdapter, ProviderError, ProviderResponse,
};

/// Names of providers in the order they were called, shared across providers.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls_in_order(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// What a scripted provider does on every call.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Reply with fixed text
    Reply(&'static str),
    /// Reply with `re: <prompt>`
    Mirror,
    /// Succeed without any text
    Empty,
    /// Succeed with whitespace-only text
    Blank,
    /// Fail with an HTTP status
    ApiError(u16),
    /// Fail with an unparseable body
    Garbage,
}

pub struct ScriptedProvider {
    name: &'static str,
    behaviour: Behaviour,
    calls: AtomicUsize,
    log: CallLog,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, behaviour: Behaviour, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name,
            behaviour,
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn text_response(text: Option<String>) -> ProviderResponse {
    ProviderResponse {
        model: "scripted".to_string(),
        text,
        usage: None,
        stop_reason: None,
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn send_message(&self, content: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.name.to_string());

        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text_response(Some(text.to_string()))),
            Behaviour::Mirror => Ok(text_response(Some(format!("re: {content}")))),
            Behaviour::Empty => Ok(text_response(None)),
            Behaviour::Blank => Ok(text_response(Some("   ".to_string()))),
            Behaviour::ApiError(status) => Err(ProviderError::ApiError {
                status: *status,
                message: "scripted failure".to_string(),
            }),
            Behaviour::Garbage => Err(ProviderError::InvalidFormat(
                "scripted garbage".to_string(),
            )),
        }
    }
}

/// A provider whose single HTTP call always times out against a server
/// that accepts connections and never answers.
pub struct TimeoutProvider {
    name: &'static str,
    url: String,
    http_client: reqwest::Client,
    calls: AtomicUsize,
    log: CallLog,
}

impl TimeoutProvider {
    pub async fn new(name: &'static str, log: &CallLog) -> Arc<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        Arc::new(Self {
            name,
            url: format!("http://{addr}/v1/chat/completions"),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Call the provider directly, bypassing the adapter.
    pub async fn raw_error(&self) -> ProviderError {
        self.send_message("ping").await.unwrap_err()
    }
}

#[async_trait::async_trait]
impl Provider for TimeoutProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "slow"
    }

    async fn send_message(&self, _content: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.name.to_string());

        self.http_client.post(&self.url).send().await?;
        Err(ProviderError::InvalidFormat(
            "server unexpectedly answered".to_string(),
        ))
    }
}

pub fn ready(provider: &Arc<impl Provider + 'static>) -> ProviderAdapter {
    ProviderAdapter::ready(Arc::clone(provider) as Arc<dyn Provider>)
}
