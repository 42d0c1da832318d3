//! Scripted generation clients for resolver tests.

use super::AssetResolver;
use crate::{
    error::{GenerationError, Result},
    fallback::PicsumFallback,
    models::{GenerateContentResponse, GenerationRequest, Part},
    traits::GenerationClient,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// base64 of "hello"
pub(crate) const HELLO_PNG: &str = "aGVsbG8=";
/// base64 of "world"
pub(crate) const WORLD_PNG: &str = "d29ybGQ=";

#[derive(Debug, Clone)]
pub(crate) enum Script {
    Image(&'static str),
    NoImage,
    NoCandidates,
    Fail,
    Unauthorized,
}

impl Script {
    fn into_result(self) -> Result<GenerateContentResponse> {
        match self {
            Script::Image(data) => Ok(GenerateContentResponse::with_parts(vec![
                Part::text("Here is the image you asked for."),
                Part::inline("image/png", data),
            ])),
            Script::NoImage => Ok(GenerateContentResponse::with_parts(vec![Part::text(
                "I can't draw that.",
            )])),
            Script::NoCandidates => Ok(GenerateContentResponse::default()),
            Script::Fail => Err(GenerationError::TransportError("connection reset".into())),
            Script::Unauthorized => Err(GenerationError::AuthError("401 Unauthorized".into())),
        }
    }
}

pub(crate) fn resolver_with(client: Arc<dyn GenerationClient>) -> AssetResolver {
    AssetResolver::new(client, Arc::new(PicsumFallback::default()))
}

/// Answers every call immediately with the same script.
pub(crate) struct ScriptedClient {
    script: Script,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push(request.clone());
        self.script.clone().into_result()
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Holds each call open until the test releases the gate for that prompt.
pub(crate) struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<Script>>>,
    calls: Mutex<Vec<GenerationRequest>>,
    completed: AtomicUsize,
}

impl GatedClient {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        })
    }

    /// Must be called before the request for `prompt` is issued.
    pub(crate) fn gate(&self, prompt: &str) -> oneshot::Sender<Script> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(prompt.to_string(), rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for GatedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push(request.clone());
        let gate = self.gates.lock().unwrap().remove(request.prompt());

        let script = match gate {
            Some(rx) => rx.await.unwrap_or(Script::Fail),
            None => Script::Fail,
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        script.into_result()
    }

    fn model(&self) -> &str {
        "gated"
    }
}

/// Lets spawned resolver tasks on the current-thread runtime run to completion.
pub(crate) async fn settle_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
