//! Scripted `ModelBackend` for tests. Records every call with its (virtual) timestamp.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{GenerationRequest, LlmError, ModelBackend};

type Responder = dyn Fn(&str, &GenerationRequest) -> Result<String, LlmError> + Send + Sync;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub at: Instant,
}

pub struct ScriptedBackend {
    responder: Box<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
    pending_failures: Mutex<HashMap<String, u32>>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &GenerationRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            pending_failures: Mutex::new(HashMap::new()),
        }
    }

    /// The next `count` calls to `model` fail with a 503 before the responder is consulted.
    pub fn fail_first(&self, model: &str, count: u32) {
        self.pending_failures
            .lock()
            .unwrap()
            .insert(model.to_string(), count);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    pub fn call_count(&self, model: &str) -> usize {
        self.calls().iter().filter(|c| c.model == model).count()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: request.parts.join("\n"),
            at: Instant::now(),
        });

        {
            let mut pending = self.pending_failures.lock().unwrap();
            if let Some(remaining) = pending.get_mut(model) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(api_error(503));
                }
            }
        }

        (self.responder)(model, request)
    }
}

pub fn api_error(status: u16) -> LlmError {
    LlmError::Api {
        status,
        message: format!("scripted failure ({status})"),
    }
}
