#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use speakease_backend::{
    message::Message,
    services::completion::{CompletionClient, CompletionError},
    state::AppState,
};

/// One recorded call: the system prompt and the history it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub system_prompt: String,
    pub history: Vec<Message>,
}

type Responder = dyn Fn(&Call) -> Result<String, CompletionError> + Send + Sync;

/// Records every call and answers through a closure, optionally after a delay
/// chosen per call.
pub struct ScriptedCompletion {
    calls: Mutex<Vec<Call>>,
    respond: Box<Responder>,
    delay: Box<dyn Fn(&Call) -> Duration + Send + Sync>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    pub fn failing() -> Arc<Self> {
        Self::with(|_| {
            Err(CompletionError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            })
        })
    }

    pub fn with<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&Call) -> Result<String, CompletionError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: Box::new(|_| Duration::ZERO),
        })
    }

    pub fn with_delay<F, D>(respond: F, delay: D) -> Arc<Self>
    where
        F: Fn(&Call) -> Result<String, CompletionError> + Send + Sync + 'static,
        D: Fn(&Call) -> Duration + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: Box::new(delay),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<String, CompletionError> {
        let call = Call {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
        };
        self.calls.lock().unwrap().push(call.clone());
        let delay = (self.delay)(&call);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(&call)
    }
}

pub fn state_with(client: Arc<ScriptedCompletion>) -> Arc<AppState> {
    Arc::new(AppState::new(client))
}
