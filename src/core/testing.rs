use crate::domain::model::TokenUsage;
use crate::domain::ports::{Completion, CompletionRequest, LanguageModel};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

type Responder = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

/// In-memory model answering each request through a closure.
pub struct ScriptedModel {
    responder: Box<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.user_prompt().to_string())
            .collect()
    }

    pub fn models(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let reply = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        Ok(Completion {
            content: reply?,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        })
    }
}
