//! Scripted in-memory completion service.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use wf_domain::error::{Error, Result};
use wf_domain::stream::{BoxStream, StreamEvent};
use wf_providers::{ChatRequest, ChatResponse, LlmProvider};

pub const DEFAULT_MODEL: &str = "scripted-model";

/// One canned reply, consumed per call in script order.
pub enum Reply {
    /// Whole text. Streamed as a single fragment.
    Text(String),
    /// Streamed fragment by fragment; `chat` returns them joined.
    Fragments(Vec<String>),
    /// Raw stream items, for in-band errors and missing `Done`.
    Events(Vec<Result<StreamEvent>>),
    /// The call itself fails.
    Fail(Error),
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn fragments(parts: &[&str]) -> Self {
        Self::Fragments(parts.iter().map(|p| p.to_string()).collect())
    }

    /// Fragments followed by a transport error on the open stream.
    pub fn broken(parts: &[&str], error: &str) -> Self {
        let mut events: Vec<Result<StreamEvent>> = parts.iter().map(|p| Ok(token(p))).collect();
        events.push(Err(Error::Http(error.to_string())));
        Self::Events(events)
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub streaming: bool,
    pub request: ChatRequest,
}

pub struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    recorded: Mutex<Vec<Recorded>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            recorded: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    fn take(&self, req: &ChatRequest, streaming: bool) -> Result<Reply> {
        self.recorded.lock().unwrap().push(Recorded {
            streaming,
            request: req.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Other("script exhausted".into()))
    }
}

pub fn token(text: &str) -> StreamEvent {
    StreamEvent::Token {
        text: text.to_string(),
    }
}

pub fn done() -> StreamEvent {
    StreamEvent::Done {
        usage: None,
        finish_reason: Some("stop".into()),
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let content = match self.take(req, false)? {
            Reply::Text(t) => t,
            Reply::Fragments(parts) => parts.concat(),
            Reply::Events(_) => return Err(Error::Http("connection reset".into())),
            Reply::Fail(e) => return Err(e),
        };
        Ok(ChatResponse {
            content,
            usage: None,
            model: req.model.clone().unwrap_or_else(|| DEFAULT_MODEL.into()),
            finish_reason: Some("stop".into()),
        })
    }

    async fn chat_stream(
        &self,
        req: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let events: Vec<Result<StreamEvent>> = match self.take(req, true)? {
            Reply::Text(t) => vec![Ok(token(&t)), Ok(done())],
            Reply::Fragments(parts) => parts
                .iter()
                .map(|p| Ok(token(p)))
                .chain(std::iter::once(Ok(done())))
                .collect(),
            Reply::Events(events) => events,
            Reply::Fail(e) => return Err(e),
        };
        Ok(Box::pin(futures_util::stream::iter(events)))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }
}
