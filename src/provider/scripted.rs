//! Scripted adapter for tests
//!
//! Plays back a queue of canned outcomes instead of calling a vendor. Clones
//! share the script and counters, so a test can keep one handle while the
//! driver owns another.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{retry_with_backoff, RetryPolicy, VendorAdapter};
use crate::error::{ColloquyError, Result};
use crate::native::{Completion, Conversation, FinishReason, ModelParams};
use crate::registry::Vendor;

enum Step {
    Reply(Completion),
    Fail(ColloquyError),
}

#[derive(Default)]
struct Script {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<Conversation>>,
    attempts: AtomicU32,
}

#[derive(Clone)]
pub struct ScriptedAdapter {
    vendor: Vendor,
    model: String,
    params: ModelParams,
    retry: RetryPolicy,
    script: Arc<Script>,
}

impl Default for ScriptedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self {
            vendor: Vendor::OpenAI,
            model: "gpt-4o".to_string(),
            params: ModelParams::default(),
            retry: RetryPolicy::without_backoff(3),
            script: Arc::new(Script::default()),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Queue a successful completion
    pub fn reply(self, text: &str, finish_reason: FinishReason) -> Self {
        self.push(Step::Reply(Completion::new(text, finish_reason)));
        self
    }

    /// Queue a failure
    pub fn fail(self, error: ColloquyError) -> Self {
        self.push(Step::Fail(error));
        self
    }

    /// Queue a retryable network failure
    pub fn transient_failure(self) -> Self {
        let vendor = self.vendor;
        self.fail(ColloquyError::TransientNetwork {
            vendor,
            message: "HTTP 503: service unavailable".to_string(),
        })
    }

    /// Network attempts made so far, retries included
    pub fn attempts(&self) -> u32 {
        self.script.attempts.load(Ordering::SeqCst)
    }

    /// Conversations passed to `translate`, one per round trip
    pub fn seen(&self) -> Vec<Conversation> {
        self.lock_seen().clone()
    }

    /// Steps not consumed yet
    pub fn remaining(&self) -> usize {
        self.lock_steps().len()
    }

    fn push(&self, step: Step) {
        self.lock_steps().push_back(step);
    }

    fn lock_steps(&self) -> std::sync::MutexGuard<'_, VecDeque<Step>> {
        self.script
            .steps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_seen(&self) -> std::sync::MutexGuard<'_, Vec<Conversation>> {
        self.script
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_step(&self) -> Result<Value> {
        self.script.attempts.fetch_add(1, Ordering::SeqCst);
        match self.lock_steps().pop_front() {
            Some(Step::Reply(completion)) => serde_json::to_value(completion)
                .map_err(|e| ColloquyError::Precondition(e.to_string())),
            Some(Step::Fail(error)) => Err(error),
            None => Err(ColloquyError::Precondition(
                "scripted adapter ran out of steps".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VendorAdapter for ScriptedAdapter {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn params(&self) -> &ModelParams {
        &self.params
    }

    fn translate(&self, conversation: &Conversation) -> Result<Value> {
        self.lock_seen().push(conversation.clone());
        serde_json::to_value(conversation).map_err(|e| ColloquyError::Parse {
            vendor: self.vendor,
            message: e.to_string(),
        })
    }

    async fn send(&self, _body: &Value) -> Result<Value> {
        retry_with_backoff(&self.retry, move || async move { self.next_step() }).await
    }

    fn parse(&self, response: Value) -> Result<Completion> {
        serde_json::from_value(response).map_err(|e| ColloquyError::Parse {
            vendor: self.vendor,
            message: e.to_string(),
        })
    }
}
