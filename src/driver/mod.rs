//! Completion driver
//!
//! A `Driver` owns one conversation and the adapter bound to it. `run_once`
//! performs a single round trip; `run_until_completion` keeps asking the model
//! to continue while it reports truncation, then optionally compacts the
//! continuation turns back into one assistant message.

pub mod compact;

use std::str::FromStr;

use tracing::{debug, info, instrument, warn};

use crate::error::{ColloquyError, ConfigurationError, Result};
use crate::native::{
    Completion, ContentItem, Conversation, FinishReason, Message, ModelParams, Role,
};
use crate::provider::{VendorAdapter, VendorClients};
use crate::registry::{self, Vendor};

pub use compact::compact;

/// User turn sent after a truncated completion
pub const DEFAULT_CONTINUATION_PROMPT: &str =
    "Continue. Do not add any prefix fillers that you are continuing. Continue from wherever you left off.";

/// How `Driver::run` drives the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Single,
    UntilCompletion,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Single => "single",
            RunMode::UntilCompletion => "until_completion",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(RunMode::Single),
            "until_completion" => Ok(RunMode::UntilCompletion),
            other => Err(ConfigurationError::InvalidParameter {
                name: "mode".to_string(),
                reason: format!("expected \"single\" or \"until_completion\", got {:?}", other),
            }),
        }
    }
}

/// Options for `Driver::run`
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Replaces `DEFAULT_CONTINUATION_PROMPT` when set
    pub continuation_prompt: Option<Vec<ContentItem>>,
    /// Collapse continuation turns once an until-completion run finishes
    pub compact_on_completion: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            continuation_prompt: None,
            compact_on_completion: true,
        }
    }
}

impl RunOptions {
    pub fn with_continuation_prompt(mut self, prompt: Vec<ContentItem>) -> Self {
        self.continuation_prompt = Some(prompt);
        self
    }

    pub fn without_compaction(mut self) -> Self {
        self.compact_on_completion = false;
        self
    }
}

/// Conversation plus the adapter that advances it
pub struct Driver {
    adapter: Box<dyn VendorAdapter>,
    conversation: Conversation,
    stateful: bool,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("vendor", &self.adapter.vendor())
            .field("model", &self.adapter.model())
            .field("messages", &self.conversation.len())
            .field("stateful", &self.stateful)
            .finish()
    }
}

impl Driver {
    /// Resolve `vendor`/`model` through the registry and bind a conversation
    ///
    /// `None` starts from an empty conversation.
    pub fn construct(
        vendor: &str,
        model: &str,
        params: ModelParams,
        conversation: Option<Conversation>,
        stateful: bool,
        clients: &VendorClients,
    ) -> Result<Self> {
        let adapter = registry::resolve(vendor, model, params, clients)?;
        Ok(Self::with_adapter(
            adapter,
            conversation.unwrap_or_default(),
            stateful,
        ))
    }

    pub fn with_adapter(
        adapter: Box<dyn VendorAdapter>,
        conversation: Conversation,
        stateful: bool,
    ) -> Self {
        Self {
            adapter,
            conversation,
            stateful,
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.adapter.vendor()
    }

    pub fn model(&self) -> &str {
        self.adapter.model()
    }

    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_conversation(self) -> Conversation {
        self.conversation
    }

    /// Drop every message after the first `len`
    ///
    /// Used to back out a user turn whose run failed.
    pub fn rewind(&mut self, len: usize) {
        self.conversation.truncate(len);
    }

    /// Append a user turn without calling the vendor
    pub fn add_user_message(&mut self, content: Vec<ContentItem>) -> Result<()> {
        self.conversation.push_user(content)
    }

    pub fn latest_assistant_text(&self) -> Option<String> {
        self.conversation.latest_assistant_text()
    }

    pub fn assistant_texts(&self) -> Vec<String> {
        self.conversation.assistant_texts()
    }

    /// Run in the given mode and return the produced text
    pub async fn run(&mut self, mode: RunMode, options: RunOptions) -> Result<String> {
        match mode {
            RunMode::Single => self.run_once().await,
            RunMode::UntilCompletion => {
                let prompt = options
                    .continuation_prompt
                    .unwrap_or_else(|| vec![ContentItem::text(DEFAULT_CONTINUATION_PROMPT)]);
                let text = self.run_until_completion(Some(prompt.clone())).await?;
                if options.compact_on_completion {
                    compact(&mut self.conversation, &text, &prompt)?;
                }
                Ok(text)
            }
        }
    }

    /// One round trip; the conversation only changes after it fully succeeds
    #[instrument(skip(self), fields(vendor = %self.adapter.vendor(), model = %self.adapter.model()))]
    pub async fn run_once(&mut self) -> Result<String> {
        Ok(self.step().await?.text)
    }

    async fn step(&mut self) -> Result<Completion> {
        let completion = self.adapter.complete(&self.conversation).await?;
        debug!(
            finish_reason = %completion.finish_reason,
            chars = completion.text.len(),
            "Completion received"
        );

        if self.stateful {
            self.conversation.push(completion.to_message())?;
        }
        Ok(completion)
    }

    /// Keep calling while the model reports truncation
    ///
    /// Returns the concatenated text of every call. Requires a stateful driver,
    /// since each continuation builds on the previous reply.
    #[instrument(skip(self, continuation_prompt), fields(vendor = %self.adapter.vendor(), model = %self.adapter.model()))]
    pub async fn run_until_completion(
        &mut self,
        continuation_prompt: Option<Vec<ContentItem>>,
    ) -> Result<String> {
        if !self.stateful {
            return Err(ColloquyError::Precondition(
                "run_until_completion requires a stateful driver".to_string(),
            ));
        }

        let prompt =
            continuation_prompt.unwrap_or_else(|| vec![ContentItem::text(DEFAULT_CONTINUATION_PROMPT)]);
        if prompt.is_empty() {
            return Err(ColloquyError::Precondition(
                "continuation prompt must not be empty".to_string(),
            ));
        }

        let mut full_text = String::new();
        let mut calls = 0u32;

        loop {
            calls += 1;
            let checkpoint = self.conversation.len();
            let completion = self.step().await?;
            full_text.push_str(&completion.text);

            if completion.finish_reason.is_failure() {
                // Failed stops leave no assistant turn behind
                self.conversation.truncate(checkpoint);
            }

            match completion.finish_reason {
                FinishReason::Complete => {
                    info!(calls, "Generation complete");
                    return Ok(full_text);
                }
                FinishReason::Truncated => {
                    debug!(calls, "Output truncated, requesting continuation");
                    self.conversation.push(Message::user(prompt.clone()))?;
                }
                FinishReason::ContentFiltered => {
                    return Err(ColloquyError::ContentPolicyViolation);
                }
                FinishReason::ToolCallRequested => {
                    return Err(ColloquyError::UnsupportedCapability(
                        "model requested a tool call".to_string(),
                    ));
                }
                FinishReason::Empty => return Err(ColloquyError::EmptyGeneration),
                FinishReason::Unknown => {
                    warn!(calls, "Unknown finish reason, returning accumulated text");
                    return Ok(full_text);
                }
            }
        }
    }

    /// Ask a single question with an explicit system prompt
    ///
    /// An empty conversation is seeded with `[system, user]`. A stateful driver
    /// appends the user turn and requires the previous turn to be the
    /// assistant's; a stateless one starts over from `[system, user]`.
    pub async fn predict(
        &mut self,
        system_prompt: &str,
        user_content: Vec<ContentItem>,
    ) -> Result<String> {
        if self.conversation.is_empty() || !self.stateful {
            self.conversation = Conversation::from_messages(vec![
                Message::system(system_prompt),
                Message::user(user_content),
            ])?;
        } else if let Some(last) = self
            .conversation
            .last()
            .filter(|m| m.role() != Role::Assistant)
        {
            return Err(ColloquyError::Precondition(format!(
                "expected the last message to be from the assistant, found {}",
                last.role()
            )));
        } else {
            self.conversation.push_user(user_content)?;
        }

        self.run_once().await
    }
}
