//! Generative-model boundary
//!
//! A provider turns one turn request into an ordered stream of events: text
//! deltas, tool-call requests, and an end-of-turn marker. The transport is
//! the only place a session can fail fatally; everything else is data.

pub mod gemini;
pub mod scripted;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::conversation::{ConversationStep, ToolCallRequest};
use revu_core::tools::ToolSpec;

pub use gemini::GeminiProvider;
pub use scripted::ScriptedProvider;

/// Buffered events per in-flight turn
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One element of a model turn, delivered in generation order
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Incremental natural-language output
    TextDelta(String),
    /// The model asked for a tool invocation
    ToolCall(ToolCallRequest),
    /// The model finished emitting events for this turn
    TurnComplete,
    /// The transport failed mid-stream; fatal to the session
    TransportError(String),
}

/// Errors raised before any event is produced
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("model endpoint rejected the request: {0}")]
    Rejected(String),
}

/// Everything the model needs for one turn
///
/// The full conversation is resent every time; no incremental context
/// protocol is assumed.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation: Vec<ConversationStep>,
    pub tools: Vec<ToolSpec>,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// A generative model capable of streaming one turn at a time
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider display name used in logs
    fn name(&self) -> &str;

    /// Start one model turn; events arrive on the returned channel in
    /// generation order, terminated by [`ModelEvent::TurnComplete`]
    async fn begin_turn(
        &self,
        request: TurnRequest,
    ) -> Result<mpsc::Receiver<ModelEvent>, ProviderError>;
}
