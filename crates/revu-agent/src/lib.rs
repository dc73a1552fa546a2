//! Revu Agent - bounded orchestration between a generative model and tools
//!
//! The orchestrator drives a single review session: it sends the task prompt
//! and the tool declarations to the model, streams the model's text to the
//! caller as it arrives, executes the tool calls the model requests, feeds
//! the results back, and stops on a text-only answer or when the step budget
//! runs out.
//!
//! The model itself sits behind [`provider::ModelProvider`]; everything on
//! this side of that trait is deterministic and testable with the
//! [`provider::ScriptedProvider`].

pub mod conversation;
pub mod orchestrator;
pub mod prompts;
pub mod provider;

// Re-export commonly used types for convenience
pub use conversation::{Conversation, ConversationStep, Role, StepContent, ToolCallRequest};
pub use orchestrator::{
    Orchestrator, OrchestratorError, SessionState, SessionSummary, Termination,
};
pub use provider::{
    GeminiProvider, ModelEvent, ModelProvider, ProviderError, ScriptedProvider, TurnRequest,
};
