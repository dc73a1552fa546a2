//! Agent orchestrator - the bounded model/tool loop
//!
//! Drives a single review session: send the conversation and the tool
//! declarations to the model, forward text deltas to the caller as they
//! arrive, execute the tool calls the model requested, append the results,
//! and call the model again. The loop stops on a text-only turn or when the
//! step budget is exhausted; exhaustion is a normal outcome, not an error.
//!
//! Tool failures of any kind are recorded in the conversation and shown to
//! the model. The only fatal condition is a transport failure on the model
//! channel.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::conversation::{Conversation, ToolCallRequest};
use crate::prompts::SYSTEM_PROMPT;
use crate::provider::{ModelEvent, ModelProvider, TurnRequest};
use revu_core::{ReviewConfig, ToolRegistry};

/// States of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingModel,
    StreamingOutput,
    ExecutingTools,
    Terminated,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model answered with text only
    Completed,
    /// The step budget was reached; the last streamed content stands
    BudgetExhausted,
    /// The caller stopped listening; in-flight work was abandoned
    Cancelled,
}

/// Errors fatal to a session
///
/// Tool failures never surface here; they are recorded in the conversation
/// for the model to react to.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("stream transport failure: {0}")]
    Transport(String),
}

/// Summary returned when the loop terminates
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub termination: Termination,
    /// Tool-execution rounds run
    pub steps_executed: usize,
    /// Individual tool invocations dispatched
    pub tool_calls: usize,
    /// The full conversation log of the session
    pub conversation: Conversation,
}

/// Orchestrates one session at a time over a provider and a tool registry
pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    registry: ToolRegistry,
    config: ReviewConfig,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ModelProvider>, registry: ToolRegistry, config: ReviewConfig) -> Self {
        Self {
            provider,
            registry,
            config,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the default system instructions
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Run one bounded session
    ///
    /// Text chunks are forwarded to `output` in generation order, never
    /// buffered into a full response first. Dropping the receiver abandons
    /// the session; dropping the returned future abandons in-flight model
    /// and tool calls.
    pub async fn run(
        &self,
        user_prompt: &str,
        output: mpsc::Sender<String>,
    ) -> Result<SessionSummary, OrchestratorError> {
        let session_id = Uuid::new_v4();
        let mut conversation = Conversation::seeded(&self.system_prompt, user_prompt);
        let mut state = SessionState::AwaitingModel;
        let mut steps_executed = 0usize;
        let mut tool_calls = 0usize;

        tracing::info!(
            %session_id,
            provider = self.provider.name(),
            budget = self.config.step_budget,
            "session started"
        );

        let termination = 'session: loop {
            let request = TurnRequest {
                conversation: conversation.steps().to_vec(),
                tools: self.registry.declarations(),
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            };
            let mut events = self
                .provider
                .begin_turn(request)
                .await
                .map_err(|e| OrchestratorError::Transport(e.to_string()))?;

            let mut turn_text = String::new();
            let mut requests: Vec<ToolCallRequest> = Vec::new();
            let mut turn_complete = false;

            while let Some(event) = events.recv().await {
                match event {
                    ModelEvent::TextDelta(delta) => {
                        if state != SessionState::StreamingOutput {
                            state = transition(session_id, state, SessionState::StreamingOutput);
                        }
                        turn_text.push_str(&delta);
                        if output.send(delta).await.is_err() {
                            tracing::debug!(%session_id, "output receiver dropped");
                            break 'session Termination::Cancelled;
                        }
                    }
                    ModelEvent::ToolCall(request) => {
                        tracing::debug!(%session_id, tool = %request.name, "tool call requested");
                        requests.push(request);
                    }
                    ModelEvent::TurnComplete => {
                        turn_complete = true;
                        break;
                    }
                    ModelEvent::TransportError(message) => {
                        return Err(OrchestratorError::Transport(message));
                    }
                }
            }
            if !turn_complete {
                return Err(OrchestratorError::Transport(
                    "model stream ended without an end-of-turn marker".to_string(),
                ));
            }

            if !turn_text.is_empty() {
                conversation.push_model_text(turn_text);
            }
            for request in &requests {
                conversation.push_tool_call(request.clone());
            }

            if requests.is_empty() {
                break Termination::Completed;
            }

            // All of a turn's tools run concurrently, but their results are
            // appended in request order before the next model call.
            state = transition(session_id, state, SessionState::ExecutingTools);
            let outcomes = futures::future::join_all(
                requests
                    .iter()
                    .map(|request| self.registry.dispatch(&request.name, request.input.clone())),
            )
            .await;
            for outcome in outcomes {
                conversation.push_tool_result(outcome);
            }
            tool_calls += requests.len();
            steps_executed += 1;

            if steps_executed >= self.config.step_budget {
                tracing::info!(%session_id, steps = steps_executed, "step budget exhausted");
                break Termination::BudgetExhausted;
            }
            state = transition(session_id, state, SessionState::AwaitingModel);
        };

        transition(session_id, state, SessionState::Terminated);
        tracing::info!(
            %session_id,
            ?termination,
            steps = steps_executed,
            tool_calls,
            "session terminated"
        );

        Ok(SessionSummary {
            session_id,
            termination,
            steps_executed,
            tool_calls,
            conversation,
        })
    }
}

fn transition(session_id: Uuid, from: SessionState, to: SessionState) -> SessionState {
    tracing::debug!(%session_id, ?from, ?to, "state transition");
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;

    fn orchestrator(turns: Vec<Vec<ModelEvent>>, config: ReviewConfig) -> Orchestrator {
        Orchestrator::new(
            Arc::new(ScriptedProvider::new(turns)),
            ToolRegistry::standard(&config),
            config,
        )
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let orchestrator = orchestrator(
            vec![vec![
                ModelEvent::TextDelta("hi".to_string()),
                ModelEvent::TransportError("connection reset".to_string()),
            ]],
            ReviewConfig::default(),
        );

        let (tx, _rx) = mpsc::channel(8);
        let err = orchestrator.run("review", tx).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Transport(_)));
    }

    #[tokio::test]
    async fn test_dropped_receiver_cancels_the_session() {
        let orchestrator = orchestrator(
            vec![vec![ModelEvent::TextDelta("hello".to_string())]],
            ReviewConfig::default(),
        );

        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let summary = orchestrator.run("review", tx).await.unwrap();
        assert_eq!(summary.termination, Termination::Cancelled);
        assert_eq!(summary.steps_executed, 0);
    }
}
