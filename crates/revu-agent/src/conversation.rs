//! Append-only conversation log
//!
//! The conversation is the only state shared between the model and the tool
//! dispatch path. Both sides append; prior entries are never mutated. The
//! full sequence is resent to the model on every turn.

use revu_core::tools::ToolOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a conversation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Model,
    ToolResult,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    pub input: Value,
}

/// Payload of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepContent {
    Text(String),
    ToolCall(ToolCallRequest),
    ToolResult(ToolOutcome),
}

/// One entry in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationStep {
    pub role: Role,
    pub content: StepContent,
}

/// Ordered, append-only sequence of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    steps: Vec<ConversationStep>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation seeded with system instructions and the task prompt
    pub fn seeded(system_prompt: &str, user_prompt: &str) -> Self {
        let mut conversation = Self::new();
        conversation.push_system(system_prompt);
        conversation.push_user(user_prompt);
        conversation
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.steps.push(ConversationStep {
            role: Role::System,
            content: StepContent::Text(text.into()),
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.steps.push(ConversationStep {
            role: Role::User,
            content: StepContent::Text(text.into()),
        });
    }

    pub fn push_model_text(&mut self, text: impl Into<String>) {
        self.steps.push(ConversationStep {
            role: Role::Model,
            content: StepContent::Text(text.into()),
        });
    }

    pub fn push_tool_call(&mut self, request: ToolCallRequest) {
        self.steps.push(ConversationStep {
            role: Role::Model,
            content: StepContent::ToolCall(request),
        });
    }

    pub fn push_tool_result(&mut self, outcome: ToolOutcome) {
        self.steps.push(ConversationStep {
            role: Role::ToolResult,
            content: StepContent::ToolResult(outcome),
        });
    }

    /// The full ordered log
    pub fn steps(&self) -> &[ConversationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seeded_conversation_order() {
        let conversation = Conversation::seeded("be thorough", "review this");

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.steps()[0].role, Role::System);
        assert_eq!(conversation.steps()[1].role, Role::User);
    }

    #[test]
    fn test_steps_are_appended_in_order() {
        let mut conversation = Conversation::seeded("sys", "user");
        conversation.push_model_text("looking at the diff");
        conversation.push_tool_call(ToolCallRequest {
            name: "get_file_changes".to_string(),
            input: json!({ "rootDir": "." }),
        });
        conversation.push_tool_result(ToolOutcome::success(
            "get_file_changes",
            json!([]),
        ));

        let roles: Vec<Role> = conversation.steps().iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Model,
                Role::Model,
                Role::ToolResult
            ]
        );
    }

    #[test]
    fn test_log_survives_serialization() {
        let mut conversation = Conversation::seeded("sys", "user");
        conversation.push_model_text("done");

        let json = serde_json::to_string(&conversation).unwrap();
        let restored: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 3);
    }
}
