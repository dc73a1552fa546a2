//! Tool registry and dispatch
//!
//! A tool is a named, schema-validated operation the model may request.
//! The registry matches requests against declarations, validates raw input
//! before any handler runs, and converts every handler fault into a
//! [`ToolOutcome`] the model can see. Dispatch never panics and never
//! propagates a handler error to the orchestration loop.

pub mod code_quality;
pub mod commit;
pub mod file_read;
pub mod git_changes;
pub mod markdown;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::ReviewConfig;
use crate::error::{CoreError, Result};

pub use code_quality::CodeQualityTool;
pub use commit::{CommitMessage, CommitMessageTool, CommitType};
pub use file_read::FileReadTool;
pub use git_changes::{FileDiff, GitChangesTool};
pub use markdown::MarkdownFileTool;

/// Declaration advertised to the model for one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// Object schema for the tool input, in the wire format the model expects
    pub parameters: Value,
}

/// Result of dispatching one tool call
///
/// Failures are data: they are appended to the conversation so the model can
/// react, never raised into the session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    pub tool: String,
    pub success: bool,
    pub payload: Value,
}

impl ToolOutcome {
    /// Successful invocation with its output payload
    pub fn success(tool: impl Into<String>, payload: Value) -> Self {
        Self {
            tool: tool.into(),
            success: true,
            payload,
        }
    }

    /// Failed invocation; the error becomes a structured payload
    pub fn failure(tool: impl Into<String>, error: &CoreError) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            payload: json!({
                "kind": error.kind(),
                "error": error.to_string(),
            }),
        }
    }
}

/// A single operation the model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within one registry
    fn name(&self) -> &'static str;

    /// Natural-language description shown to the model
    fn description(&self) -> &'static str;

    /// Input schema advertised to the model
    fn parameters(&self) -> Value;

    /// Validate and execute. Implementations parse their typed input first;
    /// nothing observable happens on a validation failure.
    async fn execute(&self, input: Value) -> Result<Value>;
}

/// Registry of the tools available to one session
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the five built-in review tools
    pub fn standard(config: &ReviewConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GitChangesTool::new(config.exclude.clone())));
        registry.register(Arc::new(CommitMessageTool));
        registry.register(Arc::new(MarkdownFileTool::new(config.report_dir.clone())));
        registry.register(Arc::new(FileReadTool));
        registry.register(Arc::new(CodeQualityTool));
        registry
    }

    /// Register a tool. A duplicate name replaces the earlier registration.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            tracing::warn!(tool = tool.name(), "replacing existing tool registration");
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Declarations for all registered tools, in registration order
    pub fn declarations(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate and run one requested tool call
    ///
    /// Unknown names and malformed input are rejected before any handler
    /// runs; handler faults are caught here. The returned outcome is always
    /// safe to append to the conversation.
    pub async fn dispatch(&self, name: &str, input: Value) -> ToolOutcome {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            tracing::warn!(tool = name, "model requested an unregistered tool");
            return ToolOutcome::failure(name, &CoreError::UnknownTool(name.to_string()));
        };

        tracing::debug!(tool = name, "dispatching tool call");
        match tool.execute(input).await {
            Ok(payload) => ToolOutcome::success(name, payload),
            Err(error) => {
                tracing::warn!(tool = name, %error, "tool call failed");
                ToolOutcome::failure(name, &error)
            }
        }
    }
}

/// Deserialize raw model input into a tool's typed input
///
/// The serde error message carries the field-level violation and is reported
/// back to the model verbatim.
pub(crate) fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| CoreError::Validation {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewConfig;

    #[tokio::test]
    async fn test_unknown_tool_is_a_validation_failure() {
        let registry = ToolRegistry::standard(&ReviewConfig::default());
        let outcome = registry.dispatch("no_such_tool", json!({})).await;

        assert!(!outcome.success);
        assert_eq!(outcome.payload["kind"], "validation");
        assert_eq!(outcome.tool, "no_such_tool");
    }

    #[tokio::test]
    async fn test_malformed_input_never_reaches_the_handler() {
        let registry = ToolRegistry::standard(&ReviewConfig::default());
        let outcome = registry
            .dispatch("generate_commit_message", json!({ "type": "fix" }))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.payload["kind"], "validation");
        let message = outcome.payload["error"].as_str().unwrap();
        assert!(message.contains("changes"), "field missing from: {message}");
    }

    #[tokio::test]
    async fn test_handler_fault_is_wrapped_as_execution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::standard(&ReviewConfig::default());
        let outcome = registry
            .dispatch(
                "get_file_changes",
                json!({ "rootDir": dir.path().to_string_lossy() }),
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.payload["kind"], "execution");
    }

    #[tokio::test]
    async fn test_successful_dispatch_carries_the_payload() {
        let registry = ToolRegistry::standard(&ReviewConfig::default());
        let outcome = registry
            .dispatch(
                "analyze_code_quality",
                json!({ "codeContent": "export function f() {}\n" }),
            )
            .await;

        assert!(outcome.success);
        assert!(outcome.payload.get("overallScore").is_some());
    }

    #[test]
    fn test_standard_registry_declarations() {
        let registry = ToolRegistry::standard(&ReviewConfig::default());
        let names: Vec<String> = registry
            .declarations()
            .iter()
            .map(|spec| spec.name.clone())
            .collect();

        assert_eq!(
            names,
            vec![
                "get_file_changes",
                "generate_commit_message",
                "write_markdown_file",
                "read_file",
                "analyze_code_quality",
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FileReadTool));
        registry.register(Arc::new(FileReadTool));
        assert_eq!(registry.len(), 1);
    }
}
