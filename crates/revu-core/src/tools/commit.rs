//! Conventional commit message synthesis

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::tools::{parse_input, Tool};

/// Short descriptions longer than this are truncated
const SHORT_LIMIT: usize = 50;

/// Characters kept before the ellipsis when truncating
const TRUNCATED_LEN: usize = 47;

/// Conventional commit categories understood by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
}

impl CommitType {
    /// Human-readable label with its emoji prefix
    pub fn label(self) -> &'static str {
        match self {
            CommitType::Feat => "✨ New feature",
            CommitType::Fix => "🐛 Bug fix",
            CommitType::Docs => "📚 Documentation",
            CommitType::Style => "💄 Code style",
            CommitType::Refactor => "♻️ Code refactoring",
            CommitType::Test => "🧪 Testing",
            CommitType::Chore => "🔧 Maintenance",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "feat" => Ok(CommitType::Feat),
            "fix" => Ok(CommitType::Fix),
            "docs" => Ok(CommitType::Docs),
            "style" => Ok(CommitType::Style),
            "refactor" => Ok(CommitType::Refactor),
            "test" => Ok(CommitType::Test),
            "chore" => Ok(CommitType::Chore),
            other => Err(CoreError::Validation {
                tool: "generate_commit_message".to_string(),
                message: format!("unknown commit type '{other}'"),
            }),
        }
    }
}

/// A generated commit message. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMessage {
    /// Short form, suitable for a subject line
    pub message: String,
    /// Short form plus the full description and a generation timestamp
    pub full_message: String,
    #[serde(rename = "type")]
    pub commit_type: CommitType,
    /// The original change description
    pub changes: String,
}

/// Build a commit message from a change description
///
/// Pure apart from the generation timestamp embedded in `full_message`.
pub fn generate(changes: &str, commit_type: CommitType) -> CommitMessage {
    let short = if changes.chars().count() > SHORT_LIMIT {
        let head: String = changes.chars().take(TRUNCATED_LEN).collect();
        format!("{head}...")
    } else {
        changes.to_string()
    };

    let label = commit_type.label();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    CommitMessage {
        message: format!("{label} {commit_type}: {short}"),
        full_message: format!("{label} {commit_type}: {changes}\n\nGenerated on: {timestamp}"),
        commit_type,
        changes: changes.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CommitMessageInput {
    changes: String,
    #[serde(rename = "type")]
    commit_type: CommitType,
}

/// Drafts a conventional commit message for the reviewed changes
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitMessageTool;

#[async_trait]
impl Tool for CommitMessageTool {
    fn name(&self) -> &'static str {
        "generate_commit_message"
    }

    fn description(&self) -> &'static str {
        "Generates a conventional commit message based on a description of the changes"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "changes": {
                    "type": "string",
                    "description": "Description of the changes made"
                },
                "type": {
                    "type": "string",
                    "enum": ["feat", "fix", "docs", "style", "refactor", "test", "chore"],
                    "description": "Type of commit"
                }
            },
            "required": ["changes", "type"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: CommitMessageInput = parse_input(self.name(), input)?;
        let message = generate(&input.changes, input.commit_type);
        Ok(serde_json::to_value(message)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_description_is_kept_verbatim() {
        let message = generate("tidy up imports", CommitType::Chore);
        assert_eq!(message.message, "🔧 Maintenance chore: tidy up imports");
        assert!(!message.message.ends_with("..."));
    }

    #[test]
    fn test_long_description_is_truncated_with_ellipsis() {
        let changes = "x".repeat(80);
        let message = generate(&changes, CommitType::Fix);

        assert!(message.message.ends_with("..."));
        let prefix = format!("{} {}: ", CommitType::Fix.label(), CommitType::Fix);
        let body_chars = message.message.chars().count() - prefix.chars().count();
        assert_eq!(body_chars, SHORT_LIMIT);
        // The full form never truncates.
        assert!(message.full_message.contains(&changes));
    }

    #[test]
    fn test_boundary_length_is_not_truncated() {
        let changes = "y".repeat(SHORT_LIMIT);
        let message = generate(&changes, CommitType::Feat);
        assert!(!message.message.ends_with("..."));
    }

    #[test]
    fn test_full_message_carries_a_timestamp() {
        let message = generate("add streaming output", CommitType::Feat);
        assert!(message.full_message.contains("Generated on: "));
        assert!(message.full_message.starts_with("✨ New feature feat: "));
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(generate("doc pass", CommitType::Docs)).unwrap();
        assert_eq!(value["type"], "docs");
        assert!(value.get("fullMessage").is_some());
    }

    #[test]
    fn test_commit_type_parsing() {
        assert_eq!("refactor".parse::<CommitType>().unwrap(), CommitType::Refactor);
        assert!("banana".parse::<CommitType>().is_err());
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected_by_the_schema() {
        let err = CommitMessageTool
            .execute(json!({ "changes": "x", "type": "banana" }))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
