//! File reading with error capture

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::tools::{parse_input, Tool};

/// Result of a file read. Missing files and permission errors are data the
/// model can react to, not session faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReport {
    pub success: bool,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FileReadInput {
    file_path: String,
}

/// Read a file as UTF-8, capturing any filesystem error
pub fn read_file(file_path: &str) -> ReadReport {
    match std::fs::read_to_string(file_path) {
        Ok(content) => ReadReport {
            success: true,
            file_path: file_path.to_string(),
            content: Some(content),
            error: None,
        },
        Err(e) => ReadReport {
            success: false,
            file_path: file_path.to_string(),
            content: None,
            error: Some(e.to_string()),
        },
    }
}

/// Reads source files so the model can see context a diff does not show
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Reads a file as UTF-8 text"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path of the file to read"
                }
            },
            "required": ["filePath"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: FileReadInput = parse_input(self.name(), input)?;
        Ok(serde_json::to_value(read_file(&input.file_path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello").unwrap();

        let report = read_file(&path.to_string_lossy());
        assert!(report.success);
        assert_eq!(report.content.as_deref(), Some("hello"));
    }

    #[test]
    fn test_missing_file_is_reported_not_raised() {
        let report = read_file("/definitely/not/here.txt");
        assert!(!report.success);
        assert!(report.error.is_some());
        assert!(report.content.is_none());
    }

    #[tokio::test]
    async fn test_tool_payload_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.ts");
        std::fs::write(&path, "export const a = 1;").unwrap();

        let value = FileReadTool
            .execute(json!({ "filePath": path.to_string_lossy() }))
            .await
            .unwrap();

        assert_eq!(value["success"], true);
        assert!(value["content"].as_str().unwrap().contains("export"));
    }
}
