//! Markdown report persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tools::{parse_input, Tool};

/// Result of a markdown write. Filesystem failures are data, not errors;
/// nothing raises past this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MarkdownInput {
    content: String,
    filename: String,
    #[serde(default)]
    directory: Option<String>,
}

/// Writes review reports as UTF-8 markdown files
#[derive(Debug, Clone, Default)]
pub struct MarkdownFileTool {
    default_dir: Option<String>,
}

impl MarkdownFileTool {
    pub fn new(default_dir: Option<String>) -> Self {
        Self { default_dir }
    }

    fn resolve_dir(&self, directory: Option<String>) -> PathBuf {
        directory
            .or_else(|| self.default_dir.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            })
    }
}

/// Write `content` to `<directory>/<filename>`, creating the directory if
/// needed and enforcing a single `.md` suffix. Overwrites any existing file.
pub fn write_markdown(content: &str, filename: &str, directory: &Path) -> WriteReport {
    if !directory.exists() {
        if let Err(e) = std::fs::create_dir_all(directory) {
            return WriteReport {
                success: false,
                file_path: None,
                error: Some(e.to_string()),
                message: format!("Failed to create directory {}", directory.display()),
            };
        }
    }

    let filename = if filename.ends_with(".md") {
        filename.to_string()
    } else {
        format!("{filename}.md")
    };
    let path = directory.join(filename);

    match std::fs::write(&path, content) {
        Ok(()) => WriteReport {
            success: true,
            file_path: Some(path.to_string_lossy().into_owned()),
            error: None,
            message: format!("Markdown file written successfully to {}", path.display()),
        },
        Err(e) => WriteReport {
            success: false,
            file_path: None,
            error: Some(e.to_string()),
            message: format!("Failed to write markdown file to {}", path.display()),
        },
    }
}

#[async_trait]
impl Tool for MarkdownFileTool {
    fn name(&self) -> &'static str {
        "write_markdown_file"
    }

    fn description(&self) -> &'static str {
        "Writes content to a markdown file, creating the target directory if needed"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The markdown content to write"
                },
                "filename": {
                    "type": "string",
                    "description": "The filename for the markdown file"
                },
                "directory": {
                    "type": "string",
                    "description": "The directory to write the file to (defaults to the current directory)"
                }
            },
            "required": ["content", "filename"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: MarkdownInput = parse_input(self.name(), input)?;
        let directory = self.resolve_dir(input.directory);
        let report = write_markdown(&input.content, &input.filename, &directory);
        if report.success {
            tracing::debug!(path = ?report.file_path, "markdown report written");
        }
        Ok(serde_json::to_value(report)?)
    }
}
