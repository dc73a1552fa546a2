//! Code quality analysis tool
//!
//! Thin schema boundary over [`crate::quality::analyze`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::quality::{analyze, DEFAULT_LANGUAGE};
use crate::tools::{parse_input, Tool};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct QualityInput {
    code_content: String,
    #[serde(default)]
    language: Option<String>,
}

/// Scores source text with the deterministic quality heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeQualityTool;

#[async_trait]
impl Tool for CodeQualityTool {
    fn name(&self) -> &'static str {
        "analyze_code_quality"
    }

    fn description(&self) -> &'static str {
        "Scores source code on readability, maintainability, security and performance"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "codeContent": {
                    "type": "string",
                    "description": "The source code to analyze"
                },
                "language": {
                    "type": "string",
                    "description": "Source language (defaults to typescript)"
                }
            },
            "required": ["codeContent"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: QualityInput = parse_input(self.name(), input)?;
        let language = input.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        let report = analyze(&input.code_content, language);
        Ok(serde_json::to_value(report)?)
    }
}
