//! Version-control diff retrieval

use async_trait::async_trait;
use git2::{DiffFormat, DiffOptions, Repository};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::tools::{parse_input, Tool};

/// One changed file and its unified diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub file: String,
    pub diff: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FileChangeInput {
    root_dir: String,
}

/// Enumerates uncommitted changes in a repository working tree
///
/// The diff baseline is HEAD (index included), so both staged and unstaged
/// edits show up. File order follows the diff enumeration.
#[derive(Debug, Clone)]
pub struct GitChangesTool {
    exclude: Vec<String>,
}

impl GitChangesTool {
    pub fn new(exclude: Vec<String>) -> Self {
        Self { exclude }
    }

    fn excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|entry| {
            path == entry
                || path.starts_with(&format!("{entry}/"))
                || Path::new(path)
                    .file_name()
                    .map(|name| name == entry.as_str())
                    .unwrap_or(false)
        })
    }

    fn collect_diffs(&self, root_dir: &str) -> Result<Vec<FileDiff>> {
        let repo = Repository::open(root_dir).map_err(|e| CoreError::Execution {
            tool: self.name().to_string(),
            message: format!("failed to open repository at '{root_dir}': {}", e.message()),
        })?;

        // Unborn HEAD (no commit yet) diffs against the empty tree.
        let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());

        let mut opts = DiffOptions::new();
        let diff = repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
            .map_err(|e| CoreError::Execution {
                tool: self.name().to_string(),
                message: format!("failed to diff working tree: {}", e.message()),
            })?;

        let mut diffs: Vec<FileDiff> = Vec::new();
        diff.print(DiffFormat::Patch, |delta, _hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            if path.is_empty() || self.excluded(&path) {
                return true;
            }

            if diffs.last().map(|d| d.file != path).unwrap_or(true) {
                diffs.push(FileDiff {
                    file: path,
                    diff: String::new(),
                });
            }
            if let Some(entry) = diffs.last_mut() {
                if matches!(line.origin(), '+' | '-' | ' ') {
                    entry.diff.push(line.origin());
                }
                entry.diff.push_str(&String::from_utf8_lossy(line.content()));
            }
            true
        })
        .map_err(|e| CoreError::Execution {
            tool: self.name().to_string(),
            message: format!("failed to render diff: {}", e.message()),
        })?;

        Ok(diffs)
    }
}

#[async_trait]
impl Tool for GitChangesTool {
    fn name(&self) -> &'static str {
        "get_file_changes"
    }

    fn description(&self) -> &'static str {
        "Gets the code changes made in the given directory as per-file unified diffs"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rootDir": {
                    "type": "string",
                    "description": "The root directory of the repository to diff"
                }
            },
            "required": ["rootDir"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: FileChangeInput = parse_input(self.name(), input)?;
        if input.root_dir.trim().is_empty() {
            return Err(CoreError::Validation {
                tool: self.name().to_string(),
                message: "rootDir must be a non-empty string".to_string(),
            });
        }

        let diffs = self.collect_diffs(&input.root_dir)?;
        tracing::debug!(files = diffs.len(), "collected working tree diffs");
        Ok(serde_json::to_value(&diffs)?)
    }
}
