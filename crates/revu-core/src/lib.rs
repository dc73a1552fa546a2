//! Revu Core - engine for the automated code-review agent
//!
//! This crate holds everything below the orchestration loop:
//!
//! - **Tool registry** (`tools`): named, schema-validated operations the
//!   model may request. Dispatch validates input before any handler runs and
//!   converts every handler fault into data the model can reason about.
//! - **Review tools** (`tools::*`): diff retrieval, commit-message synthesis,
//!   markdown persistence, file reads, and code-quality analysis.
//! - **Quality scoring** (`quality`): the deterministic heuristic that turns
//!   raw source text into a multi-dimensional quality report.
//! - **Configuration** (`config`) and the dashboard-facing synthetic
//!   **metrics service** (`metrics`).

pub mod config;
pub mod error;
pub mod metrics;
pub mod quality;
pub mod tools;

// Re-export commonly used types for convenience
pub use config::ReviewConfig;
pub use error::{CoreError, Result};
pub use quality::{analyze, Grade, QualityReport};
pub use tools::{Tool, ToolOutcome, ToolRegistry, ToolSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
