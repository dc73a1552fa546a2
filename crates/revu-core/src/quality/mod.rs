//! Code quality scoring - deterministic multi-dimensional reports
//!
//! This module converts raw source text into a [`QualityReport`]: line
//! metrics, structural and security flags, four dimension scores in `[1, 10]`,
//! ordered improvement suggestions, and a coarse letter grade.

pub mod analyzer;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use analyzer::{analyze, DEFAULT_LANGUAGE};

/// Full quality report for one piece of source text
///
/// Derived entirely from the input; identical input always yields an
/// identical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Mean of the four dimension scores, rounded to one decimal
    pub overall_score: f64,
    pub breakdown: QualityBreakdown,
    pub metrics: CodeMetrics,
    pub structure: StructureFlags,
    pub security: SecurityFlags,
    /// Improvement suggestions in a fixed trigger order
    pub suggestions: Vec<String>,
    pub grade: Grade,
}

/// Score per quality dimension, each in `[1, 10]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityBreakdown {
    pub readability: f64,
    pub maintainability: f64,
    pub security: f64,
    pub performance: f64,
}

/// Raw line counts and ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub non_empty_lines: usize,
    pub comment_lines: usize,
    /// Share of comment lines, percent
    pub comment_ratio: f64,
    /// Share of blank lines, percent
    pub empty_line_ratio: f64,
}

/// Substring-presence tests for common source constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureFlags {
    pub has_imports: bool,
    pub has_exports: bool,
    pub has_functions: bool,
    pub has_classes: bool,
    pub has_interfaces: bool,
    pub has_types: bool,
}

/// Substring-presence tests for risky patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFlags {
    pub has_console_log: bool,
    pub has_eval: bool,
    #[serde(rename = "hasInnerHTML")]
    pub has_inner_html: bool,
}

/// Coarse letter bucket derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Bucket boundaries are exact on the unrounded overall score:
    /// `>= 8` is A, `>= 6` is B, `>= 4` is C, anything below is D.
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 8.0 {
            Grade::A
        } else if overall >= 6.0 {
            Grade::B
        } else if overall >= 4.0 {
            Grade::C
        } else {
            Grade::D
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        write!(f, "{letter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries_are_exact() {
        assert_eq!(Grade::from_overall(8.0), Grade::A);
        assert_eq!(Grade::from_overall(7.9999), Grade::B);
        assert_eq!(Grade::from_overall(6.0), Grade::B);
        assert_eq!(Grade::from_overall(5.9999), Grade::C);
        assert_eq!(Grade::from_overall(4.0), Grade::C);
        assert_eq!(Grade::from_overall(3.9999), Grade::D);
    }

    #[test]
    fn test_report_serializes_with_wire_names() {
        let report = analyze("export function f() {}\n", DEFAULT_LANGUAGE);
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("overallScore").is_some());
        assert!(json["metrics"].get("commentRatio").is_some());
        assert!(json["security"].get("hasInnerHTML").is_some());
        assert!(json["structure"].get("hasExports").is_some());
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(Grade::B.to_string(), "B");
    }
}
