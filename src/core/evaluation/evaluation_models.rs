use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::search::SearchResponse;

/// A canned question with the phrases a good answer should contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub query: String,
    /// Points the answer should cover (completeness).
    pub expected: Vec<String>,
    /// Facts the answer should state (accuracy).
    pub expected_content: Vec<String>,
}

impl TestCase {
    fn new(name: &str, query: &str, expected: &[&str], expected_content: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            expected_content: expected_content.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Cases matching the bundled test documents.
pub fn builtin_cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "Project Timeline Query",
            "What are the key milestones in Q2?",
            &["April 15", "May 1", "May 15", "June 1", "June 30"],
            &["MVP development", "beta testing", "marketing campaign", "v1.0", "1000 users"],
        ),
        TestCase::new(
            "Budget Analysis Query",
            "How is the budget allocated across different phases?",
            &["development", "testing", "marketing", "launch"],
            &["budget", "allocation", "phases"],
        ),
        TestCase::new(
            "Team Structure Query",
            "Who are the key members of the project team?",
            &["CEO", "CTO", "COO", "Lead Engineer"],
            &["John Smith", "Sarah Johnson", "Michael Chen", "Alex Rodriguez"],
        ),
        TestCase::new(
            "Marketing Strategy Query",
            "What are the main marketing channels and targets for 2024?",
            &["social media", "content marketing", "email marketing", "industry events"],
            &["LinkedIn", "Twitter", "Blog", "Whitepapers"],
        ),
        TestCase::new(
            "Risk Assessment Query",
            "What are the main risks identified in the project plan?",
            &["integration", "performance", "security", "market"],
            &["legacy systems", "scale", "vulnerabilities", "competitor"],
        ),
    ]
}

/// Grades from 0 to 5 per criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub sources: f64,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub name: String,
    pub query: String,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<SearchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub total_tests: usize,
    pub completed_tests: usize,
    pub failed_tests: usize,
    pub average_score: f64,
    pub average_response_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub timestamp: DateTime<Utc>,
    pub test_cases: Vec<TestCaseResult>,
    pub summary: EvaluationSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
