pub mod evaluation_models;
pub mod evaluation_runner;
pub mod grading;

pub use evaluation_models::{
    builtin_cases, Evaluation, EvaluationError, EvaluationReport, EvaluationSummary, TestCase,
    TestCaseResult, TestStatus,
};
pub use evaluation_runner::{AnswerSource, EvaluationRunner, ReportStore};
pub use grading::{evaluate_response, summarize, weighted_score};
