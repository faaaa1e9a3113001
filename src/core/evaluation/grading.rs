use super::evaluation_models::{Evaluation, EvaluationSummary, TestCase, TestCaseResult, TestStatus};
use crate::core::search::SearchResponse;

const MAX_GRADE: f64 = 5.0;

const ACCURACY_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const CLARITY_WEIGHT: f64 = 0.2;
const SOURCES_WEIGHT: f64 = 0.1;

/// Grades a response against a test case.
pub fn evaluate_response(response: &SearchResponse, case: &TestCase) -> Evaluation {
    let mut evaluation = Evaluation::default();
    let summary = response.summary().to_lowercase();

    if summary.is_empty() {
        evaluation.notes.push("Empty summary".to_string());
    } else {
        evaluation.accuracy = coverage(&summary, &case.expected_content) * MAX_GRADE;
        evaluation.completeness = coverage(&summary, &case.expected) * MAX_GRADE;

        let has_structure = summary.contains('\n') || summary.contains('•') || summary.contains('-');
        let has_formatting = summary.contains(':') || summary.contains('(') || summary.contains(')');
        evaluation.clarity = match (has_structure, has_formatting) {
            (true, true) => 5.0,
            (true, false) | (false, true) => 3.0,
            (false, false) => 2.0,
        };
    }

    let sources = response.sources();
    if sources.is_empty() {
        evaluation.notes.push("No sources provided".to_string());
    } else {
        let multiple = sources.len() >= 2;
        let detailed = sources
            .iter()
            .any(|s| !s.name.is_empty() && !s.file_type.is_empty() && !s.link.is_empty());
        evaluation.sources = match (multiple, detailed) {
            (true, true) => 5.0,
            (true, false) | (false, true) => 3.0,
            (false, false) => 2.0,
        };
    }

    evaluation
}

/// Fraction of `phrases` found in the lowercased `summary`.
fn coverage(summary: &str, phrases: &[String]) -> f64 {
    if phrases.is_empty() {
        return 0.0;
    }
    let found = phrases
        .iter()
        .filter(|p| summary.contains(&p.to_lowercase()))
        .count();
    found as f64 / phrases.len() as f64
}

pub fn weighted_score(evaluation: &Evaluation) -> f64 {
    evaluation.accuracy * ACCURACY_WEIGHT
        + evaluation.completeness * COMPLETENESS_WEIGHT
        + evaluation.clarity * CLARITY_WEIGHT
        + evaluation.sources * SOURCES_WEIGHT
}

/// Averages are taken over completed cases only.
pub fn summarize(results: &[TestCaseResult]) -> EvaluationSummary {
    let completed: Vec<&TestCaseResult> = results
        .iter()
        .filter(|r| r.status == TestStatus::Completed)
        .collect();

    let mut summary = EvaluationSummary {
        total_tests: results.len(),
        completed_tests: completed.len(),
        failed_tests: results.len() - completed.len(),
        ..EvaluationSummary::default()
    };

    if !completed.is_empty() {
        let n = completed.len() as f64;
        summary.average_score = completed
            .iter()
            .filter_map(|r| r.evaluation.as_ref())
            .map(weighted_score)
            .sum::<f64>()
            / n;
        summary.average_response_time_ms =
            completed.iter().map(|r| r.response_time_ms as f64).sum::<f64>() / n;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::Source;

    fn case() -> TestCase {
        TestCase {
            name: "Budget".to_string(),
            query: "How is the budget allocated?".to_string(),
            expected: vec!["development".into(), "testing".into(), "marketing".into(), "launch".into()],
            expected_content: vec!["budget".into(), "allocation".into()],
        }
    }

    fn source(name: &str) -> Source {
        Source {
            name: name.to_string(),
            file_type: "documents".to_string(),
            link: format!("https://drive.google.com/file/d/{}/view", name),
            snippet: None,
            details: None,
        }
    }

    fn answer(summary: &str, sources: Vec<Source>) -> SearchResponse {
        SearchResponse::Answer {
            summary: summary.to_string(),
            sources,
            relevant_snippets: Vec::new(),
        }
    }

    #[test]
    fn grades_coverage_structure_and_sources() {
        let response = answer(
            "Budget allocation:\n- Development 40%\n- Testing 20%",
            vec![source("plan"), source("budget")],
        );
        let evaluation = evaluate_response(&response, &case());

        assert_eq!(evaluation.accuracy, 5.0);
        assert_eq!(evaluation.completeness, 2.5);
        assert_eq!(evaluation.clarity, 5.0);
        assert_eq!(evaluation.sources, 5.0);
        assert!(evaluation.notes.is_empty());
        assert!((weighted_score(&evaluation) - (2.0 + 0.75 + 1.0 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn plain_answer_with_one_source() {
        let response = answer("the budget is fine", vec![source("plan")]);
        let evaluation = evaluate_response(&response, &case());

        assert_eq!(evaluation.accuracy, 2.5);
        assert_eq!(evaluation.completeness, 0.0);
        assert_eq!(evaluation.clarity, 2.0);
        assert_eq!(evaluation.sources, 3.0);
    }

    #[test]
    fn missing_sources_are_noted() {
        let evaluation = evaluate_response(&answer("no data (sorry)", Vec::new()), &case());
        assert_eq!(evaluation.sources, 0.0);
        assert_eq!(evaluation.clarity, 3.0);
        assert_eq!(evaluation.notes, vec!["No sources provided"]);
    }

    #[test]
    fn summary_averages_only_completed_cases() {
        let result = |status, time, evaluation: Option<Evaluation>| TestCaseResult {
            name: "n".to_string(),
            query: "q".to_string(),
            status,
            response: None,
            evaluation,
            error: None,
            response_time_ms: time,
        };
        let full = Evaluation {
            accuracy: 5.0,
            completeness: 5.0,
            clarity: 5.0,
            sources: 5.0,
            notes: Vec::new(),
        };
        let results = vec![
            result(TestStatus::Completed, 100, Some(full)),
            result(TestStatus::Completed, 300, Some(Evaluation::default())),
            result(TestStatus::Failed, 5000, None),
        ];

        let summary = summarize(&results);
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.completed_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert!((summary.average_score - 2.5).abs() < 1e-9);
        assert!((summary.average_response_time_ms - 200.0).abs() < 1e-9);
    }

    #[test]
    fn empty_run_has_zero_averages() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.average_score, 0.0);
    }
}
