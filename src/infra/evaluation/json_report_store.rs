use crate::core::evaluation::{EvaluationError, EvaluationReport, ReportStore, TestCase};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes each run to `<dir>/test_results_<timestamp>.json`.
pub struct JsonReportStore {
    dir: PathBuf,
}

impl JsonReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn report_path(&self, report: &EvaluationReport) -> PathBuf {
        // Colons and dots are not welcome in file names everywhere.
        let stamp = report
            .timestamp
            .format("%Y-%m-%dT%H-%M-%S-%3fZ")
            .to_string();
        self.dir.join(format!("test_results_{}.json", stamp))
    }
}

#[async_trait]
impl ReportStore for JsonReportStore {
    async fn save(&self, report: &EvaluationReport) -> Result<String, EvaluationError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.report_path(report);
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, report)?;
        Ok(path.display().to_string())
    }
}

/// Reads a JSON array of test cases.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, EvaluationError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluation::{builtin_cases, EvaluationSummary};
    use chrono::{TimeZone, Utc};

    fn report() -> EvaluationReport {
        EvaluationReport {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap(),
            test_cases: Vec::new(),
            summary: EvaluationSummary {
                total_tests: 2,
                completed_tests: 1,
                failed_tests: 1,
                average_score: 3.5,
                average_response_time_ms: 120.0,
            },
        }
    }

    #[tokio::test]
    async fn saves_pretty_json_into_a_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let results_dir = dir.path().join("results");
        let store = JsonReportStore::new(&results_dir);

        let saved = store.save(&report()).await.unwrap();

        let expected = results_dir.join("test_results_2024-05-01T09-30-15-000Z.json");
        assert_eq!(saved, expected.display().to_string());
        let text = std::fs::read_to_string(&expected).unwrap();
        assert!(text.contains("\n  \"summary\""));
        let back: EvaluationReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report());
    }

    #[test]
    fn loads_cases_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, serde_json::to_string(&builtin_cases()).unwrap()).unwrap();

        let cases = load_test_cases(&path).unwrap();
        assert_eq!(cases, builtin_cases());
    }

    #[test]
    fn malformed_case_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, "[{\"name\": 1}]").unwrap();

        assert!(matches!(
            load_test_cases(&path),
            Err(EvaluationError::Serialization(_))
        ));
        assert!(matches!(
            load_test_cases(&dir.path().join("missing.json")),
            Err(EvaluationError::Io(_))
        ));
    }
}
