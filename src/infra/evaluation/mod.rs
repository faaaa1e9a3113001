pub mod json_report_store;

pub use json_report_store::{load_test_cases, JsonReportStore};
