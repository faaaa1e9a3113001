use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::panel::PanelView;
use crate::core::evaluation::EvaluationReport;
use crate::core::search::Source;

const NO_PREVIEW: &str = "No preview available";

/// Human-readable byte count: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_modified(time: DateTime<Utc>, tz: Tz) -> String {
    time.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

pub fn render_view(view: &PanelView<'_>, tz: Tz) -> String {
    let mut out = String::new();
    out.push_str(view.summary);
    out.push('\n');

    for source in view.sources {
        out.push('\n');
        render_source(&mut out, source, tz);
    }

    if !view.relevant_snippets.is_empty() {
        out.push_str("\nRelevant content:\n");
        for snippet in view.relevant_snippets {
            out.push_str(&format!("\n  From {} ({})\n", snippet.source, snippet.context));
            for line in snippet.content.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }

    if view.page_count > 1 {
        out.push_str(&format!("\nPage {} of {}\n", view.page, view.page_count));
    }
    out
}

fn render_source(out: &mut String, source: &Source, tz: Tz) {
    out.push_str(&format!("* {} [{}]\n", source.name, source.file_type));
    out.push_str(&format!("  {}\n", source.link));

    if let Some(details) = &source.details {
        let mut meta = vec![details.label.clone()];
        if let Some(size) = details.size {
            meta.push(format_file_size(size));
        }
        if let Some(modified) = details.modified_time {
            meta.push(format!("modified {}", format_modified(modified, tz)));
        }
        meta.push(format!("owner {}", details.owner));
        out.push_str(&format!("  {}\n", meta.join(" | ")));

        // Only file lists carry details; citations in an answer stay bare.
        out.push_str("  ");
        out.push_str(source.snippet.as_deref().unwrap_or(NO_PREVIEW));
        out.push('\n');
    }
}

pub fn render_report(report: &EvaluationReport, saved_to: &str) -> String {
    let mut out = String::new();
    for case in &report.test_cases {
        let status = match &case.error {
            None => "ok".to_string(),
            Some(error) => format!("failed: {}", error),
        };
        out.push_str(&format!(
            "{:<28} {:>6} ms  {}\n",
            case.name, case.response_time_ms, status
        ));
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\n{} of {} completed, {} failed\n",
        summary.completed_tests, summary.total_tests, summary.failed_tests
    ));
    out.push_str(&format!("Average score: {:.2} / 5\n", summary.average_score));
    out.push_str(&format!(
        "Average response time: {:.0} ms\n",
        summary.average_response_time_ms
    ));
    out.push_str(&format!("Results saved to {}\n", saved_to));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluation::{EvaluationSummary, TestCaseResult, TestStatus};
    use crate::core::search::{FileDetails, RelevantSnippet};
    use chrono::TimeZone;

    fn listed(snippet: Option<&str>) -> Source {
        Source {
            name: "Roadmap".to_string(),
            file_type: "documents".to_string(),
            link: "https://docs.google.com/document/d/r1/edit".to_string(),
            snippet: snippet.map(str::to_string),
            details: Some(FileDetails {
                label: "Google Doc".to_string(),
                size: Some(1536),
                modified_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
                owner: "Ada".to_string(),
            }),
        }
    }

    fn view<'a>(sources: &'a [Source], snippets: &'a [RelevantSnippet]) -> PanelView<'a> {
        PanelView {
            kind: "file_list",
            summary: "Found 1 relevant document(s):",
            page: 1,
            page_count: 1,
            sources,
            relevant_snippets: snippets,
        }
    }

    #[test]
    fn file_sizes_use_binary_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(format_file_size(4096 * 1024 * 1024 * 1024), "4096.0 GB");
    }

    #[test]
    fn modified_time_is_shown_in_the_display_zone() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_modified(time, Tz::UTC), "2024-03-01 12:00 UTC");
        assert_eq!(
            format_modified(time, chrono_tz::Europe::Berlin),
            "2024-03-01 13:00 CET"
        );
    }

    #[test]
    fn listed_source_shows_metadata_and_snippet() {
        let sources = [listed(Some("...the Q3 roadmap..."))];
        let text = render_view(&view(&sources, &[]), Tz::UTC);

        assert!(text.starts_with("Found 1 relevant document(s):"));
        assert!(text.contains("* Roadmap [documents]"));
        assert!(text.contains("Google Doc | 1.5 KB | modified 2024-03-01 12:00 UTC | owner Ada"));
        assert!(text.contains("...the Q3 roadmap..."));
        assert!(!text.contains("Page "));
    }

    #[test]
    fn missing_snippet_shows_placeholder() {
        let sources = [listed(None)];
        let text = render_view(&view(&sources, &[]), Tz::UTC);
        assert!(text.contains(NO_PREVIEW));
    }

    #[test]
    fn answer_lists_relevant_content() {
        let sources = [Source {
            details: None,
            ..listed(None)
        }];
        let snippets = [RelevantSnippet {
            content: "Budget is split\nacross phases".to_string(),
            source: "Roadmap".to_string(),
            context: "documents".to_string(),
            link: sources[0].link.clone(),
        }];
        let mut view = view(&sources, &snippets);
        view.kind = "answer";
        view.summary = "The budget is split across phases.";
        view.page_count = 2;

        let text = render_view(&view, Tz::UTC);
        assert!(!text.contains(NO_PREVIEW));
        assert!(text.contains("Relevant content:"));
        assert!(text.contains("  From Roadmap (documents)\n    Budget is split\n    across phases"));
        assert!(text.ends_with("Page 1 of 2\n"));
    }

    #[test]
    fn report_lists_cases_and_summary() {
        let report = EvaluationReport {
            timestamp: Utc::now(),
            test_cases: vec![TestCaseResult {
                name: "Budget".to_string(),
                query: "What is the budget?".to_string(),
                status: TestStatus::Failed,
                response: None,
                evaluation: None,
                error: Some("timeout".to_string()),
                response_time_ms: 40,
            }],
            summary: EvaluationSummary {
                total_tests: 1,
                completed_tests: 0,
                failed_tests: 1,
                average_score: 0.0,
                average_response_time_ms: 40.0,
            },
        };

        let text = render_report(&report, "results/x.json");
        assert!(text.contains("Budget"));
        assert!(text.contains("failed: timeout"));
        assert!(text.contains("0 of 1 completed, 1 failed"));
        assert!(text.ends_with("Results saved to results/x.json\n"));
    }
}
