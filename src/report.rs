use serde_json::{json, Value};

use crate::batch::SourceOutcome;

const FILE_WIDTH: usize = 24;

/// One row per source: file, max, persons holding it, seconds.
/// Failed sources get a row of their own saying why.
pub fn render_table(outcomes: &[SourceOutcome]) -> String {
    let mut out = format!(
        "{:<width$} {:>5}  {:<32} {:>9}\n",
        "file",
        "max",
        "acquaintances",
        "seconds",
        width = FILE_WIDTH
    );
    out.push_str(&format!(
        "{:<width$} {:>5}  {:<32} {:>9}\n",
        "=".repeat(15),
        "===",
        "=".repeat(15),
        "=======",
        width = FILE_WIDTH
    ));
    for outcome in outcomes {
        let row = match outcome {
            Ok(report) => format!(
                "{:<width$} {:>5}  {:<32} {:>9.4}\n",
                report.source.display().to_string(),
                report.max.count,
                format!("{:?}", report.max.persons),
                report.elapsed.as_secs_f64(),
                width = FILE_WIDTH
            ),
            Err(e) => format!(
                "{:<width$} {:>5}  {}\n",
                e.path().display().to_string(),
                "-",
                e,
                width = FILE_WIDTH
            ),
        };
        out.push_str(&row);
    }
    out
}

pub fn render_json(outcomes: &[SourceOutcome]) -> Value {
    let rows = outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(report) => json!({
                "source": report.source.display().to_string(),
                "status": "ok",
                "max": report.max.count,
                "acquaintances": report.max.persons,
                "seconds": report.elapsed.as_secs_f64(),
                "persons": report.persons,
                "stats": {
                    "records": report.stats.records,
                    "accepted": report.stats.accepted,
                    "duplicates": report.stats.duplicates,
                    "malformed": report.stats.malformed,
                    "self_calls": report.stats.self_calls,
                    "header_skipped": report.stats.header_skipped,
                },
            }),
            Err(e) => json!({
                "source": e.path().display().to_string(),
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();
    Value::Array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::SourceReport;
    use crate::ingest::SourceError;
    use crate::maximum::MaxResult;
    use crate::persons::IngestStats;
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcomes() -> Vec<SourceOutcome> {
        vec![
            Ok(SourceReport {
                source: PathBuf::from("calls.csv"),
                max: MaxResult {
                    count: 2,
                    persons: vec![2014638884, 6099241931],
                },
                stats: IngestStats {
                    records: 4,
                    accepted: 4,
                    ..Default::default()
                },
                persons: 5,
                elapsed: Duration::from_millis(2),
            }),
            Ok(SourceReport {
                source: PathBuf::from("lonely.csv"),
                max: MaxResult::default(),
                stats: IngestStats::default(),
                persons: 0,
                elapsed: Duration::ZERO,
            }),
            Err(SourceError::CapacityExceeded {
                path: PathBuf::from("huge.csv"),
                limit: 10,
            }),
        ]
    }

    #[test]
    fn table_has_a_row_per_source() {
        let table = render_table(&outcomes());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("file"));
        assert!(lines[2].starts_with("calls.csv"));
        assert!(lines[2].contains("[2014638884, 6099241931]"));
        assert!(lines[2].ends_with("0.0020"));
        assert!(lines[3].contains("[]"));
        assert!(lines[4].starts_with("huge.csv"));
        assert!(lines[4].contains("more than 10 records"));
    }

    #[test]
    fn json_separates_failures_from_empty_results() {
        let value = render_json(&outcomes());
        assert_eq!(value[0]["status"], "ok");
        assert_eq!(value[0]["acquaintances"], json!([2014638884u64, 6099241931u64]));
        assert_eq!(value[0]["stats"]["records"], 4);
        assert_eq!(value[1]["status"], "ok");
        assert_eq!(value[1]["max"], 0);
        assert_eq!(value[2]["status"], "failed");
        assert_eq!(value[2]["source"], "huge.csv");
    }
}
