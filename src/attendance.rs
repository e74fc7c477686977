use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;

use crate::academics::{is_attendance_eligible, Consistency};
use crate::error::{required, DashboardError, DashboardResult};
use crate::models::AttendanceWeek;

/// A student's week-by-week attendance record.
#[derive(Debug, Clone)]
pub struct AttendanceLog {
    weeks: Vec<AttendanceWeek>,
}

impl AttendanceLog {
    pub fn new(weeks: Vec<AttendanceWeek>) -> Self {
        Self { weeks }
    }

    pub fn weeks(&self) -> &[AttendanceWeek] {
        &self.weeks
    }

    pub fn attended(&self) -> u32 {
        self.weeks.iter().map(|w| w.attended).sum()
    }

    pub fn total(&self) -> u32 {
        self.weeks.iter().map(|w| w.total).sum()
    }

    pub fn overall_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.attended() as f64 / total as f64 * 100.0
    }

    pub fn consistency(&self) -> Consistency {
        Consistency::of(self.overall_percentage())
    }

    pub fn is_eligible(&self) -> bool {
        is_attendance_eligible(self.overall_percentage())
    }

    pub fn add_week(&mut self, attended: &str, total: &str) -> DashboardResult<&AttendanceWeek> {
        let attended = parse_count("classes attended", required("classes attended", attended)?)?;
        let total = parse_count("total classes", required("total classes", total)?)?;
        self.push_week(attended, total)
    }

    fn push_week(&mut self, attended: u32, total: u32) -> DashboardResult<&AttendanceWeek> {
        if total == 0 {
            return Err(DashboardError::invalid("total classes", "must be at least 1"));
        }
        if attended > total {
            return Err(DashboardError::invalid(
                "classes attended",
                format!("{attended} is more than the {total} classes held"),
            ));
        }

        let week = AttendanceWeek {
            label: format!("Week {}", self.weeks.len() + 1),
            attended,
            total,
        };
        self.weeks.push(week);
        Ok(&self.weeks[self.weeks.len() - 1])
    }
}

fn parse_count(field: &'static str, value: &str) -> DashboardResult<u32> {
    value
        .parse()
        .map_err(|_| DashboardError::invalid(field, format!("'{value}' is not a whole number")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Appends weeks from a `week,attended,total` CSV. Each row goes through
/// `add_week`, so rows that fail the form checks are skipped and counted.
/// The `week` column only names the row in warnings; imported weeks are
/// labelled `Week N+1` like any other added week.
pub fn import_csv(log: &mut AttendanceLog, csv_path: &Path) -> anyhow::Result<ImportSummary> {
    #[derive(Deserialize)]
    struct CsvRow {
        week: Option<String>,
        attended: Option<String>,
        total: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut summary = ImportSummary {
        inserted: 0,
        skipped: 0,
    };

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed row {} in {}", line + 2, csv_path.display()))?;
        let label = row.week.unwrap_or_else(|| format!("row {}", line + 2));

        let attended = row.attended.unwrap_or_default();
        let total = row.total.unwrap_or_default();
        match log.add_week(&attended, &total) {
            Ok(_) => summary.inserted += 1,
            Err(err) => {
                warn!("skipping {label}: {err}");
                summary.skipped += 1;
            }
        }
    }

    info!(
        "imported {} attendance weeks from {} ({} skipped)",
        summary.inserted,
        csv_path.display(),
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn seeded_log_percentage() {
        let log = AttendanceLog::new(seed::attendance_weeks());
        assert_eq!((log.attended(), log.total()), (21, 25));
        assert!((log.overall_percentage() - 84.0).abs() < 1e-9);
        assert_eq!(log.consistency(), Consistency::Medium);
        assert!(log.is_eligible());
    }

    #[test]
    fn added_weeks_are_labelled_in_sequence() {
        let mut log = AttendanceLog::new(seed::attendance_weeks());
        let week = log.add_week("5", "5").expect("add week");
        assert_eq!(week.label, "Week 6");
        assert_eq!(week.percentage(), 100);
    }

    #[test]
    fn form_checks_presence_and_range() {
        let mut log = AttendanceLog::new(Vec::new());
        assert_eq!(
            log.add_week("", "5").expect_err("blank"),
            DashboardError::MissingField("classes attended")
        );
        assert!(log.add_week("6", "5").is_err());
        assert!(log.add_week("0", "0").is_err());
        assert!(log.weeks().is_empty());
        assert_eq!(log.overall_percentage(), 0.0);
    }

    #[test]
    fn csv_import_skips_invalid_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("attendance.csv");
        std::fs::write(&path, "week,attended,total\nWeek 6,4,5\nWeek 7,6,5\n,2,4\n").expect("write csv");

        let mut log = AttendanceLog::new(seed::attendance_weeks());
        let summary = import_csv(&mut log, &path).expect("import");
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 1 });
        assert_eq!(log.weeks().len(), 7);
        assert_eq!(log.weeks()[6].label, "Week 7");
    }

    #[test]
    fn csv_import_skips_blank_and_non_numeric_cells() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("attendance.csv");
        std::fs::write(&path, "week,attended,total\nWeek 6,4,5\nWeek 7,,5\nWeek 8,four,5\nWeek 9,3,4\n")
            .expect("write csv");

        let mut log = AttendanceLog::new(seed::attendance_weeks());
        let summary = import_csv(&mut log, &path).expect("import");
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 2 });
        assert_eq!(log.weeks().len(), 7);
        assert_eq!((log.weeks()[6].attended, log.weeks()[6].total), (3, 4));
    }
}
