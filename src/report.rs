use std::fmt::Write;

use chrono::NaiveDate;

use crate::academics::SupportPlan;
use crate::analytics;
use crate::fees::{rupees, FeeOversight};
use crate::models::{MentorProfile, StudentProfile};

/// Markdown roster report for one mentor's mentees.
pub fn build_report(
    mentor: &MentorProfile,
    mentees: &[&StudentProfile],
    oversight: &FeeOversight,
    generated_on: NaiveDate,
) -> String {
    let summary = analytics::summarize(mentees);
    let insights = analytics::insights(mentees);

    let mut output = String::new();

    let _ = writeln!(output, "# Mentor Roster Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}, {}) on {}",
        mentor.name, mentor.id, mentor.department, generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Mentees");

    if insights.is_empty() {
        let _ = writeln!(output, "No mentees assigned.");
    } else {
        let _ = writeln!(output, "| ID | Name | CGPA | Attendance | Status |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for insight in insights.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {:.2} | {}% | {} |",
                insight.student_id,
                insight.name,
                insight.cgpa,
                insight.attendance,
                insight.status.label()
            );
        }
        let _ = writeln!(
            output,
            "Active: {}, at risk: {}, average CGPA {:.2}, average attendance {}%",
            summary.active, summary.at_risk, summary.average_cgpa, summary.average_attendance
        );
    }

    let totals = oversight.totals();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Fee Oversight");
    let _ = writeln!(output, "- Total fees: {}", rupees(totals.total_fees));
    let _ = writeln!(output, "- Collected: {}", rupees(totals.total_paid));
    let _ = writeln!(output, "- Outstanding: {}", rupees(totals.total_remaining));
    let _ = writeln!(
        output,
        "- Paid: {}, partially paid: {}, pending: {}",
        totals.paid_count, totals.partial_count, totals.pending_count
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Mix");
    for (band, count) in analytics::grade_mix(mentees) {
        let _ = writeln!(output, "- {}: {}", band.range_label(), count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Support Plans");

    let flagged: Vec<_> = insights
        .iter()
        .filter(|i| i.plan != SupportPlan::MaintainProgress)
        .collect();
    if flagged.is_empty() {
        let _ = writeln!(output, "Every mentee is on track.");
    } else {
        for insight in flagged {
            let _ = writeln!(
                output,
                "- {}: {} ({})",
                insight.name,
                insight.plan.label(),
                insight.plan.action()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::models::MentorId;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).expect("date")
    }

    #[test]
    fn report_covers_every_section() {
        let directory = Directory::seeded();
        let id = MentorId::new("M001");
        let mentor = directory.mentor(&id).expect("mentor");
        let mentees = directory.mentees_of(&id);
        let report = build_report(mentor, &mentees, &FeeOversight::for_mentor(&directory, &id), day());

        assert!(report.starts_with("# Mentor Roster Report\nGenerated for Dr. Rajesh Kumar (M001, CIVIL) on 2025-11-03"));
        assert!(report.contains("| 201788 | Ahmed Hassan | 5.15 | 72% | At Risk |"), "{report}");
        assert!(report.contains("- Total fees: ₹90,000"));
        assert!(report.contains("- Outstanding: ₹15,000"));
        assert!(report.contains("- Paid: 1, partially paid: 1, pending: 0"));
        assert!(report.contains("- Good (7.0-7.9): 1"));
        assert!(report.contains("- Ahmed Hassan: Intensive Support (Schedule Meeting)"));
    }

    #[test]
    fn empty_roster_still_renders() {
        let directory = Directory::seeded();
        let mentor = directory.mentor(&MentorId::new("M002")).expect("mentor");
        let report = build_report(mentor, &[], &FeeOversight::new(Vec::new()), day());

        assert!(report.contains("No mentees assigned."));
        assert!(report.contains("- Total fees: ₹0"));
        assert!(report.contains("Every mentee is on track."));
    }
}
