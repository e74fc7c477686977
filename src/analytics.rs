use serde::Serialize;

use crate::academics::{AttendanceStanding, GradeBand, MenteeStatus, SupportPlan};
use crate::models::{StudentId, StudentProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub mentees: usize,
    pub active: usize,
    pub at_risk: usize,
    /// Rounded to two decimals; zero for an empty roster.
    pub average_cgpa: f64,
    /// Rounded to a whole percent; zero for an empty roster.
    pub average_attendance: f64,
    pub mid_band: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenteeInsight {
    pub student_id: StudentId,
    pub name: String,
    pub cgpa: f64,
    pub attendance: f64,
    pub status: MenteeStatus,
    pub performance: GradeBand,
    pub attendance_level: AttendanceStanding,
    pub plan: SupportPlan,
}

pub fn summarize(students: &[&StudentProfile]) -> CohortSummary {
    let count = students.len();
    let at_risk = students
        .iter()
        .filter(|s| MenteeStatus::of(s) == MenteeStatus::AtRisk)
        .count();
    let (average_cgpa, average_attendance) = if count == 0 {
        (0.0, 0.0)
    } else {
        let cgpa: f64 = students.iter().map(|s| s.cgpa).sum::<f64>() / count as f64;
        let attendance: f64 = students.iter().map(|s| s.attendance).sum::<f64>() / count as f64;
        ((cgpa * 100.0).round() / 100.0, attendance.round())
    };

    CohortSummary {
        mentees: count,
        active: count - at_risk,
        at_risk,
        average_cgpa,
        average_attendance,
        mid_band: students
            .iter()
            .filter(|s| s.cgpa >= 6.0 && s.cgpa < 8.0)
            .count(),
    }
}

/// Mentee counts per grade band, in band order, empty bands included.
pub fn grade_mix(students: &[&StudentProfile]) -> Vec<(GradeBand, usize)> {
    GradeBand::ALL
        .iter()
        .map(|band| {
            let count = students
                .iter()
                .filter(|s| GradeBand::of(s.cgpa) == *band)
                .count();
            (*band, count)
        })
        .collect()
}

pub fn insights(students: &[&StudentProfile]) -> Vec<MenteeInsight> {
    students
        .iter()
        .map(|s| MenteeInsight {
            student_id: s.id.clone(),
            name: s.name.clone(),
            cgpa: s.cgpa,
            attendance: s.attendance,
            status: MenteeStatus::of(s),
            performance: GradeBand::of(s.cgpa),
            attendance_level: AttendanceStanding::of(s.attendance),
            plan: SupportPlan::of(s),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::models::MentorId;

    #[test]
    fn summary_for_two_mentees() {
        let directory = Directory::seeded();
        let mentees = directory.mentees_of(&MentorId::new("M001"));
        let summary = summarize(&mentees);

        assert_eq!((summary.mentees, summary.active, summary.at_risk), (2, 1, 1));
        assert_eq!(summary.average_cgpa, 6.37);
        assert_eq!(summary.average_attendance, 79.0);
        assert_eq!(summary.mid_band, 1);
    }

    #[test]
    fn empty_roster_averages_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.average_cgpa, 0.0);
        assert_eq!(summary.average_attendance, 0.0);
        assert!(grade_mix(&[]).iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn grade_mix_and_plans_cover_everyone() {
        let directory = Directory::seeded();
        let everyone: Vec<&StudentProfile> = directory.students().collect();
        let mix = grade_mix(&everyone);
        assert_eq!(
            mix,
            vec![
                (GradeBand::Excellent, 0),
                (GradeBand::Good, 1),
                (GradeBand::Average, 2),
                (GradeBand::NeedsImprovement, 2),
            ]
        );

        let plans: Vec<SupportPlan> = insights(&everyone).iter().map(|i| i.plan).collect();
        assert_eq!(
            plans.iter().filter(|p| **p == SupportPlan::IntensiveSupport).count(),
            2
        );
    }
}
