//! Threshold classifications over CGPA and attendance.

use serde::Serialize;

use crate::models::StudentProfile;

pub const ATTENDANCE_MINIMUM: f64 = 75.0;
pub const INTERNSHIP_MIN_CGPA: f64 = 6.0;

pub fn is_attendance_eligible(percentage: f64) -> bool {
    percentage >= ATTENDANCE_MINIMUM
}

pub fn is_internship_eligible(cgpa: f64) -> bool {
    cgpa >= INTERNSHIP_MIN_CGPA
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStanding {
    Excellent,
    Good,
    AtRisk,
}

impl AttendanceStanding {
    pub fn of(percentage: f64) -> Self {
        if percentage >= 85.0 {
            AttendanceStanding::Excellent
        } else if is_attendance_eligible(percentage) {
            AttendanceStanding::Good
        } else {
            AttendanceStanding::AtRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStanding::Excellent => "Excellent",
            AttendanceStanding::Good => "Good",
            AttendanceStanding::AtRisk => "At Risk",
        }
    }
}

/// Steadiness of the weekly attendance log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Consistency {
    High,
    Medium,
    Low,
}

impl Consistency {
    pub fn of(percentage: f64) -> Self {
        if percentage >= 85.0 {
            Consistency::High
        } else if percentage >= 70.0 {
            Consistency::Medium
        } else {
            Consistency::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Consistency::High => "High",
            Consistency::Medium => "Medium",
            Consistency::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GradeBand {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl GradeBand {
    pub const ALL: [GradeBand; 4] = [
        GradeBand::Excellent,
        GradeBand::Good,
        GradeBand::Average,
        GradeBand::NeedsImprovement,
    ];

    pub fn of(cgpa: f64) -> Self {
        if cgpa >= 8.0 {
            GradeBand::Excellent
        } else if cgpa >= 7.0 {
            GradeBand::Good
        } else if cgpa >= 6.0 {
            GradeBand::Average
        } else {
            GradeBand::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeBand::Excellent => "Excellent",
            GradeBand::Good => "Good",
            GradeBand::Average => "Average",
            GradeBand::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn range_label(self) -> &'static str {
        match self {
            GradeBand::Excellent => "Excellent (>=8.0)",
            GradeBand::Good => "Good (7.0-7.9)",
            GradeBand::Average => "Average (6.0-6.9)",
            GradeBand::NeedsImprovement => "Below Avg (<6.0)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenteeStatus {
    Active,
    AtRisk,
}

impl MenteeStatus {
    pub fn of(student: &StudentProfile) -> Self {
        if is_attendance_eligible(student.attendance) {
            MenteeStatus::Active
        } else {
            MenteeStatus::AtRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenteeStatus::Active => "Active",
            MenteeStatus::AtRisk => "At Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SupportPlan {
    IntensiveSupport,
    AttendanceFocus,
    MaintainProgress,
}

impl SupportPlan {
    /// Grades outrank attendance when both are weak.
    pub fn of(student: &StudentProfile) -> Self {
        if student.cgpa < INTERNSHIP_MIN_CGPA {
            SupportPlan::IntensiveSupport
        } else if !is_attendance_eligible(student.attendance) {
            SupportPlan::AttendanceFocus
        } else {
            SupportPlan::MaintainProgress
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SupportPlan::IntensiveSupport => "Intensive Support",
            SupportPlan::AttendanceFocus => "Attendance Focus",
            SupportPlan::MaintainProgress => "Maintain Progress",
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            SupportPlan::IntensiveSupport => "Schedule Meeting",
            SupportPlan::AttendanceFocus => "Follow Up",
            SupportPlan::MaintainProgress => "Encourage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::models::StudentId;

    #[test]
    fn eligibility_is_a_plain_threshold() {
        assert!(is_attendance_eligible(75.0));
        assert!(!is_attendance_eligible(74.99));
        assert!(!is_attendance_eligible(f64::NAN));
    }

    #[test]
    fn standings_follow_expected_tiers() {
        assert_eq!(AttendanceStanding::of(92.0), AttendanceStanding::Excellent);
        assert_eq!(AttendanceStanding::of(78.0), AttendanceStanding::Good);
        assert_eq!(AttendanceStanding::of(65.0), AttendanceStanding::AtRisk);
        assert_eq!(Consistency::of(84.0), Consistency::Medium);
        assert_eq!(Consistency::of(69.9), Consistency::Low);
    }

    #[test]
    fn grade_bands_cover_seeded_roster() {
        assert_eq!(GradeBand::of(7.5894), GradeBand::Good);
        assert_eq!(GradeBand::of(6.3717), GradeBand::Average);
        assert_eq!(GradeBand::of(4.1262), GradeBand::NeedsImprovement);
        assert_eq!(GradeBand::of(8.0).label(), "Excellent");
    }

    #[test]
    fn seeded_status_matches_attendance_rule() {
        let directory = Directory::seeded();
        let status = |id: &str| {
            MenteeStatus::of(directory.student(&StudentId::new(id)).expect("seeded student"))
        };
        assert_eq!(status("205631"), MenteeStatus::Active);
        assert_eq!(status("201788"), MenteeStatus::AtRisk);
        assert_eq!(status("216037"), MenteeStatus::AtRisk);
    }

    #[test]
    fn support_plan_prefers_grades() {
        let directory = Directory::seeded();
        let ahmed = directory.student(&StudentId::new("201788")).expect("seeded student");
        assert_eq!(SupportPlan::of(ahmed), SupportPlan::IntensiveSupport);
        assert_eq!(SupportPlan::of(ahmed).action(), "Schedule Meeting");

        let mut raj = directory.student(&StudentId::new("206206")).expect("seeded student").clone();
        assert_eq!(SupportPlan::of(&raj), SupportPlan::MaintainProgress);
        raj.attendance = 70.0;
        assert_eq!(SupportPlan::of(&raj), SupportPlan::AttendanceFocus);
    }
}
