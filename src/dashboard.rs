use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::academics::{AttendanceStanding, GradeBand, MenteeStatus};
use crate::analytics;
use crate::assistant::{readiness, Assistant, Speaker};
use crate::attendance::AttendanceLog;
use crate::config::Config;
use crate::directory::Directory;
use crate::error::DashboardError;
use crate::fees::{discount_percent, discount_tiers, rupees, FeeBreakdown, FeeLedger, FeeOversight};
use crate::meetings::MeetingBook;
use crate::messages::{GuidanceLog, Thread};
use crate::models::{
    display_time, ApplicationStatus, Meeting, MentorId, MentorProfile, Opportunity,
    OpportunityKind, Role, StudentId, StudentProfile,
};
use crate::notes::{Notebook, TodoFilter};
use crate::notifications::Inbox;
use crate::placements::PlacementBoard;
use crate::projects::ProjectBoard;
use crate::report;
use crate::seed;
use crate::session::Session;
use crate::settings::SettingsPanel;

/// Everything the student portal shows, seeded fresh for one session.
#[derive(Debug, Clone)]
pub struct StudentDashboard {
    pub student: StudentProfile,
    pub mentor: Option<MentorProfile>,
    pub attendance: AttendanceLog,
    pub fees: FeeLedger,
    pub notebook: Notebook,
    pub meetings: MeetingBook,
    pub thread: Thread,
    pub placements: PlacementBoard,
    pub assistant: Assistant,
    pub inbox: Inbox,
    pub settings: SettingsPanel,
    pub export_dir: PathBuf,
}

impl StudentDashboard {
    pub fn open(
        directory: &Directory,
        session: &Session,
        config: &Config,
        now: NaiveTime,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            session.role == Role::Student,
            "a {} session cannot open the student dashboard",
            session.role
        );
        let id = StudentId::new(session.id.as_str());
        let student = directory
            .student(&id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownId {
                role: Role::Student,
                id: session.id.clone(),
            })?;

        Ok(Self {
            mentor: directory.mentor_of(&id).cloned(),
            attendance: AttendanceLog::new(seed::attendance_weeks()),
            fees: FeeLedger::seeded(directory, &id, config.base_fee)?,
            notebook: Notebook::new(seed::todos()?, seed::notes()?),
            meetings: MeetingBook::new(seed::student_meetings()?),
            thread: Thread::new(seed::mentor_messages()?),
            placements: PlacementBoard::new(seed::opportunities()?),
            assistant: Assistant::new(student.clone(), config.base_fee, now),
            inbox: Inbox::new(seed::notifications()),
            settings: SettingsPanel::for_student(&student),
            export_dir: config.export_dir.clone(),
            student,
        })
    }

    pub fn overview(&self, today: NaiveDate) -> String {
        let student = &self.student;
        let summary = self.fees.summary();
        let mut output = String::new();

        let _ = writeln!(output, "Welcome back, {}!", student.first_name());
        let _ = writeln!(
            output,
            "{} ({}) - {}, year {}",
            student.name, student.id, student.department, student.year
        );
        let _ = writeln!(
            output,
            "CGPA: {:.2}/10 ({})",
            student.cgpa,
            GradeBand::of(student.cgpa).label()
        );
        let _ = writeln!(
            output,
            "Attendance: {}% ({})",
            student.attendance,
            AttendanceStanding::of(student.attendance).label()
        );
        let _ = writeln!(
            output,
            "Fees: {} ({} remaining)",
            summary.status,
            rupees(summary.remaining)
        );
        match &self.mentor {
            Some(mentor) => {
                let _ = writeln!(output, "Mentor: {}", mentor.name);
            }
            None => {
                let _ = writeln!(output, "Mentor: not assigned");
            }
        }
        let _ = writeln!(output, "Upcoming meetings: {}", self.meetings.upcoming().len());
        let _ = writeln!(
            output,
            "Pending tasks: {} ({} overdue)",
            self.notebook.todos(TodoFilter::Pending).len(),
            self.notebook.overdue(today).len()
        );
        let _ = writeln!(output, "Unread notifications: {}", self.inbox.unread_count());
        output
    }

    pub fn attendance_view(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Attendance");
        for week in self.attendance.weeks() {
            let _ = writeln!(
                output,
                "- {}: {}/{} ({}%)",
                week.label,
                week.attended,
                week.total,
                week.percentage()
            );
        }
        let _ = writeln!(
            output,
            "Overall: {}/{} classes ({:.1}%)",
            self.attendance.attended(),
            self.attendance.total(),
            self.attendance.overall_percentage()
        );
        let _ = writeln!(output, "Consistency: {}", self.attendance.consistency().label());
        let _ = writeln!(
            output,
            "Exam eligibility: {}",
            if self.attendance.is_eligible() { "Eligible" } else { "Not eligible (below 75%)" }
        );
        output
    }

    pub fn fees_view(&self) -> String {
        let summary = self.fees.summary();
        let breakdown = &summary.breakdown;
        let mut output = String::new();

        let _ = writeln!(output, "## Fees");
        let _ = writeln!(output, "Base fee: {}", rupees(breakdown.base_fee));
        let _ = writeln!(
            output,
            "Discount: {}% ({}) for CGPA {:.2}",
            discount_percent(breakdown.score),
            rupees(breakdown.discount_amount),
            breakdown.score
        );
        let _ = writeln!(output, "Final fee: {}", rupees(breakdown.final_fee));
        let _ = writeln!(output, "Paid: {}", rupees(summary.paid));
        let _ = writeln!(output, "Remaining: {}", rupees(summary.remaining));
        let _ = writeln!(output, "Status: {}", summary.status);
        let _ = writeln!(output);
        let _ = writeln!(output, "### Payments");
        if self.fees.payments().is_empty() {
            let _ = writeln!(output, "No payments recorded.");
        }
        for payment in self.fees.payments() {
            let _ = writeln!(
                output,
                "- #{} {} on {} via {} [{}]",
                payment.id,
                rupees(payment.amount),
                payment.date,
                payment.method,
                payment.status
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(output, "### Discount tiers");
        for tier in discount_tiers() {
            let _ = writeln!(
                output,
                "- {}: {}%",
                tier.label,
                discount_percent(tier.min_score)
            );
        }
        output
    }

    pub fn mentor_view(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Mentor");
        match &self.mentor {
            Some(mentor) => {
                let _ = writeln!(output, "{} ({}), {}", mentor.name, mentor.department, mentor.experience);
                let _ = writeln!(output, "Email: {}  Phone: {}", mentor.email, mentor.phone);
            }
            None => {
                let _ = writeln!(output, "No mentor assigned yet.");
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Meetings");
        for meeting in self.meetings.all() {
            let _ = writeln!(output, "{}", meeting_line(meeting));
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Messages");
        if self.thread.messages().is_empty() {
            let _ = writeln!(output, "No messages yet.");
        }
        for message in self.thread.messages() {
            let _ = writeln!(output, "- [{}] {}: {}", message.date, message.author, message.content);
        }
        output
    }

    pub fn notes_view(&self, filter: TodoFilter, today: NaiveDate) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Tasks");
        let todos = self.notebook.todos(filter);
        if todos.is_empty() {
            let _ = writeln!(output, "No tasks.");
        }
        for todo in todos {
            let overdue = !todo.completed && todo.due_date < today;
            let _ = writeln!(
                output,
                "- #{} [{}] {} (due {}{}, {} priority, {})",
                todo.id,
                if todo.completed { "x" } else { " " },
                todo.title,
                todo.due_date,
                if overdue { ", overdue" } else { "" },
                todo.priority,
                todo.category
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Notes");
        if self.notebook.notes().is_empty() {
            let _ = writeln!(output, "No notes.");
        }
        for note in self.notebook.notes() {
            let _ = writeln!(output, "- #{} {} ({}): {}", note.id, note.title, note.date, note.content);
        }
        output
    }

    pub fn placements_view(&self, kind: Option<OpportunityKind>) -> String {
        let counts = self.placements.counts();
        let applications = self.placements.applications_of(self.student.id.as_str());
        let accepted = applications
            .iter()
            .filter(|(_, a)| a.status == ApplicationStatus::Accepted)
            .count();
        let mut output = String::new();

        let _ = writeln!(
            output,
            "## Opportunities ({} internships, {} placements)",
            counts.internships, counts.placements
        );
        let _ = writeln!(output, "Applied: {}, accepted: {}", applications.len(), accepted);
        for opportunity in self.placements.filter(kind) {
            let status = self
                .placements
                .application_for(opportunity.id, self.student.id.as_str())
                .map(|a| a.status.label())
                .unwrap_or("Not applied");
            let _ = writeln!(output, "{} [{}]", opportunity_line(opportunity), status);
        }
        output
    }

    pub fn transcript_view(&self) -> String {
        let mut output = String::new();
        for turn in self.assistant.transcript() {
            let speaker = match turn.speaker {
                Speaker::User => "You",
                Speaker::Assistant => "Assistant",
            };
            let _ = writeln!(output, "[{}] {}: {}", display_time(turn.at), speaker, turn.content);
        }
        let suggestions = self.assistant.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(output, "Try asking:");
            for question in suggestions {
                let _ = writeln!(output, "- {question}");
            }
        }
        output
    }

    pub fn profile_view(&self) -> String {
        let student = &self.student;
        let mut output = String::new();
        let _ = writeln!(output, "## Profile");
        let _ = writeln!(output, "Name: {}", student.name);
        let _ = writeln!(output, "Student ID: {}", student.id);
        let _ = writeln!(output, "Email: {}", student.email);
        let _ = writeln!(output, "Phone: {}", student.phone);
        let _ = writeln!(output, "Address: {}", student.address);
        let _ = writeln!(output, "Department: {}, year {}", student.department, student.year);
        let _ = writeln!(output, "CGPA: {:.2}", student.cgpa);
        let _ = writeln!(output, "Attendance: {}%", student.attendance);
        let _ = writeln!(output, "Internship readiness: {}", readiness(student));
        output
    }
}

/// Everything the mentor portal shows, seeded fresh for one session.
#[derive(Debug, Clone)]
pub struct MentorDashboard {
    pub mentor: MentorProfile,
    pub directory: Directory,
    pub meetings: MeetingBook,
    pub guidance: GuidanceLog,
    pub projects: ProjectBoard,
    pub oversight: FeeOversight,
    pub placements: PlacementBoard,
    pub inbox: Inbox,
    pub settings: SettingsPanel,
    pub export_dir: PathBuf,
}

impl MentorDashboard {
    pub fn open(directory: &Directory, session: &Session, config: &Config) -> anyhow::Result<Self> {
        anyhow::ensure!(
            session.role == Role::Mentor,
            "a {} session cannot open the mentor dashboard",
            session.role
        );
        let id = MentorId::new(session.id.as_str());
        let mentor = directory
            .mentor(&id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownId {
                role: Role::Mentor,
                id: session.id.clone(),
            })?;

        Ok(Self {
            meetings: MeetingBook::new(seed::mentor_meetings()?),
            guidance: GuidanceLog::new(id.clone()),
            projects: ProjectBoard::new(seed::projects()?),
            oversight: FeeOversight::for_mentor(directory, &id),
            placements: PlacementBoard::new(seed::opportunities()?),
            inbox: Inbox::new(seed::notifications()),
            settings: SettingsPanel::for_mentor(&mentor),
            export_dir: config.export_dir.clone(),
            directory: directory.clone(),
            mentor,
        })
    }

    pub fn mentees(&self) -> Vec<&StudentProfile> {
        self.directory.mentees_of(&self.mentor.id)
    }

    pub fn mentee_ids(&self) -> Vec<StudentId> {
        self.mentees().iter().map(|s| s.id.clone()).collect()
    }

    pub fn overview(&self) -> String {
        let mentees = self.mentees();
        let summary = analytics::summarize(&mentees);
        let totals = self.oversight.totals();
        let mut output = String::new();

        let _ = writeln!(output, "Welcome, {}!", self.mentor.name);
        let _ = writeln!(output, "{} - {}", self.mentor.id, self.mentor.department);
        let _ = writeln!(
            output,
            "Mentees: {} ({} active, {} at risk)",
            summary.mentees, summary.active, summary.at_risk
        );
        let _ = writeln!(output, "Average CGPA: {:.2}", summary.average_cgpa);
        let _ = writeln!(output, "Average attendance: {}%", summary.average_attendance);
        let _ = writeln!(output, "Upcoming meetings: {}", self.meetings.upcoming().len());
        let _ = writeln!(output, "Outstanding fees: {}", rupees(totals.total_remaining));
        let _ = writeln!(output, "Unread notifications: {}", self.inbox.unread_count());
        output
    }

    pub fn students_view(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Mentees");
        let mentees = self.mentees();
        if mentees.is_empty() {
            let _ = writeln!(output, "No mentees assigned.");
        }
        for student in mentees {
            let _ = writeln!(
                output,
                "- {} {} | {} | CGPA {:.2} | attendance {}% | {}",
                student.id,
                student.name,
                student.department,
                student.cgpa,
                student.attendance,
                MenteeStatus::of(student).label()
            );
        }
        output
    }

    pub fn guidance_view(&self, student: &StudentId) -> String {
        let mut output = String::new();
        let history = self.guidance.history_for(student);
        if history.is_empty() {
            let _ = writeln!(output, "No guidance sent to {student} yet.");
        }
        for entry in history {
            let _ = writeln!(output, "- [{}] {}", entry.date, entry.message);
        }
        output
    }

    pub fn meetings_view(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Upcoming");
        for meeting in self.meetings.upcoming() {
            let _ = writeln!(output, "{}", meeting_line(meeting));
        }
        let _ = writeln!(output);
        let _ = writeln!(output, "## Completed");
        for meeting in self.meetings.completed() {
            let _ = writeln!(output, "{}", meeting_line(meeting));
            if !meeting.notes.is_empty() {
                let _ = writeln!(output, "  Notes: {}", meeting.notes);
            }
        }
        output
    }

    pub fn projects_view(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "## Projects");
        if self.projects.all().is_empty() {
            let _ = writeln!(output, "No projects assigned.");
        }
        for project in self.projects.all() {
            let _ = writeln!(
                output,
                "- #{} {} -> {} (due {}) [{}]",
                project.id, project.title, project.assigned_to, project.due_date, project.status
            );
        }
        output
    }

    pub fn fees_view(&self) -> String {
        let totals = self.oversight.totals();
        let mut output = String::new();
        let _ = writeln!(output, "## Fee oversight");
        for row in self.oversight.rows() {
            let _ = writeln!(
                output,
                "- {} {} | final {} | paid {} | remaining {} | {}",
                row.student_id,
                row.name,
                rupees(row.final_fee()),
                rupees(row.paid),
                rupees(row.remaining()),
                row.status()
            );
        }
        let _ = writeln!(
            output,
            "Totals: fees {}, collected {}, outstanding {}",
            rupees(totals.total_fees),
            rupees(totals.total_paid),
            rupees(totals.total_remaining)
        );
        let _ = writeln!(
            output,
            "Paid: {}, partially paid: {}, pending: {}",
            totals.paid_count, totals.partial_count, totals.pending_count
        );
        output
    }

    pub fn placements_view(&self, kind: Option<OpportunityKind>) -> String {
        let counts = self.placements.counts();
        let mut output = String::new();
        let _ = writeln!(
            output,
            "## Postings ({} internships, {} placements)",
            counts.internships, counts.placements
        );
        for opportunity in self.placements.filter(kind) {
            let _ = writeln!(output, "{}", opportunity_line(opportunity));
            for application in &opportunity.applications {
                let _ = writeln!(
                    output,
                    "  - {} {} applied {} [{}]",
                    application.student_id,
                    application.student_name,
                    application.applied_date,
                    application.status
                );
            }
        }
        output
    }

    pub fn analytics_view(&self) -> String {
        let mentees = self.mentees();
        let summary = analytics::summarize(&mentees);
        let mut output = String::new();

        let _ = writeln!(output, "## Analytics");
        let _ = writeln!(
            output,
            "Mentees: {}, active: {}, at risk: {}, in the 6.0-8.0 band: {}",
            summary.mentees, summary.active, summary.at_risk, summary.mid_band
        );
        let _ = writeln!(
            output,
            "Average CGPA {:.2}, average attendance {}%",
            summary.average_cgpa, summary.average_attendance
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "### Grade distribution");
        for (band, count) in analytics::grade_mix(&mentees) {
            let _ = writeln!(output, "- {}: {}", band.range_label(), count);
        }
        let _ = writeln!(output);
        let _ = writeln!(output, "### Per mentee");
        for insight in analytics::insights(&mentees) {
            let _ = writeln!(
                output,
                "- {}: {} performance, {} attendance, {} ({})",
                insight.name,
                insight.performance.label(),
                insight.attendance_level.label(),
                insight.plan.label(),
                insight.plan.action()
            );
        }
        output
    }

    pub fn report(&self, today: NaiveDate) -> String {
        report::build_report(&self.mentor, &self.mentees(), &self.oversight, today)
    }
}

fn meeting_line(meeting: &Meeting) -> String {
    let with = meeting
        .student_name
        .as_deref()
        .map(|name| format!(" with {name}"))
        .unwrap_or_default();
    format!(
        "- #{} {} {} {}{} @ {} [{}]",
        meeting.id,
        meeting.date,
        display_time(meeting.time),
        meeting.topic,
        with,
        meeting.location,
        meeting.status
    )
}

fn opportunity_line(opportunity: &Opportunity) -> String {
    format!(
        "- #{} {} at {} ({}, {}) {} - apply by {}",
        opportunity.id,
        opportunity.position,
        opportunity.company,
        opportunity.kind,
        opportunity.location,
        opportunity.salary,
        opportunity.deadline
    )
}

pub fn settings_view(settings: &SettingsPanel) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Profile");
    for (field, value) in &settings.profile.fields {
        let _ = writeln!(output, "- {field}: {value}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Notifications");
    for (key, enabled) in settings.preferences.iter() {
        let _ = writeln!(output, "- {key}: {}", if enabled { "on" } else { "off" });
    }
    if let Some(class) = &settings.class_settings {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Class");
        let _ = writeln!(output, "- maxStudents: {}", class.max_students);
        let _ = writeln!(output, "- attendanceThreshold: {}%", class.attendance_threshold);
        let _ = writeln!(output, "- feeStructure: {}", class.fee_structure);
    }
    output
}

pub fn notifications_view(inbox: &Inbox, show_all: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Notifications ({} unread)", inbox.unread_count());
    if inbox.is_empty() {
        let _ = writeln!(output, "Nothing new.");
    }
    for notification in inbox.visible(show_all) {
        let _ = writeln!(
            output,
            "- #{} {}[{}] {}: {} ({})",
            notification.id,
            if notification.read { "" } else { "* " },
            notification.kind,
            notification.title,
            notification.message,
            notification.timestamp
        );
    }
    if !show_all && inbox.len() > inbox.visible(false).len() {
        let _ = writeln!(output, "{} more; use --all to see everything.", inbox.len() - inbox.visible(false).len());
    }
    output
}

/// One-line answer for the standalone discount calculator.
pub fn discount_line(score: f64, base_fee: Decimal) -> String {
    let breakdown = FeeBreakdown::for_score(base_fee, score);
    format!(
        "CGPA {score:.2}: {}% discount, {} off {}, final fee {}",
        discount_percent(breakdown.score),
        rupees(breakdown.discount_amount),
        rupees(breakdown.base_fee),
        rupees(breakdown.final_fee)
    )
}

/// The fallback screen for a visitor with no session for this portal.
pub fn sign_in_hint(directory: &Directory, role: Role) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "No {role} session found. Please sign in first:");
    let _ = writeln!(output, "  campus-mentor-dashboard sign-in --role {role} --id <id>");
    let _ = writeln!(output, "Sample {role} ids:");
    for (id, name) in directory.sign_in_hints(role) {
        let _ = writeln!(output, "  {id}  {name}");
    }
    output
}

/// Default location of a mentor's roster report.
pub fn report_path(dir: &std::path::Path, mentor: &MentorId) -> PathBuf {
    dir.join(format!("roster_report_{mentor}.md"))
}

pub fn write_report(dashboard: &MentorDashboard, path: &std::path::Path, today: NaiveDate) -> anyhow::Result<()> {
    std::fs::write(path, dashboard.report(today))
        .with_context(|| format!("failed to write report to {}", path.display()))
}
