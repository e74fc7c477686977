use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Application, ApplicationStatus, AttendanceWeek, Author, Meeting, MeetingStatus, MentorId,
    MentorProfile, Message, Note, Notification, NotificationKind, Opportunity, OpportunityKind,
    Payment, PaymentStatus, Priority, Project, ProjectStatus, StudentId, StudentProfile, Todo,
    TodoCategory,
};

pub const DEFAULT_BASE_FEE: i64 = 50_000;

/// Score assumed for a fee record whose student is missing from the roster.
pub const FALLBACK_SCORE: f64 = 6.5;

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid seed date {year}-{month:02}-{day:02}"))
}

fn time(value: &str) -> anyhow::Result<chrono::NaiveTime> {
    crate::models::parse_time("time", value).with_context(|| format!("invalid seed time {value}"))
}

pub fn students() -> Vec<StudentProfile> {
    let rows = vec![
        ("205631", "Aisha Khan", "aisha@student.edu", "+91-9876543210", "Mumbai, India", "CIVIL", 3, 7.5894, 85.0),
        ("217123", "Priya Sharma", "priya@student.edu", "+91-9876543211", "Delhi, India", "ME", 2, 6.3717, 92.0),
        ("206206", "Raj Patel", "raj@student.edu", "+91-9876543212", "Ahmedabad, India", "BIO", 3, 6.9673, 78.0),
        ("216037", "Emma Wilson", "emma@student.edu", "+91-9876543213", "Pune, India", "ME", 2, 4.1262, 65.0),
        ("201788", "Ahmed Hassan", "ahmed@student.edu", "+91-9876543214", "Hyderabad, India", "ME", 3, 5.1519, 72.0),
    ];

    rows.into_iter()
        .map(
            |(id, name, email, phone, address, department, year, cgpa, attendance)| StudentProfile {
                id: StudentId::new(id),
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                address: address.to_string(),
                department: department.to_string(),
                year,
                cgpa,
                attendance,
            },
        )
        .collect()
}

pub fn mentors() -> Vec<MentorProfile> {
    let rows = vec![
        ("M001", "Dr. Rajesh Kumar", "rajesh@mentor.edu", "+91-9876543200", "CIVIL", "12 years"),
        ("M002", "Prof. Anita Singh", "anita@mentor.edu", "+91-9876543201", "ME", "8 years"),
        ("M003", "Dr. Vikram Patel", "vikram@mentor.edu", "+91-9876543202", "BIO", "10 years"),
        ("M004", "Prof. Sarah Johnson", "sarah@mentor.edu", "+91-9876543203", "ECE", "6 years"),
    ];

    rows.into_iter()
        .map(|(id, name, email, phone, department, experience)| MentorProfile {
            id: MentorId::new(id),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            department: department.to_string(),
            experience: experience.to_string(),
        })
        .collect()
}

pub fn mentor_assignments() -> Vec<(StudentId, MentorId)> {
    vec![
        ("205631", "M001"),
        ("217123", "M002"),
        ("206206", "M003"),
        ("216037", "M004"),
        ("201788", "M001"),
    ]
    .into_iter()
    .map(|(student, mentor)| (StudentId::new(student), MentorId::new(mentor)))
    .collect()
}

/// Base fee and amount already paid per student, as seen by the mentor.
pub fn fee_accounts() -> Vec<(StudentId, Decimal, Decimal)> {
    vec![
        ("205631", 25_000),
        ("201788", 50_000),
        ("217123", 0),
        ("206206", 25_000),
        ("216037", 0),
    ]
    .into_iter()
    .map(|(student, paid)| {
        (
            StudentId::new(student),
            Decimal::from(DEFAULT_BASE_FEE),
            Decimal::from(paid),
        )
    })
    .collect()
}

pub fn payments() -> anyhow::Result<Vec<Payment>> {
    let rows = vec![
        (1, 25_000, date(2025, 9, 15)?, PaymentStatus::Completed, "Online Transfer"),
        (2, 25_000, date(2025, 10, 15)?, PaymentStatus::Pending, "Credit Card"),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, amount, date, status, method)| Payment {
            id,
            amount: Decimal::from(amount),
            date,
            method: method.to_string(),
            status,
        })
        .collect())
}

pub fn attendance_weeks() -> Vec<AttendanceWeek> {
    [(4, 5), (5, 5), (3, 5), (4, 5), (5, 5)]
        .into_iter()
        .enumerate()
        .map(|(index, (attended, total))| AttendanceWeek {
            label: format!("Week {}", index + 1),
            attended,
            total,
        })
        .collect()
}

pub fn todos() -> anyhow::Result<Vec<Todo>> {
    let rows = vec![
        (1, "Complete Project Report", date(2025, 11, 10)?, Priority::High, false, TodoCategory::Academic),
        (2, "Study for Midterm", date(2025, 11, 15)?, Priority::High, false, TodoCategory::Academic),
        (3, "Submit Assignment", date(2025, 11, 8)?, Priority::Medium, true, TodoCategory::Academic),
        (4, "Prepare for Internship Interview", date(2025, 11, 20)?, Priority::High, false, TodoCategory::Career),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, title, due_date, priority, completed, category)| Todo {
            id,
            title: title.to_string(),
            due_date,
            priority,
            category,
            completed,
        })
        .collect())
}

pub fn notes() -> anyhow::Result<Vec<Note>> {
    Ok(vec![
        Note {
            id: 1,
            title: "Mentor Feedback".to_string(),
            content: "Focus on improving time management skills".to_string(),
            date: date(2025, 10, 25)?,
        },
        Note {
            id: 2,
            title: "Study Notes".to_string(),
            content: "Chapter 5 concepts need more practice".to_string(),
            date: date(2025, 10, 24)?,
        },
    ])
}

/// Meetings as listed on a student's mentor panel.
pub fn student_meetings() -> anyhow::Result<Vec<Meeting>> {
    Ok(vec![
        Meeting {
            id: 1,
            student_id: None,
            student_name: None,
            date: date(2025, 11, 5)?,
            time: time("10:00 AM")?,
            topic: "Project Discussion".to_string(),
            location: "Office Room 101".to_string(),
            status: MeetingStatus::Completed,
            notes: "Discussed project timeline and deliverables".to_string(),
        },
        Meeting {
            id: 2,
            student_id: None,
            student_name: None,
            date: date(2025, 11, 12)?,
            time: time("2:00 PM")?,
            topic: "Career Guidance".to_string(),
            location: "Virtual - Zoom".to_string(),
            status: MeetingStatus::Scheduled,
            notes: String::new(),
        },
    ])
}

/// Meetings as listed on a mentor's schedule; each names its student.
pub fn mentor_meetings() -> anyhow::Result<Vec<Meeting>> {
    let mut meetings = student_meetings()?;
    let attendees = [("205631", "Aisha Khan"), ("201788", "Ahmed Hassan")];
    for (meeting, (id, name)) in meetings.iter_mut().zip(attendees) {
        meeting.student_id = Some(StudentId::new(id));
        meeting.student_name = Some(name.to_string());
    }
    Ok(meetings)
}

pub fn mentor_messages() -> anyhow::Result<Vec<Message>> {
    Ok(vec![Message {
        author: Author::Mentor,
        content: "Hi! Looking forward to our meeting next week.".to_string(),
        date: date(2025, 11, 1)?,
    }])
}

pub fn opportunities() -> anyhow::Result<Vec<Opportunity>> {
    let rows = vec![
        (
            1,
            "Tech Corp",
            "Software Engineer",
            "₹8,00,000",
            date(2025, 11, 30)?,
            "Exciting opportunity for fresh graduates to work on cutting-edge technologies",
            "Bangalore",
            OpportunityKind::Placement,
        ),
        (
            2,
            "Data Systems",
            "Data Analyst",
            "₹6,50,000",
            date(2025, 12, 5)?,
            "Work with cutting-edge analytics tools and real-world datasets",
            "Mumbai",
            OpportunityKind::Placement,
        ),
        (
            3,
            "StartUp Labs",
            "Frontend Developer Intern",
            "₹20,000/month",
            date(2025, 11, 15)?,
            "3-month internship to build modern web applications",
            "Remote",
            OpportunityKind::Internship,
        ),
        (
            4,
            "Cloud Solutions",
            "DevOps Engineer",
            "₹7,50,000",
            date(2025, 12, 10)?,
            "Join our team to manage cloud infrastructure and deployment pipelines",
            "Hyderabad",
            OpportunityKind::Placement,
        ),
    ];

    let applications = vec![
        (1, "205631", "Aisha Khan", ApplicationStatus::Applied, date(2025, 10, 20)?),
        (1, "217123", "Priya Sharma", ApplicationStatus::Shortlisted, date(2025, 10, 19)?),
        (2, "201788", "Ahmed Hassan", ApplicationStatus::Applied, date(2025, 10, 18)?),
        (3, "205631", "Aisha Khan", ApplicationStatus::Shortlisted, date(2025, 10, 18)?),
    ];

    let mut opportunities: Vec<Opportunity> = rows
        .into_iter()
        .map(
            |(id, company, position, salary, deadline, description, location, kind)| Opportunity {
                id,
                company: company.to_string(),
                position: position.to_string(),
                salary: salary.to_string(),
                deadline,
                description: description.to_string(),
                location: location.to_string(),
                kind,
                applications: Vec::new(),
            },
        )
        .collect();

    for (opportunity_id, student_id, student_name, status, applied_date) in applications {
        let opportunity = opportunities
            .iter_mut()
            .find(|opp| opp.id == opportunity_id)
            .with_context(|| format!("seed application for missing opportunity {opportunity_id}"))?;
        opportunity.applications.push(Application {
            student_id: StudentId::new(student_id),
            student_name: student_name.to_string(),
            status,
            applied_date,
        });
    }

    Ok(opportunities)
}

pub fn projects() -> anyhow::Result<Vec<Project>> {
    let rows = vec![
        (1, "Web Development Project", "Build a responsive website", "Aisha Khan", date(2025, 11, 20)?, ProjectStatus::InProgress),
        (2, "Data Analysis Project", "Analyze student performance data", "Ahmed Hassan", date(2025, 11, 25)?, ProjectStatus::NotStarted),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, title, description, assigned_to, due_date, status)| Project {
            id,
            title: title.to_string(),
            description: description.to_string(),
            assigned_to: assigned_to.to_string(),
            due_date,
            status,
        })
        .collect())
}

pub fn notifications() -> Vec<Notification> {
    let rows = vec![
        (1, NotificationKind::Success, "Fee Payment Received", "Your fee payment of ₹5,000 has been successfully processed", "2025-10-27 10:30 AM", false),
        (2, NotificationKind::Reminder, "Upcoming Meeting", "You have a meeting with your mentor tomorrow at 2:00 PM", "2025-10-27 09:15 AM", false),
        (3, NotificationKind::Warning, "Low Attendance", "Your attendance is below 75%. Please attend more classes", "2025-10-26 03:45 PM", true),
        (4, NotificationKind::Info, "New Assignment Posted", "Your mentor has posted a new assignment for you", "2025-10-26 11:20 AM", true),
    ];

    rows.into_iter()
        .map(|(id, kind, title, message, timestamp, read)| Notification {
            id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            timestamp: timestamp.to_string(),
            read,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_student_has_a_mentor() {
        let assignments = mentor_assignments();
        for student in students() {
            assert!(assignments.iter().any(|(id, _)| *id == student.id), "{}", student.id);
        }
    }

    #[test]
    fn seeded_tables_build() {
        assert_eq!(payments().expect("payments").len(), 2);
        assert_eq!(todos().expect("todos").len(), 4);
        assert_eq!(mentor_meetings().expect("meetings")[1].student_name.as_deref(), Some("Ahmed Hassan"));
        let opportunities = opportunities().expect("opportunities");
        assert_eq!(opportunities.len(), 4);
        assert_eq!(opportunities[0].applications.len(), 2);
    }
}
