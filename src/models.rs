use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Declares a string-backed status enum whose serialized form, display text
/// and accepted input are all the same human label.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = DashboardError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(value);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| normalize_label(candidate.label()) == wanted)
                    .ok_or_else(|| {
                        let options: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                        DashboardError::invalid(
                            stringify!($name),
                            format!("'{}' is not one of {}", value.trim(), options.join(", ")),
                        )
                    })
            }
        }
    };
}

fn normalize_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

labelled_enum!(Role {
    Student => "student",
    Mentor => "mentor",
});

impl Role {
    /// Local-store key holding the signed-in id for this role.
    pub fn id_key(self) -> &'static str {
        match self {
            Role::Student => "studentId",
            Role::Mentor => "mentorId",
        }
    }
}

labelled_enum!(PaymentStatus {
    Pending => "Pending",
    Completed => "Completed",
    Overdue => "Overdue",
});

labelled_enum!(
    /// Derived standing of a whole fee record, not of a single payment.
    FeeStatus {
        Paid => "Paid",
        PartiallyPaid => "Partially Paid",
        Pending => "Pending",
    }
);

labelled_enum!(MeetingStatus {
    Scheduled => "Scheduled",
    Completed => "Completed",
});

labelled_enum!(OpportunityKind {
    Internship => "Internship",
    Placement => "Placement",
});

labelled_enum!(ApplicationStatus {
    Applied => "Applied",
    Shortlisted => "Shortlisted",
    Accepted => "Accepted",
    Rejected => "Rejected",
});

labelled_enum!(Priority {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

labelled_enum!(TodoCategory {
    Academic => "Academic",
    Career => "Career",
    Personal => "Personal",
});

labelled_enum!(ProjectStatus {
    NotStarted => "Not Started",
    InProgress => "In Progress",
    Completed => "Completed",
});

labelled_enum!(NotificationKind {
    Success => "success",
    Warning => "warning",
    Info => "info",
    Reminder => "reminder",
});

labelled_enum!(Author {
    Student => "student",
    Mentor => "mentor",
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentorId(pub String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        StudentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MentorId {
    pub fn new(id: impl Into<String>) -> Self {
        MentorId(id.into())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MentorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub department: String,
    pub year: u8,
    pub cgpa: f64,
    pub attendance: f64,
}

impl StudentProfile {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorProfile {
    pub id: MentorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub experience: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub method: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceWeek {
    pub label: String,
    pub attended: u32,
    pub total: u32,
}

impl AttendanceWeek {
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.attended as f64 / self.total as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: u32,
    pub student_id: Option<StudentId>,
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub topic: String,
    pub location: String,
    pub status: MeetingStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub student_id: StudentId,
    pub student_name: String,
    pub status: ApplicationStatus,
    pub applied_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: u32,
    pub company: String,
    pub position: String,
    pub salary: String,
    pub deadline: NaiveDate,
    pub description: String,
    pub location: String,
    pub kind: OpportunityKind,
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u32,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub category: TodoCategory,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub due_date: NaiveDate,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub content: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    pub student_id: StudentId,
    pub message: String,
    pub date: NaiveDate,
}

/// Next id for a panel list: one past the current maximum, starting at 1.
pub fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().unwrap_or(0) + 1
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", value.trim())))
}

/// Accepts both `14:00` and `2:00 PM`.
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, DashboardError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&value.to_uppercase(), "%I:%M %p"))
        .map_err(|_| DashboardError::invalid(field, format!("'{value}' is not a time like 14:00 or 2:00 PM")))
}

pub fn display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, DashboardError> {
    let amount = Decimal::from_str(value.trim())
        .map_err(|_| DashboardError::invalid(field, format!("'{}' is not a number", value.trim())))?;
    if amount.is_sign_negative() {
        return Err(DashboardError::invalid(field, "must not be negative"));
    }
    Ok(amount)
}
