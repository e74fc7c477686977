use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::dashboard::{
    notifications_view, report_path, settings_view, write_report, MentorDashboard,
    StudentDashboard,
};
use crate::error::DashboardError;
use crate::fees::PaymentForm;
use crate::meetings::MeetingForm;
use crate::models::{
    display_time, ApplicationStatus, Author, OpportunityKind, PaymentStatus, ProjectStatus,
    StudentId,
};
use crate::notes::{NoteForm, TodoFilter, TodoForm};
use crate::notifications::Inbox;
use crate::placements::OpportunityForm;
use crate::projects::ProjectForm;
use crate::session::SessionStore;
use crate::settings::SettingsPanel;

/// What the loop should do after one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Logout,
    Exit,
}

/// One portal's command handling.
pub trait Portal {
    fn prompt(&self) -> String;
    fn dispatch(&mut self, args: Vec<String>, at: NaiveDateTime) -> anyhow::Result<Flow>;
}

/// Splits a command line on whitespace. A token that starts with a quote
/// runs to the matching quote, so `"Office Room 101"` is one argument.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if !in_token && (c == '"' || c == '\'') => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Reads commands from stdin until logout, exit or end of input. Panel
/// errors are printed and the loop keeps going.
pub async fn run(portal: &mut impl Portal, sessions: &SessionStore) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_with(portal, sessions, stdin, &mut std::io::stdout()).await
}

async fn run_with(
    portal: &mut impl Portal,
    sessions: &SessionStore,
    input: impl AsyncBufRead + Unpin,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut lines = input.lines();

    loop {
        write!(out, "{}> ", portal.prompt())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }
        debug!("shell command: {}", tokens.join(" "));

        match portal.dispatch(tokens, Utc::now().naive_utc()) {
            Ok(Flow::Continue(output)) => write!(out, "{output}")?,
            Ok(Flow::Logout) => {
                sessions.clear().await?;
                info!("signed out from the {} portal", portal.prompt());
                writeln!(out, "Signed out.")?;
                break;
            }
            Ok(Flow::Exit) => break,
            Err(err) => writeln!(out, "{err:#}")?,
        }
    }
    Ok(())
}

fn joined(words: &[String]) -> String {
    words.join(" ")
}

#[derive(Subcommand, Debug)]
enum InboxAction {
    /// Mark one notification as read
    Read { id: u32 },
    /// Mark every notification as read
    ReadAll,
    /// Delete a notification
    Remove { id: u32 },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Change a profile field
    Set { field: String, value: Vec<String> },
    /// Flip a notification preference
    Toggle { preference: String },
    /// Change a class setting (mentors)
    Class { field: String, value: String },
}

fn inbox_command(inbox: &mut Inbox, show_all: bool, action: Option<InboxAction>) -> anyhow::Result<String> {
    match action {
        None => {}
        Some(InboxAction::Read { id }) => inbox.mark_read(id)?,
        Some(InboxAction::ReadAll) => inbox.mark_all_read(),
        Some(InboxAction::Remove { id }) => {
            inbox.remove(id)?;
        }
    }
    Ok(notifications_view(inbox, show_all))
}

fn settings_command(settings: &mut SettingsPanel, action: Option<SettingsAction>) -> anyhow::Result<String> {
    match action {
        None => Ok(settings_view(settings)),
        Some(SettingsAction::Set { field, value }) => {
            settings.profile.set_field(&field, &joined(&value))?;
            Ok(format!("Profile updated: {field}.\n"))
        }
        Some(SettingsAction::Toggle { preference }) => {
            let enabled = settings.preferences.toggle(&preference)?;
            Ok(format!("{preference} is now {}.\n", if enabled { "on" } else { "off" }))
        }
        Some(SettingsAction::Class { field, value }) => {
            let class = settings
                .class_settings
                .as_mut()
                .ok_or_else(|| DashboardError::invalid("setting", "class settings belong to mentors"))?;
            class.set(&field, &value)?;
            Ok(format!("Class setting {field} saved.\n"))
        }
    }
}

fn export_command(settings: &SettingsPanel, dir: PathBuf, at: NaiveDateTime) -> anyhow::Result<String> {
    let path = settings.export_to(&dir, at.and_utc())?;
    Ok(format!("Data exported to {}.\n", path.display()))
}

#[derive(Parser, Debug)]
#[command(name = "student", no_binary_name = true, disable_version_flag = true)]
struct StudentLine {
    #[command(subcommand)]
    command: StudentCommand,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    /// Summary of grades, attendance, fees and what is due
    Overview,
    /// Weekly attendance, or record a week
    Attendance {
        #[command(subcommand)]
        action: Option<AttendanceAction>,
    },
    /// Fee breakdown and payments
    Fees {
        #[command(subcommand)]
        action: Option<FeeAction>,
    },
    /// Mentor contact, meetings and messages
    Mentor {
        #[command(subcommand)]
        action: Option<MentorAction>,
    },
    /// Tasks and notes
    Notes {
        #[arg(long, default_value = "all")]
        filter: TodoFilter,
        #[command(subcommand)]
        action: Option<NotesAction>,
    },
    /// Internship and placement openings
    Placements {
        #[arg(long)]
        kind: Option<OpportunityKind>,
        #[command(subcommand)]
        action: Option<PlacementAction>,
    },
    /// Ask the academic assistant a question
    Ask {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        question: Vec<String>,
    },
    Notifications {
        #[arg(long)]
        all: bool,
        #[command(subcommand)]
        action: Option<InboxAction>,
    },
    Profile,
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Write profile data to a JSON file
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Sign out and leave
    Logout,
    /// Leave without signing out
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand, Debug)]
enum AttendanceAction {
    /// Record a week: classes attended, classes held
    Add { attended: String, total: String },
}

#[derive(Subcommand, Debug)]
enum FeeAction {
    /// Record a payment
    Pay {
        #[arg(long, default_value = "")]
        amount: String,
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        method: String,
        #[arg(long, default_value = "")]
        status: String,
    },
    Complete { id: u32 },
    Remove { id: u32 },
    Status { id: u32, status: PaymentStatus },
}

#[derive(Subcommand, Debug)]
enum MentorAction {
    /// Message your mentor
    Send { text: Vec<String> },
    /// Ask for a meeting
    Request {
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value = "")]
        location: String,
    },
}

#[derive(Subcommand, Debug)]
enum NotesAction {
    AddTodo {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        due: String,
        #[arg(long, default_value = "")]
        priority: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    Toggle { id: u32 },
    RemoveTodo { id: u32 },
    AddNote {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    RemoveNote { id: u32 },
}

#[derive(Subcommand, Debug)]
enum PlacementAction {
    Apply { id: u32 },
}

impl Portal for StudentDashboard {
    fn prompt(&self) -> String {
        "student".to_string()
    }

    fn dispatch(&mut self, args: Vec<String>, at: NaiveDateTime) -> anyhow::Result<Flow> {
        let line = match StudentLine::try_parse_from(args) {
            Ok(line) => line,
            Err(err) => return Ok(Flow::Continue(err.to_string())),
        };
        let today = at.date();

        let output = match line.command {
            StudentCommand::Overview => self.overview(today),
            StudentCommand::Attendance { action } => {
                if let Some(AttendanceAction::Add { attended, total }) = action {
                    let week = self.attendance.add_week(&attended, &total)?;
                    info!("{} recorded {}", self.student.id, week.label);
                }
                self.attendance_view()
            }
            StudentCommand::Fees { action } => {
                match action {
                    None => {}
                    Some(FeeAction::Pay { amount, date, method, status }) => {
                        let form = PaymentForm { amount, date, method, status };
                        self.fees.add_payment(&form)?;
                    }
                    Some(FeeAction::Complete { id }) => self.fees.complete_payment(id)?,
                    Some(FeeAction::Remove { id }) => {
                        self.fees.remove_payment(id)?;
                    }
                    Some(FeeAction::Status { id, status }) => self.fees.set_payment_status(id, status)?,
                }
                self.fees_view()
            }
            StudentCommand::Mentor { action } => {
                match action {
                    None => {}
                    Some(MentorAction::Send { text }) => {
                        self.thread.send(Author::Student, &joined(&text), today)?;
                    }
                    Some(MentorAction::Request { date, time, topic, location }) => {
                        let form = MeetingForm {
                            student: String::new(),
                            date,
                            time,
                            topic,
                            location,
                        };
                        self.meetings.request(&form)?;
                    }
                }
                self.mentor_view()
            }
            StudentCommand::Notes { filter, action } => {
                match action {
                    None => {}
                    Some(NotesAction::AddTodo { title, due, priority, category }) => {
                        let form = TodoForm {
                            title,
                            due_date: due,
                            priority,
                            category,
                        };
                        self.notebook.add_todo(&form)?;
                    }
                    Some(NotesAction::Toggle { id }) => {
                        self.notebook.toggle_todo(id)?;
                    }
                    Some(NotesAction::RemoveTodo { id }) => {
                        self.notebook.remove_todo(id)?;
                    }
                    Some(NotesAction::AddNote { title, content }) => {
                        self.notebook.add_note(&NoteForm { title, content }, today)?;
                    }
                    Some(NotesAction::RemoveNote { id }) => {
                        self.notebook.remove_note(id)?;
                    }
                }
                self.notes_view(filter, today)
            }
            StudentCommand::Placements { kind, action } => {
                if let Some(PlacementAction::Apply { id }) = action {
                    self.placements.apply(id, &self.student, today)?;
                }
                self.placements_view(kind)
            }
            StudentCommand::Ask { question } => {
                let question = joined(&question);
                match self.assistant.ask(&question, at.time()) {
                    Some(reply) => format!("[{}] Assistant: {}\n", display_time(reply.at), reply.content),
                    None => self.transcript_view(),
                }
            }
            StudentCommand::Notifications { all, action } => inbox_command(&mut self.inbox, all, action)?,
            StudentCommand::Profile => self.profile_view(),
            StudentCommand::Settings { action } => settings_command(&mut self.settings, action)?,
            StudentCommand::Export { dir } => {
                export_command(&self.settings, dir.unwrap_or_else(|| self.export_dir.clone()), at)?
            }
            StudentCommand::Logout => return Ok(Flow::Logout),
            StudentCommand::Exit => return Ok(Flow::Exit),
        };
        Ok(Flow::Continue(output))
    }
}

#[derive(Parser, Debug)]
#[command(name = "mentor", no_binary_name = true, disable_version_flag = true)]
struct MentorLine {
    #[command(subcommand)]
    command: MentorCommand,
}

#[derive(Subcommand, Debug)]
enum MentorCommand {
    /// Roster summary and what needs attention
    Overview,
    /// Mentee roster and guidance
    Students {
        #[command(subcommand)]
        action: Option<StudentsAction>,
    },
    Meetings {
        #[command(subcommand)]
        action: Option<MeetingAction>,
    },
    Projects {
        #[command(subcommand)]
        action: Option<ProjectAction>,
    },
    /// Fee oversight across mentees
    Fees,
    Placements {
        #[arg(long)]
        kind: Option<OpportunityKind>,
        #[command(subcommand)]
        action: Option<PostingAction>,
    },
    Analytics,
    Notifications {
        #[arg(long)]
        all: bool,
        #[command(subcommand)]
        action: Option<InboxAction>,
    },
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write the markdown roster report
    Report {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Logout,
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand, Debug)]
enum StudentsAction {
    /// Send guidance to a mentee
    Guide { id: String, text: Vec<String> },
    /// Guidance sent to a mentee this session
    History { id: String },
}

#[derive(Subcommand, Debug)]
enum MeetingAction {
    Schedule {
        #[arg(long, default_value = "")]
        student: String,
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Save meeting notes and mark it completed
    Notes { id: u32, text: Vec<String> },
}

#[derive(Subcommand, Debug)]
enum ProjectAction {
    Assign {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        assigned_to: String,
        #[arg(long, default_value = "")]
        due: String,
    },
    Status { id: u32, status: ProjectStatus },
}

#[derive(Subcommand, Debug)]
enum PostingAction {
    Post {
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        position: String,
        #[arg(long, default_value = "")]
        salary: String,
        #[arg(long, default_value = "")]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        kind: String,
    },
    Remove { id: u32 },
    /// Set an applicant's status
    Review { id: u32, student: String, status: ApplicationStatus },
}

impl Portal for MentorDashboard {
    fn prompt(&self) -> String {
        "mentor".to_string()
    }

    fn dispatch(&mut self, args: Vec<String>, at: NaiveDateTime) -> anyhow::Result<Flow> {
        let line = match MentorLine::try_parse_from(args) {
            Ok(line) => line,
            Err(err) => return Ok(Flow::Continue(err.to_string())),
        };
        let today = at.date();

        let output = match line.command {
            MentorCommand::Overview => self.overview(),
            MentorCommand::Students { action } => match action {
                None => self.students_view(),
                Some(StudentsAction::Guide { id, text }) => {
                    let student = StudentId::new(id);
                    self.guidance
                        .send_guidance(&self.directory, &student, &joined(&text), today)?;
                    format!("Guidance sent to {student}.\n")
                }
                Some(StudentsAction::History { id }) => self.guidance_view(&StudentId::new(id)),
            },
            MentorCommand::Meetings { action } => {
                match action {
                    None => {}
                    Some(MeetingAction::Schedule { student, date, time, topic, location }) => {
                        let form = MeetingForm { student, date, time, topic, location };
                        let mentees = self.mentee_ids();
                        self.meetings.schedule(&form, &self.directory, &mentees)?;
                    }
                    Some(MeetingAction::Notes { id, text }) => {
                        self.meetings.save_notes(id, &joined(&text))?;
                    }
                }
                self.meetings_view()
            }
            MentorCommand::Projects { action } => {
                match action {
                    None => {}
                    Some(ProjectAction::Assign { title, description, assigned_to, due }) => {
                        let form = ProjectForm {
                            title,
                            description,
                            assigned_to,
                            due_date: due,
                        };
                        self.projects.assign(&form)?;
                    }
                    Some(ProjectAction::Status { id, status }) => {
                        self.projects.set_status(id, status)?;
                    }
                }
                self.projects_view()
            }
            MentorCommand::Fees => self.fees_view(),
            MentorCommand::Placements { kind, action } => {
                match action {
                    None => {}
                    Some(PostingAction::Post {
                        company,
                        position,
                        salary,
                        deadline,
                        description,
                        location,
                        kind: posting_kind,
                    }) => {
                        let form = OpportunityForm {
                            company,
                            position,
                            salary,
                            deadline,
                            description,
                            location,
                            kind: posting_kind,
                        };
                        self.placements.post(&form)?;
                    }
                    Some(PostingAction::Remove { id }) => {
                        self.placements.remove(id)?;
                    }
                    Some(PostingAction::Review { id, student, status }) => {
                        self.placements.set_application_status(id, &student, status)?;
                    }
                }
                self.placements_view(kind)
            }
            MentorCommand::Analytics => self.analytics_view(),
            MentorCommand::Notifications { all, action } => inbox_command(&mut self.inbox, all, action)?,
            MentorCommand::Settings { action } => settings_command(&mut self.settings, action)?,
            MentorCommand::Export { dir } => {
                export_command(&self.settings, dir.unwrap_or_else(|| self.export_dir.clone()), at)?
            }
            MentorCommand::Report { out } => {
                let path = out.unwrap_or_else(|| report_path(&self.export_dir, &self.mentor.id));
                write_report(self, &path, today)?;
                format!("Report written to {}.\n", path.display())
            }
            MentorCommand::Logout => return Ok(Flow::Logout),
            MentorCommand::Exit => return Ok(Flow::Exit),
        };
        Ok(Flow::Continue(output))
    }
}
