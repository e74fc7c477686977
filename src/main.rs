use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use rust_decimal::Decimal;

mod academics;
mod analytics;
mod assistant;
mod attendance;
mod config;
mod dashboard;
mod directory;
mod error;
mod fees;
mod meetings;
mod messages;
mod models;
mod notes;
mod notifications;
mod placements;
mod projects;
mod report;
mod seed;
mod session;
mod settings;
mod shell;
mod storage;

use crate::attendance::AttendanceLog;
use crate::config::Config;
use crate::dashboard::{discount_line, sign_in_hint, MentorDashboard, StudentDashboard};
use crate::directory::Directory;
use crate::error::DashboardError;
use crate::fees::FeeOversight;
use crate::models::{MentorId, Role, StudentId};
use crate::session::SessionStore;
use crate::storage::LocalStore;

#[derive(Parser)]
#[command(name = "campus-mentor-dashboard")]
#[command(about = "Student and mentor academic dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the local session store
    InitDb,
    /// Sign in as a student or mentor
    SignIn {
        #[arg(long)]
        role: Role,
        #[arg(long, default_value = "")]
        id: String,
    },
    /// Forget the stored session
    SignOut,
    /// Show who is signed in
    Whoami,
    /// Open a portal for the signed-in user
    Dashboard {
        #[arg(long)]
        role: Role,
    },
    /// Fee discount calculator
    Discount {
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
        #[arg(long)]
        base_fee: Option<Decimal>,
    },
    /// Append weekly attendance rows from a CSV file
    ImportAttendance {
        #[arg(long)]
        student: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown roster report for a mentor
    Report {
        #[arg(long)]
        mentor: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let directory = Directory::seeded();
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::InitDb => {
            open_sessions(&config).await?;
            println!("Local store ready.");
        }
        Commands::SignIn { role, id } => {
            let session = session::sign_in(&directory, role, &id)?;
            open_sessions(&config).await?.save(&session).await?;
            println!("Signed in as {} {}.", role, session.id);
            println!("Open your portal with: campus-mentor-dashboard dashboard --role {role}");
        }
        Commands::SignOut => {
            open_sessions(&config).await?.clear().await?;
            println!("Signed out.");
        }
        Commands::Whoami => match open_sessions(&config).await?.current().await? {
            Some(session) => println!(
                "{} {} (session {}, since {})",
                session.role,
                session.id,
                session.session_id,
                session.opened_at.to_rfc3339()
            ),
            None => println!("Not signed in."),
        },
        Commands::Dashboard { role } => {
            let sessions = open_sessions(&config).await?;
            let Some(session) = sessions.load(role).await? else {
                print!("{}", sign_in_hint(&directory, role));
                return Ok(());
            };
            info!("opening the {role} dashboard for {}", session.id);
            match role {
                Role::Student => {
                    let mut dashboard =
                        StudentDashboard::open(&directory, &session, &config, Utc::now().time())?;
                    print!("{}", dashboard.overview(today));
                    shell::run(&mut dashboard, &sessions).await?;
                }
                Role::Mentor => {
                    let mut dashboard = MentorDashboard::open(&directory, &session, &config)?;
                    print!("{}", dashboard.overview());
                    shell::run(&mut dashboard, &sessions).await?;
                }
            }
        }
        Commands::Discount { score, base_fee } => {
            println!("{}", discount_line(score, base_fee.unwrap_or(config.base_fee)));
        }
        Commands::ImportAttendance { student, csv } => {
            let id = StudentId::new(student.trim());
            let profile = directory.student(&id).ok_or_else(|| DashboardError::UnknownId {
                role: Role::Student,
                id: id.to_string(),
            })?;
            let mut log = AttendanceLog::new(seed::attendance_weeks());
            let summary = attendance::import_csv(&mut log, &csv)?;
            println!(
                "Imported {} weeks for {} from {} ({} skipped).",
                summary.inserted,
                profile.name,
                csv.display(),
                summary.skipped
            );
            println!(
                "Overall attendance {:.1}%, consistency {}, {}.",
                log.overall_percentage(),
                log.consistency().label(),
                if log.is_eligible() { "eligible" } else { "not eligible" }
            );
        }
        Commands::Report { mentor, out } => {
            let id = MentorId::new(mentor.trim());
            let profile = directory.mentor(&id).ok_or_else(|| DashboardError::UnknownId {
                role: Role::Mentor,
                id: id.to_string(),
            })?;
            let mentees = directory.mentees_of(&id);
            let oversight = FeeOversight::for_mentor(&directory, &id);
            let report = report::build_report(profile, &mentees, &oversight, today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Opens the local store, applying migrations first.
async fn open_sessions(config: &Config) -> anyhow::Result<SessionStore> {
    let store = LocalStore::connect(&config.database_url).await?;
    store.init_db().await?;
    Ok(SessionStore::new(store))
}
