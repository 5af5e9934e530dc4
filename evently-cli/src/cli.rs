use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use evently_core::Role;
use evently_store::Theme;

#[derive(Parser, Debug)]
#[command(name = "evently", author, version, about = "Event portal client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in as one role and keep its token
    Login {
        #[arg(long)]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long, env = "EVENTLY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget one role's token, or all of them
    Logout {
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        role: Option<Role>,
        #[arg(long)]
        all: bool,
    },
    /// Create a student account and log in
    Signup(SignupArgs),
    /// Show or set the theme flag
    Theme { theme: Option<Theme> },
    /// Show the student's rotating check-in code
    Qr,
    #[command(subcommand)]
    Scan(ScanCommand),
    /// List events open to students
    Events,
    /// Register for an event, paying if it has a fee
    Register { event_id: String },
    #[command(subcommand)]
    Moderate(ModerateCommand),
    #[command(subcommand)]
    Dashboard(DashboardCommand),
    /// Registrations, check-ins and feedback for one event
    Report { event_id: String },
    #[command(subcommand)]
    Create(CreateCommand),
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "EVENTLY_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long)]
    pub school_id: Option<String>,
}

/// Camera scans. Each line on stdin is one decoded QR payload.
#[derive(Subcommand, Debug)]
pub enum ScanCommand {
    /// Volunteer desk: check students in and out
    CheckIn,
    /// Student: unlock a stall and rate it
    Stall,
}

#[derive(Subcommand, Debug)]
pub enum ModerateCommand {
    Approve {
        event_id: String,
    },
    Reject {
        event_id: String,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommand {
    Admin,
    Manager,
}

#[derive(Subcommand, Debug)]
pub enum CreateCommand {
    School {
        #[arg(long)]
        name: String,
    },
    Volunteer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        event_id: Option<String>,
    },
    Event {
        #[arg(long)]
        title: String,
        #[arg(long)]
        venue: Option<String>,
        /// RFC 3339, e.g. 2026-11-02T09:00:00Z
        #[arg(long)]
        starts_at: Option<DateTime<Utc>>,
        #[arg(long)]
        max_capacity: Option<u32>,
        #[arg(long, default_value_t = 0)]
        fee: u32,
        #[arg(long)]
        description: Option<String>,
    },
    Stall {
        #[arg(long)]
        name: String,
        #[arg(long)]
        event_id: String,
        #[arg(long)]
        school_id: Option<String>,
    },
}
