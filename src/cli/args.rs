//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    appointment::AppointmentCommands, auth::LoginArgs, auth::RegisterArgs, clinic::ClinicCommands,
    company::CompanyCommands, completions::CompletionsArgs, config::ConfigCommands,
    doctor::DoctorCommands, lab::LabCommands, patient::PatientCommands, role::RoleCommands,
    rx::RxCommands, schedule::ScheduleCommands, settings::SettingsCommands,
    specialty::SpecialtyCommands, user::UserCommands, visit::VisitCommands,
};

#[derive(Parser, Debug)]
#[command(name = "cdesk")]
#[command(author, version, about = "Clinic Desk - administer a healthcare-clinic platform from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Ignore cached responses and fetch everything again
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Override the API base URL for this invocation
    #[arg(long, global = true, env = "CDESK_API_URL")]
    pub api_url: Option<String>,

    /// Records per page for list commands
    #[arg(long, global = true)]
    pub per_page: Option<u32>,

    /// Suppress informational messages
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    /// Bordered table
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// Record IDs only
    Id,
}

impl OutputFormat {
    /// Formats meant for other programs; no decoration is printed with them
    pub fn is_machine(&self) -> bool {
        !matches!(self, OutputFormat::Auto | OutputFormat::Table)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// End the session and clear the local cache
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Totals across the platform
    Dashboard,

    /// Profile, session, and cache housekeeping
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Local client settings (API URL, page size, cache TTL)
    #[command(subcommand)]
    Config(ConfigCommands),

    /// User accounts
    #[command(subcommand)]
    User(UserCommands),

    /// Roles and their permissions
    #[command(subcommand)]
    Role(RoleCommands),

    /// Healthcare companies
    #[command(subcommand)]
    Company(CompanyCommands),

    /// Medical specialties
    #[command(subcommand)]
    Specialty(SpecialtyCommands),

    /// Clinics
    #[command(subcommand)]
    Clinic(ClinicCommands),

    /// Doctors and their clinic assignments
    #[command(subcommand)]
    Doctor(DoctorCommands),

    /// Weekly doctor schedules
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Patients, profiles, and documents
    #[command(subcommand)]
    Patient(PatientCommands),

    /// Appointments
    #[command(subcommand, visible_alias = "appt")]
    Appointment(AppointmentCommands),

    /// Visits
    #[command(subcommand)]
    Visit(VisitCommands),

    /// Prescriptions
    #[command(subcommand)]
    Rx(RxCommands),

    /// Lab tests
    #[command(subcommand)]
    Lab(LabCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_machine_formats() {
        assert!(!OutputFormat::Auto.is_machine());
        assert!(!OutputFormat::Table.is_machine());
        assert!(OutputFormat::Json.is_machine());
        assert!(OutputFormat::Id.is_machine());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cdesk", "clinic", "list", "-o", "json", "--refresh"]).unwrap();
        assert_eq!(cli.global.output, OutputFormat::Json);
        assert!(cli.global.refresh);
    }
}
