//! `cdesk appointment` command - Booking and the appointment status flow

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::api::resources::clinical;
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, refuse, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::AppointmentStatusFilter;
use crate::cli::helpers::{field, prompt_optional, prompt_select, rule};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::appointment::{AppointmentFilters, AppointmentRequest};
use crate::entities::{Appointment, AppointmentStatus};

pub(crate) const APPOINTMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("date", "DATE", 10),
    ColumnDef::new("time", "TIME", 11),
    ColumnDef::new("patient", "PATIENT", 22),
    ColumnDef::new("doctor", "DOCTOR", 22),
    ColumnDef::new("clinic", "CLINIC", 20),
    ColumnDef::new("type", "TYPE", 12),
    ColumnDef::new("status", "STATUS", 11),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Appointment,
    route: Route::Healthcare(Screen::Appointments),
    columns: APPOINTMENT_COLUMNS,
    default_columns: &["id", "date", "time", "patient", "doctor", "status"],
};

#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// List appointments
    List(ListArgs),

    Show(IdArgs),

    /// Book an appointment
    New(AppointmentArgs),

    /// Reschedule or edit an appointment
    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Cancel an open appointment
    Cancel(CancelArgs),

    /// Move an appointment to its next status
    Status(StatusArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long, default_value = "all")]
    pub status: AppointmentStatusFilter,

    #[arg(long)]
    pub doctor: Option<u64>,

    #[arg(long)]
    pub clinic: Option<u64>,

    #[arg(long)]
    pub patient: Option<u64>,

    /// Only this day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Shortcut for --date with today's date
    #[arg(long, conflicts_with = "date")]
    pub today: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct AppointmentArgs {
    #[arg(long)]
    pub patient: Option<u64>,

    #[arg(long)]
    pub doctor: Option<u64>,

    #[arg(long)]
    pub clinic: Option<u64>,

    /// Appointment day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Slot start (HH:MM), see `cdesk doctor slots`
    #[arg(long)]
    pub time: Option<String>,

    /// consultation, follow_up, ...
    #[arg(long = "type")]
    pub appointment_type: Option<String>,

    #[arg(long)]
    pub reason: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl AppointmentArgs {
    fn request(&self) -> AppointmentRequest {
        AppointmentRequest {
            patient_id: self.patient,
            doctor_id: self.doctor,
            clinic_id: self.clinic,
            appointment_date: self.date,
            start_time: self.time.clone(),
            appointment_type: self.appointment_type.clone(),
            reason: self.reason.clone(),
            notes: self.notes.clone(),
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient.is_none() {
            missing.push("--patient");
        }
        if self.doctor.is_none() {
            missing.push("--doctor");
        }
        if self.clinic.is_none() {
            missing.push("--clinic");
        }
        if self.date.is_none() {
            missing.push("--date");
        }
        if self.time.is_none() {
            missing.push("--time");
        }
        missing
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: AppointmentArgs,
}

#[derive(clap::Args, Debug)]
pub struct CancelArgs {
    pub id: u64,

    /// Reason recorded with the cancellation
    #[arg(long, short = 'r')]
    pub reason: Option<String>,

    /// Do not prompt for a reason
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Statuses an operator can move an appointment to
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TargetStatus {
    Confirmed,
    Arrived,
    InProgress,
    Completed,
    NoShow,
}

impl From<TargetStatus> for AppointmentStatus {
    fn from(target: TargetStatus) -> Self {
        match target {
            TargetStatus::Confirmed => AppointmentStatus::Confirmed,
            TargetStatus::Arrived => AppointmentStatus::Arrived,
            TargetStatus::InProgress => AppointmentStatus::InProgress,
            TargetStatus::Completed => AppointmentStatus::Completed,
            TargetStatus::NoShow => AppointmentStatus::NoShow,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    pub id: u64,

    /// Target status (prompted from the offered ones when omitted)
    #[arg(long)]
    pub to: Option<TargetStatus>,
}

pub fn run(cmd: AppointmentCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        AppointmentCommands::List(args) => {
            let date = if args.today {
                Some(chrono::Local::now().date_naive())
            } else {
                args.date
            };
            let filters = AppointmentFilters {
                search: args.search,
                status: args.status.status(),
                doctor_id: args.doctor,
                clinic_id: args.clinic,
                patient_id: args.patient,
                date,
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, appointment_row)
        }
        AppointmentCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, print_appointment)
        }
        AppointmentCommands::New(args) => {
            let missing = args.missing();
            if !missing.is_empty() {
                return Err(miette::miette!(
                    "an appointment needs {}",
                    missing.join(", ")
                ));
            }
            entity_cmd::run_create::<Appointment, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        AppointmentCommands::Update(args) => {
            entity_cmd::run_update::<Appointment, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        AppointmentCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        AppointmentCommands::Cancel(args) => run_cancel(&mut app, args, global),
        AppointmentCommands::Status(args) => run_status(&mut app, args, global),
    }
}

fn run_cancel(app: &mut App, args: CancelArgs, global: &GlobalOpts) -> Result<()> {
    app.enter(ENTITY_CONFIG.route)?;
    let current = entity_cmd::fetch::<Appointment>(app, args.id)?;
    if !current.status.can_cancel() {
        return Err(refuse("cancel", "appointment", current.status));
    }

    let reason = match args.reason {
        Some(reason) => Some(reason),
        None if args.yes || global.output.is_machine() => None,
        None => prompt_optional("Cancellation reason", None)?,
    };
    let cancelled = app.mutate(|client| clinical::cancel_appointment(client, args.id, reason))?;
    entity_cmd::print_saved(&cancelled, "Cancelled", global);
    Ok(())
}

fn run_status(app: &mut App, args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    app.enter(ENTITY_CONFIG.route)?;
    let current = entity_cmd::fetch::<Appointment>(app, args.id)?;
    let offered = current.status.status_choices();

    let target = match args.to {
        Some(to) => {
            let to = AppointmentStatus::from(to);
            if to == current.status {
                return Err(miette::miette!(
                    code = "cdesk::action_unavailable",
                    help = format!("choose one of: {}", join_statuses(&offered)),
                    "appointment #{} is already {}; no request was sent",
                    args.id,
                    to
                ));
            }
            to
        }
        None => {
            let items: Vec<String> = offered.iter().map(|s| s.to_string()).collect();
            let prompt = format!("Move appointment #{} ({}) to", args.id, current.status);
            offered[prompt_select(&prompt, &items, 0)?]
        }
    };

    let updated = app.mutate(|client| clinical::set_appointment_status(client, args.id, target))?;
    entity_cmd::print_saved(&updated, "Updated", global);
    Ok(())
}

fn join_statuses(statuses: &[AppointmentStatus]) -> String {
    statuses
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn time_range(a: &Appointment) -> String {
    match &a.end_time {
        Some(end) => format!("{}-{}", a.start_time, end),
        None => a.start_time.clone(),
    }
}

pub(crate) fn appointment_row(a: &Appointment) -> TableRow {
    TableRow::new(a.id)
        .cell("id", CellValue::Id(a.id))
        .cell("date", CellValue::Date(Some(a.appointment_date)))
        .cell("time", CellValue::Text(time_range(a)))
        .cell("patient", CellValue::Text(a.patient_name()))
        .cell("doctor", CellValue::Text(a.doctor_name()))
        .cell(
            "clinic",
            CellValue::Text(
                a.clinic
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| format!("clinic #{}", a.clinic_id)),
            ),
        )
        .cell("type", CellValue::opt(a.appointment_type.as_deref()))
        .cell("status", CellValue::Status(a.status.to_string()))
}

fn print_appointment(a: &Appointment) {
    rule();
    println!("{}: {}", style("ID").bold(), style(a.id).cyan());
    println!(
        "{}: {} {}",
        style("When").bold(),
        style(a.appointment_date).yellow(),
        time_range(a)
    );
    println!("{}: {}", style("Patient").bold(), a.patient_name());
    println!("{}: {}", style("Doctor").bold(), a.doctor_name());
    field("Clinic", a.clinic.as_ref().map(|c| &c.name));
    field("Type", a.appointment_type.as_deref());
    println!("{}: {}", style("Status").bold(), status_style(a.status));
    field("Reason", a.reason.as_deref());
    field("Cancellation reason", a.cancellation_reason.as_deref());
    rule();

    let mut actions = vec!["status".to_string()];
    if a.status.can_cancel() {
        actions.push("cancel".to_string());
    }
    println!("{}: {}", style("Actions").dim(), style(actions.join(" · ")).dim());
    if let Some(notes) = &a.notes {
        println!();
        println!("{}", notes);
    }
}

fn status_style(status: AppointmentStatus) -> console::StyledObject<String> {
    let text = status.to_string();
    match status {
        AppointmentStatus::Completed => style(text).green(),
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow => style(text).red(),
        AppointmentStatus::InProgress | AppointmentStatus::Arrived => style(text).yellow(),
        _ => style(text).cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_status_maps_to_wire_status() {
        assert_eq!(
            AppointmentStatus::from(TargetStatus::NoShow).to_string(),
            "no_show"
        );
        assert_eq!(
            AppointmentStatus::from(TargetStatus::InProgress),
            AppointmentStatus::InProgress
        );
    }

    #[test]
    fn test_missing_booking_fields() {
        let args = AppointmentArgs {
            patient: Some(1),
            doctor: None,
            clinic: Some(2),
            date: None,
            time: Some("09:00".to_string()),
            appointment_type: None,
            reason: None,
            notes: None,
        };
        assert_eq!(args.missing(), vec!["--doctor", "--date"]);
    }
}
