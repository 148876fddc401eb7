//! `cdesk schedule` command - Weekly doctor hours per clinic

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::helpers::{field, rule, yes_no};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::schedule::{ScheduleFilters, ScheduleRequest};
use crate::entities::{DayOfWeek, DoctorSchedule};

const SCHEDULE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("assignment", "DOCTOR @ CLINIC", 40),
    ColumnDef::new("day", "DAY", 10),
    ColumnDef::new("hours", "HOURS", 13),
    ColumnDef::new("slot", "SLOT", 6),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::DoctorSchedule,
    route: Route::Healthcare(Screen::DoctorSchedules),
    columns: SCHEDULE_COLUMNS,
    default_columns: &["id", "assignment", "day", "hours", "slot", "active"],
};

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List schedules
    List(ListArgs),

    Show(IdArgs),

    /// Add weekly hours for a doctor-clinic assignment
    New(ScheduleArgs),

    Update(UpdateArgs),

    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub doctor: Option<u64>,

    #[arg(long)]
    pub clinic: Option<u64>,

    /// Doctor-clinic assignment ID
    #[arg(long)]
    pub assignment: Option<u64>,

    /// Day name or number (sunday = 0)
    #[arg(long)]
    pub day: Option<DayOfWeek>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ScheduleArgs {
    /// Doctor-clinic assignment ID
    #[arg(long)]
    pub assignment: Option<u64>,

    #[arg(long)]
    pub day: Option<DayOfWeek>,

    /// Start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,

    /// End time (HH:MM)
    #[arg(long)]
    pub end: Option<String>,

    /// Minutes per slot
    #[arg(long)]
    pub slot: Option<u32>,

    #[arg(long)]
    pub active: Option<bool>,
}

impl ScheduleArgs {
    fn request(&self) -> ScheduleRequest {
        ScheduleRequest {
            doctor_clinic_id: self.assignment,
            day_of_week: self.day,
            start_time: self.start.clone(),
            end_time: self.end.clone(),
            slot_duration: self.slot,
            is_active: self.active,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: ScheduleArgs,
}

pub fn run(cmd: ScheduleCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        ScheduleCommands::List(args) => {
            let filters = ScheduleFilters {
                doctor_id: args.doctor,
                clinic_id: args.clinic,
                doctor_clinic_id: args.assignment,
                day_of_week: args.day,
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, schedule_row)
        }
        ScheduleCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |s: &DoctorSchedule| {
                rule();
                println!("{}: {}", style("ID").bold(), style(s.id).cyan());
                println!("{}: {}", style("Assignment").bold(), assignment_label(s));
                println!("{}: {}", style("Day").bold(), style(s.day_of_week).yellow());
                println!("{}: {} - {}", style("Hours").bold(), s.start_time, s.end_time);
                field("Slot", s.slot_duration.map(|m| format!("{} min", m)));
                println!("{}: {}", style("Active").bold(), yes_no(s.is_active));
                rule();
            })
        }
        ScheduleCommands::New(args) => {
            if args.assignment.is_none() || args.day.is_none() {
                return Err(miette::miette!(
                    "a schedule needs --assignment and --day"
                ));
            }
            entity_cmd::run_create::<DoctorSchedule, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        ScheduleCommands::Update(args) => {
            entity_cmd::run_update::<DoctorSchedule, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        ScheduleCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
    }
}

fn assignment_label(s: &DoctorSchedule) -> String {
    use crate::core::entity::Record;
    s.doctor_clinic
        .as_ref()
        .map(|dc| dc.label())
        .unwrap_or_else(|| format!("assignment #{}", s.doctor_clinic_id))
}

fn schedule_row(s: &DoctorSchedule) -> TableRow {
    TableRow::new(s.id)
        .cell("id", CellValue::Id(s.id))
        .cell("assignment", CellValue::Text(assignment_label(s)))
        .cell("day", CellValue::Text(s.day_of_week.to_string()))
        .cell("hours", CellValue::Text(format!("{}-{}", s.start_time, s.end_time)))
        .cell(
            "slot",
            CellValue::OptText(s.slot_duration.map(|m| format!("{}m", m))),
        )
        .cell("active", CellValue::Flag(s.is_active))
}
