//! `cdesk visit` command - Clinical encounters

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::api::resources::clinical;
use crate::cli::app::App;
use crate::cli::commands::lab::{lab_row, LAB_COLUMNS};
use crate::cli::commands::rx::{prescription_row, PRESCRIPTION_COLUMNS};
use crate::cli::entity_cmd::{self, refuse, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::VisitStatusFilter;
use crate::cli::helpers::{field, rule};
use crate::cli::output::{print_page, ListView};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::visit::{VisitFilters, VisitRequest, VitalSigns};
use crate::entities::Visit;

pub(crate) const VISIT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("patient", "PATIENT", 22),
    ColumnDef::new("doctor", "DOCTOR", 22),
    ColumnDef::new("appointment", "APPT", 6),
    ColumnDef::new("complaint", "COMPLAINT", 28),
    ColumnDef::new("diagnosis", "DIAGNOSIS", 28),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("started", "STARTED", 10),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Visit,
    route: Route::Healthcare(Screen::Visits),
    columns: VISIT_COLUMNS,
    default_columns: &["id", "patient", "doctor", "complaint", "status", "started"],
};

#[derive(Subcommand, Debug)]
pub enum VisitCommands {
    /// List visits
    List(ListArgs),

    Show(IdArgs),

    /// Open a visit (usually from an appointment)
    New(VisitArgs),

    /// Record findings on a visit
    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Close an in-progress visit
    Complete(IdArgs),

    /// Prescriptions written during a visit
    Prescriptions(IdArgs),

    /// Lab tests ordered during a visit
    LabTests(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long, default_value = "all")]
    pub status: VisitStatusFilter,

    #[arg(long)]
    pub doctor: Option<u64>,

    #[arg(long)]
    pub patient: Option<u64>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct VitalArgs {
    /// Blood pressure, e.g. 120/80
    #[arg(long)]
    pub bp: Option<String>,

    /// Heart rate (bpm)
    #[arg(long)]
    pub hr: Option<f64>,

    /// Temperature (°C)
    #[arg(long)]
    pub temp: Option<f64>,

    /// Respiratory rate (breaths/min)
    #[arg(long)]
    pub rr: Option<f64>,

    /// Oxygen saturation (%)
    #[arg(long)]
    pub spo2: Option<f64>,

    /// Weight (kg)
    #[arg(long)]
    pub weight: Option<f64>,
}

impl VitalArgs {
    fn vitals(&self) -> Option<VitalSigns> {
        let vitals = VitalSigns {
            blood_pressure: self.bp.clone(),
            heart_rate: self.hr,
            temperature: self.temp,
            respiratory_rate: self.rr,
            oxygen_saturation: self.spo2,
            weight: self.weight,
        };
        (!vitals.is_empty()).then_some(vitals)
    }
}

#[derive(clap::Args, Debug)]
pub struct VisitArgs {
    #[arg(long)]
    pub appointment: Option<u64>,

    #[arg(long)]
    pub patient: Option<u64>,

    #[arg(long)]
    pub doctor: Option<u64>,

    #[arg(long)]
    pub clinic: Option<u64>,

    #[arg(long)]
    pub complaint: Option<String>,

    #[arg(long)]
    pub diagnosis: Option<String>,

    #[arg(long)]
    pub plan: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[command(flatten)]
    pub vitals: VitalArgs,
}

impl VisitArgs {
    fn request(&self) -> VisitRequest {
        VisitRequest {
            appointment_id: self.appointment,
            patient_id: self.patient,
            doctor_id: self.doctor,
            clinic_id: self.clinic,
            chief_complaint: self.complaint.clone(),
            diagnosis: self.diagnosis.clone(),
            treatment_plan: self.plan.clone(),
            notes: self.notes.clone(),
            vital_signs: self.vitals.vitals(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: VisitArgs,
}

pub fn run(cmd: VisitCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        VisitCommands::List(args) => {
            let filters = VisitFilters {
                search: args.search,
                status: args.status.status(),
                doctor_id: args.doctor,
                patient_id: args.patient,
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, visit_row)
        }
        VisitCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, print_visit)
        }
        VisitCommands::New(args) => {
            if args.appointment.is_none() && (args.patient.is_none() || args.doctor.is_none()) {
                return Err(miette::miette!(
                    "a visit needs --appointment, or --patient and --doctor"
                ));
            }
            entity_cmd::run_create::<Visit, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        VisitCommands::Update(args) => {
            entity_cmd::run_update::<Visit, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        VisitCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        VisitCommands::Complete(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let current = entity_cmd::fetch::<Visit>(&mut app, args.id)?;
            if !current.status.can_complete() {
                return Err(refuse("complete", "visit", current.status));
            }
            let completed = app.mutate(|client| clinical::complete_visit(client, args.id))?;
            entity_cmd::print_saved(&completed, "Completed", global);
            Ok(())
        }
        VisitCommands::Prescriptions(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = clinical::visit_prescriptions(&mut app.client, args.id);
            let page = app.finish(result)?;
            let view = ListView {
                columns: PRESCRIPTION_COLUMNS,
                visible: vec!["id", "medication", "dosage", "frequency", "duration", "quantity"],
                name_plural: "prescriptions",
                wrap: None,
            };
            print_page(&page, global.output, &view, prescription_row)
        }
        VisitCommands::LabTests(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = clinical::visit_lab_tests(&mut app.client, args.id);
            let page = app.finish(result)?;
            let view = ListView {
                columns: LAB_COLUMNS,
                visible: vec!["id", "test", "type", "status", "result"],
                name_plural: "lab tests",
                wrap: None,
            };
            print_page(&page, global.output, &view, lab_row)
        }
    }
}

pub(crate) fn visit_row(v: &Visit) -> TableRow {
    TableRow::new(v.id)
        .cell("id", CellValue::Id(v.id))
        .cell("patient", CellValue::Text(v.patient_name()))
        .cell(
            "doctor",
            CellValue::Text(
                v.doctor
                    .as_ref()
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| format!("doctor #{}", v.doctor_id)),
            ),
        )
        .cell(
            "appointment",
            CellValue::OptText(v.appointment_id.map(|a| a.to_string())),
        )
        .cell("complaint", CellValue::opt(v.chief_complaint.as_deref()))
        .cell("diagnosis", CellValue::opt(v.diagnosis.as_deref()))
        .cell("status", CellValue::Status(v.status.to_string()))
        .cell(
            "started",
            CellValue::Date(v.started_at.map(|t| t.date_naive())),
        )
}

fn print_visit(v: &Visit) {
    rule();
    println!("{}: {}", style("ID").bold(), style(v.id).cyan());
    println!("{}: {}", style("Patient").bold(), style(v.patient_name()).yellow());
    field("Doctor", v.doctor.as_ref().map(|d| &d.name));
    field("Appointment", v.appointment_id.map(|a| format!("#{}", a)));
    println!("{}: {}", style("Status").bold(), v.status);
    field("Started", v.started_at.map(|t| t.format("%Y-%m-%d %H:%M")));
    field("Completed", v.completed_at.map(|t| t.format("%Y-%m-%d %H:%M")));
    rule();
    field("Complaint", v.chief_complaint.as_deref());
    field("Diagnosis", v.diagnosis.as_deref());
    field("Treatment plan", v.treatment_plan.as_deref());

    if let Some(vitals) = v.vital_signs.as_ref().filter(|vs| !vs.is_empty()) {
        println!();
        println!("{}:", style("Vital signs").bold());
        field("  Blood pressure", vitals.blood_pressure.as_deref());
        field("  Heart rate", vitals.heart_rate.map(|n| format!("{} bpm", n)));
        field("  Temperature", vitals.temperature.map(|n| format!("{} °C", n)));
        field("  Respiratory rate", vitals.respiratory_rate.map(|n| format!("{}/min", n)));
        field("  SpO2", vitals.oxygen_saturation.map(|n| format!("{}%", n)));
        field("  Weight", vitals.weight.map(|n| format!("{} kg", n)));
    }

    if v.status.can_complete() {
        println!();
        println!("{}", style(format!("Close with: cdesk visit complete {}", v.id)).dim());
    }
    if let Some(notes) = &v.notes {
        println!();
        println!("{}", notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vitals_are_omitted() {
        assert!(VitalArgs::default().vitals().is_none());

        let args = VitalArgs {
            bp: Some("120/80".to_string()),
            hr: Some(72.0),
            ..Default::default()
        };
        let vitals = args.vitals().unwrap();
        assert_eq!(vitals.blood_pressure.as_deref(), Some("120/80"));
        assert_eq!(vitals.heart_rate, Some(72.0));
        assert!(vitals.temperature.is_none());
    }
}
