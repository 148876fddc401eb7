//! `cdesk rx` command - Prescriptions

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::helpers::{field, rule};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::prescription::{PrescriptionFilters, PrescriptionRequest};
use crate::entities::Prescription;

pub(crate) const PRESCRIPTION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("visit", "VISIT", 6),
    ColumnDef::new("medication", "MEDICATION", 24),
    ColumnDef::new("dosage", "DOSAGE", 12),
    ColumnDef::new("frequency", "FREQUENCY", 16),
    ColumnDef::new("duration", "DURATION", 10),
    ColumnDef::new("quantity", "QTY", 5),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Prescription,
    route: Route::Healthcare(Screen::Prescriptions),
    columns: PRESCRIPTION_COLUMNS,
    default_columns: &["id", "visit", "medication", "dosage", "frequency", "duration"],
};

#[derive(Subcommand, Debug)]
pub enum RxCommands {
    /// List prescriptions
    List(ListArgs),
    Show(IdArgs),
    /// Write a prescription on a visit
    New(RxArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search by medication name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub visit: Option<u64>,

    #[arg(long)]
    pub patient: Option<u64>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct RxArgs {
    #[arg(long)]
    pub visit: Option<u64>,

    #[arg(long, short = 'm')]
    pub medication: Option<String>,

    /// e.g. 500mg
    #[arg(long)]
    pub dosage: Option<String>,

    /// e.g. "3 times daily"
    #[arg(long)]
    pub frequency: Option<String>,

    /// e.g. "7 days"
    #[arg(long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub quantity: Option<u32>,

    #[arg(long)]
    pub instructions: Option<String>,
}

impl RxArgs {
    fn request(&self) -> PrescriptionRequest {
        PrescriptionRequest {
            visit_id: self.visit,
            medication_name: self.medication.clone(),
            dosage: self.dosage.clone(),
            frequency: self.frequency.clone(),
            duration: self.duration.clone(),
            quantity: self.quantity,
            instructions: self.instructions.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: RxArgs,
}

pub fn run(cmd: RxCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        RxCommands::List(args) => {
            let filters = PrescriptionFilters {
                search: args.search,
                visit_id: args.visit,
                patient_id: args.patient,
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, prescription_row)
        }
        RxCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |rx: &Prescription| {
                rule();
                println!("{}: {}", style("ID").bold(), style(rx.id).cyan());
                println!("{}: {}", style("Medication").bold(), style(&rx.medication_name).yellow());
                println!("{}: #{}", style("Visit").bold(), rx.visit_id);
                field("Patient", rx.patient_id.map(|p| format!("#{}", p)));
                field("Dosage", rx.dosage.as_deref());
                field("Frequency", rx.frequency.as_deref());
                field("Duration", rx.duration.as_deref());
                field("Quantity", rx.quantity);
                rule();
                if let Some(instructions) = &rx.instructions {
                    println!("{}", instructions);
                }
            })
        }
        RxCommands::New(args) => {
            if args.visit.is_none() || args.medication.is_none() {
                return Err(miette::miette!(
                    "a prescription needs --visit and --medication"
                ));
            }
            entity_cmd::run_create::<Prescription, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        RxCommands::Update(args) => {
            entity_cmd::run_update::<Prescription, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        RxCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
    }
}

pub(crate) fn prescription_row(rx: &Prescription) -> TableRow {
    TableRow::new(rx.id)
        .cell("id", CellValue::Id(rx.id))
        .cell("visit", CellValue::Id(rx.visit_id))
        .cell("medication", CellValue::Text(rx.medication_name.clone()))
        .cell("dosage", CellValue::opt(rx.dosage.as_deref()))
        .cell("frequency", CellValue::opt(rx.frequency.as_deref()))
        .cell("duration", CellValue::opt(rx.duration.as_deref()))
        .cell(
            "quantity",
            CellValue::OptText(rx.quantity.map(|q| q.to_string())),
        )
}
