//! `cdesk patient` command - Patients, medical profiles, and documents

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::api::resources::{clinical, patients};
use crate::cli::app::App;
use crate::cli::commands::appointment::{appointment_row, APPOINTMENT_COLUMNS};
use crate::cli::commands::rx::{prescription_row, PRESCRIPTION_COLUMNS};
use crate::cli::commands::visit::{visit_row, VISIT_COLUMNS};
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{field, load_file, rule, yes_no};
use crate::cli::output::{print_page, ListView};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::patient::{
    PatientDocumentRequest, PatientFilters, PatientProfileRequest, PatientRequest,
};
use crate::entities::{Patient, PatientDocument, PatientProfile};

/// Multipart field of an uploaded document
const DOCUMENT_FIELD: &str = "file";

const PATIENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 26),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("email", "EMAIL", 26),
    ColumnDef::new("born", "BORN", 10),
    ColumnDef::new("gender", "GENDER", 8),
    ColumnDef::new("blood", "BLOOD", 5),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Patient,
    route: Route::Healthcare(Screen::Patients),
    columns: PATIENT_COLUMNS,
    default_columns: &["id", "name", "phone", "born", "gender", "active"],
};

const PROFILE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("version", "VER", 4),
    ColumnDef::new("current", "CURRENT", 7),
    ColumnDef::new("clinic", "CLINIC", 7),
    ColumnDef::new("allergies", "ALLERGIES", 24),
    ColumnDef::new("conditions", "CONDITIONS", 24),
    ColumnDef::new("created", "CREATED", 10),
];

const PROFILE_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::PatientProfile,
    route: Route::Healthcare(Screen::Patients),
    columns: PROFILE_COLUMNS,
    default_columns: &["id", "version", "current", "allergies", "conditions", "created"],
};

const DOCUMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("title", "TITLE", 30),
    ColumnDef::new("type", "TYPE", 14),
    ColumnDef::new("visit", "VISIT", 6),
    ColumnDef::new("created", "CREATED", 10),
];

const DOCUMENT_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::PatientDocument,
    route: Route::Healthcare(Screen::Patients),
    columns: DOCUMENT_COLUMNS,
    default_columns: &["id", "title", "type", "visit", "created"],
};

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    /// List patients
    List(ListArgs),

    /// Show a patient with their current medical profile
    Show(IdArgs),

    New(PatientArgs),

    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Appointment history
    Appointments(HistoryArgs),

    /// Visit history
    Visits(HistoryArgs),

    /// Prescriptions across all visits
    Prescriptions(HistoryArgs),

    /// Every profile version
    Profiles(HistoryArgs),

    /// Record a new medical profile
    ProfileNew(ProfileArgs),

    /// Revise a profile (the server keeps the previous version)
    ProfileUpdate(ProfileUpdateArgs),

    /// Documents attached to a patient
    Documents(HistoryArgs),

    /// Attach a file to a patient
    UploadDocument(UploadDocumentArgs),

    DeleteDocument(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, phone, email, and national ID
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct PatientArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub born: Option<NaiveDate>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub national_id: Option<String>,

    #[arg(long)]
    pub blood_type: Option<String>,

    #[arg(long)]
    pub emergency_name: Option<String>,

    #[arg(long)]
    pub emergency_phone: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

impl PatientArgs {
    fn request(&self) -> PatientRequest {
        PatientRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.born,
            gender: self.gender.clone(),
            address: self.address.clone(),
            national_id: self.national_id.clone(),
            blood_type: self.blood_type.clone(),
            emergency_contact_name: self.emergency_name.clone(),
            emergency_contact_phone: self.emergency_phone.clone(),
            is_active: self.active,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: PatientArgs,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Patient ID
    pub id: u64,

    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: u32,
}

#[derive(clap::Args, Debug)]
pub struct ProfileFields {
    #[arg(long)]
    pub clinic: Option<u64>,

    #[arg(long)]
    pub allergies: Option<String>,

    #[arg(long)]
    pub conditions: Option<String>,

    #[arg(long)]
    pub medications: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub height: Option<f64>,

    #[arg(long)]
    pub weight: Option<f64>,
}

impl ProfileFields {
    fn request(&self, patient_id: Option<u64>) -> PatientProfileRequest {
        PatientProfileRequest {
            patient_id,
            clinic_id: self.clinic,
            allergies: self.allergies.clone(),
            chronic_conditions: self.conditions.clone(),
            current_medications: self.medications.clone(),
            notes: self.notes.clone(),
            height_cm: self.height,
            weight_kg: self.weight,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// Patient ID
    pub id: u64,

    #[command(flatten)]
    pub fields: ProfileFields,
}

#[derive(clap::Args, Debug)]
pub struct ProfileUpdateArgs {
    /// Profile ID
    pub profile: u64,

    #[command(flatten)]
    pub fields: ProfileFields,
}

#[derive(clap::Args, Debug)]
pub struct UploadDocumentArgs {
    /// Patient ID
    pub id: u64,

    /// File to attach
    pub file: PathBuf,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Document type (e.g. report, scan, referral)
    #[arg(long = "type")]
    pub document_type: Option<String>,

    /// Tie the document to a visit
    #[arg(long)]
    pub visit: Option<u64>,
}

pub fn run(cmd: PatientCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        PatientCommands::List(args) => {
            let filters = PatientFilters {
                search: args.search,
                gender: args.gender,
                is_active: args.active.as_flag(),
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, patient_row)
        }
        PatientCommands::Show(args) => run_show(&mut app, args.id, global),
        PatientCommands::New(args) => {
            if args.name.is_none() {
                return Err(miette::miette!("a patient needs a name (--name)"));
            }
            entity_cmd::run_create::<Patient, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        PatientCommands::Update(args) => {
            entity_cmd::run_update::<Patient, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        PatientCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        PatientCommands::Appointments(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = clinical::patient_appointments(&mut app.client, args.id, args.page);
            let page = app.finish(result)?;
            let view = history_view(
                APPOINTMENT_COLUMNS,
                &["id", "date", "time", "doctor", "clinic", "status"],
                "appointments",
            );
            print_page(&page, global.output, &view, appointment_row)
        }
        PatientCommands::Visits(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = clinical::patient_visits(&mut app.client, args.id, args.page);
            let page = app.finish(result)?;
            let view = history_view(
                VISIT_COLUMNS,
                &["id", "doctor", "complaint", "diagnosis", "status", "started"],
                "visits",
            );
            print_page(&page, global.output, &view, visit_row)
        }
        PatientCommands::Prescriptions(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = clinical::patient_prescriptions(&mut app.client, args.id, args.page);
            let page = app.finish(result)?;
            let view = history_view(
                PRESCRIPTION_COLUMNS,
                &["id", "visit", "medication", "dosage", "frequency", "duration"],
                "prescriptions",
            );
            print_page(&page, global.output, &view, prescription_row)
        }
        PatientCommands::Profiles(args) => {
            app.enter(PROFILE_CONFIG.route)?;
            let result = patients::profiles(&mut app.client, args.id, args.page);
            let page = app.finish(result)?;
            let view = history_view(
                PROFILE_COLUMNS,
                PROFILE_CONFIG.default_columns,
                "patient profiles",
            );
            print_page(&page, global.output, &view, profile_row)
        }
        PatientCommands::ProfileNew(args) => {
            let request = args.fields.request(Some(args.id));
            entity_cmd::run_create::<PatientProfile, _>(&mut app, &PROFILE_CONFIG, &request, None, global)?;
            Ok(())
        }
        PatientCommands::ProfileUpdate(args) => {
            entity_cmd::run_update::<PatientProfile, _>(
                &mut app,
                &PROFILE_CONFIG,
                args.profile,
                &args.fields.request(None),
                None,
                global,
            )?;
            Ok(())
        }
        PatientCommands::Documents(args) => {
            app.enter(DOCUMENT_CONFIG.route)?;
            let result = patients::documents(&mut app.client, args.id, args.page);
            let page = app.finish(result)?;
            let view = history_view(
                DOCUMENT_COLUMNS,
                DOCUMENT_CONFIG.default_columns,
                "documents",
            );
            print_page(&page, global.output, &view, document_row)
        }
        PatientCommands::UploadDocument(args) => {
            app.enter(DOCUMENT_CONFIG.route)?;
            let file = load_file(DOCUMENT_FIELD, &args.file)?;
            let request = PatientDocumentRequest {
                patient_id: args.id,
                visit_id: args.visit,
                title: args.title,
                document_type: args.document_type,
            };
            let document =
                app.mutate(|client| patients::upload_document(client, &request, file))?;
            entity_cmd::print_saved(&document, "Uploaded", global);
            Ok(())
        }
        PatientCommands::DeleteDocument(args) => {
            entity_cmd::run_delete(&mut app, &DOCUMENT_CONFIG, &args)
        }
    }
}

fn history_view<'a>(
    columns: &'static [ColumnDef],
    visible: &[&'a str],
    name_plural: &'a str,
) -> ListView<'a> {
    ListView {
        columns,
        visible: visible.to_vec(),
        name_plural,
        wrap: None,
    }
}

fn run_show(app: &mut App, id: u64, global: &GlobalOpts) -> Result<()> {
    app.enter(ENTITY_CONFIG.route)?;
    let patient = entity_cmd::fetch::<Patient>(app, id)?;
    let profile = if global.output.is_machine() {
        None
    } else {
        let result = patients::current_profile(&mut app.client, id);
        app.finish(result)?
    };
    crate::cli::output::print_record(&patient, global.output, |p: &Patient| {
        print_patient(p, profile.as_ref())
    })
}

fn patient_row(p: &Patient) -> TableRow {
    TableRow::new(p.id)
        .cell("id", CellValue::Id(p.id))
        .cell("name", CellValue::Text(p.name.clone()))
        .cell("phone", CellValue::opt(p.phone.as_deref()))
        .cell("email", CellValue::opt(p.email.as_deref()))
        .cell("born", CellValue::Date(p.date_of_birth))
        .cell("gender", CellValue::opt(p.gender.as_deref()))
        .cell("blood", CellValue::opt(p.blood_type.as_deref()))
        .cell("active", CellValue::Flag(p.is_active))
}

fn profile_row(p: &PatientProfile) -> TableRow {
    TableRow::new(p.id)
        .cell("id", CellValue::Id(p.id))
        .cell("version", CellValue::Text(format!("v{}", p.version)))
        .cell("current", CellValue::Flag(p.is_current))
        .cell("clinic", CellValue::OptText(p.clinic_id.map(|c| c.to_string())))
        .cell("allergies", CellValue::opt(p.allergies.as_deref()))
        .cell("conditions", CellValue::opt(p.chronic_conditions.as_deref()))
        .cell(
            "created",
            CellValue::Date(p.created_at.map(|t| t.date_naive())),
        )
}

fn document_row(d: &PatientDocument) -> TableRow {
    use crate::core::entity::Record;
    TableRow::new(d.id)
        .cell("id", CellValue::Id(d.id))
        .cell("title", CellValue::Text(d.label()))
        .cell("type", CellValue::opt(d.document_type.as_deref()))
        .cell("visit", CellValue::OptText(d.visit_id.map(|v| v.to_string())))
        .cell(
            "created",
            CellValue::Date(d.created_at.map(|t| t.date_naive())),
        )
}

fn print_patient(p: &Patient, profile: Option<&PatientProfile>) {
    rule();
    println!("{}: {}", style("ID").bold(), style(p.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&p.name).yellow());
    field("Phone", p.phone.as_deref());
    field("Email", p.email.as_deref());
    field("Born", p.date_of_birth);
    field("Gender", p.gender.as_deref());
    field("Blood type", p.blood_type.as_deref());
    field("National ID", p.national_id.as_deref());
    field("Address", p.address.as_deref());
    if let Some(name) = &p.emergency_contact_name {
        let phone = p.emergency_contact_phone.as_deref().unwrap_or("-");
        println!("{}: {} ({})", style("Emergency contact").bold(), name, phone);
    }
    println!("{}: {}", style("Active").bold(), yes_no(p.is_active));
    rule();

    match profile {
        Some(profile) => {
            println!();
            println!("{} (v{}):", style("Medical profile").bold(), profile.version);
            field("  Allergies", profile.allergies.as_deref());
            field("  Conditions", profile.chronic_conditions.as_deref());
            field("  Medications", profile.current_medications.as_deref());
            field("  Height", profile.height_cm.map(|h| format!("{} cm", h)));
            field("  Weight", profile.weight_kg.map(|w| format!("{} kg", w)));
            field("  Notes", profile.notes.as_deref());
        }
        None => println!("{}", style("No medical profile on file.").dim()),
    }
}
