//! `cdesk doctor` command - Doctors, clinic assignments, and open slots

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::api::resources::directory::{self, DOCTOR_LICENSE, DOCTOR_PHOTO};
use crate::api::FileUpload;
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{confirm, field, load_file, print_done, rule, yes_no};
use crate::cli::output::{print_page, print_structured, ListView};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::cache::Filters;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::core::Config;
use crate::entities::doctor::{AssignClinicRequest, DoctorFilters, DoctorRequest};
use crate::entities::{Doctor, DoctorClinic};

/// Multipart field of the license scan
const LICENSE_FIELD: &str = "license_document";

const DOCTOR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 26),
    ColumnDef::new("specialty", "SPECIALTY", 20),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("email", "EMAIL", 26),
    ColumnDef::new("license", "LICENSE", 14),
    ColumnDef::new("experience", "YEARS", 6),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Doctor,
    route: Route::Healthcare(Screen::Doctors),
    columns: DOCTOR_COLUMNS,
    default_columns: &["id", "name", "specialty", "phone", "active"],
};

const ASSIGNMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("doctor", "DOCTOR", 24),
    ColumnDef::new("clinic", "CLINIC", 26),
    ColumnDef::new("fee", "FEE", 10),
    ColumnDef::new("follow-up", "FOLLOW-UP", 10),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ASSIGNMENT_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::DoctorClinic,
    route: Route::Healthcare(Screen::Doctors),
    columns: ASSIGNMENT_COLUMNS,
    default_columns: &["id", "doctor", "clinic", "fee", "follow-up", "active"],
};

#[derive(Subcommand, Debug)]
pub enum DoctorCommands {
    /// List doctors with filtering
    List(ListArgs),

    /// Show a doctor's details and clinic assignments
    Show(IdArgs),

    /// Create a new doctor
    New(DoctorArgs),

    /// Update a doctor (fields first, then the photo or license)
    Update(UpdateArgs),

    /// Delete a doctor
    Delete(DeleteArgs),

    /// Clinics a doctor works at
    Clinics(IdArgs),

    /// Every doctor-clinic assignment
    Assignments(AssignmentListArgs),

    /// Assign a doctor to a clinic
    Assign(AssignArgs),

    /// Change fees or the active flag of an assignment
    Reassign(AssignArgs),

    /// Remove a doctor from a clinic
    Unassign(UnassignArgs),

    /// Bookable slots for a day
    Slots(SlotArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, email, phone, and license number
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub specialty: Option<u64>,

    #[arg(long)]
    pub clinic: Option<u64>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct DoctorArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub specialty: Option<u64>,

    #[arg(long)]
    pub license_number: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub experience: Option<u32>,

    #[arg(long)]
    pub active: Option<bool>,

    /// Profile photo to upload
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// License scan to upload
    #[arg(long, conflicts_with = "photo")]
    pub license: Option<PathBuf>,
}

impl DoctorArgs {
    fn request(&self) -> DoctorRequest {
        DoctorRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            specialty_id: self.specialty,
            license_number: self.license_number.clone(),
            bio: self.bio.clone(),
            gender: self.gender.clone(),
            experience_years: self.experience,
            is_active: self.active,
        }
    }

    /// The file to send, with the upload endpoint segment it goes to
    fn file(&self) -> Result<Option<(&'static str, FileUpload)>> {
        if let Some(path) = &self.photo {
            return Ok(Some((DOCTOR_PHOTO, load_file("photo", path)?)));
        }
        if let Some(path) = &self.license {
            return Ok(Some((DOCTOR_LICENSE, load_file(LICENSE_FIELD, path)?)));
        }
        Ok(None)
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: DoctorArgs,
}

#[derive(clap::Args, Debug)]
pub struct AssignmentListArgs {
    #[arg(long)]
    pub clinic: Option<u64>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    /// Doctor ID
    pub id: u64,

    #[arg(long)]
    pub clinic: u64,

    /// Consultation fee
    #[arg(long)]
    pub fee: Option<f64>,

    #[arg(long)]
    pub follow_up_fee: Option<f64>,

    #[arg(long)]
    pub active: Option<bool>,
}

impl AssignArgs {
    fn request(&self) -> AssignClinicRequest {
        AssignClinicRequest {
            clinic_id: self.clinic,
            consultation_fee: self.fee,
            follow_up_fee: self.follow_up_fee,
            is_active: self.active,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UnassignArgs {
    /// Doctor ID
    pub id: u64,

    #[arg(long)]
    pub clinic: u64,

    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SlotArgs {
    /// Doctor ID
    pub id: u64,

    #[arg(long)]
    pub clinic: u64,

    /// Day to look up (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run(cmd: DoctorCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        DoctorCommands::List(args) => {
            let filters = DoctorFilters {
                search: args.search,
                specialty_id: args.specialty,
                clinic_id: args.clinic,
                is_active: args.active.as_flag(),
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, doctor_row)
        }
        DoctorCommands::Show(args) => {
            let config = app.config.clone();
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |d: &Doctor| {
                print_doctor(&config, d)
            })
        }
        DoctorCommands::New(args) => {
            if args.name.is_none() {
                return Err(miette::miette!("a doctor needs a name (--name)"));
            }
            let file = args.file()?.map(|(_, f)| f);
            entity_cmd::run_create::<Doctor, _>(&mut app, &ENTITY_CONFIG, &args.request(), file, global)?;
            Ok(())
        }
        DoctorCommands::Update(args) => {
            let file = args.fields.file()?;
            entity_cmd::run_update::<Doctor, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                file,
                global,
            )?;
            Ok(())
        }
        DoctorCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        DoctorCommands::Clinics(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = directory::doctor_clinics(&mut app.client, args.id);
            let page = app.finish(result)?;
            let view = ListView {
                columns: ASSIGNMENT_COLUMNS,
                visible: vec!["id", "clinic", "fee", "follow-up", "active"],
                name_plural: "clinic assignments",
                wrap: None,
            };
            print_page(&page, global.output, &view, assignment_row)
        }
        DoctorCommands::Assignments(args) => {
            let filters = Filters::new().with_opt("clinic_id", args.clinic);
            entity_cmd::run_list(&mut app, &ASSIGNMENT_CONFIG, &filters, &args.page, global, assignment_row)
        }
        DoctorCommands::Assign(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let request = args.request();
            let assignment =
                app.mutate(|client| directory::assign_clinic(client, args.id, &request))?;
            entity_cmd::print_saved(&assignment, "Assigned", global);
            Ok(())
        }
        DoctorCommands::Reassign(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let request = args.request();
            let assignment = app.mutate(|client| {
                directory::update_assignment(client, args.id, args.clinic, &request)
            })?;
            entity_cmd::print_saved(&assignment, "Updated", global);
            Ok(())
        }
        DoctorCommands::Unassign(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let prompt = format!("Remove doctor #{} from clinic #{}?", args.id, args.clinic);
            if !confirm(&prompt, args.yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            app.mutate(|client| directory::unassign_clinic(client, args.id, args.clinic))?;
            if !app.is_quiet() {
                print_done("Removed", "doctor", &format!("#{} from clinic #{}", args.id, args.clinic));
            }
            Ok(())
        }
        DoctorCommands::Slots(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let date = args
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let result = directory::available_slots(&mut app.client, args.id, args.clinic, date);
            let slots = app.finish(result)?;
            if print_structured(&slots, global.output)? {
                return Ok(());
            }
            if slots.is_empty() {
                println!("No slots on {}.", date);
                return Ok(());
            }
            for slot in &slots {
                let range = match &slot.end_time {
                    Some(end) => format!("{}-{}", slot.start_time, end),
                    None => slot.start_time.clone(),
                };
                if slot.available {
                    println!("  {} {}", style("●").green(), range);
                } else {
                    println!("  {} {}", style("○").dim(), style(range).dim());
                }
            }
            Ok(())
        }
    }
}

fn doctor_row(d: &Doctor) -> TableRow {
    TableRow::new(d.id)
        .cell("id", CellValue::Id(d.id))
        .cell("name", CellValue::Text(d.name.clone()))
        .cell("specialty", CellValue::opt(d.specialty_name()))
        .cell("phone", CellValue::opt(d.phone.as_deref()))
        .cell("email", CellValue::opt(d.email.as_deref()))
        .cell("license", CellValue::opt(d.license_number.as_deref()))
        .cell(
            "experience",
            CellValue::OptText(d.experience_years.map(|y| y.to_string())),
        )
        .cell("active", CellValue::Flag(d.is_active))
}

fn assignment_row(a: &DoctorClinic) -> TableRow {
    TableRow::new(a.id)
        .cell("id", CellValue::Id(a.id))
        .cell(
            "doctor",
            CellValue::Text(
                a.doctor_name
                    .clone()
                    .unwrap_or_else(|| format!("doctor #{}", a.doctor_id)),
            ),
        )
        .cell("clinic", CellValue::Text(a.clinic_name()))
        .cell("fee", CellValue::Money(a.consultation_fee))
        .cell("follow-up", CellValue::Money(a.follow_up_fee))
        .cell("active", CellValue::Flag(a.is_active))
}

fn print_doctor(config: &Config, d: &Doctor) {
    rule();
    println!("{}: {}", style("ID").bold(), style(d.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&d.name).yellow());
    field("Specialty", d.specialty_name());
    field("Email", d.email.as_deref());
    field("Phone", d.phone.as_deref());
    field("Gender", d.gender.as_deref());
    field("Experience", d.experience_years.map(|y| format!("{} years", y)));
    field("License", d.license_number.as_deref());
    field(
        "License scan",
        d.license_document.as_deref().map(|p| config.storage_url(p)),
    );
    field("Photo", d.photo.as_deref().map(|p| config.storage_url(p)));
    println!("{}: {}", style("Active").bold(), yes_no(d.is_active));
    rule();

    if !d.clinics.is_empty() {
        println!();
        println!("{} ({}):", style("Clinics").bold(), d.clinics.len());
        for a in &d.clinics {
            let fee = a
                .consultation_fee
                .map(|f| format!(" - fee {:.2}", f))
                .unwrap_or_default();
            let inactive = if a.is_active { "" } else { " (inactive)" };
            println!("  • {}{}{}", a.clinic_name(), fee, inactive);
        }
    }

    if let Some(bio) = &d.bio {
        println!();
        println!("{}", bio);
    }
}
