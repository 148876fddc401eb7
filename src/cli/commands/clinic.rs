//! `cdesk clinic` command - Clinic management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::api::resources::directory::CLINIC_PHOTO;
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{field, load_file, prompt_optional, prompt_text, rule, yes_no};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::Config;
use crate::core::route::{Route, Screen};
use crate::entities::clinic::{ClinicFilters, ClinicRequest};
use crate::entities::Clinic;

const CLINIC_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("company", "COMPANY", 20),
    ColumnDef::new("city", "CITY", 16),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("email", "EMAIL", 26),
    ColumnDef::new("doctors", "DOCTORS", 8),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Clinic,
    route: Route::Healthcare(Screen::Clinics),
    columns: CLINIC_COLUMNS,
    default_columns: &["id", "name", "company", "city", "phone", "active"],
};

#[derive(Subcommand, Debug)]
pub enum ClinicCommands {
    /// List clinics with filtering
    List(ListArgs),

    /// Show a clinic's details
    Show(IdArgs),

    /// Create a new clinic
    New(ClinicArgs),

    /// Update a clinic (fields first, then the photo)
    Update(UpdateArgs),

    /// Delete a clinic
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, email, and phone
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub company: Option<u64>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct ClinicArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Owning company ID
    #[arg(long)]
    pub company: Option<u64>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Set the active flag
    #[arg(long)]
    pub active: Option<bool>,

    /// Photo file to upload
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

impl ClinicArgs {
    fn request(&self) -> ClinicRequest {
        ClinicRequest {
            company_id: self.company,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            description: self.description.clone(),
            is_active: self.active,
        }
    }

    /// Fill the fields from prompts, starting from the current values
    fn prompt(&mut self, current: Option<&Clinic>) -> Result<()> {
        let name = current.map(|c| c.name.as_str());
        self.name = Some(prompt_text("Name", self.name.as_deref().or(name))?);
        self.email = prompt_optional("Email", current.and_then(|c| c.email.as_deref()))?;
        self.phone = prompt_optional("Phone", current.and_then(|c| c.phone.as_deref()))?;
        self.address = prompt_optional("Address", current.and_then(|c| c.address.as_deref()))?;
        self.city = prompt_optional("City", current.and_then(|c| c.city.as_deref()))?;
        self.description =
            prompt_optional("Description", current.and_then(|c| c.description.as_deref()))?;
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: ClinicArgs,
}

pub fn run(cmd: ClinicCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        ClinicCommands::List(args) => run_list(&mut app, args, global),
        ClinicCommands::Show(args) => {
            let config = app.config.clone();
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |c: &Clinic| {
                print_clinic(&config, c)
            })
        }
        ClinicCommands::New(mut args) => {
            if args.interactive {
                args.prompt(None)?;
            }
            if args.name.is_none() {
                return Err(miette::miette!("a clinic needs a name (--name)"));
            }
            let photo = args
                .photo
                .as_deref()
                .map(|p| load_file(CLINIC_PHOTO, p))
                .transpose()?;
            entity_cmd::run_create::<Clinic, _>(&mut app, &ENTITY_CONFIG, &args.request(), photo, global)?;
            Ok(())
        }
        ClinicCommands::Update(mut args) => {
            if args.fields.interactive {
                let current = entity_cmd::fetch::<Clinic>(&mut app, args.id)?;
                args.fields.prompt(Some(&current))?;
            }
            let photo = args
                .fields
                .photo
                .as_deref()
                .map(|p| load_file(CLINIC_PHOTO, p))
                .transpose()?;
            entity_cmd::run_update::<Clinic, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                photo.map(|f| (CLINIC_PHOTO, f)),
                global,
            )?;
            Ok(())
        }
        ClinicCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
    }
}

fn run_list(app: &mut App, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let filters = ClinicFilters {
        search: args.search,
        company_id: args.company,
        city: args.city,
        is_active: args.active.as_flag(),
    }
    .to_filters();

    entity_cmd::run_list(app, &ENTITY_CONFIG, &filters, &args.page, global, |c: &Clinic| {
        TableRow::new(c.id)
            .cell("id", CellValue::Id(c.id))
            .cell("name", CellValue::Text(c.name.clone()))
            .cell(
                "company",
                CellValue::OptText(c.company.as_ref().map(|co| co.name.clone())),
            )
            .cell("city", CellValue::opt(c.city.as_deref()))
            .cell("phone", CellValue::opt(c.phone.as_deref()))
            .cell("email", CellValue::opt(c.email.as_deref()))
            .cell("doctors", CellValue::Count(c.doctors_count.unwrap_or(0)))
            .cell("active", CellValue::Flag(c.is_active))
    })
}

fn print_clinic(config: &Config, clinic: &Clinic) {
    rule();
    println!("{}: {}", style("ID").bold(), style(clinic.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&clinic.name).yellow());
    field("Company", clinic.company.as_ref().map(|c| &c.name));
    field("Email", clinic.email.as_deref());
    field("Phone", clinic.phone.as_deref());
    field("Address", clinic.address.as_deref());
    field("City", clinic.city.as_deref());
    field("Doctors", clinic.doctors_count);
    println!("{}: {}", style("Active").bold(), yes_no(clinic.is_active));
    field("Photo", clinic.photo.as_deref().map(|p| config.storage_url(p)));
    rule();
    if let Some(description) = &clinic.description {
        println!();
        println!("{}", description);
    }
}
