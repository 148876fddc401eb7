//! `cdesk company` command - Company management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::api::resources::directory::COMPANY_LOGO;
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{field, load_file, rule, yes_no};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::company::{CompanyFilters, CompanyRequest};
use crate::entities::Company;

const COMPANY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("email", "EMAIL", 28),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("clinics", "CLINICS", 8),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Company,
    route: Route::Healthcare(Screen::Companies),
    columns: COMPANY_COLUMNS,
    default_columns: &["id", "name", "email", "clinics", "active"],
};

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// List companies
    List(ListArgs),

    /// Show a company's details
    Show(IdArgs),

    /// Create a new company
    New(CompanyArgs),

    /// Update a company (fields first, then the logo)
    Update(UpdateArgs),

    /// Delete a company
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct CompanyArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,

    /// Logo image to upload
    #[arg(long)]
    pub logo: Option<PathBuf>,
}

impl CompanyArgs {
    fn request(&self) -> CompanyRequest {
        CompanyRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            is_active: self.active,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: CompanyArgs,
}

pub fn run(cmd: CompanyCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        CompanyCommands::List(args) => {
            let filters = CompanyFilters {
                search: args.search,
                is_active: args.active.as_flag(),
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, company_row)
        }
        CompanyCommands::Show(args) => {
            let config = app.config.clone();
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |c: &Company| {
                rule();
                println!("{}: {}", style("ID").bold(), style(c.id).cyan());
                println!("{}: {}", style("Name").bold(), style(&c.name).yellow());
                field("Email", c.email.as_deref());
                field("Phone", c.phone.as_deref());
                field("Address", c.address.as_deref());
                field("Clinics", c.clinics_count);
                println!("{}: {}", style("Active").bold(), yes_no(c.is_active));
                field("Logo", c.logo.as_deref().map(|p| config.storage_url(p)));
                rule();
            })
        }
        CompanyCommands::New(args) => {
            if args.name.is_none() {
                return Err(miette::miette!("a company needs a name (--name)"));
            }
            let logo = args
                .logo
                .as_deref()
                .map(|p| load_file(COMPANY_LOGO, p))
                .transpose()?;
            entity_cmd::run_create::<Company, _>(&mut app, &ENTITY_CONFIG, &args.request(), logo, global)?;
            Ok(())
        }
        CompanyCommands::Update(args) => {
            let logo = args
                .fields
                .logo
                .as_deref()
                .map(|p| load_file(COMPANY_LOGO, p))
                .transpose()?;
            entity_cmd::run_update::<Company, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                logo.map(|f| (COMPANY_LOGO, f)),
                global,
            )?;
            Ok(())
        }
        CompanyCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
    }
}

fn company_row(c: &Company) -> TableRow {
    TableRow::new(c.id)
        .cell("id", CellValue::Id(c.id))
        .cell("name", CellValue::Text(c.name.clone()))
        .cell("email", CellValue::opt(c.email.as_deref()))
        .cell("phone", CellValue::opt(c.phone.as_deref()))
        .cell("clinics", CellValue::Count(c.clinics_count.unwrap_or(0)))
        .cell("active", CellValue::Flag(c.is_active))
}
