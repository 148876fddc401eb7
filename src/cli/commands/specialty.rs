//! `cdesk specialty` command - Medical specialties

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{field, rule, yes_no};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::entities::specialty::{SpecialtyFilters, SpecialtyRequest};
use crate::entities::Specialty;

const SPECIALTY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("description", "DESCRIPTION", 40),
    ColumnDef::new("doctors", "DOCTORS", 8),
    ColumnDef::new("active", "ACTIVE", 6),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Specialty,
    route: Route::Healthcare(Screen::Specialties),
    columns: SPECIALTY_COLUMNS,
    default_columns: &["id", "name", "doctors", "active"],
};

#[derive(Subcommand, Debug)]
pub enum SpecialtyCommands {
    List(ListArgs),
    Show(IdArgs),
    New(SpecialtyArgs),
    Update(UpdateArgs),
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
pub struct SpecialtyArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Icon name shown by the web dashboard
    #[arg(long)]
    pub icon: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

impl SpecialtyArgs {
    fn request(&self) -> SpecialtyRequest {
        SpecialtyRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            is_active: self.active,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: SpecialtyArgs,
}

pub fn run(cmd: SpecialtyCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        SpecialtyCommands::List(args) => {
            let filters = SpecialtyFilters {
                search: args.search,
                is_active: args.active.as_flag(),
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, |s: &Specialty| {
                TableRow::new(s.id)
                    .cell("id", CellValue::Id(s.id))
                    .cell("name", CellValue::Text(s.name.clone()))
                    .cell("description", CellValue::opt(s.description.as_deref()))
                    .cell("doctors", CellValue::Count(s.doctors_count.unwrap_or(0)))
                    .cell("active", CellValue::Flag(s.is_active))
            })
        }
        SpecialtyCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |s: &Specialty| {
                rule();
                println!("{}: {}", style("ID").bold(), style(s.id).cyan());
                println!("{}: {}", style("Name").bold(), style(&s.name).yellow());
                field("Icon", s.icon.as_deref());
                field("Doctors", s.doctors_count);
                println!("{}: {}", style("Active").bold(), yes_no(s.is_active));
                rule();
                if let Some(description) = &s.description {
                    println!("{}", description);
                }
            })
        }
        SpecialtyCommands::New(args) => {
            if args.name.is_none() {
                return Err(miette::miette!("a specialty needs a name (--name)"));
            }
            entity_cmd::run_create::<Specialty, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        SpecialtyCommands::Update(args) => {
            entity_cmd::run_update::<Specialty, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        SpecialtyCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
    }
}
