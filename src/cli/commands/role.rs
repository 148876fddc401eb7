//! `cdesk role` command - Roles and their permission sets

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::api::resources::accounts;
use crate::cli::app::App;
use crate::cli::commands::user::pick;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::helpers::rule;
use crate::cli::output::print_structured;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cache::Filters;
use crate::core::entity::Resource;
use crate::core::route::Route;
use crate::entities::role::RoleRequest;
use crate::entities::Role;

const ROLE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("guard", "GUARD", 8),
    ColumnDef::new("users", "USERS", 6),
    ColumnDef::new("permissions", "PERMISSIONS", 11),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::Role,
    route: Route::Users,
    columns: ROLE_COLUMNS,
    default_columns: &["id", "name", "users", "permissions"],
};

#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    List(ListArgs),

    Show(IdArgs),

    New(RoleArgs),

    /// Rename a role
    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Replace a role's permissions (picked interactively when none are given)
    SyncPermissions(SyncArgs),

    /// Every permission known to the server
    Permissions,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct RoleArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Permission names (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub permissions: Vec<String>,
}

impl RoleArgs {
    fn request(&self) -> RoleRequest {
        RoleRequest {
            name: self.name.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: RoleArgs,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Role ID
    pub id: u64,

    /// Complete permission set (comma separated)
    #[arg(value_delimiter = ',')]
    pub names: Vec<String>,
}

pub fn run(cmd: RoleCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        RoleCommands::List(args) => {
            let filters = Filters::new().with_opt("search", args.search);
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, role_row)
        }
        RoleCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, print_role)
        }
        RoleCommands::New(args) => {
            if args.name.is_none() {
                return Err(miette::miette!("a role needs a name (--name)"));
            }
            entity_cmd::run_create::<Role, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        RoleCommands::Update(args) => {
            entity_cmd::run_update::<Role, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        RoleCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        RoleCommands::SyncPermissions(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let permissions = if args.names.is_empty() {
                let role = entity_cmd::fetch::<Role>(&mut app, args.id)?;
                let result = accounts::all_permissions(&mut app.client);
                let names: Vec<String> =
                    app.finish(result)?.into_iter().map(|p| p.name).collect();
                let held: Vec<bool> = names
                    .iter()
                    .map(|n| role.permissions.iter().any(|p| &p.name == n))
                    .collect();
                pick(&format!("Permissions for {}", role.name), names, &held)?
            } else {
                args.names
            };
            let role =
                app.mutate(|client| accounts::sync_permissions(client, args.id, permissions))?;
            entity_cmd::print_saved(&role, "Synced permissions of", global);
            Ok(())
        }
        RoleCommands::Permissions => {
            app.enter(ENTITY_CONFIG.route)?;
            let result = accounts::all_permissions(&mut app.client);
            let permissions = app.finish(result)?;
            if print_structured(&permissions, global.output)? {
                return Ok(());
            }
            if permissions.is_empty() {
                println!("No permissions found.");
                return Ok(());
            }
            for permission in &permissions {
                match global.output {
                    OutputFormat::Id => println!("{}", permission.id),
                    _ => println!("{}", permission.name),
                }
            }
            Ok(())
        }
    }
}

fn role_row(r: &Role) -> TableRow {
    TableRow::new(r.id)
        .cell("id", CellValue::Id(r.id))
        .cell("name", CellValue::Text(r.name.clone()))
        .cell("guard", CellValue::opt(r.guard_name.as_deref()))
        .cell("users", CellValue::Count(r.users_count.unwrap_or(0)))
        .cell("permissions", CellValue::Count(r.permission_total()))
}

fn print_role(r: &Role) {
    rule();
    println!("{}: {}", style("ID").bold(), style(r.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&r.name).yellow());
    if let Some(users) = r.users_count {
        println!("{}: {}", style("Users").bold(), users);
    }
    rule();
    if r.permissions.is_empty() {
        println!("{}", style("No permissions granted.").dim());
        return;
    }
    println!("{} ({}):", style("Permissions").bold(), r.permissions.len());
    for permission in &r.permissions {
        println!("  • {}", permission.name);
    }
}
