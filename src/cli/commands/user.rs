//! `cdesk user` command - User accounts, roles, and direct permissions

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::api::resources::accounts;
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::{field, prompt_multi_select, prompt_password, rule, yes_no};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::Route;
use crate::entities::user::{UserFilters, UserRequest};
use crate::entities::User;

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("email", "EMAIL", 30),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("roles", "ROLES", 24),
    ColumnDef::new("active", "ACTIVE", 6),
    ColumnDef::new("created", "CREATED", 10),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::User,
    route: Route::Users,
    columns: USER_COLUMNS,
    default_columns: &["id", "name", "email", "roles", "active"],
};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List(ListArgs),

    Show(IdArgs),

    /// Create a user account
    New(UserArgs),

    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Grant roles (picked interactively when none are given)
    AssignRoles(GrantArgs),

    /// Grant direct permissions (picked interactively when none are given)
    AssignPermissions(GrantArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and email
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only users holding this role
    #[arg(long)]
    pub role: Option<String>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct UserArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Password (prompted on create when omitted)
    #[arg(long, env = "CDESK_NEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,

    /// Role names to grant on creation (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub roles: Vec<String>,
}

impl UserArgs {
    fn request(&self) -> UserRequest {
        UserRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            password_confirmation: self.password.clone(),
            phone: self.phone.clone(),
            is_active: self.active,
            roles: self.roles.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: UserArgs,
}

#[derive(clap::Args, Debug)]
pub struct GrantArgs {
    /// User ID
    pub id: u64,

    /// Names to grant (comma separated)
    #[arg(value_delimiter = ',')]
    pub names: Vec<String>,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        UserCommands::List(args) => {
            let filters = UserFilters {
                search: args.search,
                role: args.role,
                is_active: args.active.as_flag(),
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, user_row)
        }
        UserCommands::Show(args) => {
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, print_user)
        }
        UserCommands::New(mut args) => {
            if args.name.is_none() || args.email.is_none() {
                return Err(miette::miette!("a user needs --name and --email"));
            }
            if args.password.is_none() {
                args.password = Some(prompt_password("Password", true)?);
            }
            entity_cmd::run_create::<User, _>(&mut app, &ENTITY_CONFIG, &args.request(), None, global)?;
            Ok(())
        }
        UserCommands::Update(args) => {
            entity_cmd::run_update::<User, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                None,
                global,
            )?;
            Ok(())
        }
        UserCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        UserCommands::AssignRoles(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let roles = if args.names.is_empty() {
                let user = entity_cmd::fetch::<User>(&mut app, args.id)?;
                let result = accounts::all_roles(&mut app.client);
                let names: Vec<String> = app.finish(result)?.into_iter().map(|r| r.name).collect();
                let held: Vec<bool> = names
                    .iter()
                    .map(|n| user.roles.iter().any(|r| &r.name == n))
                    .collect();
                pick(&format!("Roles for {}", user.name), names, &held)?
            } else {
                args.names
            };
            let user = app.mutate(|client| accounts::assign_roles(client, args.id, roles))?;
            entity_cmd::print_saved(&user, "Updated roles of", global);
            Ok(())
        }
        UserCommands::AssignPermissions(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let permissions = if args.names.is_empty() {
                let user = entity_cmd::fetch::<User>(&mut app, args.id)?;
                let result = accounts::all_permissions(&mut app.client);
                let names: Vec<String> = app.finish(result)?.into_iter().map(|p| p.name).collect();
                let held: Vec<bool> = names
                    .iter()
                    .map(|n| user.permissions.iter().any(|p| &p.name == n))
                    .collect();
                pick(&format!("Permissions for {}", user.name), names, &held)?
            } else {
                args.names
            };
            let user =
                app.mutate(|client| accounts::assign_permissions(client, args.id, permissions))?;
            entity_cmd::print_saved(&user, "Updated permissions of", global);
            Ok(())
        }
    }
}

/// Multi-select over names, returning the chosen ones
pub(crate) fn pick(prompt: &str, names: Vec<String>, checked: &[bool]) -> Result<Vec<String>> {
    if names.is_empty() {
        return Err(miette::miette!("nothing to choose from"));
    }
    let chosen = prompt_multi_select(prompt, &names, checked)?;
    Ok(names
        .into_iter()
        .enumerate()
        .filter(|(i, _)| chosen.contains(i))
        .map(|(_, n)| n)
        .collect())
}

fn user_row(u: &User) -> TableRow {
    TableRow::new(u.id)
        .cell("id", CellValue::Id(u.id))
        .cell("name", CellValue::Text(u.name.clone()))
        .cell("email", CellValue::Text(u.email.clone()))
        .cell("phone", CellValue::opt(u.phone.as_deref()))
        .cell("roles", CellValue::Text(u.role_names()))
        .cell("active", CellValue::Flag(u.is_active.unwrap_or(true)))
        .cell(
            "created",
            CellValue::Date(u.created_at.map(|t| t.date_naive())),
        )
}

fn print_user(u: &User) {
    rule();
    println!("{}: {}", style("ID").bold(), style(u.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&u.name).yellow());
    println!("{}: {}", style("Email").bold(), u.email);
    field("Phone", u.phone.as_deref());
    field("Active", u.is_active.map(yes_no));
    field("Created", u.created_at.map(|t| t.format("%Y-%m-%d")));
    rule();

    if !u.roles.is_empty() {
        println!("{}:", style("Roles").bold());
        for role in &u.roles {
            println!("  • {}", role.name);
        }
    }
    if !u.permissions.is_empty() {
        println!("{}:", style("Direct permissions").bold());
        for permission in &u.permissions {
            println!("  • {}", permission.name);
        }
    }
}
