//! `cdesk settings` - profile, session, and cache housekeeping

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::api::auth;
use crate::cli::app::App;
use crate::cli::entity_cmd::print_saved;
use crate::cli::helpers::{confirm, field, rule};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::route::Route;
use crate::entities::user::UserRequest;
use crate::entities::User;

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the signed-in user's profile
    Profile,

    /// Update the signed-in user's profile
    UpdateProfile(UpdateProfileArgs),

    /// Show where the session and cache are stored
    Session,

    /// Cache entry counts per query name
    Cache,

    /// Drop every cached query
    ClearCache {
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct UpdateProfileArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// New password
    #[arg(long, env = "CDESK_NEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn run(cmd: SettingsCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    app.enter(Route::Settings)?;

    match cmd {
        SettingsCommands::Profile => {
            let user = signed_in_user(&mut app)?;
            if print_structured(&user, global.output)? {
                return Ok(());
            }
            rule();
            println!("{}: {}", style("Name").bold(), style(&user.name).yellow());
            println!("{}: {}", style("Email").bold(), user.email);
            field("Phone", user.phone.as_deref());
            if !user.roles.is_empty() {
                println!("{}: {}", style("Roles").bold(), user.role_names());
            }
            if let Some(avatar) = &user.avatar {
                println!("{}: {}", style("Avatar").bold(), app.config.storage_url(avatar));
            }
            rule();
            Ok(())
        }
        SettingsCommands::UpdateProfile(args) => {
            let user = signed_in_user(&mut app)?;
            let request = UserRequest {
                name: args.name,
                email: args.email,
                phone: args.phone,
                password_confirmation: args.password.clone(),
                password: args.password,
                ..Default::default()
            };
            let id = user.id;
            let updated: User = app.mutate(|client| {
                crate::api::resources::update::<User, _>(client, id, &request)
            })?;
            app.client
                .api_mut()
                .session_mut()
                .set_user(&updated)
                .into_diagnostic()?;
            print_saved(&updated, "Updated", global);
            Ok(())
        }
        SettingsCommands::Session => {
            let session = app.client.api().session();
            println!("{}: {}", style("API").bold(), app.client.api().base_url());
            println!(
                "{}: {}",
                style("Signed in").bold(),
                if session.is_authenticated() { "yes" } else { "no" }
            );
            if let Some(user) = session.get_user() {
                println!("{}: {}", style("User").bold(), user.email);
            }
            println!(
                "{}: {}",
                style("Session file").bold(),
                app.config.session_path().into_diagnostic()?.display()
            );
            println!(
                "{}: {}",
                style("Cache").bold(),
                app.config.cache_path().into_diagnostic()?.display()
            );
            Ok(())
        }
        SettingsCommands::Cache => {
            let stats = app.client.cache().statistics().into_diagnostic()?;
            if print_structured(&stats, global.output)? {
                return Ok(());
            }
            println!(
                "{} entries ({} stale)",
                style(stats.total_entries).cyan(),
                stats.stale_entries
            );
            for (name, count) in &stats.resources {
                println!("  {:<28} {}", name, count);
            }
            Ok(())
        }
        SettingsCommands::ClearCache { yes } => {
            if !confirm("Clear the local query cache?", yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            app.client.reset().map_err(miette::Report::new)?;
            if !app.is_quiet() {
                println!("{} Cache cleared", style("✓").green());
            }
            Ok(())
        }
    }
}

fn signed_in_user(app: &mut App) -> Result<User> {
    let result = auth::current_user(&mut app.client);
    app.finish(result)?
        .ok_or_else(|| miette::miette!(help = "run `cdesk login`", "not signed in"))
}
