//! `cdesk login`, `register`, `logout`, `whoami`

use console::style;
use miette::Result;

use crate::api::auth::{self, LoginRequest, RegisterRequest};
use crate::cli::app::App;
use crate::cli::helpers::{prompt_optional, prompt_password, prompt_text};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::route::Route;
use crate::entities::User;

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "CDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long, env = "CDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    app.enter(Route::Login)?;

    let email = match args.email {
        Some(email) => email,
        None => prompt_text("Email", None)?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password", false)?,
    };

    let result = auth::login(&mut app.client, &LoginRequest { email, password });
    let user = app.finish(result)?;
    signed_in(&mut app, &user, global)
}

pub fn run_register(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    app.enter(Route::Register)?;

    let name = match args.name {
        Some(name) => name,
        None => prompt_text("Full name", None)?,
    };
    let email = match args.email {
        Some(email) => email,
        None => prompt_text("Email", None)?,
    };
    let phone = match args.phone {
        Some(phone) => Some(phone),
        None if args.password.is_none() => prompt_optional("Phone (optional)", None)?,
        None => None,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password", true)?,
    };

    let request = RegisterRequest {
        name,
        email,
        password_confirmation: password.clone(),
        password,
        phone,
    };
    let result = auth::register(&mut app.client, &request);
    let user = app.finish(result)?;
    signed_in(&mut app, &user, global)
}

fn signed_in(app: &mut App, user: &User, global: &GlobalOpts) -> Result<()> {
    let landing = app.navigator.landing_after_login();
    if print_structured(user, global.output)? || app.is_quiet() {
        return Ok(());
    }
    println!(
        "{} Signed in as {} <{}>",
        style("✓").green(),
        style(&user.name).cyan(),
        user.email
    );
    println!("   {} {}", style("→").dim(), landing);
    Ok(())
}

/// Always ends signed out, whatever the server says
pub fn run_logout(global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    let outcome = auth::logout(&mut app.client).map_err(miette::Report::new)?;
    app.navigator.replace(outcome.landing);

    if let Some(err) = &outcome.server_error {
        eprintln!(
            "{} server logout failed ({}); local session cleared",
            style("!").yellow(),
            err
        );
    }
    if !app.is_quiet() {
        println!("{} Signed out", style("✓").green());
        println!("   {} {}", style("→").dim(), outcome.landing);
    }
    Ok(())
}

pub fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    let result = auth::current_user(&mut app.client);
    let user = app.finish(result)?.ok_or_else(|| {
        miette::miette!(
            code = "cdesk::auth::required",
            help = "run `cdesk login`",
            "not signed in"
        )
    })?;

    if print_structured(&user, global.output)? {
        return Ok(());
    }
    println!("{} <{}>", style(&user.name).cyan().bold(), user.email);
    if !user.roles.is_empty() {
        println!("{}: {}", style("Roles").bold(), user.role_names());
    }
    Ok(())
}
