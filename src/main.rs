use clap::Parser;
use clinicdesk::cli::commands;
use clinicdesk::cli::{Cli, Commands, GlobalOpts};
use miette::Result;
use tracing_subscriber::EnvFilter;

/// `CDESK_LOG` takes a full filter directive and overrides `-v`
const LOG_ENV: &str = "CDESK_LOG";

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(&cli.global);
    let global = &cli.global;

    match cli.command {
        Commands::Login(args) => commands::auth::run_login(args, global),
        Commands::Register(args) => commands::auth::run_register(args, global),
        Commands::Logout => commands::auth::run_logout(global),
        Commands::Whoami => commands::auth::run_whoami(global),
        Commands::Dashboard => commands::dashboard::run(global),
        Commands::Settings(cmd) => commands::settings::run(cmd, global),
        Commands::Config(cmd) => commands::config::run(cmd, global),
        Commands::User(cmd) => commands::user::run(cmd, global),
        Commands::Role(cmd) => commands::role::run(cmd, global),
        Commands::Company(cmd) => commands::company::run(cmd, global),
        Commands::Specialty(cmd) => commands::specialty::run(cmd, global),
        Commands::Clinic(cmd) => commands::clinic::run(cmd, global),
        Commands::Doctor(cmd) => commands::doctor::run(cmd, global),
        Commands::Schedule(cmd) => commands::schedule::run(cmd, global),
        Commands::Patient(cmd) => commands::patient::run(cmd, global),
        Commands::Appointment(cmd) => commands::appointment::run(cmd, global),
        Commands::Visit(cmd) => commands::visit::run(cmd, global),
        Commands::Rx(cmd) => commands::rx::run(cmd, global),
        Commands::Lab(cmd) => commands::lab::run(cmd, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Diagnostics go to stderr so piped output stays clean
fn init_logging(global: &GlobalOpts) {
    let level = match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("clinicdesk={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(global.verbose > 1)
        .without_time()
        .init();
}
