//! `cdesk dashboard` - platform totals

use console::style;
use miette::Result;

use crate::api::auth;
use crate::api::resources::dashboard;
use crate::cli::app::App;
use crate::cli::helpers::rule;
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::route::Route;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    app.enter(Route::Dashboard)?;

    let result = auth::current_user(&mut app.client);
    let user = app.finish(result)?;
    let today = chrono::Local::now().date_naive();
    let result = dashboard::summary(&mut app.client, today);
    let summary = app.finish(result)?;

    if print_structured(&summary, global.output)? {
        return Ok(());
    }

    if let Some(user) = user {
        println!("Welcome back, {}", style(&user.name).cyan().bold());
    }
    rule();
    for (name, total) in &summary.totals {
        println!("{:<20} {}", style(name).bold(), style(total).yellow());
    }
    rule();
    println!(
        "{:<20} {}",
        style(format!("today ({})", today)).bold(),
        summary.appointments_today
    );
    println!("{:<20} {}", style("awaiting confirm").bold(), summary.booked_appointments);
    println!("{:<20} {}", style("pending lab tests").bold(), summary.pending_lab_tests);
    Ok(())
}
