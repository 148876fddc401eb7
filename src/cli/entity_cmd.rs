//! Shared entity command infrastructure
//!
//! Every entity command group has the same list/show/create/update/delete
//! shape; the generic halves live here and the entity modules supply
//! columns, rows, request bodies and the detail view.

use console::style;
use miette::Result;
use serde::Serialize;

use crate::api::resources;
use crate::api::FileUpload;
use crate::cli::app::App;
use crate::cli::helpers::{confirm, print_done};
use crate::cli::output::{print_page, print_record, ListView};
use crate::cli::table::{ColumnDef, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::core::route::Route;

// =========================================================================
// Entity Configuration
// =========================================================================

/// Static configuration for an entity command group
pub struct EntityConfig {
    pub resource: Resource,
    /// Screen the commands belong to (guarded on entry)
    pub route: Route,
    pub columns: &'static [ColumnDef],
    /// Columns shown when `--columns` is not given
    pub default_columns: &'static [&'static str],
}

/// Paging and presentation flags shared by list commands
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: u32,

    /// Columns to display (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Wrap the table at this width
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,

    /// Show only the total count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Record ID
    pub id: u64,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Record ID
    pub id: u64,

    /// Skip the confirmation dialog
    #[arg(long, short = 'y')]
    pub yes: bool,
}

// =========================================================================
// Generic Commands
// =========================================================================

pub fn run_list<T: Record>(
    app: &mut App,
    config: &EntityConfig,
    filters: &Filters,
    args: &PageArgs,
    global: &GlobalOpts,
    to_row: impl Fn(&T) -> TableRow,
) -> Result<()> {
    app.enter(config.route)?;
    let result = app.client.list::<T>(args.page, filters);
    let page = app.finish(result)?;

    if args.count {
        println!("{}", page.meta.total);
        return Ok(());
    }

    let visible: Vec<&str> = if args.columns.is_empty() {
        config.default_columns.to_vec()
    } else {
        args.columns.iter().map(String::as_str).collect()
    };
    let view = ListView {
        columns: config.columns,
        visible,
        name_plural: config.resource.name_plural(),
        wrap: args.wrap,
    };
    print_page(&page, global.output, &view, to_row)
}

pub fn run_show<T: Record>(
    app: &mut App,
    config: &EntityConfig,
    id: u64,
    global: &GlobalOpts,
    pretty: impl FnOnce(&T),
) -> Result<()> {
    app.enter(config.route)?;
    let record = fetch::<T>(app, id)?;
    print_record(&record, global.output, pretty)
}

/// Load one record through the cache; id 0 is refused without a request
pub fn fetch<T: Record>(app: &mut App, id: u64) -> Result<T> {
    let result = app.client.query_detail::<T>(id);
    app.finish(result)?.ok_or_else(|| {
        miette::miette!(
            code = "cdesk::select",
            "No {} selected (id must be a positive number)",
            T::RESOURCE.name()
        )
    })
}

pub fn run_create<T: Record, B: Serialize>(
    app: &mut App,
    config: &EntityConfig,
    body: &B,
    file: Option<FileUpload>,
    global: &GlobalOpts,
) -> Result<T> {
    app.enter(config.route)?;
    let record = app.mutate(|client| resources::create::<T, B>(client, body, file))?;
    print_saved(&record, "Created", global);
    Ok(record)
}

/// Update fields, then upload the file if one was given
pub fn run_update<T: Record, B: Serialize>(
    app: &mut App,
    config: &EntityConfig,
    id: u64,
    body: &B,
    file: Option<(&str, FileUpload)>,
    global: &GlobalOpts,
) -> Result<T> {
    app.enter(config.route)?;
    let record = app
        .observe(|client| resources::update_with_file::<T, B>(client, id, body, file))
        .map_err(miette::Report::new)?;
    print_saved(&record, "Updated", global);
    Ok(record)
}

pub fn run_delete(app: &mut App, config: &EntityConfig, args: &DeleteArgs) -> Result<()> {
    app.enter(config.route)?;
    let prompt = format!("Delete {} #{}?", config.resource.name(), args.id);
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    let resource = config.resource;
    app.mutate(|client| resources::delete(client, resource, args.id))?;
    if !app.is_quiet() {
        print_done("Deleted", resource.name(), &format!("#{}", args.id));
    }
    Ok(())
}

/// Confirmation line after a create or update
pub fn print_saved<T: Record>(record: &T, action: &str, global: &GlobalOpts) {
    match global.output {
        OutputFormat::Id => println!("{}", record.id()),
        OutputFormat::Json | OutputFormat::Yaml => {
            if let Err(e) = crate::cli::output::print_structured(record, global.output) {
                eprintln!("{} {}", style("!").yellow(), e);
            }
        }
        _ if global.quiet => {}
        _ => print_done(
            action,
            T::RESOURCE.name(),
            &format!("#{} {}", record.id(), record.label()),
        ),
    }
}

/// Refuse an action the record's status does not offer
pub fn refuse(action: &str, what: &str, status: impl std::fmt::Display) -> miette::Report {
    miette::miette!(
        code = "cdesk::action_unavailable",
        "cannot {} a {} {}; no request was sent",
        action,
        status,
        what
    )
}
