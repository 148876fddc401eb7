//! `cdesk lab` command - Lab tests and result documents

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::api::resources::clinical::{self, LAB_RESULT_FIELD};
use crate::cli::app::App;
use crate::cli::entity_cmd::{self, DeleteArgs, EntityConfig, IdArgs, PageArgs};
use crate::cli::filters::LabStatusFilter;
use crate::cli::helpers::{field, load_file, rule};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Resource;
use crate::core::route::{Route, Screen};
use crate::core::Config;
use crate::entities::lab_test::{LabTestFilters, LabTestRequest};
use crate::entities::{LabTest, LabTestStatus};

pub(crate) const LAB_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("visit", "VISIT", 6),
    ColumnDef::new("test", "TEST", 26),
    ColumnDef::new("type", "TYPE", 14),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("result", "RESULT", 30),
    ColumnDef::new("file", "FILE", 4),
];

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    resource: Resource::LabTest,
    route: Route::Healthcare(Screen::LabTests),
    columns: LAB_COLUMNS,
    default_columns: &["id", "visit", "test", "status", "result", "file"],
};

#[derive(Subcommand, Debug)]
pub enum LabCommands {
    /// List lab tests
    List(ListArgs),

    Show(IdArgs),

    /// Order a test on a visit
    New(LabArgs),

    /// Record progress or a result
    Update(UpdateArgs),

    Delete(DeleteArgs),

    /// Attach the result document
    UploadResult(UploadArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long, default_value = "all")]
    pub status: LabStatusFilter,

    #[arg(long)]
    pub visit: Option<u64>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Status values accepted on write
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LabStatusArg {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl From<LabStatusArg> for LabTestStatus {
    fn from(arg: LabStatusArg) -> Self {
        match arg {
            LabStatusArg::Pending => LabTestStatus::Pending,
            LabStatusArg::InProgress => LabTestStatus::InProgress,
            LabStatusArg::Completed => LabTestStatus::Completed,
            LabStatusArg::Cancelled => LabTestStatus::Cancelled,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct LabArgs {
    #[arg(long)]
    pub visit: Option<u64>,

    #[arg(long, short = 'n')]
    pub test: Option<String>,

    /// blood, imaging, urine, ...
    #[arg(long = "type")]
    pub test_type: Option<String>,

    #[arg(long)]
    pub status: Option<LabStatusArg>,

    /// Result summary text
    #[arg(long)]
    pub result: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Result document to upload after saving
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl LabArgs {
    fn request(&self) -> LabTestRequest {
        LabTestRequest {
            visit_id: self.visit,
            test_name: self.test.clone(),
            test_type: self.test_type.clone(),
            status: self.status.map(LabTestStatus::from),
            result: self.result.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: u64,

    #[command(flatten)]
    pub fields: LabArgs,
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// Lab test ID
    pub id: u64,

    pub file: PathBuf,
}

pub fn run(cmd: LabCommands, global: &GlobalOpts) -> Result<()> {
    let mut app = App::bootstrap(global)?;
    match cmd {
        LabCommands::List(args) => {
            let filters = LabTestFilters {
                search: args.search,
                status: args.status.status(),
                visit_id: args.visit,
            }
            .to_filters();
            entity_cmd::run_list(&mut app, &ENTITY_CONFIG, &filters, &args.page, global, lab_row)
        }
        LabCommands::Show(args) => {
            let config = app.config.clone();
            entity_cmd::run_show(&mut app, &ENTITY_CONFIG, args.id, global, |t: &LabTest| {
                print_lab_test(&config, t)
            })
        }
        LabCommands::New(args) => {
            if args.visit.is_none() || args.test.is_none() {
                return Err(miette::miette!("a lab test needs --visit and --test"));
            }
            let file = args
                .file
                .as_deref()
                .map(|p| load_file(LAB_RESULT_FIELD, p))
                .transpose()?;
            entity_cmd::run_create::<LabTest, _>(&mut app, &ENTITY_CONFIG, &args.request(), file, global)?;
            Ok(())
        }
        LabCommands::Update(args) => {
            let file = args
                .fields
                .file
                .as_deref()
                .map(|p| load_file(LAB_RESULT_FIELD, p))
                .transpose()?;
            entity_cmd::run_update::<LabTest, _>(
                &mut app,
                &ENTITY_CONFIG,
                args.id,
                &args.fields.request(),
                file.map(|f| ("result", f)),
                global,
            )?;
            Ok(())
        }
        LabCommands::Delete(args) => entity_cmd::run_delete(&mut app, &ENTITY_CONFIG, &args),
        LabCommands::UploadResult(args) => {
            app.enter(ENTITY_CONFIG.route)?;
            let file = load_file(LAB_RESULT_FIELD, &args.file)?;
            let test = app.mutate(|client| clinical::upload_lab_result(client, args.id, file))?;
            entity_cmd::print_saved(&test, "Uploaded result for", global);
            Ok(())
        }
    }
}

pub(crate) fn lab_row(t: &LabTest) -> TableRow {
    TableRow::new(t.id)
        .cell("id", CellValue::Id(t.id))
        .cell("visit", CellValue::Id(t.visit_id))
        .cell("test", CellValue::Text(t.test_name.clone()))
        .cell("type", CellValue::opt(t.test_type.as_deref()))
        .cell("status", CellValue::Status(t.status.to_string()))
        .cell("result", CellValue::opt(t.result.as_deref()))
        .cell("file", CellValue::Flag(t.result_file.is_some()))
}

fn print_lab_test(config: &Config, t: &LabTest) {
    rule();
    println!("{}: {}", style("ID").bold(), style(t.id).cyan());
    println!("{}: {}", style("Test").bold(), style(&t.test_name).yellow());
    field("Type", t.test_type.as_deref());
    println!("{}: #{}", style("Visit").bold(), t.visit_id);
    let status = match t.status {
        LabTestStatus::Completed => style(t.status.to_string()).green(),
        LabTestStatus::Cancelled => style(t.status.to_string()).red(),
        _ => style(t.status.to_string()).yellow(),
    };
    println!("{}: {}", style("Status").bold(), status);
    field("Ordered", t.ordered_at.map(|d| d.format("%Y-%m-%d %H:%M")));
    field("Completed", t.completed_at.map(|d| d.format("%Y-%m-%d %H:%M")));
    field("Result", t.result.as_deref());
    field("Result file", t.result_file.as_deref().map(|p| config.storage_url(p)));
    rule();
    if let Some(notes) = &t.notes {
        println!("{}", notes);
    }
}
