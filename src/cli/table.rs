//! Table rendering for list commands
//!
//! A command declares its columns once as a `&[ColumnDef]` and converts each
//! record to a [`TableRow`]; the formatter renders the requested subset of
//! columns as a bordered table, TSV, CSV, or bare IDs.

use chrono::NaiveDate;
use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::{Style, Width};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;

/// One column a list command can display
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A typed cell, rendered per output format
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    OptText(Option<String>),
    Id(u64),
    Count(u64),
    Money(Option<f64>),
    Flag(bool),
    Date(Option<NaiveDate>),
    Status(String),
}

impl CellValue {
    pub fn opt(value: Option<&str>) -> Self {
        CellValue::OptText(value.map(str::to_string))
    }

    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Status(s) => s.clone(),
            CellValue::OptText(s) => s.clone().unwrap_or_else(|| "-".to_string()),
            CellValue::Id(id) | CellValue::Count(id) => id.to_string(),
            CellValue::Money(Some(v)) => format!("{:.2}", v),
            CellValue::Money(None) => "-".to_string(),
            CellValue::Flag(true) => "yes".to_string(),
            CellValue::Flag(false) => "no".to_string(),
            CellValue::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            CellValue::Date(None) => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableRow {
    id: u64,
    cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// Wrap the bordered table at this total width
    pub wrap: Option<usize>,
}

impl TableConfig {
    pub fn with_wrap(width: usize) -> Self {
        Self { wrap: Some(width) }
    }
}

pub struct TableFormatter {
    columns: &'static [ColumnDef],
    config: TableConfig,
}

impl TableFormatter {
    pub fn new(columns: &'static [ColumnDef]) -> Self {
        Self {
            columns,
            config: TableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    fn visible_columns(&self, visible: &[&str]) -> Vec<&'static ColumnDef> {
        if visible.is_empty() {
            return self.columns.iter().collect();
        }
        visible
            .iter()
            .filter_map(|key| self.columns.iter().find(|c| c.key == *key))
            .collect()
    }

    /// Render rows as a string in the given format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) -> Result<String> {
        let columns = self.visible_columns(visible);
        let value = |row: &TableRow, col: &ColumnDef| {
            row.get(col.key)
                .map(CellValue::render)
                .unwrap_or_else(|| "-".to_string())
        };

        match format {
            OutputFormat::Id => Ok(rows
                .iter()
                .map(|r| format!("{}\n", r.id()))
                .collect::<String>()),
            OutputFormat::Tsv => {
                let mut out = columns
                    .iter()
                    .map(|c| c.header)
                    .collect::<Vec<_>>()
                    .join("\t");
                out.push('\n');
                for row in rows {
                    let line: Vec<String> = columns
                        .iter()
                        .map(|c| truncate_str(&value(row, c).replace(['\t', '\n'], " "), c.width))
                        .collect();
                    out.push_str(&line.join("\t"));
                    out.push('\n');
                }
                Ok(out)
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer
                    .write_record(columns.iter().map(|c| c.key))
                    .into_diagnostic()?;
                for row in rows {
                    writer
                        .write_record(columns.iter().map(|c| value(row, c)))
                        .into_diagnostic()?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| miette::miette!("cannot flush CSV output: {}", e.error()))?;
                String::from_utf8(bytes).into_diagnostic()
            }
            _ => {
                let mut builder = Builder::default();
                builder.push_record(columns.iter().map(|c| c.header.to_string()));
                for row in rows {
                    builder.push_record(
                        columns
                            .iter()
                            .map(|c| truncate_str(&value(row, c), c.width)),
                    );
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                if let Some(width) = self.config.wrap {
                    table.with(Width::wrap(width));
                }
                Ok(format!("{}\n", table))
            }
        }
    }

    pub fn output(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) -> Result<()> {
        print!("{}", self.render(rows, format, visible)?);
        Ok(())
    }
}
