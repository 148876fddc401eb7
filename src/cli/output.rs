//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::api::Page;
use crate::cli::table::{ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::OutputFormat;
use crate::core::entity::Record;

/// Determine the effective output format based on context
///
/// `Auto` becomes a table for lists and stays `Auto` (the detail view) for
/// single records.
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto if is_list => OutputFormat::Table,
        other => other,
    }
}

/// Print a serializable value as JSON or YAML; false when the format is neither
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print one record; `pretty` renders the detail view
pub fn print_record<T: Record>(record: &T, format: OutputFormat, pretty: impl FnOnce(&T)) -> Result<()> {
    let format = effective_format(format, false);
    if print_structured(record, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Id => println!("{}", record.id()),
        _ => pretty(record),
    }
    Ok(())
}

/// How a list command renders its page
pub struct ListView<'a> {
    pub columns: &'static [ColumnDef],
    pub visible: Vec<&'a str>,
    pub name_plural: &'a str,
    pub wrap: Option<usize>,
}

/// Print a page of records with a pagination footer
pub fn print_page<T: Record>(
    page: &Page<T>,
    format: OutputFormat,
    view: &ListView<'_>,
    to_row: impl Fn(&T) -> TableRow,
) -> Result<()> {
    let format = effective_format(format, true);
    if print_structured(&page.items, format)? {
        return Ok(());
    }

    if page.is_empty() {
        if !format.is_machine() {
            println!("No {} found.", view.name_plural);
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = page.items.iter().map(to_row).collect();
    let config = view.wrap.map(TableConfig::with_wrap).unwrap_or_default();
    TableFormatter::new(view.columns)
        .with_config(config)
        .output(&rows, format, &view.visible)?;

    if !format.is_machine() {
        print_footer(page, view.name_plural);
    }
    Ok(())
}

fn print_footer<T>(page: &Page<T>, name_plural: &str) {
    let meta = page.meta;
    let mut line = format!(
        "Page {} of {} ({} {})",
        meta.current_page,
        meta.last_page.max(1),
        meta.total,
        name_plural
    );
    if meta.has_next() {
        line.push_str(&format!(" · next: --page {}", meta.current_page + 1));
    }
    println!("{}", style(line).dim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_format() {
        assert_eq!(effective_format(OutputFormat::Auto, true), OutputFormat::Table);
        assert_eq!(effective_format(OutputFormat::Auto, false), OutputFormat::Auto);
        assert_eq!(effective_format(OutputFormat::Csv, true), OutputFormat::Csv);
    }
}
