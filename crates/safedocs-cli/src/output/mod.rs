use serde::Serialize;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Tabular view of a report, used for `--format table`.
pub trait TableView {
    fn headers(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Render a report in the requested format.
pub fn render<T: Serialize + TableView>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(value)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a report in the requested format.
pub fn output<T: Serialize + TableView>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table<T: TableView>(value: &T) -> String {
    let prefs = ui::prefs();
    let options = table::TableOptions {
        color: prefs.table_color,
    };

    let rows = value.rows();
    if rows.is_empty() {
        return String::from("(no rows)");
    }
    table::render_table(&value.headers(), &rows, options)
}
