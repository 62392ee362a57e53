#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub color: bool,
}

/// Render an aligned table. Cells in the `status` column are colored when enabled.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(6)
        })
        .collect();

    let status_column = headers.iter().position(|header| *header == "status");

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| format_cell(header, *width, false))
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(header_line.chars().count());

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let colored = options.color && status_column == Some(index);
                let padded = format_cell(value, *width, looks_numeric(value));
                if colored {
                    colorize_status(value, &padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line.trim_end().to_string());
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | '/'))
}

fn format_cell(value: &str, width: usize, numeric: bool) -> String {
    let pad = width.saturating_sub(value.chars().count());
    if numeric {
        format!("{}{}", " ".repeat(pad), value)
    } else {
        format!("{}{}", value, " ".repeat(pad))
    }
}

/// Wrap the padded cell in an ANSI color chosen from the bare status value.
fn colorize_status(value: &str, padded: &str) -> String {
    let code = match value {
        "completed" | "ready" | "restored" | "integrated" | "present" | "pass" => Some("32"),
        "degraded" | "skipped" | "stub" | "synthesized" | "partial" | "standard_mode"
        | "absent" => Some("33"),
        "failed" | "fail" | "aborted" | "rolled_back" | "restore_failed" => Some("31"),
        _ => None,
    };

    match code {
        Some(code) => format!("\u{1b}[{code}m{padded}\u{1b}[0m"),
        None => padded.to_string(),
    }
}
