//! Report export in terminal, HTML, CSV, JSON and YAML form

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{debug, info};

use super::style::{row_style, StylePalette};
use crate::comparison::ComparisonReport;
use crate::utils::error::{ReportError, Result};

/// Output format for the comparison report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[value(name = "table")]
    Table,
    #[default]
    #[value(name = "html")]
    Html,
    #[value(name = "csv")]
    Csv,
    #[value(name = "json")]
    Json,
    #[value(name = "yaml")]
    Yaml,
}

/// Format a p-value for human-readable output
pub fn format_p_value(p: f64) -> String {
    if p.is_nan() {
        "NaN".to_string()
    } else if p != 0.0 && p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

fn display_records(report: &ComparisonReport) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|row| {
            let mut record = vec![
                row.key.category.clone(),
                row.key.comp1.clone(),
                row.key.comp2.clone(),
            ];
            record.extend(row.p_values.iter().map(|&p| format_p_value(p)));
            record
        })
        .collect()
}

/// Render the report as a text table, optionally with row backgrounds
pub fn render_table(report: &ComparisonReport, palette: &StylePalette, colour: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(report.headers());
    for record in display_records(report) {
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::psql());
    let rendered = table.to_string();

    if !colour {
        return rendered;
    }

    // psql style: header, separator, then one line per row
    rendered
        .lines()
        .enumerate()
        .map(|(i, line)| match i.checked_sub(2).and_then(|r| report.rows.get(r)) {
            Some(row) => {
                let (r, g, b) = row_style(row, palette).rgb();
                line.black().on_truecolor(r, g, b).to_string()
            }
            None => line.bold().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the report as a standalone HTML page with per-row background colours
pub fn render_html(report: &ComparisonReport, palette: &StylePalette, title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(
        "<style>\ntable { border-collapse: collapse; font-family: sans-serif; }\n\
         th, td { border: 1px solid #999; padding: 4px 8px; }\n\
         td.p { text-align: right; }\n</style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h2>{}</h2>\n<table>\n<thead><tr>", escape_html(title)));
    for header in report.headers() {
        html.push_str(&format!("<th>{}</th>", escape_html(&header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (row, record) in report.rows.iter().zip(display_records(report)) {
        let style = row_style(row, palette);
        html.push_str(&format!("<tr style=\"{}\">", escape_html(&style.css())));
        for (i, cell) in record.iter().enumerate() {
            if i < 3 {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            } else {
                html.push_str(&format!("<td class=\"p\">{}</td>", escape_html(cell)));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html.push_str(&format!(
        "<p><small>Generated {}</small></p>\n</body>\n</html>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html
}

/// Write the report as CSV with full-precision p-values
pub fn write_csv<W: Write>(report: &ComparisonReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(report.headers())?;
    for row in &report.rows {
        let mut record = vec![
            row.key.category.clone(),
            row.key.comp1.clone(),
            row.key.comp2.clone(),
        ];
        record.extend(row.p_values.iter().map(|p| p.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render the report in the requested format; `title` heads the HTML page
pub fn render(
    report: &ComparisonReport,
    palette: &StylePalette,
    format: ReportFormat,
    title: &str,
    colour: bool,
) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(render_table(report, palette, colour)),
        ReportFormat::Html => Ok(render_html(report, palette, title)),
        ReportFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(report, &mut buffer)?;
            String::from_utf8(buffer)
                .map_err(|e| ReportError::render(format!("CSV output is not UTF-8: {}", e)))
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|e| ReportError::render(format!("YAML serialization failed: {}", e))),
    }
}

/// Export the report to a file, or to stdout when no path is given
pub fn export(
    report: &ComparisonReport,
    palette: &StylePalette,
    format: ReportFormat,
    title: &str,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            let content = render(report, palette, format, title, false)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.exists() {
                    debug!("Creating directory: {}", parent.display());
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
            info!("Wrote {:?} report to {}", format, path.display());
        }
        None => {
            let content = render(report, palette, format, title, true)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
