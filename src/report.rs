//! Plain-text tables for the command-line report.

use crate::basket::BasketTable;
use crate::stats::{ProductStats, StatsColumn};
use std::fmt::Write;

const STATS_COLUMNS: [(StatsColumn, &str); 8] = [
    (StatsColumn::Product, "Product"),
    (StatsColumn::ObservationCount, "Prices"),
    (StatsColumn::AveragePrice, "Average"),
    (StatsColumn::FirstDate, "First Date"),
    (StatsColumn::FirstPrice, "First"),
    (StatsColumn::LatestDate, "Latest Date"),
    (StatsColumn::LatestPrice, "Latest"),
    (StatsColumn::AnnualizedGrowth, "Annualized"),
];

/// Renders product statistics as an aligned text table.
pub fn format_stats_table(stats: &[ProductStats]) -> String {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| STATS_COLUMNS.iter().map(|(col, _)| s.cell(*col)).collect())
        .collect();
    let headers: Vec<&str> = STATS_COLUMNS.iter().map(|(_, name)| *name).collect();
    render(&headers, &rows)
}

/// Renders basket products by period, with estimates marked `*` and a totals row.
pub fn format_basket_table(table: &BasketTable) -> String {
    let period_labels: Vec<String> = table.periods.iter().map(|p| p.to_string()).collect();
    let mut headers: Vec<&str> = vec!["Product"];
    headers.extend(period_labels.iter().map(String::as_str));

    let mut rows: Vec<Vec<String>> = table
        .products
        .iter()
        .map(|series| {
            let mut row = vec![series.product.clone()];
            row.extend(series.values.iter().map(|v| match v.value {
                Some(value) if v.is_estimated => format!("{:.2}*", value),
                Some(value) => format!("{:.2}", value),
                None => "-".to_string(),
            }));
            row
        })
        .collect();

    let mut totals = vec!["Total".to_string()];
    totals.extend(table.totals.iter().map(|t| format!("{:.2}", t)));
    rows.push(totals);

    render(&headers, &rows)
}

fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, width))| {
            // First column is text, the rest are numbers
            if idx == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
