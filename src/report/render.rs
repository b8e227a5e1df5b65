// Plain text rendering of a report.

use std::fmt::Write;

use crate::report::*;

/// Aligns a grid of cells: the first column to the left, the others to the
/// right. A separator follows the header. With `totals`, the last row is the
/// totals row and gets a separator too.
pub fn format_grid(grid: &[Vec<String>], totals: bool) -> String {
    let num_cols = grid.iter().map(|r| r.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..num_cols)
        .map(|idx| {
            grid.iter()
                .filter_map(|r| r.get(idx))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<String>>()
        .join("-+-");

    let mut out = String::new();
    for (ridx, row) in grid.iter().enumerate() {
        if totals && ridx > 1 && ridx + 1 == grid.len() {
            out.push_str(&separator);
            out.push('\n');
        }
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(cidx, w)| {
                let c = row.get(cidx).map(|s| s.as_str()).unwrap_or("");
                let pad = " ".repeat(w - c.chars().count());
                if cidx == 0 {
                    format!("{}{}", c, pad)
                } else {
                    format!("{}{}", pad, c)
                }
            })
            .collect();
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
        if ridx == 0 {
            out.push_str(&separator);
            out.push('\n');
        }
    }
    out
}

fn top_line(title: &str, top: &Option<(BucketKey, usize)>) -> String {
    match top {
        Some((k, c)) => format!("{}: {} ({})\n", title, k.label, c),
        None => format!("{}: -\n", title),
    }
}

fn detail_grid(events: &[DepartureEvent]) -> Vec<Vec<String>> {
    let mut grid = vec![vec![
        "Nº pers.".to_string(),
        "Apellido".to_string(),
        "Nombre".to_string(),
        "Línea".to_string(),
        "Categoría".to_string(),
        "Fecha".to_string(),
        "Motivo".to_string(),
        "Tipo".to_string(),
    ]];
    for e in events.iter() {
        grid.push(vec![
            e.employee_id.clone(),
            e.last_name.clone(),
            e.first_name.clone(),
            e.org_line.clone(),
            e.category.clone(),
            e.effective_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| pivot::EMPTY_CELL.to_string()),
            e.reason.clone(),
            e.exit.label().to_string(),
        ]);
    }
    grid
}

/// The full text report: headline figures, notices, summary tables and the
/// list of departures. With a search text, only the matching departures are
/// listed.
pub fn render_report(report: &Report, search: Option<&str>) -> String {
    let rec = &report.reconciliation;
    let k = &report.kpis;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", report.settings.report_name);
    let _ = writeln!(out, "{}", "=".repeat(report.settings.report_name.chars().count()));
    if let Some(author) = &report.settings.author {
        let _ = writeln!(out, "Autor: {}", author);
    }
    let _ = writeln!(out, "Período: {}", k.date_span());
    let _ = writeln!(out, "Total de salidas: {}", k.total);
    let _ = writeln!(
        out,
        "  {}: {}",
        ExitCategory::SystemDeactivation.label(),
        k.system_deactivations
    );
    let _ = writeln!(
        out,
        "  {}: {} (sin registro en {}: {})",
        ExitCategory::OrganizationalChange.label(),
        k.organizational_changes,
        LEDGER_TABLE,
        k.unresolved_changes
    );
    out.push_str(&top_line("Motivo principal", &k.top_reason));
    out.push_str(&top_line("Línea principal", &k.top_line));
    out.push_str(&top_line("Categoría principal", &k.top_category));
    out.push_str(&top_line("Mes con más salidas", &k.top_month));

    if !rec.notices.is_empty() {
        let _ = writeln!(out, "\nAvisos:");
        for n in rec.notices.iter() {
            let _ = writeln!(out, "  - {}", n);
        }
    }
    if !rec.unclassified.is_empty() {
        let _ = writeln!(out, "\nSin clasificar:");
        for u in rec.unclassified.iter() {
            let _ = writeln!(out, "  - {} ({})", u.employee_id, u.status);
        }
    }

    for t in report.tables.iter() {
        let _ = writeln!(out, "\n{}", t.title);
        out.push_str(&format_grid(&t.table.render(), true));
        if t.table.skipped > 0 {
            let _ = writeln!(out, "({} sin fecha)", t.table.skipped);
        }
    }

    let listed = match search {
        Some(q) => filter_by_text(&rec.events, q),
        None => rec.events.clone(),
    };
    match search {
        Some(q) => {
            let _ = writeln!(out, "\nDetalle ({:?}: {} de {})", q, listed.len(), rec.events.len());
        }
        None => {
            let _ = writeln!(out, "\nDetalle ({})", listed.len());
        }
    }
    out.push_str(&format_grid(&detail_grid(&listed), false));
    out
}
