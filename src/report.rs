//! Plain-text rendering of a [`Comparison`] for the terminal.

use std::fmt::Write;

use crate::core::{Comparison, format_crores, milestone_label, to_fixed};

const YEAR_COLUMN_WIDTH: usize = 6;
const VALUE_COLUMN_MIN_WIDTH: usize = 14;
const EMPTY_CELL: &str = "—";

pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    render_table(&mut out, comparison);
    out.push('\n');
    render_summary(&mut out, comparison);
    out.push('\n');
    render_milestones(&mut out, comparison);
    out
}

fn render_table(out: &mut String, comparison: &Comparison) {
    let widths = comparison
        .scenarios
        .iter()
        .map(|s| s.name.chars().count().max(VALUE_COLUMN_MIN_WIDTH))
        .collect::<Vec<_>>();

    let _ = write!(out, "{:<YEAR_COLUMN_WIDTH$}", "Year");
    for (scenario, &width) in comparison.scenarios.iter().zip(&widths) {
        let _ = write!(out, " {:>width$}", scenario.name);
    }
    out.push('\n');

    for row in &comparison.table {
        let _ = write!(out, "{:<YEAR_COLUMN_WIDTH$}", row.year);
        for (value, &width) in row.values.iter().zip(&widths) {
            let cell = value.map_or_else(|| EMPTY_CELL.to_string(), format_crores);
            let _ = write!(out, " {cell:>width$}");
        }
        out.push('\n');
    }
}

fn render_summary(out: &mut String, comparison: &Comparison) {
    let Some(summary) = &comparison.summary else {
        out.push_str("No results to summarize\n");
        return;
    };
    let _ = writeln!(
        out,
        "Best Scenario:   {} ({})",
        summary.best.name,
        format_crores(summary.best.value)
    );
    let _ = writeln!(
        out,
        "Lowest Scenario: {} ({})",
        summary.worst.name,
        format_crores(summary.worst.value)
    );
    let _ = writeln!(
        out,
        "Difference:      {} ({}% more)",
        format_crores(summary.difference),
        to_fixed(summary.percent_difference, 1)
    );
}

fn render_milestones(out: &mut String, comparison: &Comparison) {
    out.push_str("Milestones (real value)\n");
    for row in &comparison.milestones {
        let reached = row
            .reached
            .iter()
            .map(|r| format!("{}: {}", r.name, r.describe()))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "  {:<8} {reached}", milestone_label(row.threshold));
    }
}
