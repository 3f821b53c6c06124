use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ems_model::{DataQualityFinding, FindingSeverity};
use ems_report::{CompletenessRow, CountTable, IntervalStats, SummaryReport};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    let summary = &result.run.summary;
    println!("Workbook: {}", result.workbook.display());
    if let Some(dir) = &result.output_dir {
        println!("Output: {}", dir.display());
    }
    if let Some(digest) = &summary.digests.workbook_sha256 {
        println!("Workbook SHA-256: {digest}");
    }
    if let Some(digest) = &summary.digests.combined_csv_sha256 {
        println!("Combined record SHA-256: {digest}");
    }

    print_cohorts(summary);
    for counts in [
        &summary.age_groups,
        &summary.gender,
        &summary.race,
        &summary.interventions,
    ] {
        print_counts(counts);
    }
    print_intervals(&summary.intervals);
    print_completeness(&summary.completeness);
    print_findings(&summary.quality.findings);
}

fn print_cohorts(summary: &SummaryReport) {
    let sizes = summary.cohorts;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Cohort"), header_cell("Incidents")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in [
        ("All incidents", sizes.all),
        ("Clean intervals", sizes.clean),
        ("Cardiac arrest", sizes.cardiac_arrest),
        ("Cardiac arrest, clean intervals", sizes.clean_cardiac_arrest),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("{table}");
}

fn print_counts(counts: &CountTable) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(&counts.title),
        header_cell("n"),
        header_cell("%"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for row in &counts.rows {
        let count = if row.count == 0 {
            dim_cell(row.count)
        } else {
            Cell::new(row.count)
        };
        table.add_row(vec![
            Cell::new(&row.label),
            count,
            Cell::new(format!("{:.1}", row.percent)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(counts.total).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn print_intervals(intervals: &[IntervalStats]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Interval (min)"),
        header_cell("n"),
        header_cell("Mean"),
        header_cell("P10"),
        header_cell("P25"),
        header_cell("Median"),
        header_cell("P75"),
        header_cell("P90"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stats in intervals {
        table.add_row(vec![
            Cell::new(&stats.column),
            Cell::new(stats.n),
            minutes_cell(stats.mean),
            minutes_cell(stats.p10),
            minutes_cell(stats.p25),
            minutes_cell(stats.p50),
            minutes_cell(stats.p75),
            minutes_cell(stats.p90),
        ]);
    }
    println!("{table}");
}

fn print_completeness(rows: &[CompletenessRow]) {
    let Some(first) = rows.first() else {
        return;
    };
    let mut header = vec![header_cell("Age group"), header_cell("n")];
    header.extend(first.columns.iter().map(|column| header_cell(&column.column)));
    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=first.columns.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        let mut cells = vec![Cell::new(&row.age_group), Cell::new(row.n)];
        cells.extend(
            row.columns
                .iter()
                .map(|column| percent_cell(column.percent)),
        );
        table.add_row(cells);
    }
    println!();
    println!("Completeness (% non-missing):");
    println!("{table}");
}

fn print_findings(findings: &[DataQualityFinding]) {
    if findings.is_empty() {
        return;
    }
    let mut ordered: Vec<&DataQualityFinding> = findings.iter().collect();
    ordered.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.table.cmp(&b.table))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Finding"),
        header_cell("Table"),
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for finding in ordered {
        table.add_row(vec![
            severity_cell(finding.severity),
            Cell::new(finding.kind),
            Cell::new(&finding.table),
            Cell::new(finding.column.as_deref().unwrap_or("-")),
            Cell::new(finding.count).fg(severity_color(finding.severity)),
            Cell::new(&finding.message),
        ]);
    }
    println!();
    println!("Data quality:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn minutes_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.1}")),
        None => dim_cell("-"),
    }
}

fn percent_cell(percent: f64) -> Cell {
    let cell = Cell::new(format!("{percent:.1}"));
    if percent < 80.0 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn severity_cell(severity: FindingSeverity) -> Cell {
    Cell::new(severity).fg(severity_color(severity))
}

fn severity_color(severity: FindingSeverity) -> Color {
    match severity {
        FindingSeverity::Warning => Color::Yellow,
        FindingSeverity::Info => Color::Blue,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
