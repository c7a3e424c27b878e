//! Terminal tables for analysis and selection results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CategoricalInfluence, RankedFeature, SymmetryCheck};

fn section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

// Indent the table
fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the skewness of each numeric column
pub fn display_symmetry(checks: &[SymmetryCheck], tolerance: f64) {
    section_header("📐", "SYMMETRY");

    let mut table = new_table(&["Column", "Skewness", "Symmetric"]);
    for check in checks {
        table.add_row(vec![
            Cell::new(&check.name),
            Cell::new(format!("{:.4}", check.skewness)).set_alignment(CellAlignment::Right),
            if check.symmetric {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::Yellow)
            },
        ]);
    }
    print_indented(&table);

    let symmetric = checks.iter().filter(|c| c.symmetric).count();
    println!();
    println!(
        "      {} of {} column(s) symmetric {}",
        style(symmetric).yellow().bold(),
        checks.len(),
        style(format!("(|skew| < {})", tolerance)).dim()
    );
}

/// Print numeric dependencies ranked by |r|
pub fn display_numeric_ranking(ranking: &[RankedFeature]) {
    section_header("🔗", "NUMERIC DEPENDENCIES");

    if ranking.is_empty() {
        println!("      {}", style("No dependent numeric variables").dim());
        return;
    }

    let mut table = new_table(&["Rank", "Variable", "|r|"]);
    for (i, feature) in ranking.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&feature.name),
            Cell::new(format!("{:.4}", feature.strength)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

/// Print categorical variables ranked by F statistic
pub fn display_categorical_ranking(influences: &[CategoricalInfluence]) {
    section_header("🏷️", "CATEGORICAL INFLUENCE");

    if influences.is_empty() {
        println!("      {}", style("No influential categorical variables").dim());
        return;
    }

    let mut table = new_table(&["Rank", "Variable", "F statistic"]);
    for (i, influence) in influences.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&influence.name),
            Cell::new(format!("{:.4}", influence.f_statistic)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

/// Summary of a feature selection run
#[derive(Debug, Default)]
pub struct SelectionSummary {
    pub initial_columns: usize,
    pub excluded: usize,
    pub numeric_selected: Vec<String>,
    pub categorical_selected: Vec<String>,
    pub final_features: usize,
    pub train_rows: Option<usize>,
    pub test_rows: Option<usize>,
}

impl SelectionSummary {
    pub fn new(initial_columns: usize) -> Self {
        Self {
            initial_columns,
            ..Default::default()
        }
    }

    pub fn display(&self) {
        section_header("📋", "SELECTION SUMMARY");

        let mut table = new_table(&["Metric", "Value"]);
        table.add_row(vec![
            Cell::new("📁 Initial Columns"),
            Cell::new(self.initial_columns),
        ]);
        if self.excluded > 0 {
            table.add_row(vec![
                Cell::new("🚫 Excluded"),
                Cell::new(self.excluded).fg(Color::Red),
            ]);
        }
        table.add_row(vec![
            Cell::new("🔢 Numeric Selected"),
            Cell::new(self.numeric_selected.len()),
        ]);
        table.add_row(vec![
            Cell::new("🏷️  Categorical Selected"),
            Cell::new(self.categorical_selected.len()),
        ]);
        table.add_row(vec![
            Cell::new("✅ Final Features"),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        if let (Some(train), Some(test)) = (self.train_rows, self.test_rows) {
            table.add_row(vec![Cell::new("🏋️ Train Rows"), Cell::new(train)]);
            table.add_row(vec![Cell::new("🧪 Test Rows"), Cell::new(test)]);
        }
        print_indented(&table);

        let selected: Vec<&String> = self
            .numeric_selected
            .iter()
            .chain(&self.categorical_selected)
            .collect();
        if !selected.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Selected Variables").yellow(),
                style(format!("({})", selected.len())).dim()
            );
            for feature in selected {
                println!("        {} {}", style("•").dim(), feature);
            }
        }
    }
}
