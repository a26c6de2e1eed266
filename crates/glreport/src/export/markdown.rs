use chrono::NaiveDate;
use glreport_core::dump::{ReportDump, SectionDump};

use super::period_line;

const TOTAL_COLUMN: &str = "Number of Issues";

/// Markdown document with one table per section
pub fn render(dump: &ReportDump, today: NaiveDate) -> String {
    let mut out = format!("# {}\n\n", dump.title);

    if let Some(image) = &dump.image {
        out.push_str(&format!("![{}]({})\n\n", dump.title, image));
    }
    if let Some(period) = period_line(dump, today) {
        out.push_str(&period);
        out.push('\n');
    }

    for section in &dump.sections {
        out.push_str(&format!("\n## {}\n\n", section.title));
        push_table(&mut out, section);
    }

    out
}

/// Escape the pipes of a table cell so it stays in its column
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn width(text: &str) -> usize {
    text.chars().count().max(1)
}

fn separator(width: usize) -> String {
    format!(":{}|", "-".repeat(width - 1))
}

/// Cells are padded to their header width: group titles to the left, counts to the right
fn push_table(out: &mut String, section: &SectionDump) {
    if section.groups.is_empty() {
        out.push_str("No issues found.\n");
        return;
    }

    let titles: Vec<String> = section.column_titles().into_iter().map(cell).collect();
    let group_width = section
        .groups
        .iter()
        .map(|group| width(&cell(&group.title)))
        .max()
        .unwrap_or(1);
    let total_width = width(TOTAL_COLUMN);

    out.push('|');
    out.push_str(&" ".repeat(group_width));
    out.push_str(&format!("|{TOTAL_COLUMN}|"));
    for title in &titles {
        out.push_str(&format!("{title}|"));
    }
    out.push('\n');

    out.push('|');
    out.push_str(&separator(group_width));
    out.push_str(&separator(total_width));
    for title in &titles {
        out.push_str(&separator(width(title)));
    }
    out.push('\n');

    for (group, share) in section.group_shares() {
        out.push_str(&format!("|{:<group_width$}|", cell(&group.title)));
        out.push_str(&format!(
            "{:>total_width$}|",
            format!("{} ({}%)", group.total, share)
        ));
        for (column, share) in group.column_shares() {
            let count = format!("{} ({}%)", column.total, share);
            out.push_str(&format!("{:>width$}|", count, width = width(&cell(&column.title))));
        }
        out.push('\n');
    }
}
