use std::path::Path;

use chrono::NaiveDate;
use glreport_core::dump::ReportDump;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::period_line;
use crate::prelude::*;

// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LEADING: i64 = 16;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Title,
    Heading,
    Body,
}

impl Style {
    /// Font resource name and size
    fn font(self) -> (&'static str, i64) {
        match self {
            Style::Title => ("F2", 18),
            Style::Heading => ("F2", 13),
            Style::Body => ("F1", 10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    style: Style,
    text: String,
}

impl Line {
    fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Text lines of the document, before pagination
fn lines(dump: &ReportDump, today: NaiveDate) -> Vec<Line> {
    let mut lines = vec![Line::new(Style::Title, &dump.title)];
    if let Some(period) = period_line(dump, today) {
        lines.push(Line::new(Style::Body, period));
    }

    for section in &dump.sections {
        lines.push(Line::new(Style::Body, ""));
        lines.push(Line::new(
            Style::Heading,
            format!("{} ({} issues)", section.title, section.total),
        ));

        if section.groups.is_empty() {
            lines.push(Line::new(Style::Body, "No issues found."));
        }
        for (group, share) in section.group_shares() {
            let mut text = format!("{}: {} ({}%)", group.title, group.total, share);
            for (column, share) in group.column_shares() {
                text.push_str(&format!(
                    "  |  {}: {} ({}%)",
                    column.title, column.total, share
                ));
            }
            lines.push(Line::new(Style::Body, text));
        }
    }

    lines
}

fn page_content(lines: &[Line]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        let (font, size) = line.style.font();
        operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }
}

fn build(dump: &ReportDump, today: NaiveDate) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for chunk in lines(dump, today).chunks(LINES_PER_PAGE) {
        let content = page_content(chunk)
            .encode()
            .map_err(|e| eyre!("Failed to encode PDF page: {}", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

/// Write the dump as a paginated single-font PDF
pub fn write(dump: &ReportDump, today: NaiveDate, path: &Path) -> Result<()> {
    let mut doc = build(dump, today)?;
    doc.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
