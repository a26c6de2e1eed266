//! Writers for a report dump

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glreport_core::dump::ReportDump;

use crate::prelude::*;

pub mod html;
pub mod json;
pub mod markdown;
pub mod pdf;

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Markdown,
    Html,
    Pdf,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Markdown => "md",
            Format::Html => "html",
            Format::Pdf => "pdf",
        }
    }
}

/// Write `dump` as `<output_dir>/<prefix>.<ext>` and return the path
///
/// `today` closes an open-ended period in the human-readable formats.
pub fn export_dump(
    dump: &ReportDump,
    format: Format,
    output_dir: &Path,
    prefix: &str,
    today: NaiveDate,
) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.{}", prefix, format.extension()));

    match format {
        Format::Json => write_text(&path, &json::render(dump)?)?,
        Format::Markdown => write_text(&path, &markdown::render(dump, today))?,
        Format::Html => write_text(&path, &html::render(dump, today))?,
        Format::Pdf => pdf::write(dump, today, &path)?,
    }

    log::info!("Wrote {}", path.display());
    Ok(path)
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// "Period from … to …" line shared by the document formats
pub(crate) fn period_line(dump: &ReportDump, today: NaiveDate) -> Option<String> {
    if dump.period_from.is_none() && dump.period_to.is_none() {
        return None;
    }

    let mut line = "Period ".to_string();
    if let Some(from) = dump.period_from {
        line.push_str(&format!("from {} ", from.format("%Y-%m-%d")));
    }
    match dump.period_to {
        Some(to) => line.push_str(&format!("to {}", to.format("%Y-%m-%d"))),
        None => line.push_str(&format!("to {} (Today)", today.format("%Y-%m-%d"))),
    }
    Some(line)
}
