use glreport_core::dump::ReportDump;

use crate::prelude::*;

/// Pretty-printed JSON document of the dump
pub fn render(dump: &ReportDump) -> Result<String> {
    serde_json::to_string_pretty(dump).map_err(|e| eyre!("JSON serialization failed: {}", e))
}
