//! Writing scrape artifacts: resource records, narration transcripts and the
//! diagnostics dump.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use valleydocs_shared::{Diagnostics, Link, Result, ValleyDocsError};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One output file per page, plus the synthetic root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRecord {
    pub id: String,
    pub title: String,
    /// Markup string or plain-object array; `null` for navigation hubs.
    pub content: Option<serde_json::Value>,
    /// Child navigation links followed by in-page anchors.
    pub links: Vec<Link>,
    pub lookup: Option<Vec<Link>>,
    pub url: String,
}

/// One line of a narration transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    /// Dotted `resource.narration` path.
    pub locator: String,
    pub url: String,
    pub text: String,
}

const TRANSCRIPT_HEADER: [&str; 3] = ["locator", "url", "text"];

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

/// Remove `dir` if present, then recreate it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!(path = %dir.display(), "cleared directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ValleyDocsError::io(dir, e)),
    }
    std::fs::create_dir_all(dir).map_err(|e| ValleyDocsError::io(dir, e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ValleyDocsError::io(parent, e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Write `data` as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| ValleyDocsError::Serialization(format!("{}: {e}", path.display())))?;
    ensure_parent(path)?;
    std::fs::write(path, json).map_err(|e| ValleyDocsError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Write each record to `<output_dir>/data/<id>.json` and the root record to
/// `<output_dir>/data.json`.
pub fn write_records(output_dir: &Path, root: &ResourceRecord, records: &[ResourceRecord]) -> Result<()> {
    let data_dir = output_dir.join("data");
    for record in records {
        if record.id.is_empty() {
            warn!(url = %record.url, "record has no resource id, not written");
            continue;
        }
        write_json(&data_dir.join(format!("{}.json", record.id)), record)?;
    }
    write_json(&output_dir.join("data.json"), root)?;
    info!(records = records.len(), "wrote resource records");
    Ok(())
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

/// Render transcript rows as CSV with a `locator,url,text` header.
pub fn transcript_csv(rows: &[TranscriptRow]) -> String {
    let mut out = String::new();
    push_row(&mut out, &TRANSCRIPT_HEADER);
    for row in rows {
        push_row(&mut out, &[row.locator.as_str(), row.url.as_str(), row.text.as_str()]);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains([',', '"', '\n', '\r'])
}

/// Write one transcript file per lookup group under `<output_dir>/csv/`.
pub fn write_transcripts<'a>(
    output_dir: &Path,
    transcripts: impl IntoIterator<Item = (&'a String, &'a Vec<TranscriptRow>)>,
) -> Result<()> {
    let csv_dir = output_dir.join("csv");
    for (group, rows) in transcripts {
        let path = csv_dir.join(format!("{group}.csv"));
        ensure_parent(&path)?;
        std::fs::write(&path, transcript_csv(rows)).map_err(|e| ValleyDocsError::io(&path, e))?;
        debug!(%group, rows = rows.len(), "wrote transcript");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Dump every diagnostic table as its own JSON file in `log_dir`.
pub fn write_diagnostics(log_dir: &Path, diagnostics: &Diagnostics) -> Result<()> {
    write_json(&log_dir.join("tags.json"), &diagnostics.tag_item_types)?;
    write_json(&log_dir.join("classes.json"), &diagnostics.tag_classes)?;
    write_json(&log_dir.join("urls.json"), &diagnostics.urls)?;
    write_json(&log_dir.join("icons.json"), &diagnostics.icons)?;
    write_json(&log_dir.join("unknown_tags.json"), &diagnostics.unknown_tags)?;
    write_json(&log_dir.join("failed_urls.json"), &diagnostics.failed_urls)?;
    write_json(&log_dir.join("missions.json"), &diagnostics.missions)?;
    write_json(&log_dir.join("events.json"), &diagnostics.events)?;
    write_json(&log_dir.join("entries.json"), &diagnostics.entries)?;
    write_json(&log_dir.join("rewards.json"), &diagnostics.rewards)?;
    Ok(())
}
