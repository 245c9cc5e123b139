//! JSON title cache and CSV table persistence.
//!
//! A missing input file is not an error here: the loaders return `Ok(None)`
//! so the caller can fall back to fetching.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::Table;
use crate::error::Result;
use crate::parsing::common::clean_cell;

pub fn save_titles<P: AsRef<Path>>(titles: &[String], path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string(titles)?)?;
    info!("Saved {} titles to {}", titles.len(), path.display());
    Ok(())
}

pub fn load_titles<P: AsRef<Path>>(path: P) -> Result<Option<Vec<String>>> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("File {} not found", path.display());
        return Ok(None);
    }
    let titles: Vec<String> = serde_json::from_str(&fs::read_to_string(path)?)?;
    info!("Loaded {} entries from {}", titles.len(), path.display());
    Ok(Some(titles))
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Option<Table>> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("File {} not found", path.display());
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut table = Table::new(reader.headers()?.iter());
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(clean_cell).collect());
    }
    info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(Some(table))
}

pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    info!("Saved {} entries to {}", table.len(), path.display());
    Ok(())
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!("Created output directory: {}", dir.display());
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
