//! Read-only inspection commands.

use tracing::warn;

use crate::cli::{DuplicatesArgs, SegmentsArgs};
use crate::error::Result;
use crate::table::io::load_csv;
use crate::table::ops::{find_duplicate_rows, segment_counts};

pub fn run_segments_mode(args: &SegmentsArgs) -> Result<()> {
    let Some(table) = load_csv(&args.input)? else {
        return Ok(());
    };
    let counts = segment_counts(&table, &args.column)?;
    println!("Unique intended usages and their counts:");
    for (segment, count) in &counts {
        println!("  {segment}: {count}");
    }
    Ok(())
}

pub fn run_duplicates_mode(args: &DuplicatesArgs) -> Result<()> {
    let Some(table) = load_csv(&args.input)? else {
        return Ok(());
    };
    let duplicates = find_duplicate_rows(&table, &args.subset)?;
    if duplicates.is_empty() {
        println!("No duplicate rows found.");
        return Ok(());
    }

    warn!("Found {} duplicate rows", duplicates.len());
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(duplicates.headers())?;
    for row in duplicates.rows() {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
