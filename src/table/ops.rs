use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::info;

use super::{columns, Cell, Table};
use crate::error::Result;
use crate::parsing::common::split_segments;

/// Append the rows of `secondary` to `primary`, keeping `primary`'s schema.
///
/// Columns `secondary` lacks are missing in the appended rows; columns only
/// `secondary` has are dropped.
pub fn append_matching_columns(primary: &Table, secondary: &Table) -> Table {
    let mapping: Vec<Option<usize>> = primary
        .headers()
        .iter()
        .map(|h| secondary.column_index(h))
        .collect();

    let mut out = primary.clone();
    for row in 0..secondary.len() {
        let aligned: Vec<Cell> = mapping
            .iter()
            .map(|col| col.and_then(|c| secondary.cell(row, c)).map(String::from))
            .collect();
        out.push_row(aligned);
    }
    out
}

/// Drop rows whose `name` repeats an earlier row, keeping the first occurrence.
///
/// Missing names count as equal to each other. Returns the cleaned table and
/// the number of rows removed.
pub fn drop_duplicate_names(table: &Table) -> Result<(Table, usize)> {
    let col = table.require_column(columns::NAME)?;
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    let keep: Vec<usize> = (0..table.len())
        .filter(|&row| seen.insert(table.cell(row, col)))
        .collect();

    let removed = table.len() - keep.len();
    info!("Removed {removed} duplicate rows based on '{}'", columns::NAME);
    Ok((table.select_rows(keep), removed))
}

/// Every row whose values in `subset` occur more than once, in table order.
///
/// An empty `subset` compares whole rows.
pub fn find_duplicate_rows(table: &Table, subset: &[String]) -> Result<Table> {
    let cols: Vec<usize> = if subset.is_empty() {
        (0..table.headers().len()).collect()
    } else {
        subset
            .iter()
            .map(|c| table.require_column(c))
            .collect::<Result<_>>()?
    };

    let key = |row: usize| -> Vec<Option<&str>> {
        cols.iter().map(|&c| table.cell(row, c)).collect()
    };
    let mut counts: HashMap<Vec<Option<&str>>, usize> = HashMap::new();
    for row in 0..table.len() {
        *counts.entry(key(row)).or_default() += 1;
    }
    let duplicates = (0..table.len()).filter(|&row| counts[&key(row)] > 1);
    Ok(table.select_rows(duplicates))
}

/// Count each distinct usage segment in `column`, sorted by segment.
pub fn segment_counts(table: &Table, column: &str) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for value in table.column_values(column)?.into_iter().flatten() {
        for segment in split_segments(value) {
            *counts.entry(segment.to_string()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}
