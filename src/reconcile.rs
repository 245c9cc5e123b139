// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reconciliation of two processor tables.
//!
//! Both name columns are normalized and the tables are inner-joined on the
//! normalized name. A key that occurs several times on either side yields the
//! full cross product of its rows. Rows whose key has no counterpart are
//! reported separately, so matched and unmatched rows together cover both
//! inputs.

use std::collections::{HashMap, HashSet};

use crate::common::config::AppConfig;
use crate::error::Result;
use crate::normalize::normalized_names;
use crate::parsing::common::{coerce_f64, format_number};
use crate::table::{columns, Cell, Table};

pub const NORMALIZED_NAME: &str = "normalized_name";
pub const TDP_DIFFERS: &str = "TDP_differs";
pub const CORES_DIFFERS: &str = "Cores_differs";
pub const TDP_ABS_DIFF: &str = "TDP_abs_diff";
pub const CORES_ABS_DIFF: &str = "Cores_abs_diff";

/// Column names and source labels used when comparing two tables.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub name_col: String,
    pub tdp_col: String,
    pub cores_col: String,
    pub label1: String,
    pub label2: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            name_col: columns::NAME.to_string(),
            tdp_col: columns::TDP.to_string(),
            cores_col: columns::CORES.to_string(),
            label1: "wikichip".to_string(),
            label2: "external".to_string(),
        }
    }
}

impl CompareOptions {
    fn suffixed(&self, column: &str, label: &str) -> String {
        format!("{column}_{label}")
    }
}

/// The compared cells of one side of a match, as they appeared in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Side {
    pub name: Cell,
    pub tdp: Cell,
    pub cores: Cell,
}

/// One matched pair of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub normalized_name: String,
    pub left: Side,
    pub right: Side,
    pub tdp_differs: bool,
    pub cores_differs: bool,
}

/// A comparison whose numeric difference exceeded the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificantDiff {
    pub comparison: Comparison,
    pub tdp_abs_diff: Option<f64>,
    pub cores_abs_diff: Option<f64>,
}

/// Matched pairs plus the rows of each side that found no partner.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub matched: Vec<Comparison>,
    pub unmatched_left: Table,
    pub unmatched_right: Table,
}

/// Exact inequality of two cells.
///
/// Two numeric cells compare as numbers (`"10"` equals `"10.0"`), anything else
/// as text. A missing cell never equals anything, itself included.
fn cells_differ(a: Option<&str>, b: Option<&str>) -> bool {
    match (coerce_f64(a), coerce_f64(b)) {
        (Some(x), Some(y)) => x != y,
        _ => match (a, b) {
            (Some(x), Some(y)) => x != y,
            _ => true,
        },
    }
}

fn side(table: &Table, row: usize, cols: [usize; 3]) -> Side {
    let owned = |col: usize| table.cell(row, col).map(String::from);
    Side {
        name: owned(cols[0]),
        tdp: owned(cols[1]),
        cores: owned(cols[2]),
    }
}

/// Inner-join `a` and `b` on normalized name and flag TDP/cores differences.
///
/// Results are ordered by the row of `a`, then by the row of `b`.
pub fn compare_tables(a: &Table, b: &Table, opts: &CompareOptions) -> Result<Vec<Comparison>> {
    let cols_a = [
        a.require_column(&opts.name_col)?,
        a.require_column(&opts.tdp_col)?,
        a.require_column(&opts.cores_col)?,
    ];
    let cols_b = [
        b.require_column(&opts.name_col)?,
        b.require_column(&opts.tdp_col)?,
        b.require_column(&opts.cores_col)?,
    ];
    let keys_a = normalized_names(a, &opts.name_col)?;
    let keys_b = normalized_names(b, &opts.name_col)?;

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, key) in keys_b.iter().enumerate() {
        index.entry(key.as_str()).or_default().push(row);
    }

    let mut matched = Vec::new();
    for (row_a, key) in keys_a.iter().enumerate() {
        let Some(rows_b) = index.get(key.as_str()) else {
            continue;
        };
        for &row_b in rows_b {
            let left = side(a, row_a, cols_a);
            let right = side(b, row_b, cols_b);
            matched.push(Comparison {
                normalized_name: key.clone(),
                tdp_differs: cells_differ(left.tdp.as_deref(), right.tdp.as_deref()),
                cores_differs: cells_differ(left.cores.as_deref(), right.cores.as_deref()),
                left,
                right,
            });
        }
    }
    Ok(matched)
}

/// Keep comparisons whose absolute TDP or cores difference exceeds `threshold`.
///
/// Values are coerced to numbers first; a side that is missing or not numeric
/// gives a missing difference, which never exceeds the threshold.
pub fn filter_significant_diffs(matched: &[Comparison], threshold: f64) -> Vec<SignificantDiff> {
    let abs_diff = |x: &Cell, y: &Cell| -> Option<f64> {
        Some((coerce_f64(x.as_deref())? - coerce_f64(y.as_deref())?).abs())
    };
    matched
        .iter()
        .map(|c| SignificantDiff {
            tdp_abs_diff: abs_diff(&c.left.tdp, &c.right.tdp),
            cores_abs_diff: abs_diff(&c.left.cores, &c.right.cores),
            comparison: c.clone(),
        })
        .filter(|d| {
            d.tdp_abs_diff.is_some_and(|v| v > threshold)
                || d.cores_abs_diff.is_some_and(|v| v > threshold)
        })
        .collect()
}

/// Filter with the default threshold.
pub fn filter_significant_diffs_default(matched: &[Comparison]) -> Vec<SignificantDiff> {
    filter_significant_diffs(matched, AppConfig::DIFF_THRESHOLD)
}

/// Rows of each table whose normalized name does not occur in the other.
///
/// Both returned tables carry an extra `normalized_name` column.
pub fn unmatched_processors(a: &Table, b: &Table, opts: &CompareOptions) -> Result<(Table, Table)> {
    let keys_a = normalized_names(a, &opts.name_col)?;
    let keys_b = normalized_names(b, &opts.name_col)?;

    let set_a: HashSet<&str> = keys_a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = keys_b.iter().map(String::as_str).collect();

    let only = |table: &Table, keys: &[String], other: &HashSet<&str>| -> Table {
        let rows = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| !other.contains(k.as_str()))
            .map(|(row, _)| row);
        let key_cells = keys.iter().map(|k| Some(k.clone())).collect();
        table.with_column(NORMALIZED_NAME, key_cells).select_rows(rows)
    };

    Ok((only(a, &keys_a, &set_b), only(b, &keys_b, &set_a)))
}

/// Run the join and the unmatched report in one go.
pub fn reconcile(a: &Table, b: &Table, opts: &CompareOptions) -> Result<Reconciliation> {
    let matched = compare_tables(a, b, opts)?;
    let (unmatched_left, unmatched_right) = unmatched_processors(a, b, opts)?;
    Ok(Reconciliation {
        matched,
        unmatched_left,
        unmatched_right,
    })
}

fn flag(value: bool) -> Cell {
    Some(if value { "True" } else { "False" }.to_string())
}

fn comparison_headers(opts: &CompareOptions) -> Vec<String> {
    vec![
        NORMALIZED_NAME.to_string(),
        opts.suffixed(&opts.name_col, &opts.label1),
        opts.suffixed(&opts.name_col, &opts.label2),
        opts.suffixed(&opts.tdp_col, &opts.label1),
        opts.suffixed(&opts.tdp_col, &opts.label2),
        TDP_DIFFERS.to_string(),
        opts.suffixed(&opts.cores_col, &opts.label1),
        opts.suffixed(&opts.cores_col, &opts.label2),
        CORES_DIFFERS.to_string(),
    ]
}

fn comparison_row(c: &Comparison) -> Vec<Cell> {
    vec![
        Some(c.normalized_name.clone()),
        c.left.name.clone(),
        c.right.name.clone(),
        c.left.tdp.clone(),
        c.right.tdp.clone(),
        flag(c.tdp_differs),
        c.left.cores.clone(),
        c.right.cores.clone(),
        flag(c.cores_differs),
    ]
}

/// Tabular form of the matched pairs, with label-suffixed column names.
pub fn comparisons_to_table(matched: &[Comparison], opts: &CompareOptions) -> Table {
    let mut table = Table::new(comparison_headers(opts));
    for c in matched {
        table.push_row(comparison_row(c));
    }
    table
}

/// Tabular form of the significant differences, with the two diff columns appended.
pub fn diffs_to_table(diffs: &[SignificantDiff], opts: &CompareOptions) -> Table {
    let mut headers = comparison_headers(opts);
    headers.push(TDP_ABS_DIFF.to_string());
    headers.push(CORES_ABS_DIFF.to_string());

    let mut table = Table::new(headers);
    for d in diffs {
        let mut row = comparison_row(&d.comparison);
        row.push(d.tdp_abs_diff.map(format_number));
        row.push(d.cores_abs_diff.map(format_number));
        table.push_row(row);
    }
    table
}
