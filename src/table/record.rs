
use super::{Cell, Table};
use crate::parsing::common::{clean_cell, coerce_f64, format_number};

/// Column names of the processor schema, in on-disk order.
pub mod columns {
    pub const NAME: &str = "name";
    pub const LAUNCH_DATE: &str = "launch date";
    pub const SOURCE: &str = "source";
    pub const INTENDED_USAGE: &str = "intended usage";
    pub const TDP: &str = "tdp (W)";
    pub const CORES: &str = "cores";
    pub const THREADS: &str = "threads";
    pub const PROCESS: &str = "process";
    pub const DIE_AREA: &str = "die area";
}

pub const PROCESSOR_COLUMNS: [&str; 9] = [
    columns::NAME,
    columns::LAUNCH_DATE,
    columns::SOURCE,
    columns::INTENDED_USAGE,
    columns::TDP,
    columns::CORES,
    columns::THREADS,
    columns::PROCESS,
    columns::DIE_AREA,
];

/// One processor, with every field explicitly optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorRecord {
    pub name: Option<String>,
    /// `YYYY-MM-DD`.
    pub launch_date: Option<String>,
    pub source: Option<String>,
    /// Semicolon and/or comma separated market segment labels.
    pub intended_usage: Option<String>,
    pub tdp_watts: Option<f64>,
    pub cores: Option<u32>,
    /// Thread count; synthetic default rows store a per-core ratio here.
    pub threads: Option<f64>,
    pub process: Option<String>,
    pub die_area: Option<String>,
}

impl ProcessorRecord {
    /// The cell this record contributes to `column`, `None` for unknown columns.
    pub fn cell(&self, column: &str) -> Cell {
        match column {
            columns::NAME => self.name.clone(),
            columns::LAUNCH_DATE => self.launch_date.clone(),
            columns::SOURCE => self.source.clone(),
            columns::INTENDED_USAGE => self.intended_usage.clone(),
            columns::TDP => self.tdp_watts.map(format_number),
            columns::CORES => self.cores.map(|c| c.to_string()),
            columns::THREADS => self.threads.map(format_number),
            columns::PROCESS => self.process.clone(),
            columns::DIE_AREA => self.die_area.clone(),
            _ => None,
        }
    }

    /// Lay the record out along an arbitrary header.
    pub fn to_row(&self, headers: &[String]) -> Vec<Cell> {
        headers.iter().map(|h| self.cell(h)).collect()
    }

    /// Read a typed record from a table row, coercing numeric columns.
    ///
    /// Columns the table does not have are missing; non-numeric text in a
    /// numeric column is missing as well.
    pub fn from_row(table: &Table, row: usize) -> Self {
        let text = |column: &str| table.value(row, column).and_then(clean_cell);
        Self {
            name: text(columns::NAME),
            launch_date: text(columns::LAUNCH_DATE),
            source: text(columns::SOURCE),
            intended_usage: text(columns::INTENDED_USAGE),
            tdp_watts: coerce_f64(table.value(row, columns::TDP)),
            cores: coerce_f64(table.value(row, columns::CORES)).and_then(whole_count),
            threads: coerce_f64(table.value(row, columns::THREADS)),
            process: text(columns::PROCESS),
            die_area: text(columns::DIE_AREA),
        }
    }
}

fn whole_count(value: f64) -> Option<u32> {
    if (0.0..=u32::MAX as f64).contains(&value) && value.fract() == 0.0 {
        Some(value as u32)
    } else {
        None
    }
}
