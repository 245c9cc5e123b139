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

//! In-memory processor tables.
//!
//! A [`Table`] is an ordered column schema plus rows of optional text cells.
//! Missing values are always `None`; the CSV reader converts blank cells at
//! load time. Operations take `&Table` and return a new table.

pub mod io;
pub mod ops;
pub mod record;

pub use record::{columns, ProcessorRecord, PROCESSOR_COLUMNS};

use crate::error::{Error, Result};

/// A single cell: `None` is the one canonical missing value.
pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// An empty table with the standard processor schema.
    pub fn processor_schema() -> Self {
        Self::new(PROCESSOR_COLUMNS)
    }

    pub fn from_records(records: &[ProcessorRecord]) -> Self {
        let mut table = Self::processor_schema();
        for record in records {
            let row = record.to_row(&table.headers);
            table.rows.push(row);
        }
        table
    }

    pub fn records(&self) -> Vec<ProcessorRecord> {
        (0..self.len())
            .map(|row| ProcessorRecord::from_row(self, row))
            .collect()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| Error::MissingColumn(column.to_string()))
    }

    /// Append a row; short rows are padded with missing cells and long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    /// Cell lookup by column name; an unknown column reads as missing.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.column_index(column)
            .and_then(|col| self.cell(row, col))
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<Option<&str>>> {
        let col = self.require_column(column)?;
        Ok((0..self.len()).map(|row| self.cell(row, col)).collect())
    }

    /// Copy of the table with `column` rewritten cell by cell.
    pub fn map_column<F>(&self, column: &str, mut f: F) -> Result<Table>
    where
        F: FnMut(Option<&str>) -> Cell,
    {
        let col = self.require_column(column)?;
        let mut out = self.clone();
        for row in &mut out.rows {
            let updated = f(row[col].as_deref());
            row[col] = updated;
        }
        Ok(out)
    }

    /// Copy of the table with `column` set to `values`, appended when new.
    pub fn with_column(&self, column: &str, values: Vec<Cell>) -> Table {
        let mut out = self.clone();
        let col = match out.column_index(column) {
            Some(col) => col,
            None => {
                out.headers.push(column.to_string());
                for row in &mut out.rows {
                    row.push(None);
                }
                out.headers.len() - 1
            }
        };
        let mut values = values.into_iter();
        for row in &mut out.rows {
            row[col] = values.next().flatten();
        }
        out
    }

    /// Copy of the selected rows, in the order given.
    pub fn select_rows<I>(&self, indices: I) -> Table
    where
        I: IntoIterator<Item = usize>,
    {
        Table {
            headers: self.headers.clone(),
            rows: indices
                .into_iter()
                .filter_map(|i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    pub fn push_record(&mut self, record: &ProcessorRecord) {
        let row = record.to_row(&self.headers);
        self.rows.push(row);
    }
}
