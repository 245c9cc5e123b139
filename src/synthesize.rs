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

//! Synthetic per-segment default rows.
//!
//! For each segment group a single summary row is appended whose TDP is the
//! mean TDP per core of the group's processors, with `cores = 1` and `threads`
//! holding the mean threads-per-core ratio. Downstream consumers use these
//! rows as a fallback when a specific processor is unknown.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use crate::error::Result;
use crate::parsing::common::{mean, round2, split_segments};
use crate::segments::{matching_segments, SegmentCategory, CATCH_ALL_LABEL, SEGMENT_RULES_VERSION};
use crate::table::{columns, ProcessorRecord, Table};

/// Append the synthetic default rows that are not already present.
///
/// Groups are emitted in rule order followed by the catch-all `default` row.
/// A group with no eligible processors (cores > 0 and TDP present) emits
/// nothing. Existing rows are copied unchanged.
pub fn add_default_rows(table: &Table) -> Result<Table> {
    table.require_column(columns::NAME)?;
    table.require_column(columns::TDP)?;
    table.require_column(columns::CORES)?;

    let records = table.records();
    let existing: HashSet<String> = records
        .iter()
        .filter_map(|r| r.name.as_deref())
        .map(str::to_lowercase)
        .collect();
    let eligible: Vec<&ProcessorRecord> = records.iter().filter(|r| is_eligible(r)).collect();
    debug!(
        "Building default rows from {} eligible processors (segment rules v{SEGMENT_RULES_VERSION})",
        eligible.len()
    );

    let mut out = table.clone();

    for category in SegmentCategory::all() {
        let label = category.label();
        if existing.contains(label) {
            debug!("Row '{label}' already present, skipping");
            continue;
        }
        let selected: Vec<&ProcessorRecord> = eligible
            .iter()
            .copied()
            .filter(|r| r.intended_usage.as_deref().is_some_and(|u| category.matches(u)))
            .collect();

        let segments: BTreeSet<&str> = selected
            .iter()
            .filter_map(|r| r.intended_usage.as_deref())
            .flat_map(|u| matching_segments(u, category))
            .collect();
        if segments.is_empty() {
            continue;
        }

        if let Some(row) = summary_row(label, &selected, &segments) {
            info!("Adding '{label}' from {} processors", selected.len());
            out.push_record(&row);
        }
    }

    if !existing.contains(CATCH_ALL_LABEL) {
        let segments: BTreeSet<&str> = eligible
            .iter()
            .filter_map(|r| r.intended_usage.as_deref())
            .flat_map(split_segments)
            .collect();
        if let Some(row) = summary_row(CATCH_ALL_LABEL, &eligible, &segments) {
            info!("Adding '{CATCH_ALL_LABEL}' from {} processors", eligible.len());
            out.push_record(&row);
        }
    }

    Ok(out)
}

fn is_eligible(record: &ProcessorRecord) -> bool {
    record.tdp_watts.is_some() && record.cores.is_some_and(|c| c > 0)
}

/// Build the summary row, `None` when `selected` is empty.
fn summary_row(
    label: &str,
    selected: &[&ProcessorRecord],
    segments: &BTreeSet<&str>,
) -> Option<ProcessorRecord> {
    let per_core = |value: Option<f64>, cores: Option<u32>| match (value, cores) {
        (Some(v), Some(c)) if c > 0 => Some(v / c as f64),
        _ => None,
    };

    let tdp_ratios: Vec<f64> = selected
        .iter()
        .filter_map(|r| per_core(r.tdp_watts, r.cores))
        .collect();
    let thread_ratios: Vec<f64> = selected
        .iter()
        .filter_map(|r| per_core(r.threads, r.cores))
        .collect();

    let tdp_per_core = mean(&tdp_ratios)?;
    let usage = segments.iter().copied().collect::<Vec<_>>().join("; ");

    Some(ProcessorRecord {
        name: Some(label.to_string()),
        intended_usage: (!usage.is_empty()).then_some(usage),
        tdp_watts: Some(round2(tdp_per_core)),
        cores: Some(1),
        threads: mean(&thread_ratios).map(round2),
        ..Default::default()
    })
}
