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

//! Processor name normalization.
//!
//! Different sources spell the same part differently: `"Core i5-7200U - Intel"`,
//! `"Intel® Core™ i5-7200U Processor"`. The normalized form is lowercase, free of
//! trademark glyphs and punctuation (hyphens are kept), whitespace-collapsed,
//! and puts a trailing vendor suffix in front. It is the join and dedup key.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::table::Table;

/// Vendors recognised in a `"<chip> - <vendor>"` suffix.
pub const VENDORS: [&str; 22] = [
    "intel",
    "amd",
    "arm",
    "apple",
    "qualcomm",
    "via",
    "motorola",
    "samsung",
    "ibm",
    "nvidia",
    "rockchip",
    "hisilicon",
    "centaur",
    "zhaoxin",
    "tesla",
    "ampere",
    "mobileye",
    "phytium",
    "intel nervana",
    "socionext",
    "appliedmicro",
    "baikal electronics",
];

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static VENDOR_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(.+?)\s*-\s*({})$", VENDORS.join("|"))).unwrap()
});

/// Lowercase, strip trademark glyphs and the word "processor", drop
/// punctuation other than hyphens, collapse whitespace.
pub fn normalize_text(name: &str) -> String {
    let mut name = name.to_lowercase().replace(['®', '™'], "");
    while name.contains("processor") {
        name = name.replace("processor", "");
    }
    let name = PUNCTUATION.replace_all(&name, "");
    WHITESPACE.replace_all(&name, " ").trim().to_string()
}

/// Rewrite `"<chip> - <vendor>"` as `"<vendor> <chip>"`; other names pass through.
pub fn reorder_vendor(name: &str) -> String {
    match VENDOR_SUFFIX.captures(name) {
        Some(caps) => format!("{} {}", caps[2].trim(), caps[1].trim()),
        None => name.to_string(),
    }
}

/// Canonical comparison key for a raw processor name; absent names map to `""`.
///
/// The single pass is repeated until nothing changes, so the result is a fixed
/// point: normalizing it again returns it unchanged. Every repeated pass either
/// removes characters or consumes a hyphen, so the loop terminates.
pub fn normalize_processor_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };
    let mut current = single_pass(name);
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn single_pass(name: &str) -> String {
    reorder_vendor(&normalize_text(name)).trim().to_string()
}

/// Normalize every value of `column`, returning a new table.
pub fn normalize_column(table: &Table, column: &str) -> Result<Table> {
    table.map_column(column, |value| Some(normalize_processor_name(value)))
}

/// Normalized names of `column` in row order.
pub fn normalized_names(table: &Table, column: &str) -> Result<Vec<String>> {
    Ok(table
        .column_values(column)?
        .into_iter()
        .map(normalize_processor_name)
        .collect())
}
