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

// Common parsing utilities for numeric coercion, cell cleanup, and segment splitting.

use std::str::FromStr;

/// Parse a number from a string after sanitizing by removing commas, underscores, and trimming.
/// Returns None if parsing fails.
pub fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    let cleaned = s.trim().replace([',', '_'], "");
    cleaned.parse::<T>().ok()
}

/// Cell texts read as missing, the same set pandas' CSV reader treats as NaN.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Coerce an optional table cell into a finite float.
///
/// Unlike [`parse_number`] no separators are stripped: `"1,000"` is not a
/// number here. Anything that is absent, blank, non-numeric, NaN or infinite
/// becomes `None`.
pub fn coerce_f64(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Turn a raw cell into the canonical missing representation: blank text and
/// the [`MISSING_TOKENS`] are `None`.
pub fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Split a usage string on commas and semicolons into trimmed, non-empty segments.
pub fn split_segments(text: &str) -> impl Iterator<Item = &str> {
    text.split([',', ';']).map(str::trim).filter(|s| !s.is_empty())
}

/// Render a float without a trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Round to two decimal places, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_util() {
        assert_eq!(parse_number::<u32>("1_234"), Some(1234));
        assert_eq!(parse_number::<u64>("1,234,567"), Some(1_234_567));
        assert_eq!(parse_number::<f64>("  3.1234 "), Some(3.1234));
        assert_eq!(parse_number::<i32>("abc"), None);
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(Some("15")), Some(15.0));
        assert_eq!(coerce_f64(Some(" 6.5 ")), Some(6.5));
        assert_eq!(coerce_f64(Some("n/a")), None);
        assert_eq!(coerce_f64(Some("NaN")), None);
        assert_eq!(coerce_f64(Some("")), None);
        assert_eq!(coerce_f64(Some("1,000")), None);
        assert_eq!(coerce_f64(Some("1_000")), None);
        assert_eq!(coerce_f64(Some("1e3")), Some(1000.0));
        assert_eq!(coerce_f64(None), None);
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  "), None);
        assert_eq!(clean_cell("server"), Some("server".to_string()));
        for token in ["n/a", "N/A", "NA", "NaN", "null", " None "] {
            assert_eq!(clean_cell(token), None, "{token:?} should be missing");
        }
        assert_eq!(clean_cell("Nano"), Some("Nano".to_string()));
    }

    #[test]
    fn test_split_segments() {
        let parts: Vec<&str> = split_segments("Server; Workstation,  Desktop ;;").collect();
        assert_eq!(parts, vec!["Server", "Workstation", "Desktop"]);
    }

    #[test]
    fn test_format_and_round() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(11.67), "11.67");
        assert_eq!(round2(35.0 / 3.0), 11.67);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(mean(&[10.0, 10.0, 15.0]).map(round2), Some(11.67));
        assert_eq!(mean(&[]), None);
    }
}
