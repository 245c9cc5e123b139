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

//! Unified error types for the tdp-scrape library.
//!
//! Numeric coercion never produces an error: a cell that does not parse is
//! treated as missing. Everything else that can go wrong while loading,
//! fetching or saving tables is represented here.
//!
//! # Example
//!
//! ```rust,no_run
//! use tdp_scrape::table::io::load_csv;
//! use tdp_scrape::Result;
//!
//! fn count_rows(path: &str) -> Result<usize> {
//!     Ok(load_csv(path)?.map(|t| t.len()).unwrap_or(0))
//! }
//! ```

use thiserror::Error;

/// The main error type for tdp-scrape operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing a local file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A CSV file could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP request itself failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured API endpoint is not a valid URL.
    #[error("Invalid API endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The remote response body was not the expected JSON structure.
    ///
    /// Carries the HTTP status and the leading part of the body so the
    /// failure can be diagnosed from the log alone.
    #[error("Failed to parse response (status {status}): {excerpt}")]
    ResponseParse { status: u16, excerpt: String },

    /// The API answered with an inline `error` object.
    #[error("API error: {0}")]
    Api(String),

    /// A column required by an operation is not present in the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A configuration value was out of range or could not be parsed.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

/// A specialized Result type for tdp-scrape operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of body characters kept in [`Error::ResponseParse`].
pub const RESPONSE_EXCERPT_CHARS: usize = 300;

/// Build a [`Error::ResponseParse`] from a status code and raw body.
pub fn response_parse_error(status: u16, body: &str) -> Error {
    Error::ResponseParse {
        status,
        excerpt: body.chars().take(RESPONSE_EXCERPT_CHARS).collect(),
    }
}
