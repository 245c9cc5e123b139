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

use async_trait::async_trait;

use crate::error::Result;

/// Raw answer from the API endpoint, before any JSON decoding.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A way of sending one query to a MediaWiki `api.php` endpoint.
///
/// The fetcher only ever issues GET requests built from query parameters, so
/// the seam is a single method. The HTTP implementation lives in
/// [`crate::network::client::HttpTransport`]; tests substitute canned responses.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send a request with the given query parameters and return the raw body.
    ///
    /// An `Err` means the request itself failed; a successful return may still
    /// carry a body that is not valid JSON.
    async fn query(&self, params: &[(String, String)]) -> Result<TransportResponse>;

    /// Endpoint description for logging.
    fn endpoint(&self) -> &str;
}
