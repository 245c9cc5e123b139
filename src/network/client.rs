use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, error, info, warn};
use url::Url;

use super::ask_parser::{build_ask_query, parse_ask_response, parse_category_page, AskPayload};
use super::batch::{BatchOutcome, BatchResult, FetchReport};
use crate::common::config::{AppConfig, FetchConfig};
use crate::error::{Error, Result};
use crate::parsing::common::round2;
use crate::traits::{QueryTransport, TransportResponse};

/// reqwest-backed transport for a MediaWiki `api.php` endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<Self> {
        Url::parse(endpoint).map_err(|source| Error::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(AppConfig::CONNECTION_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(AppConfig::POOL_IDLE_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(AppConfig::TCP_KEEPALIVE_SECS))
            .user_agent(AppConfig::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn query(&self, params: &[(String, String)]) -> Result<TransportResponse> {
        let response = self.client.get(&self.endpoint).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Client for the knowledge base, owning its transport for the length of a run.
pub struct WikiClient<T: QueryTransport> {
    transport: T,
    config: FetchConfig,
}

impl WikiClient<HttpTransport> {
    pub fn from_config(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.api_url)?;
        Self::new(transport, config)
    }
}

impl<T: QueryTransport> WikiClient<T> {
    /// Fails with [`Error::InvalidConfig`] when `config` does not validate.
    pub fn new(transport: T, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List every page title in the configured category, following continuation tokens.
    ///
    /// A response that is not the expected JSON aborts the listing.
    pub async fn fetch_all_titles(&self) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut params = vec![
                param("action", "query"),
                param("format", "json"),
                param("list", "categorymembers"),
                param("cmtitle", &self.config.category),
                param("cmlimit", &AppConfig::CATEGORY_PAGE_LIMIT.to_string()),
            ];
            if let Some(token) = &continuation {
                params.push(param("cmcontinue", token));
            }

            let response = self.transport.query(&params).await?;
            let page = parse_category_page(&response).inspect_err(|_| {
                error!(
                    "Failed to parse category listing from {} (status {}): {}",
                    self.transport.endpoint(),
                    response.status,
                    excerpt(&response.body)
                );
            })?;

            debug!("Received {} titles", page.titles.len());
            titles.extend(page.titles);

            match page.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
            pause(self.config.page_delay).await;
        }

        info!("Listed {} page titles", titles.len());
        Ok(titles)
    }

    /// Query processor properties for `titles` in batches.
    ///
    /// Every batch produces a [`BatchResult`]; failures never abort the run.
    pub async fn fetch_processor_data(&self, titles: &[String]) -> FetchReport {
        let chunks: Vec<&[String]> = titles.chunks(self.config.batch_size).collect();
        let total = chunks.len();
        let mut batches = Vec::with_capacity(total);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let outcome = self.fetch_batch(index, total, chunk).await;
            if let BatchOutcome::Fetched(records) = &outcome {
                info!(
                    "Finished batch {}/{total} with {} processors",
                    index + 1,
                    records.len()
                );
            }
            batches.push(BatchResult {
                index,
                titles: chunk.len(),
                outcome,
            });

            if index + 1 < total {
                let wait = self.random_delay();
                debug!("Sleeping {:.2}s before next batch", wait.as_secs_f64());
                pause(wait).await;
            }
        }

        FetchReport { batches }
    }

    async fn fetch_batch(&self, index: usize, total: usize, batch: &[String]) -> BatchOutcome {
        let params = vec![
            param("action", "ask"),
            param("format", "json"),
            param("query", &build_ask_query(batch)),
        ];

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_retries {
            let result = match self.transport.query(&params).await {
                Ok(response) => parse_ask_response(&response),
                Err(e) => Err(e),
            };

            match result {
                Ok(AskPayload::Records(records)) => return BatchOutcome::Fetched(records),
                Ok(AskPayload::ApiError(message)) => {
                    warn!("API error in batch {}/{total}: {message}", index + 1);
                    return BatchOutcome::ApiError(message);
                }
                Err(e) => {
                    warn!(
                        "Attempt {attempt} failed for batch {}/{total}: {e}",
                        index + 1
                    );
                    last_error = e.to_string();
                    if attempt < self.config.max_retries {
                        pause(self.config.retry_delay).await;
                    }
                }
            }
        }

        BatchOutcome::Exhausted {
            attempts: self.config.max_retries,
            last_error,
        }
    }

    fn random_delay(&self) -> Duration {
        let (min, max) = self.config.delay_range;
        let seconds = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };
        Duration::from_secs_f64(round2(seconds).max(0.0))
    }
}

fn param(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn excerpt(body: &str) -> String {
    body.chars().take(crate::error::RESPONSE_EXCERPT_CHARS).collect()
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
