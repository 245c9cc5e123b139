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

use std::path::PathBuf;

use tracing::info;

use crate::cli::ScrapeArgs;
use crate::common::config::FetchConfig;
use crate::error::Result;
use crate::network::WikiClient;
use crate::normalize::normalize_column;
use crate::synthesize::add_default_rows;
use crate::table::io::{load_csv, load_titles, save_csv, save_titles};
use crate::table::ops::{append_matching_columns, drop_duplicate_names};
use crate::table::{columns, ProcessorRecord, Table};
use crate::traits::QueryTransport;

/// Files read and written by a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapePaths {
    pub titles: PathBuf,
    pub cpu_tdp_csv: PathBuf,
    pub external_csv: PathBuf,
}

impl From<&ScrapeArgs> for ScrapePaths {
    fn from(args: &ScrapeArgs) -> Self {
        Self {
            titles: args.titles.clone(),
            cpu_tdp_csv: args.cpu_tdp_csv.clone(),
            external_csv: args.external_csv.clone(),
        }
    }
}

/// Entry point of the `scrape` subcommand.
pub async fn run_scrape_mode(args: &ScrapeArgs) -> Result<()> {
    let client = WikiClient::from_config(FetchConfig::resolve(&args.overrides())?)?;
    let config = client.config();
    info!(
        "Using {} (batch size {}, {} attempts, delay {:.2}-{:.2}s)",
        config.api_url, config.batch_size, config.max_retries, config.delay_range.0, config.delay_range.1
    );
    run_scrape(&client, &ScrapePaths::from(args)).await?;
    Ok(())
}

/// Load or fetch titles, then build and save the processor table unless it
/// already holds data.
///
/// Returns the table that was written, `None` when the existing file was kept.
pub async fn run_scrape<T: QueryTransport>(
    client: &WikiClient<T>,
    paths: &ScrapePaths,
) -> Result<Option<Table>> {
    let titles = match load_titles(&paths.titles)? {
        Some(titles) if !titles.is_empty() => titles,
        _ => {
            info!("Fetching processor titles...");
            let titles = client.fetch_all_titles().await?;
            save_titles(&titles, &paths.titles)?;
            titles
        }
    };

    if load_csv(&paths.cpu_tdp_csv)?.is_some_and(|t| !t.is_empty()) {
        info!(
            "{} already holds processor data, nothing to fetch",
            paths.cpu_tdp_csv.display()
        );
        return Ok(None);
    }

    info!("Fetching processor details for {} titles...", titles.len());
    let report = client.fetch_processor_data(&titles).await;
    report.log_summary();

    let external = load_csv(&paths.external_csv)?;
    let table = build_processor_table(&report.records(), external.as_ref())?;
    save_csv(&table, &paths.cpu_tdp_csv)?;
    Ok(Some(table))
}

/// Assemble fetched records into the final table: append external rows,
/// normalize names, drop duplicates and add the default rows.
pub fn build_processor_table(
    records: &[ProcessorRecord],
    external: Option<&Table>,
) -> Result<Table> {
    let mut table = Table::from_records(records);
    if let Some(external) = external {
        table = append_matching_columns(&table, external);
    }
    let table = normalize_column(&table, columns::NAME)?;
    let (table, _) = drop_duplicate_names(&table)?;
    add_default_rows(&table)
}
