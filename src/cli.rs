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

use clap::{Parser, Subcommand};

use crate::common::config::{AppConfig, FetchOverrides};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch processor data (unless already cached), merge, deduplicate and add default rows.
    Scrape(ScrapeArgs),
    /// Compare two processor tables and write match, diff and unmatched reports.
    Analyze(AnalyzeArgs),
    /// Print every distinct intended-usage segment with its count.
    Segments(SegmentsArgs),
    /// Print rows that occur more than once.
    Duplicates(DuplicatesArgs),
}

#[derive(Parser, Clone)]
pub struct ScrapeArgs {
    /// JSON file caching the category page titles.
    #[arg(long, default_value = AppConfig::TITLES_PATH)]
    pub titles: PathBuf,
    /// Processor CSV; when it already holds data nothing is fetched.
    #[arg(long, default_value = AppConfig::CPU_TDP_CSV_PATH)]
    pub cpu_tdp_csv: PathBuf,
    /// External processor CSV whose rows are appended before deduplication.
    #[arg(long, default_value = AppConfig::EXTERNAL_CSV_PATH)]
    pub external_csv: PathBuf,
    /// The api.php endpoint to query.
    #[arg(long)]
    pub api_url: Option<String>,
    /// Number of titles per ask query.
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Attempts per batch before it is skipped.
    #[arg(long)]
    pub max_retries: Option<u32>,
    /// Lower bound of the pause between batches, in seconds.
    #[arg(long)]
    pub delay_min: Option<f64>,
    /// Upper bound of the pause between batches, in seconds.
    #[arg(long)]
    pub delay_max: Option<f64>,
}

impl ScrapeArgs {
    pub fn overrides(&self) -> FetchOverrides {
        FetchOverrides {
            api_url: self.api_url.clone(),
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            delay_min: self.delay_min,
            delay_max: self.delay_max,
        }
    }
}

#[derive(Parser, Clone)]
pub struct AnalyzeArgs {
    /// First processor table.
    pub input_file1: PathBuf,
    /// Second processor table.
    pub input_file2: PathBuf,
    /// Directory receiving the report CSVs.
    #[arg(long, default_value = AppConfig::ANALYSIS_OUTPUT_DIR)]
    pub output_dir: PathBuf,
    /// Absolute TDP or core-count difference above which a match is reported.
    #[arg(long, default_value_t = AppConfig::DIFF_THRESHOLD)]
    pub threshold: f64,
    /// Suffix for columns taken from the first table.
    #[arg(long, default_value = "wikichip")]
    pub label1: String,
    /// Suffix for columns taken from the second table.
    #[arg(long, default_value = "external")]
    pub label2: String,
}

#[derive(Parser, Clone)]
pub struct SegmentsArgs {
    /// Processor table to inspect.
    pub input: PathBuf,
    /// Column holding the usage text.
    #[arg(long, default_value = "intended usage")]
    pub column: String,
}

#[derive(Parser, Clone)]
pub struct DuplicatesArgs {
    /// Processor table to inspect.
    pub input: PathBuf,
    /// Columns compared for duplicates; all columns when omitted.
    #[arg(long = "subset", num_args = 1..)]
    pub subset: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_defaults() {
        let cli = Cli::try_parse_from(["tdp-scrape", "scrape"]).unwrap();
        let Commands::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        assert_eq!(args.titles, PathBuf::from(AppConfig::TITLES_PATH));
        assert_eq!(args.cpu_tdp_csv, PathBuf::from(AppConfig::CPU_TDP_CSV_PATH));
        assert!(args.overrides().batch_size.is_none());
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::try_parse_from([
            "tdp-scrape",
            "analyze",
            "a.csv",
            "b.csv",
            "--output-dir",
            "out",
            "--threshold",
            "1.5",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input_file1, PathBuf::from("a.csv"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.threshold, 1.5);
        assert_eq!(args.label1, "wikichip");
    }

    #[test]
    fn test_duplicates_subset() {
        let cli =
            Cli::try_parse_from(["tdp-scrape", "duplicates", "t.csv", "--subset", "name", "cores"])
                .unwrap();
        let Commands::Duplicates(args) = cli.command else {
            panic!("expected duplicates");
        };
        assert_eq!(args.subset, vec!["name", "cores"]);
    }
}
