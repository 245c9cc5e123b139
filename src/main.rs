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

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tdp_scrape::cli::{Cli, Commands};
use tdp_scrape::pipeline::{
    run_analyze_mode, run_duplicates_mode, run_scrape_mode, run_segments_mode,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let fallback = if cli.verbose {
        "tdp_scrape=debug"
    } else {
        "tdp_scrape=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Commands::Scrape(args) => run_scrape_mode(&args).await,
        Commands::Analyze(args) => run_analyze_mode(&args),
        Commands::Segments(args) => run_segments_mode(&args),
        Commands::Duplicates(args) => run_duplicates_mode(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
