//! The subcommands, wired from the library pieces.

pub mod analyze;
pub mod inspect;
pub mod scrape;

pub use analyze::{run_analysis, run_analyze_mode, AnalysisSummary};
pub use inspect::{run_duplicates_mode, run_segments_mode};
pub use scrape::{build_processor_table, run_scrape, run_scrape_mode, ScrapePaths};
