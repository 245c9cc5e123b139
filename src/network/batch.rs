use tracing::{info, warn};

use crate::table::ProcessorRecord;

/// What happened to one batch of titles.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Fetched(Vec<ProcessorRecord>),
    /// The API rejected the query; such batches are not retried.
    ApiError(String),
    /// Every attempt failed at the transport or decoding level.
    Exhausted { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Zero-based batch number.
    pub index: usize,
    /// Number of titles in the batch.
    pub titles: usize,
    pub outcome: BatchOutcome,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Fetched(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub batches: Vec<BatchResult>,
}

impl FetchReport {
    /// Records of all successful batches, in batch order.
    pub fn records(&self) -> Vec<ProcessorRecord> {
        self.batches
            .iter()
            .filter_map(|b| match &b.outcome {
                BatchOutcome::Fetched(records) => Some(records.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchResult> {
        self.batches.iter().filter(|b| !b.is_success())
    }

    pub fn successful_batches(&self) -> usize {
        self.batches.iter().filter(|b| b.is_success()).count()
    }

    /// Titles that belonged to failed batches and therefore yielded no data.
    pub fn lost_titles(&self) -> usize {
        self.failed().map(|b| b.titles).sum()
    }

    /// Log one line per failed batch and an overall tally.
    pub fn log_summary(&self) {
        let total = self.batches.len();
        for batch in self.failed() {
            match &batch.outcome {
                BatchOutcome::ApiError(message) => warn!(
                    "Skipped batch {}/{total} after API error: {message}",
                    batch.index + 1
                ),
                BatchOutcome::Exhausted { attempts, last_error } => warn!(
                    "Skipped batch {}/{total} after {attempts} failed attempts: {last_error}",
                    batch.index + 1
                ),
                BatchOutcome::Fetched(_) => {}
            }
        }
        info!(
            "Fetched {} processors from {}/{total} batches ({} titles skipped)",
            self.records().len(),
            self.successful_batches(),
            self.lost_titles()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ProcessorRecord {
        ProcessorRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_records_skip_failed_batches() {
        let report = FetchReport {
            batches: vec![
                BatchResult {
                    index: 0,
                    titles: 2,
                    outcome: BatchOutcome::Fetched(vec![named("a"), named("b")]),
                },
                BatchResult {
                    index: 1,
                    titles: 2,
                    outcome: BatchOutcome::Exhausted {
                        attempts: 3,
                        last_error: "timeout".to_string(),
                    },
                },
                BatchResult {
                    index: 2,
                    titles: 1,
                    outcome: BatchOutcome::Fetched(vec![named("c")]),
                },
            ],
        };
        let names: Vec<_> = report
            .records()
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(report.successful_batches(), 2);
        assert_eq!(report.lost_titles(), 2);
        assert_eq!(report.failed().count(), 1);
    }
}
