use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::cli::AnalyzeArgs;
use crate::error::Result;
use crate::reconcile::{
    comparisons_to_table, diffs_to_table, filter_significant_diffs, reconcile, CompareOptions,
};
use crate::table::io::{ensure_dir, load_csv, save_csv};

pub const MATCHING_FILE: &str = "matching_processor_names.csv";
pub const DIFF_FILE: &str = "diff_cores_or_tdp.csv";

/// Counts reported by an analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub matched: usize,
    pub significant: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
    pub written: Vec<PathBuf>,
}

/// Entry point of the `analyze` subcommand.
pub fn run_analyze_mode(args: &AnalyzeArgs) -> Result<()> {
    let opts = CompareOptions {
        label1: args.label1.clone(),
        label2: args.label2.clone(),
        ..CompareOptions::default()
    };
    run_analysis(
        &args.input_file1,
        &args.input_file2,
        &args.output_dir,
        &opts,
        args.threshold,
    )?;
    Ok(())
}

/// Compare two CSV tables and write the reports into `output_dir`.
///
/// A missing input is logged and yields `Ok(None)` without writing anything.
pub fn run_analysis(
    input1: &Path,
    input2: &Path,
    output_dir: &Path,
    opts: &CompareOptions,
    threshold: f64,
) -> Result<Option<AnalysisSummary>> {
    ensure_dir(output_dir)?;

    let (Some(left), Some(right)) = (load_csv(input1)?, load_csv(input2)?) else {
        error!("Missing one or both input files");
        return Ok(None);
    };

    let result = reconcile(&left, &right, opts)?;
    let mut summary = AnalysisSummary {
        matched: result.matched.len(),
        unmatched_left: result.unmatched_left.len(),
        unmatched_right: result.unmatched_right.len(),
        ..AnalysisSummary::default()
    };

    if result.matched.is_empty() {
        info!("No matching processor names found");
    } else {
        let path = output_dir.join(MATCHING_FILE);
        info!(
            "Found {} matching processor names, saving to {}",
            result.matched.len(),
            path.display()
        );
        save_csv(&comparisons_to_table(&result.matched, opts), &path)?;
        summary.written.push(path);

        let diffs = filter_significant_diffs(&result.matched, threshold);
        let path = output_dir.join(DIFF_FILE);
        info!(
            "Found {} processors with TDP or core count differences > {threshold}, saving to {}",
            diffs.len(),
            path.display()
        );
        save_csv(&diffs_to_table(&diffs, opts), &path)?;
        summary.significant = diffs.len();
        summary.written.push(path);
    }

    for (input, table) in [
        (input1, &result.unmatched_left),
        (input2, &result.unmatched_right),
    ] {
        let path = output_dir.join(unmatched_file_name(input));
        save_csv(table, &path)?;
        summary.written.push(path);
    }

    Ok(Some(summary))
}

/// `unmatched_<file name of input>`.
pub fn unmatched_file_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("unmatched_{base}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_file_name() {
        assert_eq!(
            unmatched_file_name(Path::new("data/CPU_TDP_wikichip.csv")),
            "unmatched_CPU_TDP_wikichip.csv"
        );
        assert_eq!(unmatched_file_name(Path::new("plain.csv")), "unmatched_plain.csv");
    }
}
