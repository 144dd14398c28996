pub mod change;
pub mod demographics;
pub mod platforms;
pub mod range;
pub mod report;
pub mod trends;

use crate::analyzer::range::RangeRequest;
use crate::analyzer::report::{AggregatedReport, SavedReport};
use crate::config::Config;
use crate::dataset::HistoricalReport;
use anyhow::Result;

/// Resolves the request's interval and aggregates the raw document over it.
pub fn summarize(raw: &HistoricalReport, request: &RangeRequest) -> AggregatedReport {
    let resolved = range::resolve(request);
    report::build_aggregated_report(raw, &resolved)
}

pub fn summarize_and_save(
    config: &Config,
    raw: &HistoricalReport,
    request: &RangeRequest,
) -> Result<(AggregatedReport, SavedReport)> {
    let summary = summarize(raw, request);
    let saved = report::save_report_files(&summary, &config.report_dir)?;

    Ok((summary, saved))
}
