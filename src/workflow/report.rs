//! Report Assembler - one markdown document per scheduled run

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::session::SessionLabel;
use crate::types::AnalysisResult;

/// Closes the header and every instrument section.
pub const SEPARATOR: &str = "---\n\n";

/// Fixed risk notice, appended once at the very end.
pub const DISCLAIMER: &str = "*Risk notice: AI suggestions are for reference only and do not constitute investment advice. The market carries risk; decide with care.*";

/// Timestamp format of the "generated at" line.
const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Push title for a report dated `benchmark_date`.
pub fn report_title(benchmark_date: NaiveDate) -> String {
    format!("{benchmark_date} AI advisory report")
}

/// Build the report text.
///
/// Header lines (benchmark date, generation time, session note) come first,
/// then one section per result in order, then the disclaimer. Pure.
pub fn assemble(
    benchmark_date: NaiveDate,
    generated_at: &DateTime<FixedOffset>,
    session: SessionLabel,
    results: &[AnalysisResult],
) -> String {
    let mut report = format!(
        "**Benchmark date:** {benchmark_date}\n\n**Generated at:** {}\n\n**Session:** {}\n\n{SEPARATOR}",
        generated_at.format(GENERATED_AT_FORMAT),
        session.note(),
    );

    for result in results {
        report.push_str(&section(result));
        report.push_str(SEPARATOR);
    }

    report.push_str("\n\n");
    report.push_str(DISCLAIMER);
    report
}

/// Body of one instrument section, without its trailing separator.
fn section(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Advice { advice, .. } => format!("{advice}\n\n"),
        AnalysisResult::Failed { code, error } => {
            format!("### Instrument: {code}\n\n> {error}\n\n")
        }
    }
}
