use newsreport_core::types::{ReportArtifact, ReportRequest};
use newsreport_core::ReportError;

/// Terminal result of one report generation.
#[derive(Debug)]
pub enum ReportOutcome {
    Succeeded(ReportArtifact),
    EmptyResult(EmptyReason),
    Failed(ReportError),
    Cancelled,
}

impl ReportOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, ReportOutcome::Succeeded(_))
    }
}

/// Structured "no matching data" explanation. All candidate causes are
/// surfaced as hints; the engine does not guess which one applied.
#[derive(Debug, Clone)]
pub struct EmptyReason {
    pub message: String,
    pub hints: Vec<String>,
}

impl EmptyReason {
    pub fn no_matching_data(request: &ReportRequest) -> Self {
        Self {
            message: format!(
                "No campaign data matched the request for advertiser '{}'",
                request.advertiser
            ),
            hints: vec![
                format!(
                    "Check the tracking terms ({}) against the campaign links",
                    request.tracking_terms.join(", ")
                ),
                format!(
                    "Check the date range ({} to {})",
                    request.date_range.start, request.date_range.end
                ),
                format!("Check the advertiser spelling ('{}')", request.advertiser),
            ],
        }
    }
}
