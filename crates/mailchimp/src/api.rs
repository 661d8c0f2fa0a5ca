use async_trait::async_trait;
use newsreport_core::types::{Campaign, CampaignStats, DateRange};
use newsreport_core::ReportResult;

/// Seam between the report engine and the remote marketing platform.
///
/// `list_campaigns` paginates internally and hands the caller one flattened
/// sequence; the listing carries no link data. `fetch_clicked_urls`
/// resolves the tracked link URLs for one campaign and is called per
/// date/edition candidate. `fetch_stats` is called per matched campaign
/// only, so engagement counts are never fetched for campaigns the tracking
/// filter discards.
#[async_trait]
pub trait CampaignApi: Send + Sync {
    async fn list_campaigns(
        &self,
        audience_id: &str,
        range: &DateRange,
    ) -> ReportResult<Vec<Campaign>>;

    async fn fetch_clicked_urls(&self, campaign_id: &str) -> ReportResult<Vec<String>>;

    async fn fetch_stats(&self, campaign_id: &str) -> ReportResult<CampaignStats>;
}
