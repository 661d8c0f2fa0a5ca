//! Mailchimp v3 API client. Wire DTOs are private; the rest of the system
//! only sees `Campaign` and `CampaignStats`.

use crate::api::CampaignApi;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsreport_core::config::MailchimpConfig;
use newsreport_core::types::{Campaign, CampaignStats, DateRange};
use newsreport_core::{ReportError, ReportResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct MailchimpClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    page_size: usize,
    policy: RetryPolicy,
}

impl MailchimpClient {
    pub fn new(config: &MailchimpConfig) -> ReportResult<Self> {
        if config.api_key.is_empty() {
            return Err(ReportError::Auth("Mailchimp api key is not configured".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ReportError::Network(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.effective_base_url(),
            page_size: config.page_size,
            policy: RetryPolicy::new(config.max_rate_limit_retries),
        })
    }

    /// GET a JSON resource with the crate's retry policy applied.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ReportResult<T> {
        let mut attempt: u32 = 0;
        loop {
            match self.get_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) => match self.policy.backoff(&err, attempt) {
                    Some(delay) => {
                        warn!(
                            url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Transient API failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> ReportResult<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ReportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body, retry_after));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReportError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success HTTP status to the error taxonomy.
fn error_for_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> ReportError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ReportError::Auth(format!("Mailchimp rejected credentials: {}", truncate(body)))
        }
        StatusCode::TOO_MANY_REQUESTS => ReportError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        StatusCode::NOT_FOUND => ReportError::NotFound(truncate(body)),
        _ => ReportError::Network(format!("Mailchimp API error {}: {}", status, truncate(body))),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

// ─── Wire DTOs ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CampaignsPage {
    #[serde(default)]
    campaigns: Vec<CampaignDto>,
    #[serde(default)]
    total_items: usize,
}

#[derive(Debug, Deserialize)]
struct CampaignDto {
    id: String,
    send_time: Option<String>,
    #[serde(default)]
    settings: CampaignSettingsDto,
}

#[derive(Debug, Default, Deserialize)]
struct CampaignSettingsDto {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ClickDetailsPage {
    #[serde(default)]
    urls_clicked: Vec<UrlClickedDto>,
    #[serde(default)]
    total_items: usize,
}

#[derive(Debug, Deserialize)]
struct UrlClickedDto {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CampaignReportDto {
    #[serde(default)]
    emails_sent: u64,
    #[serde(default)]
    opens: OpensDto,
    #[serde(default)]
    clicks: ClicksDto,
}

#[derive(Debug, Default, Deserialize)]
struct OpensDto {
    #[serde(default)]
    opens_total: u64,
    #[serde(default)]
    unique_opens: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ClicksDto {
    #[serde(default)]
    clicks_total: u64,
}

impl CampaignDto {
    /// Campaigns without a parseable send time cannot be date-filtered and
    /// are dropped from the listing.
    fn into_campaign(self) -> Option<Campaign> {
        let raw = self.send_time?;
        let send_time: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()?;
        Some(Campaign {
            id: self.id,
            title: self.settings.title,
            send_time,
            // Tracked URLs live in the click-details report, resolved per
            // candidate campaign through fetch_clicked_urls.
            tracked_urls: Vec::new(),
            // The v3 campaign payload carries no keyword list; keyword
            // matching applies only to platforms that supply one.
            keywords: Vec::new(),
        })
    }
}

fn list_url(base: &str, audience_id: &str, range: &DateRange, offset: usize, count: usize) -> String {
    format!(
        "{}/campaigns?list_id={}&since_send_time={}T00:00:00Z&before_send_time={}T23:59:59Z&offset={}&count={}",
        base, audience_id, range.start, range.end, offset, count
    )
}

#[async_trait]
impl CampaignApi for MailchimpClient {
    async fn list_campaigns(
        &self,
        audience_id: &str,
        range: &DateRange,
    ) -> ReportResult<Vec<Campaign>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let url = list_url(&self.base_url, audience_id, range, offset, self.page_size);
            let page: CampaignsPage = match self.get_json(&url).await {
                Ok(page) => page,
                // An unknown audience is an empty listing, not a failure.
                Err(ReportError::NotFound(_)) => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };
            let fetched = page.campaigns.len();
            debug!(offset, fetched, total = page.total_items, "Fetched campaign page");
            all.extend(page.campaigns.into_iter().filter_map(CampaignDto::into_campaign));
            offset += fetched;
            if fetched == 0 || offset >= page.total_items {
                break;
            }
        }
        Ok(all)
    }

    async fn fetch_clicked_urls(&self, campaign_id: &str) -> ReportResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut offset = 0;
        loop {
            let url = format!(
                "{}/reports/{}/click-details?offset={}&count={}",
                self.base_url, campaign_id, offset, self.page_size
            );
            let page: ClickDetailsPage = match self.get_json(&url).await {
                Ok(page) => page,
                // A campaign with no click report yet has no tracked links.
                Err(ReportError::NotFound(_)) => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };
            let fetched = page.urls_clicked.len();
            debug!(campaign_id, offset, fetched, total = page.total_items, "Fetched click-details page");
            urls.extend(page.urls_clicked.into_iter().map(|u| u.url));
            offset += fetched;
            if fetched == 0 || offset >= page.total_items {
                break;
            }
        }
        Ok(urls)
    }

    async fn fetch_stats(&self, campaign_id: &str) -> ReportResult<CampaignStats> {
        let url = format!("{}/reports/{}", self.base_url, campaign_id);
        let report: CampaignReportDto = self.get_json(&url).await?;
        Ok(CampaignStats {
            opens: report.opens.opens_total,
            unique_opens: report.opens.unique_opens,
            recipients: report.emails_sent,
            clicks: report.clicks.clicks_total,
        })
    }
}
