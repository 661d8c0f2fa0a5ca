//! Request, campaign, and artifact model shared by the client, engine,
//! and store crates.

use crate::error::ReportError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Newsletter editions the platform sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsletterType {
    Am,
    Pm,
    Energy,
    HealthCare,
    BreakingNews,
}

impl NewsletterType {
    /// Case-insensitive title fragments identifying this edition in
    /// campaign titles on the platform. Health care campaigns are titled
    /// either "HC" or "Health Care".
    pub fn title_patterns(&self) -> &'static [&'static str] {
        match self {
            NewsletterType::Am => &["am"],
            NewsletterType::Pm => &["pm"],
            NewsletterType::Energy => &["energy"],
            NewsletterType::HealthCare => &["hc", "health care"],
            NewsletterType::BreakingNews => &["breaking news", "breaking"],
        }
    }

    /// True when a campaign title names this edition.
    pub fn matches_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.title_patterns().iter().any(|p| title.contains(p))
    }
}

impl fmt::Display for NewsletterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NewsletterType::Am => "AM",
            NewsletterType::Pm => "PM",
            NewsletterType::Energy => "Energy",
            NewsletterType::HealthCare => "HealthCare",
            NewsletterType::BreakingNews => "BreakingNews",
        };
        f.write_str(label)
    }
}

/// Inclusive date window a report covers. Compared on calendar dates only,
/// never time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

/// A reportable metric. The derive order is the canonical column order for
/// aggregation output and CSV export; do not reorder variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    UniqueOpens,
    TotalOpens,
    TotalRecipients,
    TotalClicks,
    Ctr,
}

impl Metric {
    /// Header label used by CSV export.
    pub fn column_label(&self) -> &'static str {
        match self {
            Metric::UniqueOpens => "Unique Opens",
            Metric::TotalOpens => "Total Opens",
            Metric::TotalRecipients => "Total Recipients",
            Metric::TotalClicks => "Total Clicks",
            Metric::Ctr => "Ctr",
        }
    }
}

/// Which metrics the caller asked for. At least one must be set for a
/// request to be valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    #[serde(default)]
    pub unique_opens: bool,
    #[serde(default)]
    pub total_opens: bool,
    #[serde(default)]
    pub total_recipients: bool,
    #[serde(default)]
    pub total_clicks: bool,
    #[serde(default)]
    pub ctr: bool,
}

impl MetricSelection {
    pub fn any(&self) -> bool {
        self.unique_opens || self.total_opens || self.total_recipients || self.total_clicks || self.ctr
    }

    pub fn is_selected(&self, metric: Metric) -> bool {
        match metric {
            Metric::UniqueOpens => self.unique_opens,
            Metric::TotalOpens => self.total_opens,
            Metric::TotalRecipients => self.total_recipients,
            Metric::TotalClicks => self.total_clicks,
            Metric::Ctr => self.ctr,
        }
    }

    /// Selected metrics in canonical column order.
    pub fn selected(&self) -> Vec<Metric> {
        [
            Metric::UniqueOpens,
            Metric::TotalOpens,
            Metric::TotalRecipients,
            Metric::TotalClicks,
            Metric::Ctr,
        ]
        .into_iter()
        .filter(|m| self.is_selected(*m))
        .collect()
    }
}

/// Input to one report generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub newsletter_type: NewsletterType,
    pub advertiser: String,
    pub tracking_terms: Vec<String>,
    pub date_range: DateRange,
    pub metrics: MetricSelection,
    /// Display name for the artifact; derived from advertiser, type, and
    /// today's date when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl ReportRequest {
    /// Reject malformed requests before any remote call is made.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.advertiser.trim().is_empty() {
            return Err(ReportError::Validation("advertiser must not be empty".into()));
        }
        if self.tracking_terms.is_empty() {
            return Err(ReportError::Validation(
                "at least one tracking term is required".into(),
            ));
        }
        if self.tracking_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ReportError::Validation("tracking terms must not be empty".into()));
        }
        if !self.metrics.any() {
            return Err(ReportError::Validation(
                "at least one metric must be requested".into(),
            ));
        }
        if !self.date_range.is_valid() {
            return Err(ReportError::Validation(format!(
                "start date {} is after end date {}",
                self.date_range.start, self.date_range.end
            )));
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            format!(
                "{}-{}-{}",
                self.advertiser,
                self.newsletter_type,
                Utc::now().format("%Y-%m-%d")
            )
        })
    }
}

/// One sent newsletter instance, as listed by the remote platform.
/// Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub send_time: DateTime<Utc>,
    /// Link URLs tracked by the platform for this campaign.
    pub tracked_urls: Vec<String>,
    /// Advertiser-associated keywords attached to the campaign.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Campaign {
    pub fn send_date(&self) -> NaiveDate {
        self.send_time.date_naive()
    }
}

/// Raw engagement counts fetched per matched campaign.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CampaignStats {
    pub opens: u64,
    pub unique_opens: u64,
    pub recipients: u64,
    pub clicks: u64,
}

/// A campaign confirmed to be in range and matching at least one tracking
/// term. `matched_terms` is diagnostic only.
#[derive(Debug, Clone)]
pub struct MatchedCampaign {
    pub campaign: Campaign,
    pub matched_terms: Vec<String>,
}

/// Per-campaign metric row. Only requested metrics appear as keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign_id: String,
    pub send_date: NaiveDate,
    pub metrics: BTreeMap<Metric, f64>,
}

/// Aggregation output: one row per matched campaign plus a computed total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub rows: Vec<CampaignRow>,
    pub totals: BTreeMap<Metric, f64>,
}

impl AggregatedMetrics {
    /// True when at least one requested total is non-zero.
    pub fn has_data(&self) -> bool {
        self.totals.values().any(|v| *v != 0.0)
    }
}

/// The persisted output of one successful generation. Owned by the report
/// store once saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub id: Uuid,
    pub name: String,
    pub advertiser: String,
    pub newsletter_type: NewsletterType,
    pub date_range: DateRange,
    pub created_at: DateTime<Utc>,
    pub metrics: AggregatedMetrics,
    /// Per-campaign stat-fetch failures recorded during generation.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}
