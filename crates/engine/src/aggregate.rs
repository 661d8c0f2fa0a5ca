//! Metric aggregation over matched campaigns.
//!
//! Raw metrics are summed across campaigns; CTR is derived once from the
//! aggregated totals (clicks / recipients, 0.0 when there are no
//! recipients) and rounded to four decimal places. Only requested metrics
//! appear in the output.

use newsreport_core::types::{
    AggregatedMetrics, CampaignRow, CampaignStats, MatchedCampaign, Metric, MetricSelection,
};
use std::collections::BTreeMap;

const CTR_PRECISION: f64 = 10_000.0;

fn round_ctr(value: f64) -> f64 {
    (value * CTR_PRECISION).round() / CTR_PRECISION
}

fn ctr(clicks: u64, recipients: u64) -> f64 {
    if recipients > 0 {
        round_ctr(clicks as f64 / recipients as f64)
    } else {
        0.0
    }
}

/// Aggregate stats for matched campaigns into per-campaign rows plus a
/// computed total. Rows come out sorted by send date ascending.
pub fn aggregate(
    matched: &[(MatchedCampaign, CampaignStats)],
    selection: &MetricSelection,
) -> AggregatedMetrics {
    let mut rows: Vec<CampaignRow> = matched
        .iter()
        .map(|(m, stats)| CampaignRow {
            campaign_id: m.campaign.id.clone(),
            send_date: m.campaign.send_date(),
            metrics: row_metrics(stats, selection),
        })
        .collect();
    rows.sort_by_key(|row| row.send_date);

    let mut totals = BTreeMap::new();
    if selection.unique_opens {
        totals.insert(
            Metric::UniqueOpens,
            matched.iter().map(|(_, s)| s.unique_opens).sum::<u64>() as f64,
        );
    }
    if selection.total_opens {
        totals.insert(
            Metric::TotalOpens,
            matched.iter().map(|(_, s)| s.opens).sum::<u64>() as f64,
        );
    }
    if selection.total_recipients {
        totals.insert(
            Metric::TotalRecipients,
            matched.iter().map(|(_, s)| s.recipients).sum::<u64>() as f64,
        );
    }
    if selection.total_clicks {
        totals.insert(
            Metric::TotalClicks,
            matched.iter().map(|(_, s)| s.clicks).sum::<u64>() as f64,
        );
    }
    if selection.ctr {
        let clicks: u64 = matched.iter().map(|(_, s)| s.clicks).sum();
        let recipients: u64 = matched.iter().map(|(_, s)| s.recipients).sum();
        totals.insert(Metric::Ctr, ctr(clicks, recipients));
    }

    AggregatedMetrics { rows, totals }
}

fn row_metrics(stats: &CampaignStats, selection: &MetricSelection) -> BTreeMap<Metric, f64> {
    let mut metrics = BTreeMap::new();
    if selection.unique_opens {
        metrics.insert(Metric::UniqueOpens, stats.unique_opens as f64);
    }
    if selection.total_opens {
        metrics.insert(Metric::TotalOpens, stats.opens as f64);
    }
    if selection.total_recipients {
        metrics.insert(Metric::TotalRecipients, stats.recipients as f64);
    }
    if selection.total_clicks {
        metrics.insert(Metric::TotalClicks, stats.clicks as f64);
    }
    if selection.ctr {
        metrics.insert(Metric::Ctr, ctr(stats.clicks, stats.recipients));
    }
    metrics
}
