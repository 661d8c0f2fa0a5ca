//! Report generation orchestrator — one request per invocation, driven
//! through Validating → Fetching → Matching → Aggregating → Finalizing and
//! into exactly one terminal outcome.
//!
//! Cancellation is cooperative: the token is checked at every stage
//! transition and before each per-campaign remote call. In-flight fetches
//! are detached and their results discarded; nothing is persisted on
//! cancel.

use crate::aggregate::aggregate;
use crate::matcher::{match_campaigns, prefilter_campaigns};
use crate::outcome::{EmptyReason, ReportOutcome};
use anyhow::anyhow;
use chrono::Utc;
use newsreport_core::progress::{ProgressSink, ProgressTracker, Stage};
use newsreport_core::types::{Campaign, CampaignStats, ReportArtifact, ReportRequest};
use newsreport_core::{CancelToken, ReportError, ReportResult};
use newsreport_mailchimp::CampaignApi;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Persistence seam for the finished artifact. Implemented by the report
/// store; mocked in tests to verify save-call counts.
pub trait ArtifactStore: Send + Sync {
    fn save(&self, artifact: &ReportArtifact) -> ReportResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Validating,
    Fetching,
    Matching,
    Aggregating,
    Finalizing,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::Validating => "validating",
            State::Fetching => "fetching",
            State::Matching => "matching",
            State::Aggregating => "aggregating",
            State::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

pub struct ReportGenerator {
    client: Arc<dyn CampaignApi>,
    store: Arc<dyn ArtifactStore>,
    sink: Arc<dyn ProgressSink>,
    audience_id: String,
    concurrency: usize,
}

impl ReportGenerator {
    pub fn new(
        client: Arc<dyn CampaignApi>,
        store: Arc<dyn ArtifactStore>,
        sink: Arc<dyn ProgressSink>,
        audience_id: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            store,
            sink,
            audience_id: audience_id.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Run one generation to a terminal outcome. The generator is not
    /// reused across requests; callers serialize their own submissions.
    pub async fn generate(&self, request: ReportRequest, cancel: CancelToken) -> ReportOutcome {
        let mut state = State::Idle;
        let mut tracker = ProgressTracker::new(self.sink.as_ref());
        let mut diagnostics: Vec<String> = Vec::new();

        // Validating: reject before any remote call.
        transition(&mut state, State::Validating);
        if cancel.is_cancelled() {
            return ReportOutcome::Cancelled;
        }
        if let Err(e) = request.validate() {
            warn!(error = %e, "Report request rejected");
            return ReportOutcome::Failed(e);
        }
        tracker.checkpoint(Stage::Validating, 5, "request validated");

        // Fetching: the client retries transient failures internally, so
        // any error arriving here is final.
        transition(&mut state, State::Fetching);
        if cancel.is_cancelled() {
            return ReportOutcome::Cancelled;
        }
        tracker.checkpoint(Stage::FetchingCampaigns, 15, "listing campaigns");
        let campaigns = match self.client.list_campaigns(&self.audience_id, &request.date_range).await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Campaign listing failed");
                return ReportOutcome::Failed(e);
            }
        };
        info!(count = campaigns.len(), "Campaign listing complete");

        // Matching: narrow by send date and edition title using listing
        // data, then resolve tracked links per candidate and apply the
        // tracking-term filter.
        transition(&mut state, State::Matching);
        if cancel.is_cancelled() {
            return ReportOutcome::Cancelled;
        }
        let candidates =
            prefilter_campaigns(&campaigns, &request.date_range, request.newsletter_type);
        info!(candidates = candidates.len(), "Date and edition filter applied");

        let mut resolved: Vec<Campaign> = Vec::with_capacity(candidates.len());
        for mut campaign in candidates {
            if cancel.is_cancelled() {
                return ReportOutcome::Cancelled;
            }
            match self.client.fetch_clicked_urls(&campaign.id).await {
                Ok(urls) => {
                    campaign.tracked_urls = urls;
                    resolved.push(campaign);
                }
                Err(e) => {
                    if matches!(e, ReportError::Auth(_)) {
                        return ReportOutcome::Failed(e);
                    }
                    // Non-fatal: the campaign cannot be matched without
                    // its links; exclude it and keep the evidence.
                    warn!(campaign_id = %campaign.id, error = %e, "Click details unavailable, excluding campaign");
                    diagnostics.push(format!(
                        "click details unavailable for campaign {}: {}",
                        campaign.id, e
                    ));
                }
            }
        }
        let matched = match_campaigns(&resolved, &request.tracking_terms);
        let total = matched.len();
        info!(matched = total, "Campaign matching complete");
        tracker.emit(Stage::MatchingCampaigns, 20, "campaigns matched", 0, total);

        // Aggregating: fetch stats per matched campaign with bounded
        // concurrency; zero matches proceeds with an empty set.
        transition(&mut state, State::Aggregating);
        let mut stats: Vec<Option<CampaignStats>> = vec![None; total];
        let mut join_set: JoinSet<(usize, ReportResult<CampaignStats>)> = JoinSet::new();
        let mut issued = 0;
        let mut completed = 0;

        while completed < total {
            while join_set.len() < self.concurrency && issued < total {
                if cancel.is_cancelled() {
                    join_set.detach_all();
                    return ReportOutcome::Cancelled;
                }
                let client = Arc::clone(&self.client);
                let campaign_id = matched[issued].campaign.id.clone();
                let idx = issued;
                join_set.spawn(async move { (idx, client.fetch_stats(&campaign_id).await) });
                issued += 1;
            }

            match join_set.join_next().await {
                Some(Ok((idx, Ok(fetched)))) => {
                    stats[idx] = Some(fetched);
                }
                Some(Ok((idx, Err(e)))) => {
                    if matches!(e, ReportError::Auth(_)) {
                        join_set.detach_all();
                        return ReportOutcome::Failed(e);
                    }
                    // Non-fatal: exclude the campaign, keep the evidence.
                    let campaign_id = &matched[idx].campaign.id;
                    warn!(campaign_id = %campaign_id, error = %e, "Stats fetch failed, excluding campaign");
                    diagnostics.push(format!("stats unavailable for campaign {}: {}", campaign_id, e));
                }
                Some(Err(join_err)) => {
                    join_set.detach_all();
                    return ReportOutcome::Failed(ReportError::Internal(anyhow!(
                        "stat fetch task failed: {join_err}"
                    )));
                }
                None => break,
            }

            completed += 1;
            let percent = 20 + (60.0 * completed as f64 / total as f64).round() as u8;
            tracker.emit(
                Stage::AggregatingMetrics,
                percent,
                "fetching campaign stats",
                completed,
                total,
            );
            if cancel.is_cancelled() {
                join_set.detach_all();
                return ReportOutcome::Cancelled;
            }
        }

        let pairs: Vec<_> = matched
            .into_iter()
            .zip(stats)
            .filter_map(|(m, s)| s.map(|s| (m, s)))
            .collect();
        let metrics = aggregate(&pairs, &request.metrics);
        tracker.emit(Stage::AggregatingMetrics, 90, "metrics aggregated", total, total);

        // Finalizing: classify and, on success, persist before reporting.
        transition(&mut state, State::Finalizing);
        if cancel.is_cancelled() {
            return ReportOutcome::Cancelled;
        }
        if !metrics.has_data() {
            info!("Generation finished with no matching data");
            tracker.checkpoint(Stage::Finalizing, 100, "no matching data");
            return ReportOutcome::EmptyResult(EmptyReason::no_matching_data(&request));
        }

        let artifact = ReportArtifact {
            id: Uuid::new_v4(),
            name: request.display_name(),
            advertiser: request.advertiser.clone(),
            newsletter_type: request.newsletter_type,
            date_range: request.date_range,
            created_at: Utc::now(),
            metrics,
            diagnostics,
        };
        // File I/O stays off the executor threads.
        let store = Arc::clone(&self.store);
        let to_save = artifact.clone();
        let save_result = match tokio::task::spawn_blocking(move || store.save(&to_save)).await {
            Ok(result) => result,
            Err(join_err) => Err(ReportError::Internal(anyhow!("save task failed: {join_err}"))),
        };
        if let Err(e) = save_result {
            warn!(error = %e, "Failed to persist report artifact");
            return ReportOutcome::Failed(e);
        }
        info!(artifact_id = %artifact.id, name = %artifact.name, "Report generated");
        tracker.checkpoint(Stage::Finalizing, 100, "report persisted");
        ReportOutcome::Succeeded(artifact)
    }
}

fn transition(state: &mut State, next: State) {
    debug!(from = %state, to = %next, "State transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use newsreport_core::progress::CaptureSink;
    use newsreport_core::types::{DateRange, Metric, MetricSelection, NewsletterType};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum StatsOutcome {
        Ok(CampaignStats),
        NetworkFail,
        AuthFail,
    }

    #[derive(Default)]
    struct MockApi {
        campaigns: Vec<Campaign>,
        urls: HashMap<String, Vec<String>>,
        urls_fail_for: Option<String>,
        stats: HashMap<String, StatsOutcome>,
        fail_list_with_auth: bool,
        list_calls: AtomicUsize,
        url_calls: AtomicUsize,
        stats_calls: AtomicUsize,
    }

    #[async_trait]
    impl CampaignApi for MockApi {
        async fn list_campaigns(
            &self,
            _audience_id: &str,
            _range: &DateRange,
        ) -> ReportResult<Vec<Campaign>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list_with_auth {
                return Err(ReportError::Auth("expired key".into()));
            }
            Ok(self.campaigns.clone())
        }

        async fn fetch_clicked_urls(&self, campaign_id: &str) -> ReportResult<Vec<String>> {
            self.url_calls.fetch_add(1, Ordering::SeqCst);
            if self.urls_fail_for.as_deref() == Some(campaign_id) {
                return Err(ReportError::Network("connection reset".into()));
            }
            Ok(self.urls.get(campaign_id).cloned().unwrap_or_default())
        }

        async fn fetch_stats(&self, campaign_id: &str) -> ReportResult<CampaignStats> {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            match self.stats.get(campaign_id) {
                Some(StatsOutcome::Ok(stats)) => Ok(*stats),
                Some(StatsOutcome::NetworkFail) => {
                    Err(ReportError::Network("connection reset".into()))
                }
                Some(StatsOutcome::AuthFail) => Err(ReportError::Auth("expired key".into())),
                None => Err(ReportError::NotFound(campaign_id.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct MockStore {
        saves: AtomicUsize,
        fail: bool,
    }

    impl ArtifactStore for MockStore {
        fn save(&self, _artifact: &ReportArtifact) -> ReportResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReportError::Storage("disk full".into()));
            }
            Ok(())
        }
    }

    fn campaign(id: &str, title: &str, day: u32) -> Campaign {
        Campaign {
            id: id.into(),
            title: title.into(),
            send_time: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            tracked_urls: vec![],
            keywords: vec![],
        }
    }

    fn sample_stats() -> CampaignStats {
        CampaignStats {
            opens: 60,
            unique_opens: 40,
            recipients: 100,
            clicks: 10,
        }
    }

    fn request() -> ReportRequest {
        ReportRequest {
            newsletter_type: NewsletterType::Am,
            advertiser: "Acme".into(),
            tracking_terms: vec!["acme.com/promo".into()],
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
            metrics: MetricSelection {
                total_clicks: true,
                total_recipients: true,
                ctr: true,
                ..Default::default()
            },
            name: None,
        }
    }

    fn generator(
        api: Arc<MockApi>,
        store: Arc<MockStore>,
        sink: Arc<CaptureSink>,
    ) -> ReportGenerator {
        ReportGenerator::new(api, store, sink, "aud-1", 4)
    }

    #[tokio::test]
    async fn test_invalid_request_fails_without_remote_calls() {
        let api = Arc::new(MockApi::default());
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(CaptureSink::new());
        let mut req = request();
        req.tracking_terms.clear();

        let outcome = generator(api.clone(), store.clone(), sink)
            .generate(req, CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::Failed(ReportError::Validation(_))));
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_metrics_unselected_is_validation_failure() {
        let api = Arc::new(MockApi::default());
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(CaptureSink::new());
        let mut req = request();
        req.metrics = MetricSelection::default();

        let outcome = generator(api.clone(), store, sink)
            .generate(req, CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::Failed(ReportError::Validation(_))));
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_success_with_matching_campaign() {
        let mut api = MockApi::default();
        api.campaigns = vec![
            campaign("c-1", "AM Newsletter Jan 5", 5),
            campaign("c-2", "AM Newsletter Jan 9", 9),
        ];
        api.urls
            .insert("c-1".into(), vec!["https://acme.com/promo?utm=am".into()]);
        api.urls
            .insert("c-2".into(), vec!["https://other.org/story".into()]);
        api.stats.insert("c-1".into(), StatsOutcome::Ok(sample_stats()));
        let api = Arc::new(api);
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(CaptureSink::new());

        let outcome = generator(api.clone(), store.clone(), sink.clone())
            .generate(request(), CancelToken::new())
            .await;

        let artifact = match outcome {
            ReportOutcome::Succeeded(a) => a,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(artifact.metrics.totals[&Metric::TotalClicks], 10.0);
        assert_eq!(artifact.metrics.totals[&Metric::TotalRecipients], 100.0);
        assert_eq!(artifact.metrics.totals[&Metric::Ctr], 0.1);
        assert_eq!(artifact.metrics.rows.len(), 1);
        assert!(artifact.diagnostics.is_empty());
        // Links are resolved for both in-range AM campaigns, but stats are
        // only fetched for the matching one.
        assert_eq!(api.url_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.stats_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_edition_campaign_not_aggregated() {
        let mut api = MockApi::default();
        api.campaigns = vec![
            campaign("c-am", "AM Newsletter Jan 5", 5),
            campaign("c-pm", "PM Newsletter Jan 5", 5),
        ];
        // Both editions ran the same promo link.
        api.urls
            .insert("c-am".into(), vec!["https://acme.com/promo?utm=am".into()]);
        api.urls
            .insert("c-pm".into(), vec!["https://acme.com/promo?utm=pm".into()]);
        api.stats.insert("c-am".into(), StatsOutcome::Ok(sample_stats()));
        api.stats.insert("c-pm".into(), StatsOutcome::Ok(sample_stats()));
        let api = Arc::new(api);

        let outcome = generator(api.clone(), Arc::new(MockStore::default()), Arc::new(CaptureSink::new()))
            .generate(request(), CancelToken::new())
            .await;

        let artifact = match outcome {
            ReportOutcome::Succeeded(a) => a,
            other => panic!("expected success, got {:?}", other),
        };
        // Only the AM edition contributes; the PM campaign is filtered out
        // before its links or stats are ever fetched.
        assert_eq!(artifact.metrics.totals[&Metric::TotalClicks], 10.0);
        assert_eq!(artifact.metrics.rows.len(), 1);
        assert_eq!(artifact.metrics.rows[0].campaign_id, "c-am");
        assert_eq!(api.url_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.stats_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let mut api = MockApi::default();
        api.campaigns = vec![
            campaign("c-1", "AM Newsletter Jan 5", 5),
            campaign("c-2", "AM Newsletter Jan 6", 6),
            campaign("c-3", "AM Newsletter Jan 7", 7),
        ];
        for id in ["c-1", "c-2", "c-3"] {
            api.urls
                .insert(id.into(), vec!["https://acme.com/promo".into()]);
            api.stats.insert(id.into(), StatsOutcome::Ok(sample_stats()));
        }
        let sink = Arc::new(CaptureSink::new());

        let outcome = generator(Arc::new(api), Arc::new(MockStore::default()), sink.clone())
            .generate(request(), CancelToken::new())
            .await;

        assert!(outcome.is_succeeded());
        let events = sink.events();
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "percents: {:?}", percents);
        assert_eq!(*percents.last().unwrap(), 100);
        // Stage transitions never go backward.
        let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();
        assert!(stages.windows(2).all(|w| w[0] <= w[1]), "stages: {:?}", stages);
    }

    #[tokio::test]
    async fn test_zero_matches_is_empty_result_without_save() {
        let mut api = MockApi::default();
        api.campaigns = vec![campaign("c-1", "AM Newsletter Jan 5", 5)];
        api.urls
            .insert("c-1".into(), vec!["https://other.org/story".into()]);
        let api = Arc::new(api);
        let store = Arc::new(MockStore::default());
        let sink = Arc::new(CaptureSink::new());

        let outcome = generator(api.clone(), store.clone(), sink.clone())
            .generate(request(), CancelToken::new())
            .await;

        let reason = match outcome {
            ReportOutcome::EmptyResult(r) => r,
            other => panic!("expected empty result, got {:?}", other),
        };
        assert_eq!(reason.hints.len(), 3);
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(api.stats_calls.load(Ordering::SeqCst), 0);
        assert_eq!(sink.last_percent(), Some(100));
    }

    #[tokio::test]
    async fn test_all_zero_totals_is_empty_result() {
        let mut api = MockApi::default();
        api.campaigns = vec![campaign("c-1", "AM Newsletter Jan 5", 5)];
        api.urls
            .insert("c-1".into(), vec!["https://acme.com/promo".into()]);
        api.stats
            .insert("c-1".into(), StatsOutcome::Ok(CampaignStats::default()));
        let store = Arc::new(MockStore::default());

        let outcome = generator(Arc::new(api), store.clone(), Arc::new(CaptureSink::new()))
            .generate(request(), CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::EmptyResult(_)));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_before_submission_observed() {
        let api = Arc::new(MockApi::default());
        let store = Arc::new(MockStore::default());
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = generator(api.clone(), store.clone(), Arc::new(CaptureSink::new()))
            .generate(request(), cancel)
            .await;

        assert!(matches!(outcome, ReportOutcome::Cancelled));
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_during_listing_is_fatal() {
        let mut api = MockApi::default();
        api.fail_list_with_auth = true;
        let store = Arc::new(MockStore::default());

        let outcome = generator(Arc::new(api), store.clone(), Arc::new(CaptureSink::new()))
            .generate(request(), CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::Failed(ReportError::Auth(_))));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_click_details_failure_recorded_as_diagnostic() {
        let mut api = MockApi::default();
        api.campaigns = vec![
            campaign("c-1", "AM Newsletter Jan 5", 5),
            campaign("c-2", "AM Newsletter Jan 6", 6),
        ];
        api.urls
            .insert("c-1".into(), vec!["https://acme.com/promo".into()]);
        api.urls_fail_for = Some("c-2".into());
        api.stats.insert("c-1".into(), StatsOutcome::Ok(sample_stats()));

        let outcome = generator(
            Arc::new(api),
            Arc::new(MockStore::default()),
            Arc::new(CaptureSink::new()),
        )
        .generate(request(), CancelToken::new())
        .await;

        let artifact = match outcome {
            ReportOutcome::Succeeded(a) => a,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(artifact.metrics.rows.len(), 1);
        assert_eq!(artifact.diagnostics.len(), 1);
        assert!(artifact.diagnostics[0].contains("c-2"));
    }

    #[tokio::test]
    async fn test_partial_stats_failure_recorded_as_diagnostic() {
        let mut api = MockApi::default();
        api.campaigns = vec![
            campaign("c-1", "AM Newsletter Jan 5", 5),
            campaign("c-2", "AM Newsletter Jan 6", 6),
        ];
        for id in ["c-1", "c-2"] {
            api.urls
                .insert(id.into(), vec!["https://acme.com/promo".into()]);
        }
        api.stats.insert(
            "c-1".into(),
            StatsOutcome::Ok(CampaignStats {
                opens: 20,
                unique_opens: 12,
                recipients: 80,
                clicks: 4,
            }),
        );
        api.stats.insert("c-2".into(), StatsOutcome::NetworkFail);

        let outcome = generator(
            Arc::new(api),
            Arc::new(MockStore::default()),
            Arc::new(CaptureSink::new()),
        )
        .generate(request(), CancelToken::new())
        .await;

        let artifact = match outcome {
            ReportOutcome::Succeeded(a) => a,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(artifact.metrics.rows.len(), 1);
        assert_eq!(artifact.diagnostics.len(), 1);
        assert!(artifact.diagnostics[0].contains("c-2"));
    }

    #[tokio::test]
    async fn test_auth_failure_during_stats_is_fatal() {
        let mut api = MockApi::default();
        api.campaigns = vec![campaign("c-1", "AM Newsletter Jan 5", 5)];
        api.urls
            .insert("c-1".into(), vec!["https://acme.com/promo".into()]);
        api.stats.insert("c-1".into(), StatsOutcome::AuthFail);
        let store = Arc::new(MockStore::default());

        let outcome = generator(Arc::new(api), store.clone(), Arc::new(CaptureSink::new()))
            .generate(request(), CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::Failed(ReportError::Auth(_))));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let mut api = MockApi::default();
        api.campaigns = vec![campaign("c-1", "AM Newsletter Jan 5", 5)];
        api.urls
            .insert("c-1".into(), vec!["https://acme.com/promo".into()]);
        api.stats.insert("c-1".into(), StatsOutcome::Ok(sample_stats()));
        let store = Arc::new(MockStore {
            fail: true,
            ..Default::default()
        });

        let outcome = generator(Arc::new(api), store, Arc::new(CaptureSink::new()))
            .generate(request(), CancelToken::new())
            .await;

        assert!(matches!(outcome, ReportOutcome::Failed(ReportError::Storage(_))));
    }
}
