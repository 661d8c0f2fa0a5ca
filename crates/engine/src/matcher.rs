//! Campaign filtering, in two stages. `prefilter_campaigns` narrows the
//! listing by send date and newsletter edition using listing data alone, so
//! it runs before any per-campaign remote call. `match_campaigns` then
//! applies the tracking-term filter once tracked URLs have been resolved.

use newsreport_core::types::{Campaign, DateRange, MatchedCampaign, NewsletterType};

/// Filter campaigns to those sent within the date range (inclusive, send
/// date only) whose title names the requested newsletter edition. Output
/// preserves input order.
pub fn prefilter_campaigns(
    campaigns: &[Campaign],
    range: &DateRange,
    newsletter_type: NewsletterType,
) -> Vec<Campaign> {
    campaigns
        .iter()
        .filter(|c| range.contains(c.send_date()))
        .filter(|c| newsletter_type.matches_title(&c.title))
        .cloned()
        .collect()
}

/// Filter campaigns to those matching at least one tracking term. A term
/// matches when it is a case-insensitive substring of any tracked link URL,
/// or equals a campaign keyword case-insensitively. Output preserves input
/// order.
pub fn match_campaigns(campaigns: &[Campaign], tracking_terms: &[String]) -> Vec<MatchedCampaign> {
    campaigns
        .iter()
        .filter_map(|campaign| {
            let matched_terms: Vec<String> = tracking_terms
                .iter()
                .filter(|term| term_matches(campaign, term))
                .cloned()
                .collect();
            if matched_terms.is_empty() {
                None
            } else {
                Some(MatchedCampaign {
                    campaign: campaign.clone(),
                    matched_terms,
                })
            }
        })
        .collect()
}

fn term_matches(campaign: &Campaign, term: &str) -> bool {
    let term_lower = term.to_lowercase();
    let url_match = campaign
        .tracked_urls
        .iter()
        .any(|url| url.to_lowercase().contains(&term_lower));
    let keyword_match = campaign
        .keywords
        .iter()
        .any(|kw| kw.to_lowercase() == term_lower);
    url_match || keyword_match
}
