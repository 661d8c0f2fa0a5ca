//! Remote campaign client for the Mailchimp v3 API — campaign listing with
//! internal pagination, per-campaign stats, auth and rate-limit handling.

pub mod api;
pub mod client;
pub mod retry;

pub use api::CampaignApi;
pub use client::MailchimpClient;
pub use retry::RetryPolicy;
