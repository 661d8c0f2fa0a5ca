use serde::Deserialize;
use tokio::sync::watch;

/// Root application configuration. Loaded from environment variables with
/// the prefix `NEWSREPORT__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mailchimp: MailchimpConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailchimpConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub audience_id: String,
    /// Explicit API base url. When empty it is derived from the api key's
    /// datacenter suffix (`xxxx-us1` -> `https://us1.api.mailchimp.com/3.0`).
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_stat_fetch_concurrency")]
    pub stat_fetch_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_reports_path")]
    pub reports_path: String,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_rate_limit_retries() -> u32 {
    3
}

fn default_page_size() -> usize {
    1000
}

fn default_stat_fetch_concurrency() -> usize {
    6
}

fn default_reports_path() -> String {
    "reports.json".to_string()
}

fn default_download_dir() -> String {
    ".".to_string()
}

impl Default for MailchimpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            audience_id: String::new(),
            base_url: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            max_rate_limit_retries: default_rate_limit_retries(),
            page_size: default_page_size(),
            stat_fetch_concurrency: default_stat_fetch_concurrency(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reports_path: default_reports_path(),
            download_dir: default_download_dir(),
        }
    }
}

impl MailchimpConfig {
    /// Resolve the effective base url, deriving the datacenter from the api
    /// key suffix when no explicit url is configured.
    pub fn effective_base_url(&self) -> String {
        if !self.base_url.is_empty() {
            return self.base_url.trim_end_matches('/').to_string();
        }
        let dc = self.api_key.split('-').next_back().filter(|s| !s.is_empty());
        format!("https://{}.api.mailchimp.com/3.0", dc.unwrap_or("us1"))
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("NEWSREPORT")
                .separator("__")
                .try_parsing(true),
        );
        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// Publish/subscribe handle for settings changes. The settings collaborator
/// publishes a new `AppConfig`; consumers read the current value at the
/// start of each generation instead of polling a file on a timer.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    rx: watch::Receiver<AppConfig>,
}

#[derive(Debug)]
pub struct ConfigPublisher {
    tx: watch::Sender<AppConfig>,
}

impl ConfigHandle {
    pub fn new(initial: AppConfig) -> (ConfigPublisher, ConfigHandle) {
        let (tx, rx) = watch::channel(initial);
        (ConfigPublisher { tx }, ConfigHandle { rx })
    }

    /// Current configuration snapshot.
    pub fn current(&self) -> AppConfig {
        self.rx.borrow().clone()
    }

    /// Wait until the next published change.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl ConfigPublisher {
    pub fn publish(&self, config: AppConfig) {
        // Receivers may all be gone during shutdown; nothing to do then.
        let _ = self.tx.send(config);
    }
}
