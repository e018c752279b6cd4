pub mod rss;
pub mod search;

use crate::config::Settings;
use crate::domain::news::NewsItem;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait NewsGateway: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Up to `max_results` recent headlines about `company_name`.
    ///
    /// Never fails: an unreadable feed comes back as a single
    /// [`NewsItem::Unavailable`] entry.
    async fn search(&self, company_name: &str, max_results: usize) -> Vec<NewsItem>;
}

/// The keyed search API when `NEWS_API_KEY` is set, else the keyless RSS feed.
pub fn from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn NewsGateway>> {
    let gateway: Arc<dyn NewsGateway> = if settings.news_api_key.is_some() {
        Arc::new(search::NewsSearchClient::from_settings(settings)?)
    } else {
        Arc::new(rss::GoogleNewsRssClient::from_settings(settings)?)
    };

    tracing::info!(provider = gateway.provider_name(), "news gateway configured");
    Ok(gateway)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyless_settings_use_the_rss_feed() {
        let gateway = from_settings(&Settings::offline()).unwrap();
        assert_eq!(gateway.provider_name(), "google_news_rss");
    }

    #[test]
    fn configured_key_uses_the_search_api() {
        let mut settings = Settings::offline();
        settings.news_api_key = Some("serper-test".to_string());
        let gateway = from_settings(&settings).unwrap();
        assert_eq!(gateway.provider_name(), "news_search");
    }
}
