use crate::config::Settings;
use crate::domain::news::{NewsArticle, NewsItem};
use crate::news::NewsGateway;
use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";
const MAX_PAGE: usize = 100;

/// Google News search through a Serper-compatible JSON endpoint, Korean locale.
#[derive(Debug, Clone)]
pub struct NewsSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsSearchClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = std::env::var("NEWS_BASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(settings.call_timeout)
            .build()
            .context("failed to build news http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.news_api_key.clone(),
        })
    }

    async fn fetch(&self, api_key: &str, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let url = format!("{}/news", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "q": query,
            "gl": "kr",
            "hl": "ko",
            "num": max_results.min(MAX_PAGE),
        });

        let res = self
            .http
            .post(url)
            .header("X-API-KEY", api_key)
            .json(&body)
            .send()
            .await
            .context("news request failed")?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("news HTTP {status}: {}", text.chars().take(200).collect::<String>());
        }

        let parsed = res
            .json::<SearchResponse>()
            .await
            .context("failed to parse news response")?;
        Ok(articles_from_response(parsed, max_results))
    }
}

#[async_trait::async_trait]
impl NewsGateway for NewsSearchClient {
    fn provider_name(&self) -> &'static str {
        "news_search"
    }

    async fn search(&self, company_name: &str, max_results: usize) -> Vec<NewsItem> {
        if max_results == 0 {
            return Vec::new();
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return vec![NewsItem::unavailable("NEWS_API_KEY is not configured")];
        };

        let query = search_query(company_name);
        match self.fetch(api_key, &query, max_results).await {
            Ok(items) => {
                tracing::debug!(%query, count = items.len(), "fetched news");
                items
            }
            Err(err) => {
                tracing::warn!(%query, error = %err, "news feed unavailable");
                vec![NewsItem::unavailable(err.to_string())]
            }
        }
    }
}

pub(crate) fn search_query(company_name: &str) -> String {
    format!("{} 주가", company_name.trim())
}

fn articles_from_response(res: SearchResponse, max_results: usize) -> Vec<NewsItem> {
    res.news
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| {
            let title = n.title.trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(NewsItem::Article(NewsArticle {
                title,
                link: n.link,
                published: n.date.filter(|d| !d.trim().is_empty()),
                source: n.source.filter(|s| !s.trim().is_empty()),
            }))
        })
        .take(max_results)
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Option<Vec<SearchHit>>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    source: Option<String>,
}
