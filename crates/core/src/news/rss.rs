use crate::config::Settings;
use crate::domain::news::{NewsArticle, NewsItem};
use crate::news::search::search_query;
use crate::news::NewsGateway;
use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://news.google.com";

/// Keyless Google News RSS search, Korean edition. Used when no search API key is set.
#[derive(Debug, Clone)]
pub struct GoogleNewsRssClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleNewsRssClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = std::env::var("NEWS_RSS_BASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(settings.call_timeout)
            .build()
            .context("failed to build news rss http client")?;

        Ok(Self { http, base_url })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: crate::testing::local_http(),
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let url = format!("{}/rss/search", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[("q", query), ("hl", "ko"), ("gl", "KR"), ("ceid", "KR:ko")])
            .send()
            .await
            .context("news rss request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "news rss HTTP {status}");

        let body = res.text().await.context("failed to read news rss response")?;
        articles_from_feed(&body, max_results)
    }
}

#[async_trait::async_trait]
impl NewsGateway for GoogleNewsRssClient {
    fn provider_name(&self) -> &'static str {
        "google_news_rss"
    }

    async fn search(&self, company_name: &str, max_results: usize) -> Vec<NewsItem> {
        if max_results == 0 {
            return Vec::new();
        }

        let query = search_query(company_name);
        match self.fetch(&query, max_results).await {
            Ok(items) => {
                tracing::debug!(%query, count = items.len(), "fetched news rss");
                items
            }
            Err(err) => {
                tracing::warn!(%query, error = %err, "news rss feed unavailable");
                vec![NewsItem::unavailable(format!("{err:#}"))]
            }
        }
    }
}

fn articles_from_feed(xml: &str, max_results: usize) -> Result<Vec<NewsItem>> {
    let feed: Rss = quick_xml::de::from_str(xml).context("failed to parse news rss feed")?;

    Ok(feed
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let source = item
                .source
                .map(|s| s.name.trim().to_string())
                .filter(|s| !s.is_empty());
            let title = strip_publisher(item.title.trim(), source.as_deref());
            if title.is_empty() {
                return None;
            }
            Some(NewsItem::Article(NewsArticle {
                title: title.to_string(),
                link: item.link.trim().to_string(),
                published: item.pub_date.filter(|d| !d.trim().is_empty()),
                source,
            }))
        })
        .take(max_results)
        .collect())
}

// Google News appends " - {publisher}" to every headline.
fn strip_publisher<'a>(title: &'a str, source: Option<&str>) -> &'a str {
    source
        .and_then(|s| title.strip_suffix(s))
        .and_then(|t| t.strip_suffix(" - "))
        .map(str::trim_end)
        .unwrap_or(title)
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default, rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(default)]
    source: Option<RssSource>,
}

#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(default, rename = "$text")]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_http;
    use std::time::Duration;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"삼성전자 주가" - Google 뉴스</title>
    <link>https://news.google.com/search?q=%EC%82%BC%EC%84%B1</link>
    <language>ko</language>
    <item>
      <title>삼성전자 신고가 경신 - 연합뉴스</title>
      <link>https://news.google.com/rss/articles/a1</link>
      <guid isPermaLink="false">a1</guid>
      <pubDate>Mon, 19 Oct 2026 01:00:00 GMT</pubDate>
      <description>&lt;a href="https://n.example/1"&gt;삼성전자 신고가 경신&lt;/a&gt;</description>
      <source url="https://www.yna.co.kr">연합뉴스</source>
    </item>
    <item>
      <title> </title>
      <link>https://news.google.com/rss/articles/blank</link>
    </item>
    <item>
      <title>반도체 업황 개선 &amp; 수출 증가</title>
      <link>https://news.google.com/rss/articles/a2</link>
    </item>
    <item>
      <title>외국인 순매수 확대 - 한국경제</title>
      <link>https://news.google.com/rss/articles/a3</link>
      <source url="https://www.hankyung.com">한국경제</source>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_strips_publisher_suffix() {
        let items = articles_from_feed(FEED, 5).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title(), Some("삼성전자 신고가 경신"));
        assert_eq!(items[1].title(), Some("반도체 업황 개선 & 수출 증가"));
        match &items[0] {
            NewsItem::Article(a) => {
                assert_eq!(a.source.as_deref(), Some("연합뉴스"));
                assert_eq!(a.link, "https://news.google.com/rss/articles/a1");
                assert_eq!(a.published.as_deref(), Some("Mon, 19 Oct 2026 01:00:00 GMT"));
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn caps_results_in_feed_order() {
        let items = articles_from_feed(FEED, 2).unwrap();
        let titles: Vec<_> = items.iter().filter_map(NewsItem::title).collect();
        assert_eq!(titles, vec!["삼성전자 신고가 경신", "반도체 업황 개선 & 수출 증가"]);
    }

    #[test]
    fn title_without_matching_publisher_is_kept() {
        assert_eq!(strip_publisher("Kakao rallies - Reuters", Some("Bloomberg")), "Kakao rallies - Reuters");
        assert_eq!(strip_publisher("Kakao rallies", None), "Kakao rallies");
    }

    #[test]
    fn malformed_feed_is_an_error() {
        assert!(articles_from_feed("<html><body>blocked</body></html>", 5).is_err());
    }

    #[tokio::test]
    async fn searches_the_feed_without_a_key() {
        let base = stub_http(vec![("/rss/search", Duration::ZERO, FEED.to_string())]).await;
        let client = GoogleNewsRssClient::with_base_url(base);

        let items = client.search("삼성전자", 5).await;
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|n| n.title().is_some()));
    }

    #[tokio::test]
    async fn unreachable_feed_yields_unavailable_sentinel() {
        let base = stub_http(Vec::new()).await;
        let client = GoogleNewsRssClient::with_base_url(base);

        let items = client.search("삼성전자", 5).await;
        match items.as_slice() {
            [NewsItem::Unavailable { error }] => assert!(error.contains("404"), "{error}"),
            other => panic!("expected a single unavailable sentinel, got {other:?}"),
        }
    }
}
