//! In-memory gateways for unit tests.

use crate::domain::market::{Period, StockSnapshot};
use crate::domain::news::NewsItem;
use crate::llm::{IntelligenceGateway, Provider};
use crate::market::MarketDataGateway;
use crate::news::NewsGateway;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub(crate) fn snapshot(ticker: &str, name: &str, price: f64, change_percent: f64) -> StockSnapshot {
    StockSnapshot {
        ticker: ticker.to_string(),
        display_name: name.to_string(),
        current_price: price,
        period: Period::OneMonth,
        price_change_percent: change_percent,
        period_high: price,
        period_low: price,
        average_volume: 1_000,
        market_cap: None,
        sector: None,
        currency: None,
        fifty_two_week_high: None,
        fifty_two_week_low: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeMarket {
    listings: HashMap<String, StockSnapshot>,
    pub history_calls: AtomicUsize,
}

impl FakeMarket {
    pub fn with(mut self, snap: StockSnapshot) -> Self {
        self.listings.insert(snap.ticker.clone(), snap);
        self
    }

    pub fn calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for FakeMarket {
    fn provider_name(&self) -> &'static str {
        "fake_market"
    }

    async fn get_history(&self, ticker: &str, period: Period) -> anyhow::Result<StockSnapshot> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match self.listings.get(ticker) {
            Some(s) => Ok(StockSnapshot {
                period,
                ..s.clone()
            }),
            None => anyhow::bail!("no price history for {ticker}"),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeNews {
    items: Vec<NewsItem>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeNews {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            items: titles
                .iter()
                .enumerate()
                .map(|(i, t)| NewsItem::article(*t, format!("https://news.example/{i}")))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            items: vec![NewsItem::unavailable(error)],
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl NewsGateway for FakeNews {
    fn provider_name(&self) -> &'static str {
        "fake_news"
    }

    async fn search(&self, _company_name: &str, max_results: usize) -> Vec<NewsItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.items.iter().take(max_results).cloned().collect()
    }
}

/// Replies with a fixed completion, or fails every call when built with [`FakeIntelligence::failing`].
pub(crate) struct FakeIntelligence {
    reply: Result<String, String>,
    available: bool,
    delay: Duration,
    pub calls: AtomicUsize,
    pub last_context: Mutex<Option<String>>,
}

impl FakeIntelligence {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            available: true,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            available: true,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: Err("not configured".to_string()),
            available: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Sleeps for `delay` before every completion.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IntelligenceGateway for FakeIntelligence {
    fn provider(&self) -> Provider {
        if self.available {
            Provider::Anthropic
        } else {
            Provider::Disabled
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, _system_prompt: &str, context: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_context.lock() {
            *last = Some(context.to_string());
        }
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => anyhow::bail!("{e}"),
        }
    }
}

/// Canned HTTP/1.1 responder on a loopback port. Each route is a path prefix, a
/// delay before answering and a body; unknown paths get a 404. Returns the base URL.
pub(crate) async fn stub_http(routes: Vec<(&'static str, Duration, String)>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while read < buf.len() {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&buf[..read]);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = match routes.iter().find(|(prefix, _, _)| path.starts_with(prefix)) {
                    Some((_, delay, body)) => {
                        tokio::time::sleep(*delay).await;
                        ("200 OK", body.clone())
                    }
                    None => ("404 Not Found", String::new()),
                };

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Plain client for talking to [`stub_http`]; ignores proxy environment variables.
pub(crate) fn local_http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
