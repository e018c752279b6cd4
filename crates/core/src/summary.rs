use crate::call;
use crate::domain::news::{headline_titles, NewsItem};
use crate::domain::record::GeneratedText;
use crate::llm::IntelligenceGateway;
use std::sync::Arc;
use std::time::Duration;

const FALLBACK_TITLES: usize = 3;
const FALLBACK_HEADING: &str = "Recent news:";

const SYSTEM_PROMPT: &str = "You are a financial news summarizer. Read the headlines and \
summarize the key points in 3-4 concise sentences. Answer in the language of the headlines.";

pub struct NewsSummarizer {
    intelligence: Arc<dyn IntelligenceGateway>,
    call_timeout: Duration,
}

impl NewsSummarizer {
    pub fn new(intelligence: Arc<dyn IntelligenceGateway>, call_timeout: Duration) -> Self {
        Self {
            intelligence,
            call_timeout,
        }
    }

    /// Never fails; an absent or failing provider yields the raw-title summary.
    pub async fn summarize(&self, news: &[NewsItem]) -> GeneratedText {
        let titles: Vec<&str> = headline_titles(news).collect();
        if titles.is_empty() || !self.intelligence.is_available() {
            return GeneratedText::fallback(fallback_summary(news));
        }

        let context = titles
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n");

        let res = call::bounded(
            self.call_timeout,
            "news summary",
            self.intelligence.complete(SYSTEM_PROMPT, &context),
        )
        .await;

        match res {
            Ok(text) if !text.trim().is_empty() => GeneratedText::intelligence(text.trim()),
            Ok(_) => {
                tracing::warn!("news summary came back empty; using headline list");
                GeneratedText::fallback(fallback_summary(news))
            }
            Err(err) => {
                tracing::warn!(error = %err, "news summary degraded to headline list");
                GeneratedText::fallback(fallback_summary(news))
            }
        }
    }
}

/// Bullet list of the first few usable headlines.
pub fn fallback_summary(news: &[NewsItem]) -> String {
    let bullets: Vec<String> = headline_titles(news)
        .take(FALLBACK_TITLES)
        .map(|t| format!("- {t}"))
        .collect();

    if bullets.is_empty() {
        return format!("{FALLBACK_HEADING} no headlines collected.");
    }
    format!("{FALLBACK_HEADING}\n{}", bullets.join("\n"))
}
