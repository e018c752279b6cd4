use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
    pub source: Option<String>,
}

/// A headline, or the sentinel a news gateway returns when its feed could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewsItem {
    Article(NewsArticle),
    Unavailable { error: String },
}

impl NewsItem {
    pub fn article(title: impl Into<String>, link: impl Into<String>) -> Self {
        NewsItem::Article(NewsArticle {
            title: title.into(),
            link: link.into(),
            published: None,
            source: None,
        })
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        NewsItem::Unavailable {
            error: error.into(),
        }
    }

    /// Headline text for usable items; `None` for the error sentinel.
    pub fn title(&self) -> Option<&str> {
        match self {
            NewsItem::Article(a) => Some(a.title.as_str()),
            NewsItem::Unavailable { .. } => None,
        }
    }
}

/// Titles of the usable items, in feed order.
pub fn headline_titles(items: &[NewsItem]) -> impl Iterator<Item = &str> {
    items
        .iter()
        .filter_map(NewsItem::title)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
