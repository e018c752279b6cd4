use crate::domain::news::{headline_titles, NewsItem};
use crate::domain::scores::{Sentiment, SentimentResult};

const POSITIVE: &[&str] = &[
    "상승", "증가", "성장", "호재", "개선", "확대", "급등", "최고", "신고가",
    "surge", "surges", "rally", "rallies", "soar", "soars", "gain", "gains", "growth",
    "record high", "upgrade", "upgraded", "beat", "beats", "outperform",
];

const NEGATIVE: &[&str] = &[
    "하락", "감소", "악화", "악재", "하락세", "급락", "최저", "위기", "손실",
    "plunge", "plunges", "slump", "slumps", "drop", "drops", "decline", "declines", "loss",
    "losses", "downgrade", "downgraded", "crisis", "miss", "misses", "underperform",
];

const POSITIVE_ABOVE: f64 = 60.0;
const NEGATIVE_BELOW: f64 = 40.0;

/// Keyword polarity over headline titles. Error sentinels and blank titles are skipped.
pub fn score(news: &[NewsItem]) -> SentimentResult {
    let mut positive = 0u32;
    let mut negative = 0u32;
    let mut neutral = 0u32;

    for title in headline_titles(news) {
        match classify_title(title) {
            Sentiment::Positive => positive += 1,
            Sentiment::Negative => negative += 1,
            Sentiment::Neutral => neutral += 1,
        }
    }

    let total = positive + negative + neutral;
    if total == 0 {
        return SentimentResult::neutral_empty();
    }

    let raw = (f64::from(positive) - f64::from(negative)) / f64::from(total) * 100.0 + 50.0;
    let score = ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0);

    let classification = if score > POSITIVE_ABOVE {
        Sentiment::Positive
    } else if score < NEGATIVE_BELOW {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentResult {
        classification,
        score,
        positive_count: positive,
        negative_count: negative,
        neutral_count: neutral,
        total_analyzed: total,
    }
}

// A headline hitting both sets is neutral.
fn classify_title(title: &str) -> Sentiment {
    let lowered = title.to_lowercase();
    let pos = POSITIVE.iter().any(|k| contains_keyword(&lowered, k));
    let neg = NEGATIVE.iter().any(|k| contains_keyword(&lowered, k));
    match (pos, neg) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

// ASCII keywords must stand alone as words; Hangul keywords match anywhere since
// particles attach directly to the stem.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return haystack.contains(keyword);
    }
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    haystack.match_indices(keyword).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + keyword.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}
