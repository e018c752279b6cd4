use serde::de::DeserializeOwned;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// First balanced `{...}` span in `text` that deserializes as `T`.
///
/// Tolerates prose, code fences and several objects in one reply; spans that are not
/// valid JSON or do not fit `T` are skipped.
pub fn first_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    first_object_where(text, |_: &T| true)
}

/// Like [`first_object`], but also skips parsed objects rejected by `accept`.
pub fn first_object_where<T, F>(text: &str, accept: F) -> Option<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            if let Ok(parsed) = serde_json::from_str::<T>(&text[start..start + end]) {
                if accept(&parsed) {
                    return Some(parsed);
                }
            }
        }
        from = start + 1;
    }

    // Whole-reply fallback covers fenced output whose braces are unbalanced by prose.
    extract_json(text)
        .and_then(|s| serde_json::from_str::<T>(&s).ok())
        .filter(|parsed| accept(parsed))
}

// Byte length of the object starting at s[0] == '{', honouring JSON strings.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        ticker: String,
        name: String,
    }

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "prefix {\"a\":1} suffix";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn first_object_tolerates_surrounding_prose() {
        let reply = "Sure! The ticker is:\n{\"ticker\": \"005930.KS\", \"name\": \"삼성전자\"}\nHope that helps {smile}";
        let pair: Pair = first_object(reply).unwrap();
        assert_eq!(pair.ticker, "005930.KS");
        assert_eq!(pair.name, "삼성전자");
    }

    #[test]
    fn first_object_skips_records_of_the_wrong_shape() {
        let reply = "{\"note\": \"thinking\"} then {\"ticker\": \"AAPL\", \"name\": \"Apple {Inc}\"}";
        let pair: Pair = first_object(reply).unwrap();
        assert_eq!(pair.ticker, "AAPL");
        assert_eq!(pair.name, "Apple {Inc}");
    }

    #[test]
    fn first_object_reads_fenced_reply() {
        let reply = "```json\n{\"ticker\": \"TSLA\", \"name\": \"Tesla\"}\n```";
        let pair: Pair = first_object(reply).unwrap();
        assert_eq!(pair.ticker, "TSLA");
    }

    #[test]
    fn first_object_where_skips_rejected_records() {
        #[derive(Debug, Deserialize)]
        struct Loose {
            #[serde(default)]
            ticker: Option<String>,
        }

        let reply = "{\"reasoning\": \"looks like Kakao\"}\n{\"ticker\": \"035720.KS\"}";
        let hit: Loose = first_object_where(reply, |l: &Loose| l.ticker.is_some()).unwrap();
        assert_eq!(hit.ticker.as_deref(), Some("035720.KS"));
        assert!(first_object_where("{\"reasoning\": \"x\"}", |l: &Loose| l.ticker.is_some()).is_none());
    }

    #[test]
    fn first_object_returns_none_for_garbage() {
        assert!(first_object::<Pair>("no json here").is_none());
        assert!(first_object::<Pair>("{\"ticker\": \"AAPL\"").is_none());
    }
}
