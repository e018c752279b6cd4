/// A listing the local fallback knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub ticker: &'static str,
    pub name: &'static str,
}

pub const POPULAR: &[Listing] = &[
    Listing { ticker: "005930.KS", name: "삼성전자" },
    Listing { ticker: "000660.KS", name: "SK하이닉스" },
    Listing { ticker: "035420.KS", name: "NAVER" },
    Listing { ticker: "005380.KS", name: "현대차" },
    Listing { ticker: "051910.KS", name: "LG화학" },
    Listing { ticker: "035720.KS", name: "카카오" },
    Listing { ticker: "006400.KS", name: "삼성SDI" },
    Listing { ticker: "207940.KS", name: "삼성바이오로직스" },
    Listing { ticker: "AAPL", name: "Apple" },
    Listing { ticker: "MSFT", name: "Microsoft" },
    Listing { ticker: "NVDA", name: "NVIDIA" },
    Listing { ticker: "TSLA", name: "Tesla" },
    Listing { ticker: "GOOGL", name: "Alphabet" },
    Listing { ticker: "AMZN", name: "Amazon" },
];

// Alternate spellings, romanizations and common typos. Keys are already normalized.
const ALIASES: &[(&str, &str)] = &[
    ("samsung", "005930.KS"),
    ("samsungelectronics", "005930.KS"),
    ("삼성", "005930.KS"),
    ("삼송전자", "005930.KS"),
    ("샘숭", "005930.KS"),
    ("삼전", "005930.KS"),
    ("skhynix", "000660.KS"),
    ("hynix", "000660.KS"),
    ("하이닉스", "000660.KS"),
    ("에스케이하이닉스", "000660.KS"),
    ("네이버", "035420.KS"),
    ("naver", "035420.KS"),
    ("hyundai", "005380.KS"),
    ("hyundaimotor", "005380.KS"),
    ("현대자동차", "005380.KS"),
    ("lgchem", "051910.KS"),
    ("엘지화학", "051910.KS"),
    ("kakao", "035720.KS"),
    ("까카오", "035720.KS"),
    ("samsungsdi", "006400.KS"),
    ("삼성에스디아이", "006400.KS"),
    ("samsungbiologics", "207940.KS"),
    ("삼성바이오", "207940.KS"),
    ("apple", "AAPL"),
    ("애플", "AAPL"),
    ("microsoft", "MSFT"),
    ("마이크로소프트", "MSFT"),
    ("마소", "MSFT"),
    ("nvidia", "NVDA"),
    ("엔비디아", "NVDA"),
    ("tesla", "TSLA"),
    ("테슬라", "TSLA"),
    ("google", "GOOGL"),
    ("구글", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("알파벳", "GOOGL"),
    ("amazon", "AMZN"),
    ("아마존", "AMZN"),
];

/// Lower-cases and drops whitespace so "Samsung Electronics" and "samsungelectronics" compare equal.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn name_for(ticker: &str) -> Option<&'static str> {
    POPULAR.iter().find(|l| l.ticker == ticker).map(|l| l.name)
}

/// Popular listings whose name contains the query, or is contained in it, in list order.
pub fn popular_matches(query: &str) -> Vec<Listing> {
    let q = normalize(query);
    if q.chars().count() < 2 {
        return Vec::new();
    }
    POPULAR
        .iter()
        .filter(|l| {
            let name = normalize(l.name);
            name.contains(&q) || q.contains(&name)
        })
        .copied()
        .collect()
}

/// Alias hits for the query: an exact alias first, then aliases contained in the query, longest first.
pub fn alias_matches(query: &str) -> Vec<&'static str> {
    let q = normalize(query);
    if q.is_empty() {
        return Vec::new();
    }

    if let Some((_, ticker)) = ALIASES.iter().find(|(alias, _)| *alias == q) {
        return vec![*ticker];
    }

    let mut hits: Vec<(&str, &str)> = ALIASES
        .iter()
        .copied()
        .filter(|(alias, _)| q.contains(alias))
        .collect();
    hits.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.chars().count()));

    let mut tickers: Vec<&'static str> = Vec::new();
    for (_, ticker) in hits {
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
