//! Search engine crawler detection from the `User-Agent` header.

use axum::http::{HeaderMap, header};

/// Lowercase user-agent fragments identifying search engine crawlers.
const SEARCH_BOT_TOKENS: &[&str] = &[
    "googlebot",
    "bingbot",
    "msnbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandex",
    "sogou",
    "exabot",
    "facebookexternalhit",
    "ia_archiver",
    "applebot",
    "seznambot",
    "naver",
];

/// Whether the user agent belongs to a known search engine crawler.
pub fn is_search_bot(user_agent: Option<&str>) -> bool {
    let Some(user_agent) = user_agent else {
        return false;
    };
    let user_agent = user_agent.to_ascii_lowercase();
    SEARCH_BOT_TOKENS
        .iter()
        .any(|token| user_agent.contains(token))
}

/// Convenience wrapper reading the `User-Agent` header.
pub fn is_search_bot_request(headers: &HeaderMap) -> bool {
    is_search_bot(
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    )
}
