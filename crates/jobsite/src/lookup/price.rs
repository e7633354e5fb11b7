use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;

use crate::config::SearchConfig;
use crate::error::LookupError;
use crate::lookup::manuals::{decode_entities, text_content};
use crate::lookup::{http_client, parse_http_url, BestEffort};
use crate::sanitize::redact_url;

static RE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>").unwrap()
});
static RE_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b(?:CAD|CA|USD|US|C)\s?)?\$\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?").unwrap()
});
static RE_META_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(?:itemprop\s*=\s*["']price["'][^>]*content\s*=\s*["']|"price"\s*:\s*"?)(\d+(?:\.\d{1,2})?)"#)
        .unwrap()
});

/// Fetches a product page and scans it for something that looks like a
/// price.
pub struct PriceSniffer {
    client: Client,
    timeout: Duration,
}

impl PriceSniffer {
    pub fn new(config: &SearchConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: http_client(config)?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Empty string when nothing was found or the page could not be
    /// fetched.
    pub fn sniff_price(&self, url: &str) -> BestEffort<String> {
        let _span = tracing::info_span!("lookup.price", url = %redact_url(url)).entered();
        let result = BestEffort::from_result(
            "Price sniff",
            self.fetch(url).map(|html| find_price(&html).unwrap_or_default()),
        );
        log::debug!("Price sniff found {:?}", result.value);
        result
    }

    fn fetch(&self, url: &str) -> Result<String, LookupError> {
        let url = parse_http_url(url)?;
        let response = self.client.get(url).timeout(self.timeout).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

/// First price in the visible text of `html`, falling back to structured
/// product data (`itemprop="price"` or a JSON `"price"` field).
pub fn find_price(html: &str) -> Option<String> {
    let visible = RE_SCRIPT.replace_all(html, " ");
    let text = text_content(&visible);

    if let Some(m) = RE_PRICE.find(&text) {
        return Some(m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));
    }

    RE_META_PRICE
        .captures(&decode_entities(html))
        .map(|caps| format!("${}", &caps[1]))
}
