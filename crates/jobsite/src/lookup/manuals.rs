use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Serialize;
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::error::LookupError;
use crate::lookup::{http_client, parse_http_url, BestEffort, FailureKind};
use crate::sanitize::{redact_path, redact_url, truncate};

const QUERY_SUFFIX: &str = "manual filetype:pdf";
/// Longest query text recorded in spans and log lines.
const QUERY_LOG_CHARS: usize = 40;

static RE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").unwrap());
static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static RE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// PDF manual search against an HTML search endpoint, plus downloads of
/// the hits.
pub struct ManualFinder {
    client: Client,
    endpoint: String,
    timeout: Duration,
    download_timeout: Duration,
    max_results: usize,
}

impl ManualFinder {
    pub fn new(config: &SearchConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
            max_results: config.max_results,
        })
    }

    /// Empty on any failure; an empty value with `is_ok()` means "no
    /// results".
    pub fn search(&self, query: &str) -> BestEffort<Vec<SearchHit>> {
        let query = query.trim();
        let _span = tracing::info_span!("lookup.search", query = %query_label(query)).entered();

        if query.is_empty() {
            return BestEffort::failed(Vec::new(), FailureKind::InvalidInput);
        }

        let result = BestEffort::from_result("Manual search", self.try_search(query));
        log::info!("Manual search returned {} result(s)", result.value.len());
        result
    }

    fn try_search(&self, query: &str) -> Result<Vec<SearchHit>, LookupError> {
        let endpoint = parse_http_url(&self.endpoint)?;
        let q = format!("{} {}", query, QUERY_SUFFIX);

        let response = self
            .client
            .get(endpoint)
            .query(&[("q", q.as_str())])
            .timeout(self.timeout)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let base = response.url().clone();
        let html = response.text()?;
        Ok(parse_results(&html, &base, self.max_results))
    }

    /// Saves `url` as `manual_{8-hex}.pdf` under `dest_dir`. Redirects are
    /// followed. A partially written file is removed.
    pub fn download(&self, url: &str, dest_dir: &Path) -> BestEffort<Option<PathBuf>> {
        let _span = tracing::info_span!("lookup.download", url = %redact_url(url)).entered();
        BestEffort::from_result("Manual download", self.try_download(url, dest_dir).map(Some))
    }

    fn try_download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, LookupError> {
        let url = parse_http_url(url)?;

        let mut response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        std::fs::create_dir_all(dest_dir).map_err(|e| LookupError::Io {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let path = dest_dir.join(format!("manual_{}.pdf", short_id()));
        let mut file = File::create(&path).map_err(|e| LookupError::Io {
            path: path.clone(),
            source: e,
        })?;

        match response.copy_to(&mut file) {
            Ok(bytes) => {
                log::info!("Downloaded manual {} ({} bytes)", redact_path(&path), bytes);
                Ok(path)
            }
            Err(e) => {
                drop(file);
                let _ = std::fs::remove_file(&path);
                Err(e.into())
            }
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Extracts result links (`<a class="result__a">`) from a search results
/// page. Hits are deduplicated by URL, in page order, at most `max_results`.
pub fn parse_results(html: &str, base: &Url, max_results: usize) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for anchor in RE_ANCHOR.captures_iter(html) {
        if hits.len() >= max_results {
            break;
        }

        let attrs = &anchor[1];
        let is_result = attribute(&RE_CLASS, attrs)
            .is_some_and(|class| class.split_whitespace().any(|c| c == "result__a"));
        if !is_result {
            continue;
        }

        let Some(url) = attribute(&RE_HREF, attrs).and_then(|href| normalize_url(href, base))
        else {
            continue;
        };

        if seen.insert(url.clone()) {
            hits.push(SearchHit {
                title: text_content(&anchor[2]),
                url,
            });
        }
    }

    hits
}

fn attribute<'h>(re: &Regex, attrs: &'h str) -> Option<&'h str> {
    let caps = re.captures(attrs)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Resolves `href` against `base` and unwraps `uddg` redirect links when
/// their target is http(s).
fn normalize_url(href: &str, base: &Url) -> Option<String> {
    let href = decode_entities(href.trim());
    if href.is_empty() {
        return None;
    }

    let absolute = base.join(&href).ok()?;
    if let Some((_, target)) = absolute.query_pairs().find(|(key, _)| key == "uddg") {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Some(target.into_owned());
        }
    }
    Some(absolute.to_string())
}

/// Tag-stripped, entity-decoded, whitespace-collapsed text of an HTML
/// fragment.
pub(crate) fn text_content(fragment: &str) -> String {
    let stripped = RE_TAG.replace_all(fragment, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn decode_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let code = if let Some(hex) =
                        entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn query_label(query: &str) -> String {
    truncate(query, QUERY_LOG_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_label_is_shortened() {
        assert_eq!(query_label("Square D QO"), "Square D QO");

        let long = "Square D QO load center 200A main breaker installation guide";
        let label = query_label(long);
        assert_eq!(label.chars().count(), QUERY_LOG_CHARS + 3);
        assert!(label.ends_with("..."));
        assert!(long.starts_with(label.trim_end_matches("...")));
    }

    fn base() -> Url {
        Url::parse("https://duckduckgo.com/html/").unwrap()
    }

    const RESULTS_PAGE: &str = r#"
<div class="results">
  <div class="result">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.eaton.com%2Fch%2Dpanel%2Emanual.pdf&amp;rut=abc">
      Eaton <b>CH</b> Loadcenter &amp; Breaker Manual
    </a>
    <a class="result__snippet" href="https://ignored.example/snippet">snippet</a>
  </div>
  <div class="result">
    <a class="result__a" href="https://example.com/docs/gfci.pdf">GFCI &#8211; Install Guide</a>
  </div>
  <div class="result">
    <a class="result__a" href="/l/?uddg=https%3A%2F%2Fwww.eaton.com%2Fch%2Dpanel%2Emanual.pdf">Duplicate</a>
  </div>
  <div class="result">
    <a class="result__a" href="/l/?uddg=javascript%3Aalert(1)">Not http</a>
  </div>
  <div class="result">
    <a class="result__a" href="">Empty</a>
  </div>
</div>
"#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(RESULTS_PAGE, &base(), 8);

        assert_eq!(hits.len(), 3);
        assert_eq!(
            hits[0],
            SearchHit {
                title: "Eaton CH Loadcenter & Breaker Manual".to_string(),
                url: "https://www.eaton.com/ch-panel.manual.pdf".to_string(),
            }
        );
        assert_eq!(hits[1].title, "GFCI \u{2013} Install Guide");
        assert_eq!(hits[1].url, "https://example.com/docs/gfci.pdf");
        // A uddg target that is not http(s) keeps the joined redirect link.
        assert!(hits[2].url.starts_with("https://duckduckgo.com/l/?uddg="));
    }

    #[test]
    fn test_parse_results_caps_at_max() {
        let hits = parse_results(RESULTS_PAGE, &base(), 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_parse_results_without_hits() {
        assert!(parse_results("<html><body>No results.</body></html>", &base(), 8).is_empty());
        assert!(parse_results("", &base(), 8).is_empty());
    }

    #[test]
    fn test_single_quoted_attributes() {
        let html = "<a href='https://example.com/a.pdf' class='result__a big'>A</a>";
        let hits = parse_results(html, &base(), 8);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://example.com/a.pdf");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#39;x&#x27;"), "'x'");
        assert_eq!(decode_entities("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_text_content() {
        assert_eq!(text_content("  <b>Square&nbsp;D</b>\n  QO  "), "Square D QO");
    }

    #[test]
    fn test_blank_query_is_rejected_without_network() {
        let finder = ManualFinder::new(&SearchConfig::default()).unwrap();
        let result = finder.search("   ");
        assert!(!result.is_ok());
        assert_eq!(result.failure, Some(FailureKind::InvalidInput));
        assert!(result.value.is_empty());
    }

    #[test]
    fn test_download_rejects_non_http_url() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let finder = ManualFinder::new(&SearchConfig::default()).unwrap();

        let result = finder.download("ftp://example.com/manual.pdf", temp_dir.path());

        assert_eq!(result.failure, Some(FailureKind::InvalidInput));
        assert_eq!(result.value, None);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
