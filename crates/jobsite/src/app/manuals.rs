use std::path::Path;

use super::{ApiResponse, JobsiteApp, Notice};
use crate::error::{LookupError, ValidationError};
use crate::lookup::{BestEffort, ManualFinder, PriceSniffer, SearchHit};
use crate::session::{Page, SessionContext};

/// Pending-input key holding the last manual search query.
pub const MANUAL_QUERY_KEY: &str = "manuals::query";

/// Best-effort results are always successful responses; a failure only
/// changes the notice.
fn soft<T>(result: BestEffort<T>, what: &str, found: Option<String>) -> ApiResponse<T> {
    let notice = match (result.failure, found) {
        (Some(kind), _) => Notice::warning(format!("{} failed ({}); try again later", what, kind)),
        (None, Some(message)) => Notice::success(message),
        (None, None) => Notice::info(format!("{}: nothing found", what)),
    };
    ApiResponse::ok(result.value).with_notice(notice)
}

fn unavailable<T: Default>(what: &str, error: LookupError) -> BestEffort<T> {
    BestEffort::from_result(what, Err(error))
}

impl JobsiteApp {
    pub fn search_manuals(
        &self,
        session: &mut SessionContext,
        query: &str,
    ) -> ApiResponse<Vec<SearchHit>> {
        session.navigate(Page::Manuals);
        let query = query.trim();
        if query.is_empty() {
            return ApiResponse::rejected(ValidationError::EmptyQuery);
        }
        session.set_input(MANUAL_QUERY_KEY, query);

        let result = match ManualFinder::new(&self.config.search) {
            Ok(finder) => finder.search(query),
            Err(e) => unavailable("Manual search", e),
        };
        let found = (!result.value.is_empty())
            .then(|| format!("Found {} manual(s)", result.value.len()));
        soft(result, "Manual search", found)
    }

    /// Downloads `url` into the manuals directory.
    pub fn download_manual(
        &self,
        session: &mut SessionContext,
        url: &str,
    ) -> ApiResponse<Option<String>> {
        session.navigate(Page::Manuals);

        let result = match ManualFinder::new(&self.config.search) {
            Ok(finder) => finder.download(url, &self.config.manuals_path()),
            Err(e) => unavailable("Manual download", e),
        };
        let result = BestEffort {
            value: result.value.map(|p| p.display().to_string()),
            failure: result.failure,
        };
        let found = result.value.as_ref().map(|p| format!("Saved {}", p));
        soft(result, "Manual download", found)
    }

    /// Price string found on the page at `url`, or empty.
    pub fn sniff_price(&self, session: &mut SessionContext, url: &str) -> ApiResponse<String> {
        session.navigate(Page::Manuals);

        let result = match PriceSniffer::new(&self.config.search) {
            Ok(sniffer) => sniffer.sniff_price(url),
            Err(e) => unavailable("Price sniff", e),
        };
        let found = (!result.value.is_empty()).then(|| format!("Price: {}", result.value));
        soft(result, "Price sniff", found)
    }

    /// Text recognized in the image at `path`, or empty.
    pub fn extract_text(&self, session: &mut SessionContext, path: &Path) -> ApiResponse<String> {
        session.navigate(Page::Photos);

        let result = self.ocr.extract_file(path);
        let found = (!result.value.is_empty())
            .then(|| format!("Recognized {} character(s)", result.value.chars().count()));
        soft(result, "Text extraction", found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::open_app;
    use crate::app::NoticeLevel;

    #[test]
    fn test_blank_query_is_rejected() {
        let (_dir, app) = open_app();
        let mut session = SessionContext::new();

        let response = app.search_manuals(&mut session, "  ");

        assert!(!response.success);
        assert_eq!(session.page(), Page::Manuals);
        assert_eq!(session.input(MANUAL_QUERY_KEY), None);
    }

    #[test]
    fn test_invalid_download_url_is_a_soft_failure() {
        let (_dir, app) = open_app();
        let mut session = SessionContext::new();

        let response = app.download_manual(&mut session, "not a url");

        assert!(response.success);
        assert_eq!(response.data, Some(None));
        assert_eq!(response.notice.map(|n| n.level), Some(NoticeLevel::Warning));
        assert!(!app.config().manuals_path().exists());
    }

    #[test]
    fn test_price_sniff_invalid_url_is_empty() {
        let (_dir, app) = open_app();
        let mut session = SessionContext::new();

        let response = app.sniff_price(&mut session, "mailto:someone@example.com");

        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some(""));
        assert_eq!(response.notice.map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn test_ocr_disabled_is_a_soft_failure() {
        let (_dir, app) = open_app();
        let mut session = SessionContext::new();

        let response = app.extract_text(&mut session, Path::new("/nonexistent/label.png"));

        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some(""));
        assert_eq!(response.notice.map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn test_soft_notice_levels() {
        let found = soft(BestEffort::ok(vec![1]), "Search", Some("Found 1".into()));
        assert_eq!(found.notice.unwrap().level, NoticeLevel::Success);

        let empty = soft(BestEffort::ok(Vec::<u8>::new()), "Search", None);
        assert_eq!(empty.notice.unwrap().message, "Search: nothing found");
    }
}
