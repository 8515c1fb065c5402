//! Next-page discovery for payloads and rendered markup.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::extract::scan::ScanResult;
use crate::utils::{element_text, resolve_url};

static PAGINATION_LAST: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"nav[aria-label="Pagination"] a:last-child"#).unwrap());

static PAGE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="page="]"#).unwrap());

const NEXT_LABEL: &str = "Next";
const DISABLED_CLASS: &str = "wt-is-disabled";

/// Pagination URLs of a scanned JSON payload not yet in `seen`, in document
/// order. Returned URLs are recorded in `seen`.
pub fn discover_from_json(found: &ScanResult<'_>, seen: &mut HashSet<String>) -> Vec<String> {
    found
        .next_urls
        .iter()
        .filter(|url| seen.insert((*url).clone()))
        .cloned()
        .collect()
}

/// Next review page linked from rendered markup, absolutized against
/// `page_url`.
///
/// Prefers the last link of the pagination nav when it is enabled and
/// labelled "Next"; otherwise any `page=` link whose text or label says
/// "Next".
pub fn discover_next_page(document: &Html, page_url: &Url) -> Option<String> {
    let primary = document.select(&PAGINATION_LAST).find(|a| {
        let el = a.value();
        !el.classes().any(|c| c == DISABLED_CLASS)
            && el
                .attr("aria-label")
                .is_some_and(|label| label.contains(NEXT_LABEL))
    });

    let link = primary.or_else(|| {
        document.select(&PAGE_LINKS).find(|a| {
            element_text(a).contains(NEXT_LABEL)
                || a
                    .value()
                    .attr("aria-label")
                    .is_some_and(|label| label.contains(NEXT_LABEL))
        })
    })?;

    link.value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(page_url, href))
}
