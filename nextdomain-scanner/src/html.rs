use crate::error::{ActionError, Result};
use crate::result::ScanResult;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Elements whose text never reaches the reader.
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template"];

/// Accepts absolute URLs carrying both a scheme and a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Sorts the anchors of `html` into same-host pages and root-relative hidden pages.
///
/// Root-relative hrefs (`/path`) are always hidden pages, even when the same
/// target also appears as an absolute link, as long as they still resolve to
/// the scanned host (`/\other.host` does not). Document-relative hrefs and links
/// to other hosts are dropped.
pub fn classify_links(page_url: &str, html: &str) -> Result<ScanResult> {
    let base = Url::parse(page_url).map_err(|e| ActionError::InvalidUrl(e.to_string()))?;
    let document = Html::parse_document(html);
    let mut result = ScanResult::new(page_url.to_string());

    for element in document.select(&ANCHORS) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if is_ignored(href) {
            continue;
        }

        if href.starts_with('/') && !href.starts_with("//") {
            match resolve(&base, href) {
                Some(resolved) if same_host(&resolved, &base) => {
                    debug!("Hidden page: {}", resolved);
                    result.hidden.insert(resolved.to_string());
                }
                Some(resolved) => debug!("Skipping foreign link: {}", resolved),
                None => debug!("Skipping unresolvable link: {}", href),
            }
            continue;
        }

        let absolute = if href.starts_with("//") {
            base.join(href).ok()
        } else {
            Url::parse(href).ok()
        };

        match absolute {
            Some(mut url) if same_host(&url, &base) => {
                url.set_fragment(None);
                debug!("Same-host page: {}", url);
                result.pages.insert(url.to_string());
            }
            Some(url) => debug!("Skipping foreign link: {}", url),
            None => debug!("Skipping relative link: {}", href),
        }
    }

    Ok(result)
}

/// Text content of a document, one trimmed line per non-empty text run.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let invisible = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| INVISIBLE.contains(&e.name())))
            .unwrap_or(false);
        if invisible {
            continue;
        }
        lines.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    lines.join("\n")
}

fn is_ignored(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
}

fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

fn same_host(url: &Url, base: &Url) -> bool {
    matches!((url.host_str(), base.host_str()), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}
