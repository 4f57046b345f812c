// src/extract.rs
// =============================================================================
// Link extraction.
//
// Given the canonical URL of a page and its HTML body, produce the ordered,
// deduplicated list of absolute URLs the page references. One pass over the
// document in tree order, so a <base href> tag takes effect for every
// reference that follows it.
//
// Tags considered: <base href>, <a href>, <link href>, <script src>. The
// HTML parser lowercases tag and attribute names, so matching is
// case-insensitive for free. Anything else is ignored; malformed HTML never
// aborts extraction.
// =============================================================================

use scraper::{Html, Selector};

use crate::urls::{clean_url, host_prefix, path_join};

/// Per-page extraction state: the page's own canonical URL, the <base href>
/// seen so far (if any), and the links accumulated in document order. A
/// fresh one is built for every page and discarded after extraction.
struct PageLinks {
    page_url: String,
    base: Option<String>,
    links: Vec<String>,
}

impl PageLinks {
    fn new(page_url: &str) -> Self {
        PageLinks {
            page_url: page_url.to_string(),
            base: None,
            links: Vec::new(),
        }
    }

    /// Resolve a raw reference string to an absolute canonical URL, or
    /// `None` when the reference is not a usable child.
    fn resolve(&self, reference: &str) -> Option<String> {
        // clean_url also strips any ?query suffix.
        let path = clean_url(reference);

        if path == "/" {
            // Root self-reference, nothing to follow.
            return None;
        }

        if path.starts_with('/') {
            // Site-absolute path: resolve against the <base href> when one
            // was seen, otherwise against the page's scheme+host prefix.
            match &self.base {
                Some(base) => Some(path_join(base, &path)),
                None => host_prefix(&self.page_url).map(|prefix| path_join(prefix, &path)),
            }
        } else if !path.contains("://") {
            // Relative path: resolve against the page URL itself.
            Some(path_join(&self.page_url, &path))
        } else {
            // Already absolute.
            Some(path)
        }
    }

    /// Resolve and append a reference, keeping first-occurrence order and
    /// skipping self-references and duplicates.
    fn push(&mut self, reference: &str) {
        if let Some(resolved) = self.resolve(reference) {
            if resolved != self.page_url && !self.links.contains(&resolved) {
                self.links.push(resolved);
            }
        }
    }
}

/// Extract the child URLs referenced by `html`, a page fetched from the
/// canonical URL `page_url`. Returns absolute canonical URLs, deduplicated,
/// in first-occurrence document order.
pub fn extract_links(page_url: &str, html: &str) -> Vec<String> {
    // Static selector list; tree-order iteration gives us base-before-link
    // ordering for free.
    let selector =
        Selector::parse("base[href], a[href], link[href], script[src]").unwrap();

    let document = Html::parse_document(html);
    let mut state = PageLinks::new(page_url);

    for element in document.select(&selector) {
        match element.value().name() {
            "base" => {
                if let Some(href) = element.value().attr("href") {
                    state.base = Some(clean_url(href));
                }
            }
            "a" | "link" => {
                if let Some(href) = element.value().attr("href") {
                    // Fragment- and query-only references do not lead
                    // anywhere new.
                    if href.starts_with('#') || href.starts_with('?') {
                        continue;
                    }
                    state.push(href);
                }
            }
            "script" => {
                if let Some(src) = element.value().attr("src") {
                    state.push(src);
                }
            }
            _ => {}
        }
    }

    state.links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_without_base() {
        let links = extract_links("http://a.com/x/y.html", r#"<a href="/z">z</a>"#);
        assert_eq!(links, vec!["http://a.com/z"]);
    }

    #[test]
    fn test_absolute_path_with_base() {
        let html = r#"<base href="http://a.com/base/"><a href="/z">z</a>"#;
        let links = extract_links("http://a.com/x/y.html", html);
        assert_eq!(links, vec!["http://a.com/base/z"]);
    }

    #[test]
    fn test_relative_path_joins_page_url() {
        let links = extract_links("http://a.com/x", r#"<a href="sub/page.html">p</a>"#);
        assert_eq!(links, vec!["http://a.com/x/sub/page.html"]);
    }

    #[test]
    fn test_already_absolute_reference() {
        let links = extract_links("http://a.com/", r#"<a href="http://other.com/p">p</a>"#);
        assert_eq!(links, vec!["http://other.com/p"]);
    }

    #[test]
    fn test_skips_fragment_and_query_refs() {
        let html = r##"<a href="#top">top</a><a href="?sort=asc">sort</a>"##;
        assert!(extract_links("http://a.com/x", html).is_empty());
    }

    #[test]
    fn test_skips_root_self_reference() {
        assert!(extract_links("http://a.com/x", r#"<a href="/">home</a>"#).is_empty());
    }

    #[test]
    fn test_skips_page_self_reference() {
        let links = extract_links("http://a.com/x", r#"<a href="http://a.com/x">me</a>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let html = r#"
            <a href="/b">b</a>
            <a href="/a">a</a>
            <a href="/b">b again</a>
        "#;
        let links = extract_links("http://a.com/x", html);
        assert_eq!(links, vec!["http://a.com/b", "http://a.com/a"]);
    }

    #[test]
    fn test_script_src_is_extracted() {
        let links = extract_links("http://a.com/x", r#"<script src="/js/app.js"></script>"#);
        assert_eq!(links, vec!["http://a.com/js/app.js"]);
    }

    #[test]
    fn test_link_tag_href_is_extracted() {
        let links = extract_links("http://a.com/x", r#"<link rel="stylesheet" href="/s.css">"#);
        assert_eq!(links, vec!["http://a.com/s.css"]);
    }

    #[test]
    fn test_query_suffix_stripped_from_refs() {
        let links = extract_links("http://a.com/x", r#"<a href="/p?id=3">p</a>"#);
        assert_eq!(links, vec!["http://a.com/p"]);
    }

    #[test]
    fn test_tag_case_is_insensitive() {
        let links = extract_links("http://a.com/x", r#"<A HREF="/z">z</A>"#);
        assert_eq!(links, vec!["http://a.com/z"]);
    }

    #[test]
    fn test_malformed_html_is_best_effort() {
        let links =
            extract_links("http://a.com/x", r##"<a href="/ok"><div><<>junk<a href="#"##);
        assert_eq!(links, vec!["http://a.com/ok"]);
    }
}
