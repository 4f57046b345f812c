// src/policy.rs
// =============================================================================
// Traversal policy.
//
// Pure decision functions evaluated before every fetch. Two distinct pattern
// semantics live here and must not be mixed up:
//
// - include patterns are conjunctive (every pattern must match) and gate the
//   traversal itself, together with the exclude patterns;
// - filter patterns are disjunctive (any match wins) and gate only what is
//   reported and mirrored, never what is traversed.
// =============================================================================

use std::collections::HashSet;

use crate::cli::CrawlConfig;

/// True when the depth limit allows fetching at `depth`. A max depth of 0
/// means unlimited.
pub fn within_depth(config: &CrawlConfig, depth: usize) -> bool {
    config.max_depth == 0 || depth <= config.max_depth
}

/// False when any exclude pattern matches anywhere in the URL.
fn passes_exclude(config: &CrawlConfig, url: &str) -> bool {
    !config.exclude.iter().any(|pattern| pattern.is_match(url))
}

/// True only when every include pattern matches the URL.
fn passes_include(config: &CrawlConfig, url: &str) -> bool {
    config.include.iter().all(|pattern| pattern.is_match(url))
}

/// The traversal gate: should this canonical URL be fetched at this depth?
pub fn should_fetch(
    config: &CrawlConfig,
    url: &str,
    depth: usize,
    visited: &HashSet<String>,
) -> bool {
    within_depth(config, depth)
        && !visited.contains(url)
        && passes_exclude(config, url)
        && passes_include(config, url)
}

/// The display gate: should this fetched URL be reported and mirrored?
///
/// Directory URLs get a virtual `index.html` suffix before matching so a
/// filter like `index\.html$` catches them. With no filters configured every
/// fetched URL is shown.
pub fn should_display(config: &CrawlConfig, url: &str) -> bool {
    if config.filter.is_empty() {
        return true;
    }
    let candidate = if url.ends_with('/') {
        format!("{}index.html", url)
    } else {
        url.to_string()
    };
    config.filter.iter().any(|pattern| pattern.is_match(&candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn patterns(list: &[&str]) -> Vec<Regex> {
        list.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn test_depth_zero_is_unlimited() {
        let config = CrawlConfig::default();
        assert!(within_depth(&config, 0));
        assert!(within_depth(&config, 1000));
    }

    #[test]
    fn test_depth_limit_is_inclusive() {
        let config = CrawlConfig {
            max_depth: 2,
            ..CrawlConfig::default()
        };
        assert!(within_depth(&config, 2));
        assert!(!within_depth(&config, 3));
    }

    #[test]
    fn test_visited_urls_are_not_refetched() {
        let config = CrawlConfig::default();
        let mut visited = HashSet::new();
        assert!(should_fetch(&config, "http://a.com/x", 0, &visited));
        visited.insert("http://a.com/x".to_string());
        assert!(!should_fetch(&config, "http://a.com/x", 0, &visited));
    }

    #[test]
    fn test_any_exclude_match_drops_the_url() {
        let config = CrawlConfig {
            exclude: patterns(&["/tmp/", "/cache/"]),
            ..CrawlConfig::default()
        };
        let visited = HashSet::new();
        assert!(!should_fetch(&config, "http://a.com/tmp/x.txt", 0, &visited));
        assert!(should_fetch(&config, "http://a.com/data/x.txt", 0, &visited));
    }

    #[test]
    fn test_includes_are_conjunctive() {
        let config = CrawlConfig {
            include: patterns(&["a\\.com", "\\.txt$"]),
            ..CrawlConfig::default()
        };
        let visited = HashSet::new();
        assert!(should_fetch(&config, "http://a.com/x.txt", 0, &visited));
        // Matches only one of the two includes.
        assert!(!should_fetch(&config, "http://a.com/x.html", 0, &visited));
        assert!(!should_fetch(&config, "http://b.com/x.txt", 0, &visited));
    }

    #[test]
    fn test_filters_are_disjunctive() {
        let config = CrawlConfig {
            filter: patterns(&["\\.txt$", "\\.css$"]),
            ..CrawlConfig::default()
        };
        assert!(should_display(&config, "http://a.com/x.txt"));
        assert!(should_display(&config, "http://a.com/x.css"));
        assert!(!should_display(&config, "http://a.com/x.html"));
    }

    #[test]
    fn test_no_filters_displays_everything() {
        let config = CrawlConfig::default();
        assert!(should_display(&config, "http://a.com/anything"));
    }

    #[test]
    fn test_directory_urls_match_as_index_html() {
        let config = CrawlConfig {
            filter: patterns(&["index\\.html$"]),
            ..CrawlConfig::default()
        };
        assert!(should_display(&config, "http://a.com/docs/"));
        assert!(!should_display(&config, "http://a.com/docs/page.html"));
    }
}
